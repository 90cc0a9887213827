// In app/src/report.rs

use analytics::TradeSummary;
use core_types::{profit_loss, AnalysisResult, Market, Position, TradeRecord};
use database::StoredSignal;
use engine::{CustomEntry, SignalHit};
use itertools::Itertools;

pub fn print_hits(market: Market, hits: &[SignalHit]) {
    println!("\n--- Scan Complete ({market}) ---");
    if hits.is_empty() {
        println!("No signals passed the score filter.");
        return;
    }
    for (i, hit) in hits.iter().enumerate() {
        println!("\n[Rank {} | {} | #{}]", i + 1, hit.symbol, hit.signal_id);
        print_result(&hit.analysis);
    }
}

pub fn print_analysis(hit: &SignalHit) {
    println!("\n--- {} (signal #{}) ---", hit.symbol, hit.signal_id);
    print_result(&hit.analysis);
}

fn print_result(a: &AnalysisResult) {
    println!("  - Action: {} | Score: {} | Price: {:.4}", a.action, a.score, a.current_price);
    println!(
        "  - Trend: {} ({}) | EMA: {} | RSI: {:.2} | Volume: {:.2}x | ATR: {:.4}",
        a.trend, a.trend_score, a.ema_trend, a.rsi, a.volume_ratio, a.atr
    );
    println!(
        "  - Components: trend {} + rsi {} + volume {} + patterns {}",
        a.trend_score, a.rsi_score, a.volume_score, a.pattern_score
    );
    if !a.detected_patterns.is_empty() {
        println!("  - Patterns: {}", a.detected_patterns.iter().join(", "));
    }
    if let Some(l) = &a.levels {
        println!(
            "  - Entry: {:.4} ({:.4} - {:.4}) | TP: {:.4} / {:.4} / {:.4} | SL: {:.4}",
            l.ideal_entry, l.entry_low, l.entry_high, l.tp1, l.tp2, l.tp3, l.sl
        );
    }
}

pub fn print_custom_entry(entry: &CustomEntry) {
    let t = &entry.targets;
    println!("\n--- Custom Entry: {} {} ---", entry.symbol, entry.side);
    let rr = t.risk_reward().map(|rr| format!("{rr:.2}")).unwrap_or_else(|| "n/a".to_string());
    println!("  - Entry: {:.4} | ATR: {:.4} | R:R {rr}", t.entry_price, entry.atr);
    println!("  - TP: {:.4} / {:.4} / {:.4} | SL: {:.4}", t.tp1, t.tp2, t.tp3, t.sl);
}

pub fn print_positions(positions: &[Position]) {
    if positions.is_empty() {
        println!("No active positions.");
        return;
    }
    for p in positions {
        let pnl = profit_loss(p.side, p.entry_price, p.current_price);
        println!(
            "#{} {} {} | entry {} | now {} | P&L {} | TP {} / {} / {} | SL {} | since {}",
            p.id,
            p.symbol,
            p.side,
            p.entry_price,
            p.current_price,
            pnl,
            p.tp1,
            p.tp2,
            p.tp3,
            p.sl,
            p.created_at.format("%Y-%m-%d %H:%M")
        );
    }
}

pub fn print_history(trades: &[TradeRecord], summary: &TradeSummary) {
    for t in trades {
        println!(
            "#{} {} {} | {} -> {} | P&L {} | {} | {}",
            t.id,
            t.symbol,
            t.side,
            t.entry_price,
            t.exit_price,
            t.profit_loss,
            t.exit_type,
            t.timestamp.format("%Y-%m-%d %H:%M")
        );
    }
    println!("\n--- Performance ---");
    println!(
        "  - Trades: {} | Wins: {} | Losses: {} | Win rate: {:.2}%",
        summary.total_trades, summary.wins, summary.losses, summary.win_rate
    );
    println!(
        "  - Net P&L: {} | Profit factor: {:.2} | Expectancy: {}",
        summary.net_pnl, summary.profit_factor, summary.expectancy
    );
}

pub fn print_signals(signals: &[StoredSignal]) {
    if signals.is_empty() {
        println!("No stored signals.");
        return;
    }
    for s in signals {
        println!(
            "#{} {} | {} | score {} | {}",
            s.id,
            s.symbol,
            s.analysis.action,
            s.analysis.score,
            s.created_at.format("%Y-%m-%d %H:%M")
        );
    }
}
