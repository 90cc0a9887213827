// In crates/database/src/postgres.rs

use crate::types::{to_numeric, PositionRow, SignalRow, TradeRow};
use crate::{Error, PositionStore, Result, SignalStore, StoredSignal};
use app_config::DatabaseSettings;
use async_trait::async_trait;
use core_types::{profit_loss, AnalysisResult, ExitType, Market, NewPosition, Position, Symbol, TradeRecord};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{postgres::PgPoolOptions, PgPool};

const POSITION_COLUMNS: &str = "id, symbol, market, side, entry_price, entry_low, entry_high, \
     tp1, tp2, tp3, sl, current_price, status, created_at, closed_at";

/// A wrapper around the `sqlx` connection pool.
#[derive(Debug, Clone)]
pub struct Db(PgPool);

/// Establishes a connection pool to the PostgreSQL database and runs migrations.
pub async fn connect(settings: &DatabaseSettings) -> Result<Db> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        // `?` converts the `sqlx::Error` through the `#[from]` on our error enum.
        .connect(&settings.url)
        .await?;

    // Run database migrations. This ensures the database schema is up-to-date.
    sqlx::migrate!("../../migrations").run(&pool).await.map_err(Error::from)?;
    tracing::info!("Database connected and migrated.");

    Ok(Db(pool))
}

#[async_trait]
impl SignalStore for Db {
    async fn save_signal(&self, symbol: &Symbol, market: Market, analysis: &AnalysisResult) -> Result<i64> {
        let levels = analysis.levels.as_ref();
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO signals (
                symbol, market, action, score, current_price,
                rsi, atr, volume_ratio, trend, ema_trend,
                ema_score, hh, hl, lh, ll,
                entry_low, entry_high, tp1, tp2, tp3,
                sl, patterns, analysis
            )
            VALUES (
                $1, $2, $3, $4, $5,
                $6, $7, $8, $9, $10,
                $11, $12, $13, $14, $15,
                $16, $17, $18, $19, $20,
                $21, $22, $23
            )
            RETURNING id
            "#,
        )
        .bind(&symbol.0)
        .bind(market.as_str())
        .bind(analysis.action.as_str())
        .bind(analysis.score)
        .bind(analysis.current_price)
        .bind(analysis.rsi)
        .bind(analysis.atr)
        .bind(analysis.volume_ratio)
        .bind(analysis.trend.as_str())
        .bind(analysis.ema_trend.as_str())
        .bind(analysis.ema_score)
        .bind(analysis.hh)
        .bind(analysis.hl)
        .bind(analysis.lh)
        .bind(analysis.ll)
        .bind(levels.map(|l| l.entry_low))
        .bind(levels.map(|l| l.entry_high))
        .bind(levels.map(|l| l.tp1))
        .bind(levels.map(|l| l.tp2))
        .bind(levels.map(|l| l.tp3))
        .bind(levels.map(|l| l.sl))
        .bind(Json(&analysis.patterns))
        .bind(Json(analysis))
        .fetch_one(&self.0)
        .await
        .map_err(Error::OperationFailed)?;

        tracing::debug!(id, %symbol, action = %analysis.action, score = analysis.score, "Signal saved.");
        Ok(id)
    }

    async fn get_all_signals(&self, market: Market) -> Result<Vec<StoredSignal>> {
        let rows: Vec<SignalRow> = sqlx::query_as(
            "SELECT id, symbol, market, analysis, created_at FROM signals \
             WHERE market = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(market.as_str())
        .fetch_all(&self.0)
        .await
        .map_err(Error::OperationFailed)?;

        rows.into_iter().map(StoredSignal::try_from).collect()
    }

    async fn delete_signal(&self, symbol: &Symbol, market: Market) -> Result<bool> {
        let result = sqlx::query("DELETE FROM signals WHERE symbol = $1 AND market = $2")
            .bind(&symbol.0)
            .bind(market.as_str())
            .execute(&self.0)
            .await
            .map_err(Error::OperationFailed)?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl PositionStore for Db {
    async fn save_position(&self, position: NewPosition) -> Result<i64> {
        let (entry_low, entry_high, current_price) = position.resolved_band();
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO positions (
                symbol, market, side, entry_price, entry_low,
                entry_high, tp1, tp2, tp3, sl, current_price
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
            "#,
        )
        .bind(&position.symbol.0)
        .bind(position.market.as_str())
        .bind(position.side.as_str())
        .bind(to_numeric(position.entry_price)?)
        .bind(to_numeric(entry_low)?)
        .bind(to_numeric(entry_high)?)
        .bind(to_numeric(position.tp1)?)
        .bind(to_numeric(position.tp2)?)
        .bind(to_numeric(position.tp3)?)
        .bind(to_numeric(position.sl)?)
        .bind(to_numeric(current_price)?)
        .fetch_one(&self.0)
        .await
        .map_err(Error::OperationFailed)?;

        tracing::info!(id, symbol = %position.symbol, side = %position.side, "Position opened.");
        Ok(id)
    }

    async fn update_current_price(&self, symbol: &Symbol, price: Decimal) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE positions SET current_price = $1 WHERE symbol = $2 AND status = 'active'",
        )
        .bind(to_numeric(price)?)
        .bind(&symbol.0)
        .execute(&self.0)
        .await
        .map_err(Error::OperationFailed)?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_active_positions(&self, market: Option<Market>) -> Result<Vec<Position>> {
        let sql = format!(
            "SELECT {POSITION_COLUMNS} FROM positions \
             WHERE status = 'active' AND ($1::TEXT IS NULL OR market = $1) \
             ORDER BY created_at DESC, id DESC"
        );
        let rows: Vec<PositionRow> = sqlx::query_as(&sql)
            .bind(market.map(|m| m.as_str()))
            .fetch_all(&self.0)
            .await
            .map_err(Error::OperationFailed)?;

        rows.into_iter().map(Position::try_from).collect()
    }

    async fn close_position(&self, id: i64, exit_price: Decimal, exit_type: ExitType) -> Result<bool> {
        let mut tx = self.0.begin().await.map_err(Error::OperationFailed)?;

        let sql = format!("SELECT {POSITION_COLUMNS} FROM positions WHERE id = $1 AND status = 'active' FOR UPDATE");
        let row: Option<PositionRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(Error::OperationFailed)?;

        // Dropping the transaction rolls it back.
        let Some(row) = row else {
            return Ok(false);
        };
        let position = Position::try_from(row)?;
        let pnl = profit_loss(position.side, position.entry_price, exit_price);

        sqlx::query(
            r#"
            INSERT INTO trade_history (
                position_id, symbol, market, side,
                entry_price, exit_price, profit_loss, exit_type
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(position.id)
        .bind(&position.symbol.0)
        .bind(position.market.as_str())
        .bind(position.side.as_str())
        .bind(to_numeric(position.entry_price)?)
        .bind(to_numeric(exit_price)?)
        .bind(to_numeric(pnl)?)
        .bind(exit_type.as_str())
        .execute(&mut *tx)
        .await
        .map_err(Error::OperationFailed)?;

        sqlx::query(
            "UPDATE positions SET status = 'closed', closed_at = now(), current_price = $1 WHERE id = $2",
        )
        .bind(to_numeric(exit_price)?)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(Error::OperationFailed)?;

        tx.commit().await.map_err(Error::OperationFailed)?;

        tracing::info!(id, symbol = %position.symbol, %exit_type, profit_loss = %pnl, "Position closed.");
        Ok(true)
    }

    async fn get_trade_history(&self, market: Option<Market>, limit: usize) -> Result<Vec<TradeRecord>> {
        let rows: Vec<TradeRow> = sqlx::query_as(
            "SELECT id, symbol, market, side, entry_price, exit_price, profit_loss, exit_type, timestamp \
             FROM trade_history WHERE ($1::TEXT IS NULL OR market = $1) \
             ORDER BY timestamp DESC, id DESC LIMIT $2",
        )
        .bind(market.map(|m| m.as_str()))
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.0)
        .await
        .map_err(Error::OperationFailed)?;

        rows.into_iter().map(TradeRecord::try_from).collect()
    }
}
