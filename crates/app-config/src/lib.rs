// In crates/app-config/src/lib.rs

use config::{Config, Environment, File, FileFormat};

pub mod error;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use types::{AppSettings, BinanceSettings, DatabaseSettings, ScannerSettings, Settings, YahooSettings};

/// Shortest series the scoring engine accepts.
pub const MIN_OHLCV_LIMIT: usize = strategies::MIN_BARS;

/// Loads the application settings from various sources.
///
/// This function orchestrates the layered configuration loading:
/// 1. Reads from a default `base.toml` file.
/// 2. Merges settings from an environment-specific file (e.g., `development.toml`).
/// 3. Merges settings from environment variables.
pub fn load_settings() -> Result<Settings> {
    // Get the current environment. Default to "development" if not set.
    let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

    let settings = Config::builder()
        .add_source(File::with_name("config/base"))
        .add_source(File::with_name(&format!("config/{}", environment)).required(false))
        // e.g. `APP__SCANNER__MARKET=forex`
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let settings: Settings = settings.try_deserialize()?;
    settings.validate()?;

    Ok(settings)
}

/// Parses settings from an in-memory TOML document, without the file and env layers.
pub fn from_toml_str(toml: &str) -> Result<Settings> {
    let settings: Settings = Config::builder()
        .add_source(File::from_str(toml, FileFormat::Toml))
        .build()?
        .try_deserialize()?;
    settings.validate()?;
    Ok(settings)
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.scanner.ohlcv_limit < MIN_OHLCV_LIMIT {
            return Err(Error::Invalid {
                field: "scanner.ohlcv_limit",
                reason: format!("must be at least {MIN_OHLCV_LIMIT}, got {}", self.scanner.ohlcv_limit),
            });
        }
        if !(self.strategy.atr_multiplier > 0.0) {
            return Err(Error::Invalid {
                field: "strategy.atr_multiplier",
                reason: format!("must be positive, got {}", self.strategy.atr_multiplier),
            });
        }
        if !(self.strategy.entry_range_pct >= 0.0) {
            return Err(Error::Invalid {
                field: "strategy.entry_range_pct",
                reason: format!("must not be negative, got {}", self.strategy.entry_range_pct),
            });
        }
        Ok(())
    }
}
