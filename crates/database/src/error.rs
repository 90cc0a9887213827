// In crates/database/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to connect to the database")]
    ConnectionError(#[from] sqlx::Error),
    #[error("Database migration failed: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
    #[error("Database operation failed")]
    OperationFailed(sqlx::Error),
    #[error("Stored row is invalid: {0}")]
    InvalidRow(#[from] core_types::Error),
    #[error("Numeric conversion failed: {0}")]
    NumericConversion(String),
}

pub type Result<T> = std::result::Result<T, Error>;
