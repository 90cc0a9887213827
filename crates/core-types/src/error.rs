// In crates/core-types/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("Unknown market: {0}")]
    UnknownMarket(String),

    #[error("Unknown side: {0}")]
    UnknownSide(String),

    #[error("Unknown exit type: {0}")]
    UnknownExitType(String),

    #[error("Unknown position status: {0}")]
    UnknownStatus(String),

    #[error("Price {0} cannot be represented as a decimal")]
    InvalidPrice(f64),
}

pub type Result<T> = std::result::Result<T, Error>;
