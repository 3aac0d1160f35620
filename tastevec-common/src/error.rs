//! Common error types for tastevec

use thiserror::Error;

/// Common result type for tastevec operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across tastevec crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),
}
