//! Error type for the demo binary.

use cart_store::{ConfigError, StoreError};
use thiserror::Error;

pub type DemoResult<T> = Result<T, DemoError>;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cart store error: {0}")]
    Store(#[from] StoreError),
}
