use thiserror::Error;

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

#[cfg(feature = "serde")]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse detector config: {0}")]
    Parse(String),
}
