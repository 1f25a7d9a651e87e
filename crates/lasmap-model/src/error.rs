use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("invalid curve name: {0:?}")]
    InvalidName(String),
    #[error("unknown dictionary status: {0:?}")]
    UnknownStatus(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
