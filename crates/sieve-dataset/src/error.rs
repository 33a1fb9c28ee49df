use sieve_common::error::CommonError;
use thiserror::Error;

pub type DatasetResult<T> = Result<T, DatasetError>;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("missing argument: {0}")]
    MissingArgument(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("checkpoint error: {0}")]
    CheckpointError(String),
    #[error("internal error: {0}")]
    InternalError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("upstream error: {0}")]
    UpstreamError(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl DatasetError {
    pub fn missing(message: impl Into<String>) -> Self {
        DatasetError::MissingArgument(message.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        DatasetError::InvalidArgument(message.into())
    }

    pub fn checkpoint(message: impl Into<String>) -> Self {
        DatasetError::CheckpointError(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        DatasetError::InternalError(message.into())
    }
}

impl From<CommonError> for DatasetError {
    fn from(error: CommonError) -> Self {
        match error {
            CommonError::InvalidArgument(message) => DatasetError::InvalidArgument(message),
        }
    }
}
