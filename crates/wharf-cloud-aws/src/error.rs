//! AWS driver error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AwsError {
    #[error("{0} must be specified")]
    MissingOption(&'static str),

    #[error("Resource already exists: {0}")]
    ResourceAlreadyExists(String),

    #[error("DB instance {0} has no endpoint")]
    MissingEndpoint(String),

    #[error("could not find DB instance {0} after creation")]
    CreatedInstanceMissing(String),

    #[error("AWS API error: {0}")]
    Api(String),

    #[error("timed out waiting for {0}")]
    Timeout(String),
}

pub type Result<T> = std::result::Result<T, AwsError>;
