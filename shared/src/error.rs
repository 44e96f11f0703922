//! Error types for Surfcamp Events Lambda functions.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Surfcamp Events Lambda functions.
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// AWS SDK error
    #[error("AWS error: {0}")]
    Aws(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required request parameter was not supplied
    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    /// A timezone identifier not present in the IANA database
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// A stored record carries a start/end time that cannot be interpreted
    #[error("Malformed record time: {0}")]
    MalformedRecordTime(String),

    /// Not found error
    #[error("Not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::MissingParameter(_) | Error::InvalidTimezone(_) => 400,
            Error::NotFound(_) => 404,
            _ => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_4xx() {
        assert_eq!(Error::MissingParameter("ids".into()).status_code(), 400);
        assert_eq!(Error::InvalidTimezone("Mars/Olympus".into()).status_code(), 400);
        assert_eq!(Error::NotFound("event 9".into()).status_code(), 404);
        assert_eq!(Error::Aws("throttled".into()).status_code(), 500);
    }
}
