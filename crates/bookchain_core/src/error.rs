//! Core error types for BOOKCHAIN.

use crate::hash::HashError;

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;

/// Core error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Invalid hash format
    #[error("Invalid hash: {0}")]
    InvalidHash(#[from] HashError),

    /// Invalid timestamp
    #[error("Invalid timestamp: {reason}")]
    InvalidTimestamp {
        /// What was wrong with it
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::InvalidTimestamp {
            reason: "not rfc3339".to_string(),
        };
        assert_eq!(format!("{}", err), "Invalid timestamp: not rfc3339");
    }

    #[test]
    fn test_hash_error_converts() {
        let err: CoreError = HashError::InvalidLength(3).into();
        assert_eq!(err, CoreError::InvalidHash(HashError::InvalidLength(3)));
        assert!(err.to_string().contains("3"));
    }
}
