//! Validation errors for castkit requests.

use thiserror::Error;

use crate::params::RankingStrategy;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, ValidationError>;

/// A request that was rejected before any downstream call was made.
///
/// The `Display` text is the message shown to callers, so variants carry
/// exactly the wording clients match against.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field (identifier list, username, search term) was absent or empty.
    #[error("{field} is required")]
    Missing {
        /// The name of the missing field.
        field: &'static str,
    },

    /// The ranking strategy is not one of the supported values.
    #[error(
        "incorrect strategy {given}. please choose one from [{}]",
        RankingStrategy::allowed_list()
    )]
    InvalidStrategy {
        /// The value supplied by the caller.
        given: String,
    },

    /// Both handles and fids were supplied to a query that takes one kind.
    #[error("cannot query by both handles and fids. query by either handle or fid")]
    Ambiguous,

    /// Neither handles nor fids were supplied to a query that needs one.
    #[error("either handles or fids is required")]
    NoIdentifiers,

    /// A numeric field could not be parsed.
    #[error("{field} must be a non-negative integer")]
    InvalidInteger {
        /// The name of the invalid field.
        field: &'static str,
    },

    /// A hash field is not a (optionally `0x`-prefixed) hex string.
    #[error("{field} must be a hex string")]
    InvalidHash {
        /// The name of the invalid field.
        field: &'static str,
    },

    /// The request body does not match the expected schema.
    #[error("invalid request body: {0}")]
    Body(String),
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Body(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_display() {
        let err = ValidationError::Missing { field: "handles" };
        assert_eq!(err.to_string(), "handles is required");
    }

    #[test]
    fn test_invalid_strategy_lists_allowed_values() {
        let err = ValidationError::InvalidStrategy {
            given: "popular".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "incorrect strategy popular. please choose one from \
             [follows, engagement, activity, og_circles, og_engagement, og_activity]"
        );
    }

    #[test]
    fn test_ambiguous_display() {
        let msg = ValidationError::Ambiguous.to_string();
        assert!(msg.contains("both handles and fids"));
    }

    #[test]
    fn test_invalid_integer_display() {
        let err = ValidationError::InvalidInteger { field: "cursor" };
        assert_eq!(err.to_string(), "cursor must be a non-negative integer");
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<Vec<u64>>("[\"a\"]").unwrap_err();
        let err: ValidationError = json_err.into();
        assert!(matches!(err, ValidationError::Body(_)));
        assert!(err.to_string().starts_with("invalid request body"));
    }

    #[test]
    fn test_result_type_err() {
        let result: Result<u32> = Err(ValidationError::NoIdentifiers);
        assert!(result.is_err());
    }
}
