/// Error types for popscout.
///
/// Two very different failure scopes share this enum:
///
/// 1. **Item failures** happen inside a single mapped call (one country's
///    population request). The mapper catches them and stores the rendered
///    message in a [`ResultRecord::Failure`](crate::results::ResultRecord)
///    sentinel, so they never reach the caller as an `Err`.
///
/// 2. **Batch failures** happen before any item is claimed, e.g. the country
///    list itself could not be fetched. Those are returned as `Err` from
///    [`load_countries`](crate::population::load_countries).
///
/// Substring absence is not an error anywhere in this crate; `index_of`
/// returns `None`.
use thiserror::Error;

/// Result type for popscout operations
pub type ScoutResult<T> = Result<T, ScoutError>;

/// Errors that can occur while loading or presenting data
#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{status} {reason} – {detail}")]
    BadStatus {
        status: u16,
        reason: String,
        detail: String,
    },
    #[error("Malformed payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("No countries returned from API.")]
    EmptyCountryList,
    #[error("Invalid sort order: {0}")]
    InvalidSortOrder(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ScoutError {
    /// Builds the error for a non-success HTTP response. An empty body falls
    /// back to the requested URL so the message always says what failed.
    pub fn bad_status(
        status: u16,
        reason: impl Into<String>,
        body: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        let body = body.into();
        let detail = if body.trim().is_empty() {
            url.into()
        } else {
            body
        };
        Self::BadStatus {
            status,
            reason: reason.into(),
            detail,
        }
    }

    pub fn invalid_sort_order(order: impl Into<String>) -> Self {
        Self::InvalidSortOrder(order.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

impl From<config::ConfigError> for ScoutError {
    fn from(err: config::ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = ScoutError::bad_status(404, "Not Found", "", "http://x/countries");
        assert!(matches!(err, ScoutError::BadStatus { status: 404, .. }));

        let err = ScoutError::invalid_sort_order("height:up");
        assert!(matches!(err, ScoutError::InvalidSortOrder(_)));

        let err = ScoutError::config_error("Missing base_url");
        assert!(matches!(err, ScoutError::ConfigError(_)));
    }

    #[test]
    fn test_error_messages() {
        let err = ScoutError::bad_status(500, "Internal Server Error", "boom", "http://x");
        assert_eq!(err.to_string(), "500 Internal Server Error – boom");

        // Blank body falls back to the URL
        let err = ScoutError::bad_status(404, "Not Found", "  ", "http://x/countries");
        assert_eq!(err.to_string(), "404 Not Found – http://x/countries");

        assert_eq!(
            ScoutError::EmptyCountryList.to_string(),
            "No countries returned from API."
        );

        let err = ScoutError::invalid_sort_order("height:up");
        assert_eq!(err.to_string(), "Invalid sort order: height:up");
    }

    #[test]
    fn test_payload_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: ScoutError = json_err.into();
        assert!(err.to_string().starts_with("Malformed payload:"));
    }
}
