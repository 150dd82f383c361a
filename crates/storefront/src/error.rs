//! Unified error handling.
//!
//! Cart event handlers never return errors to the page; each failure is
//! logged where it is detected. `AppError` covers what does propagate with
//! `?`: setup and template rendering. `PayloadError` describes bad data on a
//! clicked element and stays inside the dispatcher.

use thiserror::Error;

use crate::config::ConfigError;

/// A clicked element didn't carry usable data.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// No element on the click path carries an item payload.
    #[error("no item payload on the clicked element or its ancestors")]
    MissingPayload,

    /// The item payload isn't a JSON object describing an item.
    #[error("could not parse item data: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The element has no `data-id`.
    #[error("element has no item id")]
    MissingItemId,

    /// The element's `data-id` isn't an integer.
    #[error("invalid item id {0:?}")]
    InvalidItemId(String),
}

/// Application-level error type for the cart.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration couldn't be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// A template failed to render.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::from(ConfigError::InvalidEnvVar(
            "CART_MODAL_HIDE_MS".to_string(),
            "invalid digit found in string".to_string(),
        ));
        assert_eq!(
            err.to_string(),
            "Config error: Invalid environment variable CART_MODAL_HIDE_MS: invalid digit found in string"
        );
    }

    #[test]
    fn test_payload_error_display() {
        let err = PayloadError::InvalidItemId("abc".to_string());
        assert_eq!(err.to_string(), "invalid item id \"abc\"");
    }

    #[test]
    fn test_malformed_payload_wraps_serde_error() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json");
        let Err(source) = parse else {
            panic!("expected a parse error");
        };
        let err = PayloadError::from(source);
        assert!(err.to_string().starts_with("could not parse item data"));
    }
}
