//! Error types for the MoneyApp client library.

use crate::form::{Field, FormState};

/// All errors that can occur when using the MoneyApp client.
#[derive(Debug, thiserror::Error)]
pub enum MoneyAppError {
    /// HTTP transport error (connection refused, DNS failure, broken body).
    #[cfg(any(feature = "async", feature = "blocking"))]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a status other than `200 OK`.
    #[error("API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, or a placeholder if it could not be read.
        message: String,
    },

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The configured API base URL is not a valid URL.
    #[error("invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A configuration value is present but unusable.
    #[error("invalid configuration for {key}: {reason}")]
    Config {
        /// Name of the offending setting.
        key: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// An environment file exists but could not be loaded.
    #[cfg(feature = "env-file")]
    #[error("failed to load environment file: {0}")]
    EnvFile(#[from] dotenvy::Error),

    /// The add-transaction form is not ready to submit.
    #[error("form is not ready to submit: {0}")]
    Validation(#[from] ValidationError),

    /// The requested form action is not allowed in the current state.
    #[error("cannot {action} while the form is {state}")]
    FormState {
        /// The attempted action.
        action: &'static str,
        /// State the form was in.
        state: FormState,
    },
}

/// First condition that keeps the add-transaction form from being
/// submittable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// No date has been picked.
    #[error("no date selected")]
    MissingDate,
    /// The amount field is empty.
    #[error("amount is empty")]
    MissingAmount,
    /// The amount does not reproduce itself when parsed and re-rendered.
    #[error("amount {0:?} is not a canonical number")]
    InvalidAmount(String),
    /// No transaction type has been selected.
    #[error("no transaction type selected")]
    MissingKind,
    /// A reference required by the selected type is empty.
    #[error("{0} is required")]
    MissingField(Field),
}

/// Convenience alias for results with [`MoneyAppError`].
pub type Result<T> = core::result::Result<T, MoneyAppError>;
