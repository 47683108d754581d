//! Error handling for the shop client

use std::fmt;
use thiserror::Error;

/// Gateway and transport errors
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Authentication errors (bad credentials, sign-up conflicts, missing session)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The backend rejected a row operation
    #[error("Database error: {message} (Status: {status})")]
    Database {
        status: reqwest::StatusCode,
        message: String,
    },

    /// A row read from the backend did not match its record type
    #[error("Invalid row: {0}")]
    InvalidRow(String),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// JWT errors
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// General errors
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Create a new authentication error
    pub fn auth<T: fmt::Display>(msg: T) -> Self {
        Error::Auth(msg.to_string())
    }

    /// Create a new invalid row error
    pub fn invalid_row<T: fmt::Display>(msg: T) -> Self {
        Error::InvalidRow(msg.to_string())
    }

    /// Create a new configuration error
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    /// Create a new general error
    pub fn general<T: fmt::Display>(msg: T) -> Self {
        Error::General(msg.to_string())
    }

    /// The backend's own wording, for showing inline
    pub fn user_message(&self) -> String {
        match self {
            Error::Auth(message) | Error::Database { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Input rejected before any network call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please add items to your cart before placing an order")]
    EmptyCart,

    #[error("Please fill in the required fields: {}", .0.join(", "))]
    InvalidFields(Vec<String>),
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|field| field.to_string())
            .collect();
        fields.sort();
        ValidationError::InvalidFields(fields)
    }
}

/// Outcome of a failed order or contact submission
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Submission failed, please try again: {0}")]
    Gateway(#[from] Error),

    #[error("A submission is already in progress")]
    InFlight,
}

impl SubmitError {
    /// Whether re-submitting the same input can succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, SubmitError::Gateway(_) | SubmitError::InFlight)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
