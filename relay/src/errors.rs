use crate::payment_providers::ProviderError;
use crate::store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Webhook arrived without a signature header
    #[error("Missing signature header")]
    MissingSignature,

    /// Webhook signature did not match the body
    #[error("Invalid signature")]
    InvalidSignature,

    /// Request body could not be understood
    #[error("Malformed payload: {message}")]
    MalformedPayload { message: String },

    /// Requested resource not found
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: String, id: String },

    /// Feature needs configuration that is absent
    #[error("{feature} is not configured")]
    NotConfigured { feature: String },

    /// The upstream payment provider failed or rejected the call
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Order storage failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingSignature => StatusCode::BAD_REQUEST,
            Error::InvalidSignature => StatusCode::FORBIDDEN,
            Error::MalformedPayload { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::NotConfigured { .. } => StatusCode::NOT_IMPLEMENTED,
            Error::Provider(_) => StatusCode::BAD_GATEWAY,
            Error::Store(_) | Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::MissingSignature => "Missing signature header".to_string(),
            Error::InvalidSignature => "Invalid signature".to_string(),
            Error::MalformedPayload { message } => format!("Malformed payload: {message}"),
            Error::NotFound { resource, id } => format!("{resource} with ID {id} not found"),
            Error::NotConfigured { feature } => format!("{feature} is not configured"),
            Error::Provider(provider_err) => match provider_err {
                ProviderError::Rejected { status, message } => {
                    format!("Payment provider rejected the request ({status}): {message}")
                }
                ProviderError::Transport(_) => "Payment provider is unreachable".to_string(),
                ProviderError::InvalidResponse(_) => "Payment provider returned an invalid response".to_string(),
            },
            Error::Store(_) | Error::Other(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Store(_) | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Provider(_) => {
                tracing::warn!("Payment provider error: {}", self);
            }
            Error::InvalidSignature => {
                tracing::warn!("Rejected webhook: {}", self);
            }
            Error::MissingSignature | Error::MalformedPayload { .. } | Error::NotFound { .. } | Error::NotConfigured { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        (self.status_code(), self.user_message()).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
