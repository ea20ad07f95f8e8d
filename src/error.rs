//! Global error handling module for the Anime Indexer
//!
//! This module provides a unified error type for the HTTP surface and converts
//! it to appropriate HTTP responses with consistent JSON structure.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::extractors::ExtractError;
use crate::fetcher::FetchError;
use crate::models::ApiError;

/// Application-wide error type that unifies all error sources
#[derive(Debug, Error)]
pub enum AppError {
    /// Extraction errors (fetch, parse, missing markers)
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractError),

    /// Validation errors (bad request)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request - Validation errors
            AppError::Validation(_) => StatusCode::BAD_REQUEST,

            AppError::Extraction(extract_err) => match extract_err {
                // 404 Not Found - missing anime or markers
                ExtractError::NotFound(_) => StatusCode::NOT_FOUND,
                // 404 Not Found - the site itself reports the page missing
                ExtractError::Fetch(FetchError::HttpError(404)) => StatusCode::NOT_FOUND,
                // 502 Bad Gateway - proxy or upstream failures
                ExtractError::Fetch(_) => StatusCode::BAD_GATEWAY,
                // 500 Internal Server Error - page could not be decoded
                ExtractError::Parse(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },

            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Internal(msg) => msg.clone(),

            AppError::Extraction(extract_err) => match extract_err {
                ExtractError::NotFound(what) => format!("Not found: {}", what),
                ExtractError::Parse(_) => "Failed to read data from the source page".to_string(),
                ExtractError::Fetch(fetch_err) => match fetch_err {
                    FetchError::ClientError(_) => "HTTP client unavailable".to_string(),
                    FetchError::NetworkError(msg) => {
                        format!("Failed to connect to server: {}", msg)
                    }
                    FetchError::HttpError(status) => {
                        format!("Server returned error status: {}", status)
                    }
                    FetchError::ResponseError(msg) => format!("Failed to read response: {}", msg),
                    FetchError::EnvelopeError(_) => {
                        "Proxy returned an unexpected response".to_string()
                    }
                },
            },
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status_code()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_response = ApiError::new(self.user_message());

        HttpResponse::build(status).json(error_response)
    }
}

/// Result type alias for operations that can fail with AppError
pub type AppResult<T> = Result<T, AppError>;
