use std::time::Duration;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;

#[derive(thiserror::Error, Debug)]
pub enum ScrapeError {
    #[error("{element} `{locator}` did not appear within {timeout:?}")]
    RequiredElementTimeout {
        element: &'static str,
        locator: String,
        timeout: Duration,
    },

    #[error("browser unavailable: {0}")]
    Environment(String),

    #[error("browser command failed: {0}")]
    Browser(String),

    #[error("failed reading the page: {0}")]
    Extraction(String),

    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("failed writing the output artifact: {0}")]
    Artifact(#[from] std::io::Error),

    #[error("failed serializing records: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Serialize)]
pub struct FailureBody {
    pub success: bool,
    pub error: String,
}

impl ResponseError for ScrapeError {
    fn status_code(&self) -> StatusCode {
        match self {
            ScrapeError::Environment(_) => StatusCode::SERVICE_UNAVAILABLE,
            ScrapeError::RequiredElementTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(FailureBody {
            success: false,
            error: self.to_string(),
        })
    }
}
