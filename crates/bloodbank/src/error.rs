use crate::config::ConfigError;
use crate::donors::DonorServiceError;
use crate::eligibility::EligibilityError;
use crate::inventory::LedgerError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use std::fmt;

/// Failure categories shared by the evaluator, ledger and donor workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    InsufficientStock,
    Ineligible,
    InvalidInput,
    Conflict,
    Transient,
}

impl ErrorKind {
    pub const fn status_code(self) -> StatusCode {
        match self {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::InsufficientStock | ErrorKind::Ineligible => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Transient => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// JSON error body with the status matching this kind.
    pub fn respond(self, message: impl Into<String>) -> Response {
        let body = Json(json!({
            "error": message.into(),
            "kind": self,
        }));
        (self.status_code(), body).into_response()
    }
}

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Eligibility(EligibilityError),
    Ledger(LedgerError),
    Donor(DonorServiceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Eligibility(err) => write!(f, "eligibility error: {}", err),
            AppError::Ledger(err) => write!(f, "inventory error: {}", err),
            AppError::Donor(err) => write!(f, "donor workflow error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Eligibility(err) => Some(err),
            AppError::Ledger(err) => Some(err),
            AppError::Donor(err) => Some(err),
        }
    }
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Eligibility(_) => ErrorKind::InvalidInput,
            AppError::Ledger(err) => err.kind(),
            AppError::Donor(err) => err.kind(),
            AppError::Config(_) | AppError::Telemetry(_) | AppError::Io(_) => {
                ErrorKind::Transient
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Config(_) | AppError::Telemetry(_) | AppError::Io(_) => {
                let body = Json(json!({ "error": self.to_string() }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
            other => other.kind().respond(other.to_string()),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<EligibilityError> for AppError {
    fn from(value: EligibilityError) -> Self {
        Self::Eligibility(value)
    }
}

impl From<LedgerError> for AppError {
    fn from(value: LedgerError) -> Self {
        Self::Ledger(value)
    }
}

impl From<DonorServiceError> for AppError {
    fn from(value: DonorServiceError) -> Self {
        Self::Donor(value)
    }
}
