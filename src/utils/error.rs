use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use log::error;
use mongodb::error::{ErrorKind, WriteFailure};
use serde_json::json;
use thiserror::Error;

use crate::utils::helpers::service_name;

const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Debug, Error)]
pub enum CustomError {
    #[error("Bad Request: {0}")]
    InvalidInput(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal Server Error: {0}")]
    Unexpected(String),
}

impl CustomError {
    fn kind(&self) -> &'static str {
        match *self {
            CustomError::InvalidInput(..) => "BAD_REQUEST_ERROR",
            CustomError::NotFound(..) => "NOT_FOUND_ERROR",
            CustomError::Conflict(..) => "CONFLICT_ERROR",
            CustomError::Forbidden(..) => "FORBIDDEN_ERROR",
            CustomError::Unauthorized(..) => "UNAUTHORIZED_ERROR",
            CustomError::Unexpected(..) => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl From<mongodb::error::Error> for CustomError {
    fn from(err: mongodb::error::Error) -> Self {
        CustomError::Unexpected(format!("store failure: {}", err))
    }
}

/// True when a write was rejected by a unique index.
pub fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY_CODE
        }
        ErrorKind::Command(command_error) => command_error.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}

impl ResponseError for CustomError {
    fn status_code(&self) -> StatusCode {
        match *self {
            CustomError::InvalidInput(..) => StatusCode::BAD_REQUEST,
            CustomError::NotFound(..) => StatusCode::NOT_FOUND,
            // State-machine violations share the 400 contract of the REST surface.
            CustomError::Conflict(..) => StatusCode::BAD_REQUEST,
            CustomError::Forbidden(..) => StatusCode::FORBIDDEN,
            CustomError::Unauthorized(..) => StatusCode::UNAUTHORIZED,
            CustomError::Unexpected(..) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            CustomError::Unexpected(detail) => {
                error!("{}", detail);
                "Something went wrong".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "message": message,
            "httpStatusCode": self.status_code().as_u16(),
            "error": self.kind(),
            "service": service_name(),
        }))
    }
}
