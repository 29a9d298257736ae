//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the
//! application, plus the `OpResponse` success envelope that mirrors it.
//! Every failure crossing the HTTP boundary carries the same wire shape,
//! `{error: true, status, message}`, and every plain success carries
//! `{error: false, status, message}` — clients switch on the `error` flag.
//!
//! `AppError` implements `actix_web::error::ResponseError` to seamlessly
//! convert application errors into HTTP responses. `From` implementations
//! for `mongodb::error::Error` and `bcrypt::BcryptError` allow conversion
//! with the `?` operator.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;
use serde_json::json;
use std::fmt;

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Authentication or authorization failure (HTTP 401): bad session
    /// cookie, wrong password, expired confirmation code, or not-owner.
    /// The wording deliberately never distinguishes "does not exist" from
    /// "wrong credentials".
    Unauthorized(String),
    /// Malformed or missing input, or a referenced sub-resource that does
    /// not exist (HTTP 400).
    BadRequest(String),
    /// Unknown route action (HTTP 404).
    NotFound(String),
    /// Unexpected server-side error (HTTP 500).
    InternalServerError(String),
    /// Error originating from the document store (HTTP 500).
    DatabaseError(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn message(&self) -> &str {
        match self {
            AppError::Unauthorized(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::InternalServerError(msg)
            | AppError::DatabaseError(msg) => msg,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
        }
    }
}

/// Converts `AppError` variants into `HttpResponse` objects carrying the
/// `{error: true, status, message}` body.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status()).json(json!({
            "error": true,
            "status": self.status().as_u16(),
            "message": self.message()
        }))
    }
}

/// Converts `mongodb::error::Error` into `AppError`.
///
/// A duplicate-key write (code 11000, the unique index on `email`) is a
/// client error; everything else is a database error. Duplicate emails are
/// surfaced here, at the constraint level, rather than pre-checked.
impl From<mongodb::error::Error> for AppError {
    fn from(error: mongodb::error::Error) -> AppError {
        use mongodb::error::{ErrorKind, WriteFailure};

        if let ErrorKind::Write(WriteFailure::WriteError(write_error)) = &*error.kind {
            if write_error.code == 11000 {
                return AppError::BadRequest("Email already in use".into());
            }
        }

        AppError::DatabaseError(error.to_string())
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::InternalServerError`.
///
/// This handles errors during password hashing. Verification never goes
/// through this path — a malformed stored hash verifies as `false`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}

/// Success envelope mirroring the failure shape above.
///
/// Operations that return extra data define their own envelope with the
/// same leading fields (see `auth::EmailChangeResponse`, `lists::ListResponse`).
#[derive(Debug, Serialize)]
pub struct OpResponse {
    pub error: bool,
    pub status: u16,
    pub message: String,
}

impl OpResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            error: false,
            status: 200,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_responses() {
        let error = AppError::Unauthorized("Invalid email or password".into());
        let response = error.error_response();
        assert_eq!(response.status(), 401);

        let error = AppError::BadRequest("Missing list name".into());
        let response = error.error_response();
        assert_eq!(response.status(), 400);

        let error = AppError::NotFound("Not Found".into());
        let response = error.error_response();
        assert_eq!(response.status(), 404);

        let error = AppError::InternalServerError("Server error".into());
        let response = error.error_response();
        assert_eq!(response.status(), 500);

        let error = AppError::DatabaseError("connection reset".into());
        let response = error.error_response();
        assert_eq!(response.status(), 500);
    }

    #[test]
    fn test_success_envelope() {
        let response = OpResponse::ok("Created list");
        assert!(!response.error);
        assert_eq!(response.status, 200);
        assert_eq!(response.message, "Created list");
    }
}
