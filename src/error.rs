use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use derive_more::From;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{repository::RepositoryError, schema::Violation};

#[derive(Debug, Clone, Copy, Deserialize)]
pub enum ErrorVerbosity {
    /// Server returns a generic message for internal and parse errors.
    Message,
    /// Server returns the underlying reason for internal and parse errors.
    Full,
}

impl ErrorVerbosity {
    pub fn should_generate_error_reason(&self) -> bool {
        matches!(self, ErrorVerbosity::Full)
    }
}

/// The `message` of an error envelope.
///
/// Validation errors carry one entry per violation, every other error a single string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorMessage {
    Single(String),
    Many(Vec<String>),
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorBody {
    /// A string, or an array of strings for validation errors.
    #[schema(value_type = Object)]
    pub message: ErrorMessage,
    pub status: u16,
}

/// Envelope of every error response.
///
/// The message is repeated at the top level.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
    #[schema(value_type = Object)]
    pub message: ErrorMessage,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.error.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status_code, Json(self)).into_response()
    }
}

#[derive(Debug, From)]
/// API error
pub enum ApiError {
    /// Internal server error
    ///
    /// This error is returned when the database fails or something unexpected happens.
    InternalServerError(InternalServerError),
    /// Body error
    ///
    /// This error is returned when the body is not JSON or does not deserialize.
    Body(BodyError),
    /// Path error
    ///
    /// This error is returned when the path parameters are not as expected.
    Path(PathError),
    /// Validation error
    ///
    /// This error is returned when the body does not satisfy the payload schema.
    Validation(ValidationError),
    /// Not found error
    ///
    /// This error is returned when no book has the requested isbn.
    NotFound(NotFoundError),
    /// Conflict error
    ///
    /// This error is returned when a book with the isbn already exists.
    Conflict(ConflictError),
    /// Route not found
    RouteNotFound(RouteNotFoundError),
    /// Method not allowed
    MethodNotAllowed(MethodNotAllowedError),
}

impl ApiError {
    pub fn from_repository_error(verbosity: ErrorVerbosity, err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { isbn } => NotFoundError::new(isbn).into(),
            RepositoryError::AlreadyExists { isbn } => ConflictError::new(isbn).into(),
            err @ RepositoryError::Database(_) => {
                InternalServerError::from_generic_error(verbosity, err).into()
            }
        }
    }

    fn message(&self) -> ErrorMessage {
        match self {
            ApiError::InternalServerError(err) => err.message(),
            ApiError::Body(err) => err.message(),
            ApiError::Path(err) => err.message(),
            ApiError::Validation(err) => err.message(),
            ApiError::NotFound(err) => err.message(),
            ApiError::Conflict(err) => err.message(),
            ApiError::RouteNotFound(_) => ErrorMessage::Single(String::from("Not Found")),
            ApiError::MethodNotAllowed(_) => {
                ErrorMessage::Single(String::from("Method Not Allowed"))
            }
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Body(err) => err.status,
            ApiError::Path(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl From<ApiError> for ApiErrorResponse {
    fn from(error: ApiError) -> Self {
        let message = error.message();

        ApiErrorResponse {
            error: ApiErrorBody {
                message: message.clone(),
                status: error.status_code().as_u16(),
            },
            message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        ApiErrorResponse::from(self).into_response()
    }
}

#[derive(Debug)]
pub struct InternalServerError {
    internal_server_error: Option<String>,
}

impl InternalServerError {
    pub fn from_generic_error<E: Into<anyhow::Error>>(verbosity: ErrorVerbosity, err: E) -> Self {
        let err: anyhow::Error = err.into();
        let err = format!("{err:#}");
        tracing::error!(%err, "Internal server error");

        let internal_server_error = verbosity.should_generate_error_reason().then_some(err);

        InternalServerError {
            internal_server_error,
        }
    }

    fn message(&self) -> ErrorMessage {
        ErrorMessage::Single(
            self.internal_server_error
                .clone()
                .unwrap_or_else(|| String::from("An internal server error has occurred")),
        )
    }
}

#[derive(Debug)]
pub struct BodyError {
    status: StatusCode,
    body_error_reason: Option<String>,
}

impl BodyError {
    pub fn new(verbosity: ErrorVerbosity, status: StatusCode, body_error_reason: String) -> Self {
        let body_error_reason = verbosity
            .should_generate_error_reason()
            .then_some(body_error_reason);

        BodyError {
            status,
            body_error_reason,
        }
    }

    fn message(&self) -> ErrorMessage {
        ErrorMessage::Single(
            self.body_error_reason
                .clone()
                .unwrap_or_else(|| String::from("Failed to parse request body")),
        )
    }
}

#[derive(Debug)]
pub struct PathError {
    path_error_reason: Option<String>,
}

impl PathError {
    pub fn new(verbosity: ErrorVerbosity, path_error_reason: String) -> Self {
        let path_error_reason = verbosity
            .should_generate_error_reason()
            .then_some(path_error_reason);

        PathError { path_error_reason }
    }

    fn message(&self) -> ErrorMessage {
        ErrorMessage::Single(
            self.path_error_reason
                .clone()
                .unwrap_or_else(|| String::from("Failed to parse path parameters")),
        )
    }
}

#[derive(Debug)]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    pub fn new(violations: Vec<Violation>) -> Self {
        ValidationError { violations }
    }

    fn message(&self) -> ErrorMessage {
        ErrorMessage::Many(self.violations.iter().map(ToString::to_string).collect())
    }
}

#[derive(Debug)]
pub struct NotFoundError {
    isbn: String,
}

impl NotFoundError {
    pub fn new(isbn: String) -> Self {
        NotFoundError { isbn }
    }

    fn message(&self) -> ErrorMessage {
        // Existing clients match this text exactly, unbalanced quote included.
        ErrorMessage::Single(format!("There is no book with an isbn '{}", self.isbn))
    }
}

#[derive(Debug)]
pub struct ConflictError {
    isbn: String,
}

impl ConflictError {
    pub fn new(isbn: String) -> Self {
        ConflictError { isbn }
    }

    fn message(&self) -> ErrorMessage {
        ErrorMessage::Single(format!(
            "There is already a book with an isbn '{}'",
            self.isbn
        ))
    }
}

#[derive(Debug, Default)]
pub struct RouteNotFoundError;

#[derive(Debug, Default)]
pub struct MethodNotAllowedError;
