use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// The kinds of records the archive stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Drawing,
    Runtime,
    SearchData,
    Feedback,
    History,
}

impl Entity {
    fn singular(self) -> &'static str {
        match self {
            Entity::Drawing => "drawing",
            Entity::Runtime => "runtime",
            Entity::SearchData => "search data",
            Entity::Feedback => "feedback",
            Entity::History => "history",
        }
    }

    fn plural(self) -> &'static str {
        match self {
            Entity::Drawing => "drawings",
            Entity::Runtime => "runtimes",
            Entity::SearchData => "search data",
            Entity::Feedback => "feedbacks",
            Entity::History => "histories",
        }
    }
}

/// Errors raised by the service and mapping layers.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{}", not_found_message(.entity, .id))]
    NotFound { entity: Entity, id: i64 },

    /// A by-parent lookup came back empty.
    #[error("Could not find {} for {} with id {id}", .entity.plural(), .parent.singular())]
    NotFoundForParent { entity: Entity, parent: Entity, id: i64 },

    /// The store rejected a write because a referenced row is missing.
    #[error("Unable to find Drawing: {0}")]
    ForeignKeyViolation(String),

    #[error("Invalid value for '{field}': {message}")]
    InvalidInput { field: &'static str, message: String },

    #[error("storage access failed: {0}")]
    Storage(sqlx::Error),
}

fn not_found_message(entity: &Entity, id: &i64) -> String {
    match entity {
        Entity::Drawing => format!("Unable to find Drawing with id {}", id),
        Entity::History => format!("Unable to find History with id {}", id),
        other => format!("Could not find {} with id {}", other.singular(), id),
    }
}

impl ServiceError {
    pub fn not_found(entity: Entity, id: i64) -> Self {
        ServiceError::NotFound { entity, id }
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                ServiceError::ForeignKeyViolation(db_err.message().to_string())
            }
            _ => ServiceError::Storage(err),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// The error type returned by HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// For client errors due to invalid requests.
    BadRequest(String),
    /// For when a requested resource is not found.
    NotFound(String),
    /// For when a service is temporarily unavailable.
    ServiceUnavailable(String),
    /// For errors related to database operations.
    Database(String),
    /// For when a specific field in a request fails validation.
    ValidationError {
        /// The name of the field that failed validation.
        field: String,
        /// A message describing the validation error.
        message: String,
    },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
            AppError::Database(msg) => write!(f, "Database error: {}", msg),
            AppError::ValidationError { field, message } => {
                write!(f, "Validation error on field '{}': {}", field, message)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, error_message, details) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None),
            AppError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE", msg, None)
            }
            AppError::Database(msg) => {
                let error_id = uuid::Uuid::new_v4();
                tracing::error!(%error_id, "Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                    Some(json!({ "error_id": error_id.to_string() })),
                )
            }
            AppError::ValidationError { field, message } => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                format!("Validation failed for field '{}'", field),
                Some(json!({ "field": field, "message": message })),
            ),
        };

        let mut body = json!({
            "error": {
                "code": error_code,
                "message": error_message,
            },
            "status": status.as_u16(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        if let Some(details) = details {
            body["error"]["details"] = details;
        }

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(status = %rejection.status(), "Rejected request body");
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db_err) => AppError::Database(db_err.message().to_string()),
            sqlx::Error::PoolTimedOut => {
                AppError::ServiceUnavailable("Database connection pool timed out".to_string())
            }
            _ => AppError::Database(err.to_string()),
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound { .. }
            | ServiceError::NotFoundForParent { .. }
            | ServiceError::ForeignKeyViolation(_) => AppError::NotFound(err.to_string()),
            ServiceError::InvalidInput { field, message } => {
                AppError::ValidationError { field: field.to_string(), message }
            }
            ServiceError::Storage(e) => AppError::from(e),
        }
    }
}

/// A type alias for `Result<T, AppError>`, used by the HTTP handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Turns an absent lookup result into the matching not-found error.
pub trait OptionExt<T> {
    fn ok_or_not_found(self, entity: Entity, id: i64) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, entity: Entity, id: i64) -> AppResult<T> {
        self.ok_or_else(|| ServiceError::not_found(entity, id).into())
    }
}
