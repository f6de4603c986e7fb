use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ExpenseError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    InvalidInput(String),
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

impl ExpenseError {
    pub fn item_not_found() -> Self {
        Self::NotFound("Item")
    }
}

impl ResponseError for ExpenseError {
    fn status_code(&self) -> StatusCode {
        match self {
            ExpenseError::NotFound(_) => StatusCode::NOT_FOUND,
            ExpenseError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ExpenseError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let detail = match self {
            ExpenseError::Database(err) => {
                // Store failures are logged, never echoed back.
                error!(error = %err, "unhandled store failure");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(json!({ "detail": detail }))
    }
}
