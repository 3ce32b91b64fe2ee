use std::sync::Arc;

use actix_web::{
    error::BlockingError, http::StatusCode, web, HttpResponse, ResponseError,
};
use log::error;
use serde_json::json;
use thiserror::Error;

use crate::{
    auth::token::SessionTokens,
    database::{DocumentStore, StoreError},
};

/** Used for sharing the store and the token issuer between request handlers */
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub tokens: Arc<SessionTokens>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, tokens: SessionTokens) -> Self {
        Self {
            store,
            tokens: Arc::new(tokens),
        }
    }

    /// Runs a store operation on the blocking thread pool so a slow store
    /// doesn't stall the worker serving other requests.
    pub async fn with_store<F, T>(&self, op: F) -> Result<T, AppError>
    where
        F: FnOnce(&dyn DocumentStore) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.store.clone();
        web::block(move || op(store.as_ref()))
            .await?
            .map_err(|err| {
                error!("Store operation failed: {}", err);
                AppError::from(err)
            })
    }
}

#[cfg(test)]
impl AppState {
    pub fn in_memory() -> Self {
        AppState::new(
            Arc::new(crate::database::memory_store::MemoryStore::new()),
            SessionTokens::new(b"test secret"),
        )
    }
}

/** Holds the errors we will use during request processing */
#[derive(Debug, Error)]
pub enum AppError {
    /// A required input is missing or the body couldn't be parsed
    #[error("{0}")]
    BadRequest(String),
    /// Duplicate natural key, answered with 400 like other client errors
    #[error("{0}")]
    Conflict(String),
    #[error("unauthorized access")]
    Unauthorized,
    #[error("forbidden access")]
    Forbidden,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Unauthorized | AppError::Forbidden => json!({ "message": self.to_string() }),
            _ => json!({ "error": self.to_string() }),
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Internal(err.to_string())
    }
}
impl From<BlockingError> for AppError {
    fn from(err: BlockingError) -> Self {
        AppError::Internal(err.to_string())
    }
}
impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
