pub mod blog;
pub mod comment;
pub mod token;
pub mod user;
pub mod wishlist;

use actix_web::{get, web::JsonConfig, HttpResponse};

use crate::app::AppError;

/// Body extraction settings shared by every route; malformed JSON bodies are
/// answered with `400 {error}` like the other validation failures.
pub fn json_config() -> JsonConfig {
    JsonConfig::default().error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

/// Fails with `400 {error: message}` when `value` is missing or empty
pub(crate) fn required(value: Option<String>, message: &str) -> Result<String, AppError> {
    value
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::BadRequest(message.to_string()))
}

#[get("/")]
pub async fn index() -> HttpResponse {
    HttpResponse::Ok().body("Blog server is running")
}
