use actix_web::{
    post,
    web::{Data, Json},
    HttpResponse,
};
use serde_json::{json, Map, Value};

use crate::{
    app::{AppError, AppState},
    auth::token::SessionTokens,
};

/// Pipe for starting a session
/// - url: `{domain}/jwt`
///
/// # HTTP request requirements
/// ## body
/// - json object with the identity to sign, `email` is what protected routes check
///
/// # Example
/// ```
/// let data = "{ \"email\": \"reader@mail.com\" }";
/// let request = actix_web::test::TestRequest::post()
///     .uri("localhost/jwt")
///     .insert_header(ContentType::json())
///     .set_payload(data)
///     .to_request();
/// ```
///
/// # Response
/// ## Ok
/// - http-only `token` cookie, valid for 5 hours
#[post("/jwt")]
pub async fn issue_token(
    body: Json<Map<String, Value>>,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let token = app_state.tokens.issue(body.into_inner())?;

    Ok(HttpResponse::Ok()
        .cookie(SessionTokens::cookie(token))
        .json(json!({ "success": true })))
}

/// Pipe for ending a session by clearing the `token` cookie
/// - url: `{domain}/logout`
#[post("/logout")]
pub async fn logout() -> HttpResponse {
    HttpResponse::Ok()
        .cookie(SessionTokens::removal_cookie())
        .json(json!({ "success": true }))
}
