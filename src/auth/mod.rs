pub mod token;

use std::future::{ready, Ready};

use actix_web::{dev::Payload, web::Data, FromRequest, HttpRequest};

use crate::app::{AppError, AppState};
use token::{Claims, TOKEN_COOKIE};

/// Guard for protected routes. Taking it as a handler argument rejects the
/// request with `401` unless the `token` cookie holds a valid session token,
/// and hands the decoded identity to the handler otherwise.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Claims);

impl Authenticated {
    /// Fails with `403` unless the token was issued for `email`
    pub fn ensure_email(&self, email: &str) -> Result<(), AppError> {
        match self.0.email() {
            Some(own) if own == email => Ok(()),
            _ => Err(AppError::Forbidden),
        }
    }
}

impl FromRequest for Authenticated {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<Authenticated, AppError> {
    let app_state = req
        .app_data::<Data<AppState>>()
        .ok_or_else(|| AppError::Internal("application state not configured".into()))?;
    let token = req.cookie(TOKEN_COOKIE).ok_or(AppError::Unauthorized)?;

    app_state.tokens.verify(token.value()).map(Authenticated)
}
