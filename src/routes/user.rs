use actix_web::{
    get, post,
    web::{Data, Json, Query},
    HttpResponse,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::required;
use crate::{
    app::{AppError, AppState},
    auth::Authenticated,
    database::models::{InsertResult, User},
};

#[derive(Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

#[derive(Deserialize)]
pub struct NewUser {
    email: Option<String>,
    #[serde(default)]
    wishlist: Vec<String>,
    #[serde(flatten)]
    profile: Map<String, Value>,
}

/// Pipe for reading the logged in user's profile
/// - url: `{domain}/users?email={email}`
///
/// # HTTP request requirements
/// - `email` query parameter, must match the email the session token was issued for
/// ## header
/// - cookie named `token` containing the session token
///
/// # Example
/// ```
/// let cookie = CookieBuilder::new("token", "test_token").finish();
/// let request = actix_web::test::TestRequest::get()
///     .uri("localhost/users?email=reader@mail.com")
///     .cookie(cookie)
///     .to_request();
/// ```
///
/// # Response
/// ## Ok
/// - json formatted user document
/// ## Error
/// - Bad request
/// - Unauthorized
/// - Forbidden
/// - Not found
/// - Internal server error
#[get("/users")]
pub async fn get_user(
    auth: Authenticated,
    query: Query<EmailQuery>,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let email = required(query.into_inner().email, "Email is required")?;
    auth.ensure_email(&email)?;

    let user = app_state
        .with_store(move |store| store.find_user(&email))
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(HttpResponse::Ok().json(user))
}

/// Pipe for registering an user
/// - url: `{domain}/users`
///
/// # HTTP request requirements
/// ## body
/// - json formatted user document, `email` is required, other keys are kept as profile data
///
/// # Example
/// ```
/// let data = "{ \"email\": \"reader@mail.com\", \"name\": \"Reader\" }";
/// let request = actix_web::test::TestRequest::post()
///     .uri("localhost/users")
///     .insert_header(ContentType::json())
///     .set_payload(data)
///     .to_request();
/// ```
///
/// # Response
/// ## Ok
/// - `{ "acknowledged": true, "insertedId": "..." }`
/// ## Error
/// - Bad request, also when the email is already registered
/// - Internal server error
#[post("/users")]
pub async fn create_new_user(
    body: Json<NewUser>,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let NewUser {
        email,
        wishlist,
        mut profile,
    } = body.into_inner();
    let email = required(email, "Email is required")?;

    let lookup = email.clone();
    if app_state
        .with_store(move |store| store.find_user(&lookup))
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("User already exists".into()));
    }

    profile.remove("_id");
    let id = Uuid::new_v4().to_string();
    let mut user = User::new(&email);
    user.id = Some(id.clone());
    user.profile = profile;
    for blog_id in &wishlist {
        user.bookmark(blog_id);
    }

    // the store refuses a second user with the same email, so a concurrent
    // registration that passed the check above still ends up here
    let inserted = app_state
        .with_store(move |store| store.insert_user(&user))
        .await?;
    if !inserted {
        return Err(AppError::Conflict("User already exists".into()));
    }

    Ok(HttpResponse::Ok().json(InsertResult::new(id)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{
        http::{header::ContentType, StatusCode},
        test, App,
    };
    use chrono::Duration;
    use serde_json::json;

    use super::*;
    use crate::{
        auth::token::SessionTokens,
        database::memory_store::MemoryStore,
        routes::{json_config, test_utils::login_cookie},
    };

    async fn seed_user(app_state: &AppState, email: &str) {
        let mut user = User::new(email);
        user.profile.insert("name".into(), json!("Test reader"));
        app_state
            .with_store(move |store| store.insert_user(&user))
            .await
            .unwrap();
    }

    #[actix_rt::test]
    async fn test_get_user() {
        let app_state = AppState::in_memory();
        seed_user(&app_state, "reader@mail.com").await;

        let app = test::init_service(
            App::new()
                .app_data(Data::new(app_state.clone()))
                .service(super::get_user),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/users?email=reader@mail.com")
            .cookie(login_cookie(&app_state, "reader@mail.com"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let user: Value = test::read_body_json(resp).await;
        assert_eq!(user["email"], "reader@mail.com");
        assert_eq!(user["name"], "Test reader");
    }

    #[actix_rt::test]
    async fn test_get_user_without_email() {
        let app_state = AppState::in_memory();
        let app = test::init_service(
            App::new()
                .app_data(Data::new(app_state.clone()))
                .service(super::get_user),
        )
        .await;

        for uri in ["/users", "/users?email="] {
            let req = test::TestRequest::get()
                .uri(uri)
                .cookie(login_cookie(&app_state, "reader@mail.com"))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body, json!({ "error": "Email is required" }));
        }
    }

    #[actix_rt::test]
    async fn test_get_user_not_found() {
        let app_state = AppState::in_memory();
        let app = test::init_service(
            App::new()
                .app_data(Data::new(app_state.clone()))
                .service(super::get_user),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/users?email=ghost@mail.com")
            .cookie(login_cookie(&app_state, "ghost@mail.com"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_rt::test]
    async fn test_get_user_needs_token() {
        let app_state = AppState::in_memory();
        seed_user(&app_state, "reader@mail.com").await;
        let app = test::init_service(
            App::new()
                .app_data(Data::new(app_state.clone()))
                .service(super::get_user),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/users?email=reader@mail.com")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "message": "unauthorized access" }));

        let req = test::TestRequest::get()
            .uri("/users?email=reader@mail.com")
            .cookie(SessionTokens::cookie("not.a.token".into()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_get_user_expired_token() {
        let store = Arc::new(MemoryStore::new());
        let app_state = AppState::new(store.clone(), SessionTokens::new(b"test secret"));
        let stale = AppState::new(
            store,
            SessionTokens::with_validity(b"test secret", Duration::hours(-6)),
        );
        seed_user(&app_state, "reader@mail.com").await;

        let app = test::init_service(
            App::new()
                .app_data(Data::new(app_state.clone()))
                .service(super::get_user),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/users?email=reader@mail.com")
            .cookie(login_cookie(&stale, "reader@mail.com"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_get_other_user_is_forbidden() {
        let app_state = AppState::in_memory();
        seed_user(&app_state, "reader@mail.com").await;
        seed_user(&app_state, "other@mail.com").await;

        let app = test::init_service(
            App::new()
                .app_data(Data::new(app_state.clone()))
                .service(super::get_user),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/users?email=other@mail.com")
            .cookie(login_cookie(&app_state, "reader@mail.com"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "message": "forbidden access" }));
    }

    #[actix_rt::test]
    async fn test_create_user() {
        let app_state = AppState::in_memory();
        let app = test::init_service(
            App::new()
                .app_data(Data::new(app_state.clone()))
                .app_data(json_config())
                .service(super::create_new_user),
        )
        .await;

        let data = json!({ "email": "new@mail.com", "name": "New", "wishlist": ["a", "a"] });
        let req = test::TestRequest::post()
            .uri("/users")
            .insert_header(ContentType::json())
            .set_payload(data.to_string())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let result: Value = test::read_body_json(resp).await;
        assert_eq!(result["acknowledged"], true);

        let user = app_state
            .with_store(|store| store.find_user("new@mail.com"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.id.as_deref(), result["insertedId"].as_str());
        assert_eq!(user.wishlist, vec!["a".to_string()]);
        assert_eq!(user.email, "new@mail.com");
        assert_eq!(user.profile.get("name"), Some(&json!("New")));

        let req = test::TestRequest::post()
            .uri("/users")
            .insert_header(ContentType::json())
            .set_payload(data.to_string())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "User already exists" }));
    }

    #[actix_rt::test]
    async fn test_create_user_without_email() {
        let app_state = AppState::in_memory();
        let app = test::init_service(
            App::new()
                .app_data(Data::new(app_state.clone()))
                .app_data(json_config())
                .service(super::create_new_user),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/users")
            .insert_header(ContentType::json())
            .set_payload(json!({ "name": "Nameless" }).to_string())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/users")
            .insert_header(ContentType::json())
            .set_payload("{ not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
