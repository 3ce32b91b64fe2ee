use actix_web::{
    get, patch,
    web::{Data, Json, Query},
    HttpResponse,
};
use serde::Deserialize;
use serde_json::json;

use super::{required, user::EmailQuery};
use crate::app::{AppError, AppState};

#[derive(Deserialize)]
pub struct WishlistPatch {
    email: Option<String>,
    #[serde(rename = "_id")]
    blog_id: Option<String>,
}

/// Pipe for reading the blogs an user bookmarked
/// - url: `{domain}/wishlist?email={email}`
///
/// The wishlist ids are resolved with one batched lookup. Ids whose blog no
/// longer exists are left out of the answer.
///
/// # Response
/// ## Ok
/// - json array of blog documents
/// ## Error
/// - Bad request
/// - Not found
/// - Internal server error
#[get("/wishlist")]
pub async fn get_wishlist(
    query: Query<EmailQuery>,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let email = required(query.into_inner().email, "Email is required")?;

    let user = app_state
        .with_store(move |store| store.find_user(&email))
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    // not atomic with the read above, a concurrent PATCH may or may not show up
    let wishlist = user.wishlist;
    let blogs = app_state
        .with_store(move |store| store.find_blogs(&wishlist))
        .await?;

    Ok(HttpResponse::Ok().json(blogs))
}

/// Pipe for bookmarking a blog
/// - url: `{domain}/wishlist`
///
/// # HTTP request requirements
/// ## body
/// - json formatted string containing `email` and `_id` (blog id) keys
///
/// # Example
/// ```
/// let data = "{ \"email\": \"reader@mail.com\", \"_id\": \"blog_id\" }";
/// let request = actix_web::test::TestRequest::patch()
///     .uri("localhost/wishlist")
///     .insert_header(ContentType::json())
///     .set_payload(data)
///     .to_request();
/// ```
///
/// # Response
/// ## Ok
/// - the id was added
/// ## Error
/// - Not found, when the user doesn't exist or the id was already bookmarked
/// - Internal server error
#[patch("/wishlist")]
pub async fn add_to_wishlist(
    body: Json<WishlistPatch>,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let not_updated = || AppError::NotFound("User not found or wishlist not updated".into());

    let WishlistPatch { email, blog_id } = body.into_inner();
    let (email, blog_id) = match (email, blog_id) {
        (Some(email), Some(blog_id)) => (email, blog_id),
        _ => return Err(not_updated()),
    };

    let modified = app_state
        .with_store(move |store| store.add_to_wishlist(&email, &blog_id))
        .await?;
    if !modified {
        return Err(not_updated());
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Wishlist updated successfully" })))
}
