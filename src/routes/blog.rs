use actix_web::{
    get, post,
    web::{Data, Json, Path},
    HttpResponse,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    app::{AppError, AppState},
    database::models::{deserialize_client_date, Blog, InsertResult},
};

/// How many blogs `/recentblogs` returns at most
pub const RECENT_LIMIT: usize = 6;

#[derive(Deserialize)]
pub struct NewBlog {
    #[serde(default, deserialize_with = "deserialize_client_date")]
    date: Option<DateTime<Utc>>,
    #[serde(default)]
    featured: bool,
    #[serde(flatten)]
    content: Map<String, Value>,
}

/// Pipe for listing every blog
/// - url: `{domain}/blogs`
///
/// # Response
/// ## Ok
/// - json array of blog documents
/// ## Error
/// - Internal server error
#[get("/blogs")]
pub async fn get_blogs(app_state: Data<AppState>) -> Result<HttpResponse, AppError> {
    let blogs = app_state.with_store(|store| store.list_blogs()).await?;
    Ok(HttpResponse::Ok().json(blogs))
}

/// Pipe for publishing a blog
/// - url: `{domain}/blogs`
///
/// # HTTP request requirements
/// ## body
/// - json formatted blog document. `date` (RFC 3339, or `YYYY-MM-DD` for
///   midnight UTC) defaults to now,
///   `featured` to false, every other key is stored as content
///
/// # Example
/// ```
/// let data = "{ \"title\": \"Test title\", \"date\": \"2024-05-01T10:00:00Z\" }";
/// let request = actix_web::test::TestRequest::post()
///     .uri("localhost/blogs")
///     .insert_header(ContentType::json())
///     .set_payload(data)
///     .to_request();
/// ```
///
/// # Response
/// ## Ok
/// - `{ "acknowledged": true, "insertedId": "..." }`
/// ## Error
/// - Bad request
/// - Internal server error
#[post("/blogs")]
pub async fn create_new_blog(
    body: Json<NewBlog>,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let NewBlog {
        date,
        featured,
        mut content,
    } = body.into_inner();
    content.remove("_id");

    let blog = Blog::new(date.unwrap_or_else(Utc::now), featured, content);
    let id = blog.id.to_string();
    app_state
        .with_store(move |store| store.insert_blog(&blog))
        .await?;

    Ok(HttpResponse::Ok().json(InsertResult::new(id)))
}

/// Pipe for the newest blogs, at most [`RECENT_LIMIT`], newest first
/// - url: `{domain}/recentblogs`
#[get("/recentblogs")]
pub async fn get_recent_blogs(app_state: Data<AppState>) -> Result<HttpResponse, AppError> {
    let blogs = app_state
        .with_store(|store| store.recent_blogs(RECENT_LIMIT))
        .await?;
    Ok(HttpResponse::Ok().json(blogs))
}

/// Pipe for the blogs flagged as featured
/// - url: `{domain}/featuredblogs`
#[get("/featuredblogs")]
pub async fn get_featured_blogs(app_state: Data<AppState>) -> Result<HttpResponse, AppError> {
    let blogs = app_state.with_store(|store| store.featured_blogs()).await?;
    Ok(HttpResponse::Ok().json(blogs))
}

/// Pipe for reading one blog
/// - url: `{domain}/blog/{id}`
///
/// # Response
/// ## Ok
/// - json formatted blog document, `null` when no blog has that id
/// ## Error
/// - Internal server error, also when `{id}` isn't a valid blog id
#[get("/blog/{id}")]
pub async fn get_blog(
    path: Path<String>,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = Uuid::parse_str(&path.into_inner())?;

    let blog = app_state.with_store(move |store| store.find_blog(&id)).await?;
    Ok(HttpResponse::Ok().json(blog))
}
