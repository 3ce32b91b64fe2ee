use actix_web::{
    get, post,
    web::{Data, Json, Query},
    HttpResponse,
};
use serde::Deserialize;
use serde_json::json;

use super::required;
use crate::{
    app::{AppError, AppState},
    database::models::{CommentEntry, CommentPush},
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentQuery {
    blog_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    blog_id: String,
    #[serde(flatten)]
    entry: CommentEntry,
}

/// Pipe for creating a comment
/// - url: `{domain}/comment`
///
/// The first comment on a blog opens its thread, every later one is appended
/// to the end of it.
///
/// # HTTP request requires
/// ## body
/// - json formatted string with `blogId`, `userId`, `userName`, `userImg` and `comment` keys
///
/// # Example
/// ```
/// let data = "{ \"blogId\": \"blog_id\", \"userId\": \"user_id\", \"comment\": \"Nice\" }";
/// let request = actix_web::test::TestRequest::post()
///     .uri("localhost/comment")
///     .insert_header(ContentType::json())
///     .set_payload(data)
///     .to_request();
/// ```
///
/// # Response
/// ## Created
/// - `{ "message": "Comment added successfully", "id": "..." }`
/// ## Ok
/// - `{ "message": "Comment appended successfully" }`
/// ## Error
/// - Bad request
/// - Internal server errror
#[post("/comment")]
pub async fn create_comment(
    body: Json<NewComment>,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let NewComment { blog_id, entry } = body.into_inner();

    let pushed = app_state
        .with_store(move |store| store.push_comment(&blog_id, &entry))
        .await?;

    Ok(match pushed {
        CommentPush::Created { thread_id } => HttpResponse::Created().json(json!({
            "message": "Comment added successfully",
            "id": thread_id,
        })),
        CommentPush::Appended => {
            HttpResponse::Ok().json(json!({ "message": "Comment appended successfully" }))
        }
    })
}

/// Pipe for getting comments from blog
/// - url: `{domain}/comment?blogId={blog_id}`
///
/// # Response
/// ## Ok
/// - json array of the thread's comments, oldest first
/// ```
/// [
///     {
///         "userId": "e60a0f7b-381c-46b7-8736-1f204b329727",
///         "userName": "Reader",
///         "userImg": "https://img.host/reader.png",
///         "comment": "Comment body 1"
///     }
/// ]
/// ```
/// ## Error
/// - Bad request
/// - Not found
/// - Internal server error
#[get("/comment")]
pub async fn get_comments(
    query: Query<CommentQuery>,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let blog_id = required(query.into_inner().blog_id, "Blog ID is required")?;

    let comments = app_state
        .with_store(move |store| store.find_comments(&blog_id))
        .await?
        .ok_or_else(|| AppError::NotFound("No comments found for this blog".into()))?;

    Ok(HttpResponse::Ok().json(comments))
}
