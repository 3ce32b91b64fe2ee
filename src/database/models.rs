pub mod blog;
pub mod comment;
pub mod user;

pub use blog::{deserialize_client_date, Blog};
pub use comment::{CommentEntry, CommentPush};
pub use user::User;

use serde::Serialize;

/// Body returned after a document has been inserted
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InsertResult {
    pub acknowledged: bool,
    pub inserted_id: String,
}

impl InsertResult {
    pub fn new(inserted_id: impl Into<String>) -> Self {
        Self {
            acknowledged: true,
            inserted_id: inserted_id.into(),
        }
    }
}
