use serde::{Deserialize, Serialize};

/// One entry of a blog's comment thread
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_img: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/** What happened to the thread when a comment was pushed */
#[derive(Debug, Clone, PartialEq)]
pub enum CommentPush {
    /// The comment opened a new thread with the given id
    Created { thread_id: String },
    Appended,
}
