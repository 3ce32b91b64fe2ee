use r2d2_redis::{r2d2, redis::RedisError};
use thiserror::Error;
use uuid::Uuid;

use super::models::{Blog, CommentEntry, CommentPush, User};

/// Anything that can go wrong while talking to the store.
/// The message is handed to the client untouched.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Redis(#[from] RedisError),
    #[error("{0}")]
    Pool(#[from] r2d2::Error),
    #[error("{0}")]
    Serde(#[from] serde_json::Error),
    #[error("store lock poisoned")]
    Poisoned,
}

/// Collection scoped operations used by the handlers.
///
/// Calls are blocking; handlers run them on the blocking pool through
/// [`AppState::with_store`](crate::app::AppState::with_store).
/// `add_to_wishlist` and `push_comment` must be single atomic store updates.
pub trait DocumentStore: Send + Sync {
    fn ping(&self) -> Result<(), StoreError>;

    fn find_user(&self, email: &str) -> Result<Option<User>, StoreError>;
    /// Returns `false` when a user with the same email already exists
    fn insert_user(&self, user: &User) -> Result<bool, StoreError>;
    /// Set-add of `blog_id` to the user's wishlist.
    /// Returns `false` when the user is missing or the id was already there.
    fn add_to_wishlist(&self, email: &str, blog_id: &str) -> Result<bool, StoreError>;

    fn list_blogs(&self) -> Result<Vec<Blog>, StoreError>;
    fn recent_blogs(&self, limit: usize) -> Result<Vec<Blog>, StoreError>;
    fn featured_blogs(&self) -> Result<Vec<Blog>, StoreError>;
    fn find_blog(&self, id: &Uuid) -> Result<Option<Blog>, StoreError>;
    /// Batched lookup; ids without a matching blog are skipped
    fn find_blogs(&self, ids: &[String]) -> Result<Vec<Blog>, StoreError>;
    fn insert_blog(&self, blog: &Blog) -> Result<(), StoreError>;

    fn find_comments(&self, blog_id: &str) -> Result<Option<Vec<CommentEntry>>, StoreError>;
    fn push_comment(&self, blog_id: &str, entry: &CommentEntry)
        -> Result<CommentPush, StoreError>;
}
