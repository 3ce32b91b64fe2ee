//! Redis backed [`DocumentStore`].
//!
//! Layout:
//! - `user:{email}` JSON profile
//! - `wishlist:{email}` set of blog ids
//! - `blog:{id}` JSON document, `blogs:by_date` sorted set scored by the
//!   blog date in milliseconds, `blogs:featured` set of ids
//! - `comments:{blogId}` list of JSON entries, `comment_threads` hash of
//!   blogId to thread id
//!
//! Every prefix ends in `:` and none is a prefix of another or of a fixed key,
//! so client supplied emails and blog ids cannot reach each other's keys.
//!
//! Wishlist adds (`SADD`) and comment appends (`RPUSH`) are single commands,
//! so concurrent writers to the same user or thread never lose updates.
use std::sync::Arc;

use r2d2_redis::{
    r2d2::{Pool, PooledConnection},
    redis::{self, Commands},
    RedisConnectionManager,
};
use uuid::Uuid;

use super::{
    models::{Blog, CommentEntry, CommentPush, User},
    store::{DocumentStore, StoreError},
};

const BLOGS_BY_DATE: &str = "blogs:by_date";
const BLOGS_FEATURED: &str = "blogs:featured";
const COMMENT_THREADS: &str = "comment_threads";

fn user_key(email: &str) -> String {
    format!("user:{}", email)
}
fn wishlist_key(email: &str) -> String {
    format!("wishlist:{}", email)
}
fn blog_key(id: &str) -> String {
    format!("blog:{}", id)
}
fn comment_key(blog_id: &str) -> String {
    format!("comments:{}", blog_id)
}

#[derive(Clone)]
pub struct RedisStore {
    pool: Arc<Pool<RedisConnectionManager>>,
}

impl RedisStore {
    pub fn new(pool: Arc<Pool<RedisConnectionManager>>) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<PooledConnection<RedisConnectionManager>, StoreError> {
        Ok(self.pool.get()?)
    }

    /// Loads the documents stored under `ids` with a single `MGET`
    fn load_blogs(
        conn: &mut PooledConnection<RedisConnectionManager>,
        ids: &[String],
    ) -> Result<Vec<Blog>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let keys = ids.iter().map(|id| blog_key(id)).collect::<Vec<_>>();
        let docs: Vec<Option<String>> = redis::cmd("MGET").arg(&keys[..]).query(&mut **conn)?;

        docs.into_iter()
            .flatten()
            .map(|doc| serde_json::from_str::<Blog>(&doc).map_err(StoreError::from))
            .collect()
    }
}

impl DocumentStore for RedisStore {
    fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.conn()?;
        redis::cmd("PING").query::<String>(&mut *conn)?;
        Ok(())
    }

    fn find_user(&self, email: &str) -> Result<Option<User>, StoreError> {
        let mut conn = self.conn()?;
        let (doc, mut wishlist): (Option<String>, Vec<String>) = redis::pipe()
            .get(user_key(email))
            .smembers(wishlist_key(email))
            .query(&mut *conn)?;

        let mut user = match doc {
            Some(doc) => serde_json::from_str::<User>(&doc)?,
            None => return Ok(None),
        };
        wishlist.sort();
        user.wishlist = wishlist;

        Ok(Some(user))
    }

    fn insert_user(&self, user: &User) -> Result<bool, StoreError> {
        let mut conn = self.conn()?;

        // the wishlist lives in its own set
        let mut doc = user.clone();
        let wishlist = std::mem::take(&mut doc.wishlist);

        let created: bool = conn.set_nx(user_key(&user.email), serde_json::to_string(&doc)?)?;
        if created && !wishlist.is_empty() {
            let _: i64 = conn.sadd(wishlist_key(&user.email), wishlist)?;
        }

        Ok(created)
    }

    fn add_to_wishlist(&self, email: &str, blog_id: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn()?;

        let exists: bool = conn.exists(user_key(email))?;
        if !exists {
            return Ok(false);
        }
        let added: i64 = conn.sadd(wishlist_key(email), blog_id)?;

        Ok(added > 0)
    }

    fn list_blogs(&self) -> Result<Vec<Blog>, StoreError> {
        let mut conn = self.conn()?;
        let ids: Vec<String> = conn.zrevrange(BLOGS_BY_DATE, 0, -1)?;
        Self::load_blogs(&mut conn, &ids)
    }

    fn recent_blogs(&self, limit: usize) -> Result<Vec<Blog>, StoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let mut conn = self.conn()?;
        let ids: Vec<String> = conn.zrevrange(BLOGS_BY_DATE, 0, limit as isize - 1)?;
        Self::load_blogs(&mut conn, &ids)
    }

    fn featured_blogs(&self) -> Result<Vec<Blog>, StoreError> {
        let mut conn = self.conn()?;
        let ids: Vec<String> = conn.smembers(BLOGS_FEATURED)?;
        let blogs = Self::load_blogs(&mut conn, &ids)?;

        Ok(blogs.into_iter().filter(|blog| blog.featured).collect())
    }

    fn find_blog(&self, id: &Uuid) -> Result<Option<Blog>, StoreError> {
        let mut conn = self.conn()?;
        let doc: Option<String> = conn.get(blog_key(&id.to_string()))?;

        match doc {
            Some(doc) => Ok(Some(serde_json::from_str(&doc)?)),
            None => Ok(None),
        }
    }

    fn find_blogs(&self, ids: &[String]) -> Result<Vec<Blog>, StoreError> {
        let mut conn = self.conn()?;
        Self::load_blogs(&mut conn, ids)
    }

    fn insert_blog(&self, blog: &Blog) -> Result<(), StoreError> {
        let mut conn = self.conn()?;
        let id = blog.id.to_string();

        let mut pipe = redis::pipe();
        pipe.atomic()
            .set(blog_key(&id), serde_json::to_string(blog)?)
            .ignore()
            .zadd(BLOGS_BY_DATE, &id, blog.date.timestamp_millis())
            .ignore();
        if blog.featured {
            pipe.sadd(BLOGS_FEATURED, &id).ignore();
        }
        pipe.query::<()>(&mut *conn)?;

        Ok(())
    }

    fn find_comments(&self, blog_id: &str) -> Result<Option<Vec<CommentEntry>>, StoreError> {
        let mut conn = self.conn()?;
        let docs: Vec<String> = conn.lrange(comment_key(blog_id), 0, -1)?;

        // threads are never emptied, so an empty list means no thread
        if docs.is_empty() {
            return Ok(None);
        }
        let entries = docs
            .iter()
            .map(|doc| serde_json::from_str::<CommentEntry>(doc))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(entries))
    }

    fn push_comment(
        &self,
        blog_id: &str,
        entry: &CommentEntry,
    ) -> Result<CommentPush, StoreError> {
        let mut conn = self.conn()?;
        let (len, thread_id): (i64, String) = redis::pipe()
            .atomic()
            .rpush(comment_key(blog_id), serde_json::to_string(entry)?)
            .hset_nx(COMMENT_THREADS, blog_id, Uuid::new_v4().to_string())
            .ignore()
            .hget(COMMENT_THREADS, blog_id)
            .query(&mut *conn)?;

        // the append that makes the list one long is the one that opened it
        if len > 1 {
            return Ok(CommentPush::Appended);
        }
        Ok(CommentPush::Created { thread_id })
    }
}
