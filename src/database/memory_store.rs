use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use uuid::Uuid;

use super::{
    models::{blog::most_recent, Blog, CommentEntry, CommentPush, User},
    store::{DocumentStore, StoreError},
};

/// In process store used for local runs and tests. Every operation holds the
/// lock for its whole duration, which gives the same single-document
/// atomicity the Redis backend gets from its commands.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<Collections>,
}

#[derive(Default)]
struct Collections {
    users: HashMap<String, User>,
    blogs: Vec<Blog>,
    threads: HashMap<String, Thread>,
}

struct Thread {
    id: String,
    comment_list: Vec<CommentEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Collections>, StoreError> {
        self.collections.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl DocumentStore for MemoryStore {
    fn ping(&self) -> Result<(), StoreError> {
        self.lock().map(|_| ())
    }

    fn find_user(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.lock()?.users.get(email).cloned())
    }

    fn insert_user(&self, user: &User) -> Result<bool, StoreError> {
        let mut collections = self.lock()?;
        if collections.users.contains_key(&user.email) {
            return Ok(false);
        }

        let mut doc = user.clone();
        doc.wishlist.clear();
        for id in &user.wishlist {
            doc.bookmark(id);
        }
        collections.users.insert(user.email.clone(), doc);

        Ok(true)
    }

    fn add_to_wishlist(&self, email: &str, blog_id: &str) -> Result<bool, StoreError> {
        let mut collections = self.lock()?;
        Ok(match collections.users.get_mut(email) {
            Some(user) => user.bookmark(blog_id),
            None => false,
        })
    }

    fn list_blogs(&self) -> Result<Vec<Blog>, StoreError> {
        Ok(self.lock()?.blogs.clone())
    }

    fn recent_blogs(&self, limit: usize) -> Result<Vec<Blog>, StoreError> {
        Ok(most_recent(self.lock()?.blogs.clone(), limit))
    }

    fn featured_blogs(&self) -> Result<Vec<Blog>, StoreError> {
        Ok(self
            .lock()?
            .blogs
            .iter()
            .filter(|blog| blog.featured)
            .cloned()
            .collect())
    }

    fn find_blog(&self, id: &Uuid) -> Result<Option<Blog>, StoreError> {
        Ok(self.lock()?.blogs.iter().find(|blog| &blog.id == id).cloned())
    }

    fn find_blogs(&self, ids: &[String]) -> Result<Vec<Blog>, StoreError> {
        Ok(self
            .lock()?
            .blogs
            .iter()
            .filter(|blog| ids.contains(&blog.id.to_string()))
            .cloned()
            .collect())
    }

    fn insert_blog(&self, blog: &Blog) -> Result<(), StoreError> {
        self.lock()?.blogs.push(blog.clone());
        Ok(())
    }

    fn find_comments(&self, blog_id: &str) -> Result<Option<Vec<CommentEntry>>, StoreError> {
        Ok(self
            .lock()?
            .threads
            .get(blog_id)
            .map(|thread| thread.comment_list.clone()))
    }

    fn push_comment(
        &self,
        blog_id: &str,
        entry: &CommentEntry,
    ) -> Result<CommentPush, StoreError> {
        let mut collections = self.lock()?;

        if let Some(thread) = collections.threads.get_mut(blog_id) {
            thread.comment_list.push(entry.clone());
            return Ok(CommentPush::Appended);
        }

        let thread = Thread {
            id: Uuid::new_v4().to_string(),
            comment_list: vec![entry.clone()],
        };
        let thread_id = thread.id.clone();
        collections.threads.insert(blog_id.to_string(), thread);

        Ok(CommentPush::Created { thread_id })
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use chrono::Utc;
    use serde_json::Map;

    use super::*;

    fn entry(text: &str) -> CommentEntry {
        CommentEntry {
            comment: Some(text.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_insert_user_rejects_duplicate_email() {
        let store = MemoryStore::new();
        assert!(store.insert_user(&User::new("a@b.com")).unwrap());
        assert!(!store.insert_user(&User::new("a@b.com")).unwrap());
    }

    #[test]
    fn test_wishlist_add_needs_user() {
        let store = MemoryStore::new();
        assert!(!store.add_to_wishlist("nobody@b.com", "1").unwrap());

        store.insert_user(&User::new("a@b.com")).unwrap();
        assert!(store.add_to_wishlist("a@b.com", "1").unwrap());
        assert!(!store.add_to_wishlist("a@b.com", "1").unwrap());
        assert_eq!(
            store.find_user("a@b.com").unwrap().unwrap().wishlist,
            vec!["1".to_string()]
        );
    }

    #[test]
    fn test_find_blogs_skips_unknown_ids() {
        let store = MemoryStore::new();
        let blog = Blog::new(Utc::now(), false, Map::new());
        store.insert_blog(&blog).unwrap();

        let found = store
            .find_blogs(&[blog.id.to_string(), Uuid::new_v4().to_string()])
            .unwrap();
        assert_eq!(found, vec![blog]);
    }

    #[test]
    fn test_push_comment_creates_then_appends() {
        let store = MemoryStore::new();
        assert!(store.find_comments("b1").unwrap().is_none());

        let first = store.push_comment("b1", &entry("one")).unwrap();
        assert!(matches!(first, CommentPush::Created { .. }));
        let second = store.push_comment("b1", &entry("two")).unwrap();
        assert_eq!(second, CommentPush::Appended);

        let list = store.find_comments("b1").unwrap().unwrap();
        assert_eq!(list, vec![entry("one"), entry("two")]);
    }

    #[test]
    fn test_concurrent_appends_are_not_lost() {
        let store = Arc::new(MemoryStore::new());

        let handles = (0..8)
            .map(|i| {
                let store = store.clone();
                thread::spawn(move || {
                    store
                        .push_comment("b1", &entry(&format!("comment {}", i)))
                        .unwrap()
                })
            })
            .collect::<Vec<_>>();
        let created = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|push| matches!(push, CommentPush::Created { .. }))
            .count();

        assert_eq!(created, 1);
        assert_eq!(store.find_comments("b1").unwrap().unwrap().len(), 8);
    }
}
