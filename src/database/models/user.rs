use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A registered reader. `email` is the natural key, everything else the
/// client sends is kept as free-form profile data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub email: String,
    /// Ids of bookmarked blogs, without duplicates
    #[serde(default)]
    pub wishlist: Vec<String>,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl User {
    pub fn new(email: &str) -> User {
        User {
            id: None,
            email: email.to_string(),
            wishlist: Vec::new(),
            profile: Map::new(),
        }
    }

    /// Adds `blog_id` unless it is already present. Returns whether the list changed.
    pub fn bookmark(&mut self, blog_id: &str) -> bool {
        if self.wishlist.iter().any(|id| id == blog_id) {
            return false;
        }
        self.wishlist.push(blog_id.to_string());
        true
    }
}
