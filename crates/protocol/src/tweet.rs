//! Raw feed items
//!
//! Only the fields the pipeline reads are typed; everything else is captured in
//! `extra` and serialized back out untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Publishing account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Numeric account id
    pub id: u64,
    /// Account id as a string
    #[serde(default)]
    pub id_str: String,
    /// Handle without the leading `@`
    pub screen_name: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Fields not used by the pipeline
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A tweet as delivered by the filter stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tweet {
    /// Numeric tweet id
    pub id: u64,
    /// Tweet id as a string
    #[serde(default)]
    pub id_str: String,
    /// Body text
    #[serde(default)]
    pub text: String,
    /// Author
    pub user: User,
    /// Set when this item is a retweet, `null` otherwise
    #[serde(default)]
    pub retweeted_status: Option<Box<Tweet>>,
    /// Set when this item quotes another tweet, `null` otherwise
    #[serde(default)]
    pub quoted_status: Option<Box<Tweet>>,
    /// Fields not used by the pipeline
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Tweet {
    /// Stable string identifier, preferring `id_str`
    pub fn id_string(&self) -> String {
        if self.id_str.is_empty() {
            self.id.to_string()
        } else {
            self.id_str.clone()
        }
    }
}
