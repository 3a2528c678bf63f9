//! Stream credentials
//!
//! Loaded from a local JSON file kept out of the main TOML config:
//!
//! ```json
//! {
//!   "consumerKey": "...",
//!   "consumerSecret": "...",
//!   "accessToken": "...",
//!   "accessSecret": "..."
//! }
//! ```

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// OAuth 1.0a consumer and access credentials
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// Application consumer key
    pub consumer_key: String,
    /// Application consumer secret
    pub consumer_secret: String,
    /// User access token
    pub access_token: String,
    /// User access token secret
    pub access_secret: String,
}

impl Credentials {
    /// Load and validate credentials from a JSON file
    ///
    /// # Errors
    ///
    /// Missing file, malformed JSON, or a missing/empty field.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let name = path.display().to_string();

        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: name.clone(),
            source: e,
        })?;

        let credentials: Credentials =
            serde_json::from_str(&contents).map_err(|e| ConfigError::CredentialsParse {
                path: name.clone(),
                source: e,
            })?;

        credentials.validate(&name)?;
        Ok(credentials)
    }

    fn validate(&self, name: &str) -> Result<()> {
        let fields = [
            ("consumerKey", &self.consumer_key),
            ("consumerSecret", &self.consumer_secret),
            ("accessToken", &self.access_token),
            ("accessSecret", &self.access_secret),
        ];

        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(ConfigError::missing_field("credentials", name, field));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("access_token", &self.access_token)
            .field("access_secret", &"<redacted>")
            .finish()
    }
}
