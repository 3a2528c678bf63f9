//! Output formatting for tailed tweets

use owo_colors::{OwoColorize, Style};
use tweetcast_protocol::Tweet;

/// Output formatter
pub struct Formatter {
    json: bool,
    use_color: bool,
}

impl Formatter {
    pub fn new(json: bool) -> Self {
        Self {
            json,
            use_color: true,
        }
    }

    /// Enable or disable color output
    pub fn with_color(mut self, use_color: bool) -> Self {
        self.use_color = use_color;
        self
    }

    /// Render one tweet payload, or `None` if it cannot be decoded
    pub fn format(&self, payload: &str) -> Option<String> {
        if self.json {
            return Some(payload.to_string());
        }

        let tweet: Tweet = match serde_json::from_str(payload) {
            Ok(tweet) => tweet,
            Err(e) => {
                tracing::warn!(error = %e, "undecodable tweet payload");
                return None;
            }
        };

        let name_style = if self.use_color {
            Style::new().green().bold()
        } else {
            Style::new()
        };

        // keep one tweet per line
        let text = tweet.text.replace(['\r', '\n'], " ");
        Some(format!(
            "{} {}",
            tweet.user.screen_name.style(name_style),
            text
        ))
    }
}
