//! Accepted events
//!
//! An `Event` is a tweet that passed the exclusion predicate. It is created
//! once at ingestion, never mutated, and shared by reference with every
//! subscriber that receives it.

use serde::{Serialize, Serializer};

use crate::tweet::Tweet;

/// Classification used by the exclusion predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweetKind {
    /// Authored content
    Original,
    /// Carries a retweet back-reference
    Retweet,
    /// Carries a quote back-reference
    Quote,
}

impl TweetKind {
    /// Classify a raw tweet
    ///
    /// A retweet of a quote is reported as `Retweet`.
    pub fn of(tweet: &Tweet) -> Self {
        if tweet.retweeted_status.is_some() {
            Self::Retweet
        } else if tweet.quoted_status.is_some() {
            Self::Quote
        } else {
            Self::Original
        }
    }

    /// Whether this kind is admitted into the pipeline
    #[inline]
    pub fn is_original(self) -> bool {
        self == Self::Original
    }
}

/// An accepted feed item ready for delivery
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    id: String,
    kind: TweetKind,
    tweet: Tweet,
}

impl Event {
    /// Admit a tweet, or return `None` if the exclusion predicate rejects it
    pub fn accept(tweet: Tweet) -> Option<Self> {
        let kind = TweetKind::of(&tweet);
        if !kind.is_original() {
            return None;
        }

        Some(Self {
            id: tweet.id_string(),
            kind,
            tweet,
        })
    }

    /// Unique tweet identifier
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Publishing account id
    #[inline]
    pub fn author_id(&self) -> u64 {
        self.tweet.user.id
    }

    /// Publishing account handle
    #[inline]
    pub fn screen_name(&self) -> &str {
        &self.tweet.user.screen_name
    }

    /// Body text
    #[inline]
    pub fn text(&self) -> &str {
        &self.tweet.text
    }

    /// Classification computed at ingestion
    #[inline]
    pub fn kind(&self) -> TweetKind {
        self.kind
    }

    /// The underlying tweet
    #[inline]
    pub fn tweet(&self) -> &Tweet {
        &self.tweet
    }

    /// Serialize to the JSON payload forwarded to subscribers
    pub fn to_payload(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Events serialize as the full tweet object
impl Serialize for Event {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.tweet.serialize(serializer)
    }
}
