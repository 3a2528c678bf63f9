//! Command implementations for the tweetcast CLI

pub mod serve;
pub mod tail;
