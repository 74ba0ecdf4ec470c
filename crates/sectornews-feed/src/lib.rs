//! Syndication feed retrieval for keyword searches.
//!
//! [`FeedClient`] issues one search request per keyword against a Google
//! News style RSS endpoint, retrying transient failures, and [`parse_feed`]
//! turns the response body into raw [`FeedEntry`] values whose fields are all
//! optional; deciding what to do with incomplete entries is the caller's job.

pub mod client;
pub mod error;
pub mod parse;

mod retry;

pub use client::{FeedClient, FeedSettings};
pub use error::FeedError;
pub use parse::{parse_feed, parse_published, FeedEntry};
