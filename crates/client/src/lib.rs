//! Client code for pagetitle.
//!
//! This crate provides the HTTP fetch pipeline, title extraction, and the
//! cache-first resolver used by the server.

pub mod extract;
pub mod fetch;
pub mod resolve;

pub use extract::{NO_TITLE, extract_title, title_or_sentinel};
pub use fetch::{FetchClient, FetchConfig, FetchResponse, PageSource};
pub use resolve::{DEFAULT_BATCH_CONCURRENCY, Resolution, TitleResolver};
