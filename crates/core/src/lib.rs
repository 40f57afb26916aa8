//! Core types and shared functionality for pagetitle.
//!
//! This crate provides:
//! - Title cache with SQLite backend
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheDb, TitleCache, TitleStore};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
