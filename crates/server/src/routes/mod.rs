//! HTTP route implementations.

pub mod health;
pub mod titles;
