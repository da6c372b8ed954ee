//! Core types and trait definitions for launchdeck.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! sync pipeline, the storage backend and the API all depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod entity;
pub mod error;
pub mod launch;
pub mod launchpad;
pub mod query;
pub mod record;
pub mod rocket;
pub mod store;
pub mod tally;

pub use error::{Error, Result};
