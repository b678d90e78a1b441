//! Shared error definitions used across all netreg crates.

pub mod error;

pub use error::{Context, Error, FromMessage, Result};
