//! Shared error plumbing used across all palaver crates.

pub mod error;

pub use error::FromMessage;
