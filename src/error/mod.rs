//! Error handling
//!
//! Defines error types and handling for the sandbox.

pub mod handlers;
pub mod types;

pub use types::*;
