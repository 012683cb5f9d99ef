//! Server core functionality
//!
//! Startup of the sandbox process: root directory, registry, console.

pub mod core;

pub use core::Server;
