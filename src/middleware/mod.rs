//! Console middleware
//!
//! Provides audit logging.

pub mod logging;
