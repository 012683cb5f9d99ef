//! Navigate module
//!
//! Handles directory changes inside a jail.

mod operations;

pub use operations::change_directory;
