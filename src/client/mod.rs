//! Client management system
//!
//! Session state and the console session loop.

pub mod handler;
pub mod operations;
pub mod session;
pub mod state;

pub use handler::handle_client;
pub use session::SessionContext;
pub use state::Client;
