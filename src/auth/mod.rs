//! Authentication system
//!
//! User registry, credential validation, and jail provisioning.

pub mod credentials;
pub mod provisioning;
pub mod validator;

pub use credentials::{UserAccount, UserRegistry};
pub use provisioning::{authenticate, register};
