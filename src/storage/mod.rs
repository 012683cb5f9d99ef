//! Jailed file system storage
//!
//! Path containment, quota accounting, and the sandboxed operation set.

pub mod archive;
pub mod filesystem;
pub mod operations;
pub mod quota;
pub mod results;
pub mod validation;

pub use operations::FileOps;
pub use quota::{QuotaPolicy, QuotaStatus};
pub use results::{DirEntry, ExtractResult};
pub use validation::{PathResolver, is_contained};
