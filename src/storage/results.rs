//! Storage result types
//!
//! Defines result structures returned by storage operations.

/// One immediate child of a listed directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Result of an archive expansion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractResult {
    pub entries: usize,
    pub bytes: u64,
}
