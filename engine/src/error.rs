//! Error types for the Gather engine.

use thiserror::Error;

/// All possible errors from the Gather engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Pagination errors
    #[error("source query failed: {0}")]
    SourceQueryFailed(String),

    #[error("page size must be greater than zero")]
    ZeroPageSize,

    #[error("page holds {len} items but page size is {page_size}")]
    PageOverflow { len: usize, page_size: u64 },

    #[error("page holds {len} items but the sequence counts {count}")]
    ItemsExceedCount { len: usize, count: u64 },

    #[error("inconsistent page: {0}")]
    InconsistentPage(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
