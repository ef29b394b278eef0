//! # Gather Engine
//!
//! The IO-free core of Gather: server-side pagination and the client-side
//! entity cache.
//!
//! ## Design Principles
//!
//! - **No IO**: sources are reached only through the [`QuerySource`] trait
//! - **Deterministic**: the cache applies results by issuance order, not completion order
//! - **Testable**: every piece runs against in-memory data
//!
//! ## Core Concepts
//!
//! ### Pagination
//!
//! A [`PageRequest`] clamps its page number and size when they are assigned.
//! The [`Paginator`] counts a [`QuerySource`], fetches one bounded range and
//! wraps both in a [`PageSlice`].
//!
//! ### Entity cache
//!
//! The [`EntityCache`] holds copies of server-owned [`Entity`] values, keyed by
//! id and iterated in insertion order. It derives date-sorted and date-grouped
//! views on demand.
//!
//! ### Op tokens
//!
//! Operations draw an [`OpToken`] from a [`Sequencer`] when issued. The cache
//! refuses to apply a result whose token is older than the last one applied to
//! the same id, and uses [`Checkpoint`]s to undo optimistic changes.
//!
//! ## Quick Start
//!
//! ```rust
//! use gather_engine::{Activity, EntityCache, PageRequest};
//!
//! let mut cache = EntityCache::new();
//! cache.upsert(Activity::new("a-2", "Climbing", "2024-01-02T09:00:00"));
//! cache.upsert(Activity::new("a-1", "Museum", "2024-01-01"));
//!
//! let groups = cache.grouped_by_date();
//! assert_eq!(groups[0].date, "2024-01-01");
//! assert_eq!(groups[1].entities[0].title, "Climbing");
//!
//! let request = PageRequest::new(2, 200);
//! assert_eq!(request.page_size(), 50);
//! ```

pub mod cache;
pub mod entity;
pub mod error;
pub mod page;
pub mod paginate;
pub mod sequence;

// Re-export main types at crate root
pub use cache::{Checkpoint, DateGroup, EntityCache};
pub use entity::{normalize_date, parse_date, Activity, Entity, DATE_FORMAT};
pub use error::Error;
pub use page::{PageRequest, PageSlice, PaginationHeader, MAX_PAGE_SIZE};
pub use paginate::{Paginator, QuerySource, SourceError, VecSource};
pub use sequence::{OpToken, Sequencer};

/// Type alias for clarity
pub type EntityId = String;
