//! # Gather Client
//!
//! Keeps a local [`EntityCache`](gather_engine::EntityCache) in step with the
//! Gather server.
//!
//! The [`SyncCoordinator`] runs load-all, load-one, create, update and delete
//! against any [`RemoteCollection`]. [`HttpRemote`] is the implementation
//! that talks to the server's `/activities` endpoints.
//!
//! ```rust,no_run
//! use gather_client::{ClientConfig, HttpRemote, SyncCoordinator};
//! use gather_engine::Activity;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let remote = HttpRemote::new(ClientConfig::new("http://localhost:5000"))?;
//! let coordinator: SyncCoordinator<Activity, _> = SyncCoordinator::new(remote);
//!
//! coordinator.load_all().await;
//! for group in coordinator.read(|cache| {
//!     cache
//!         .grouped_by_date()
//!         .into_iter()
//!         .map(|g| (g.date, g.entities.len()))
//!         .collect::<Vec<_>>()
//! }) {
//!     println!("{}: {} activities", group.0, group.1);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod coordinator;
pub mod error;
pub mod http;
pub mod remote;
pub mod status;

pub use config::ClientConfig;
pub use coordinator::SyncCoordinator;
pub use error::{ConfigError, RemoteError, RemoteResult, SyncError};
pub use http::{new_activity_id, HttpRemote, PAGINATION_HEADER};
pub use remote::RemoteCollection;
pub use status::{OperationKind, SyncFailure, SyncStatus};
