//! External collaborators consumed by the router: pool discovery, reserve
//! reads and token metadata

pub mod snapshot_store;
pub mod traits;

pub use snapshot_store::{Snapshot, SnapshotStore};
pub use traits::{PoolSource, ReserveReader, TokenRegistry};
