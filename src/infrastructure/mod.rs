//! Infrastructure layer - data sources behind the collaborator traits

pub mod sources;

pub use sources::{PoolSource, ReserveReader, SnapshotStore, TokenRegistry};
