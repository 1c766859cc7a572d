//! Optimistic reorder synchronization: local tree state, per-scope debouncing,
//! per-scope serial dispatch and reconciliation against the remote store.

pub mod debounce;
mod engine;
mod lists;
pub mod queue;
mod reconcile;
pub mod state;
mod tasks;
pub mod telemetry;

#[cfg(test)]
mod testing;

pub use engine::{EngineOptions, Mutation, SyncEngine};
pub use state::{Board, ListGroupsState, Snapshot, TreeState};
