//! Camp storage boundary.
//!
//! A `CampStore` answers queries over camps/talks/speakers and applies a batch
//! of staged changes atomically. It is shared across requests; staging lives
//! in the per-request `CampRepository`.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryCampStore;
pub use postgres::PostgresCampStore;
pub use r#trait::{CampFilter, CampQuery, CampStore, StagedChange, StoreError};
