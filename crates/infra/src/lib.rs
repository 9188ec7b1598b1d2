//! Infrastructure layer: camp storage, the per-request repository, database
//! wiring (pool, migrations) and sample data.

pub mod camp_store;
pub mod db;
pub mod repository;
pub mod seed;

pub use camp_store::{CampFilter, CampQuery, CampStore, InMemoryCampStore, PostgresCampStore, StagedChange, StoreError};
pub use repository::{CampRepository, RepositoryError};
