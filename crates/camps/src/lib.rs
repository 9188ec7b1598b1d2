//! Camps domain module (camps, their venue, talks and speakers).
//!
//! This crate contains the entity model and its business rules, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod camp;
pub mod moniker;
pub mod speaker;
pub mod talk;

pub use camp::{Camp, Location};
pub use speaker::Speaker;
pub use talk::Talk;
