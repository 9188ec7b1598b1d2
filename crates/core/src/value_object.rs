//! Value object trait: equality by value, not identity.
//!
//! Value objects have **no identity**; two value objects with the same values
//! are the same value. They live and die with the entity that embeds them.

/// Marker trait for value objects.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Location {
///     venue_name: Option<String>,
///     city_town: Option<String>,
/// }
///
/// impl ValueObject for Location {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
