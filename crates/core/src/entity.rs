//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Identities are assigned by persistence, so an entity that has been built
/// in memory but not yet committed has no identifier.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier, or `None` before the first commit.
    fn id(&self) -> Option<Self::Id>;

    fn is_persisted(&self) -> bool {
        self.id().is_some()
    }
}
