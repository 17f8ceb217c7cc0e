//! Ownership tags attached to blocks.

use std::fmt;

use uuid::Uuid;

/// Identifier of a container (a tensor map or a block) able to own blocks.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct OwnerId {
    id: Uuid,
}

impl OwnerId {
    /// Fresh, globally unique identifier.
    pub fn new() -> Self {
        Self { id: Uuid::new_v4() }
    }
}

impl Default for OwnerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Whether a block lives inside another container.
///
/// A block moves from `Unowned` to `OwnedBy` exactly once, when it is inserted in a
/// tensor map or attached as a gradient. Inserting an owned block again fails.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Ownership {
    /// Free-standing block.
    #[default]
    Unowned,
    /// Block stored in the container with this id.
    OwnedBy(OwnerId),
}

impl Ownership {
    /// Whether the block is owned by some container.
    pub fn is_owned(&self) -> bool {
        matches!(self, Ownership::OwnedBy(_))
    }
}
