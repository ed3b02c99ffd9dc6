use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

/// A unique identifier for a component within a session's tree.
///
/// Internally, a `ComponentId` is a wrapper around a [`Uuid`]. It is assigned
/// once when the component is created and never changes for the component's
/// lifetime, so it can be handed to the client and used to route input back.
///
/// **Note:** The use of [`Uuid`] is an implementation detail. Always treat
/// `ComponentId` as an opaque handle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(Uuid);

impl ComponentId {
    /// Create a new unique `ComponentId` using a random UUID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Identifier of the client-side element rendered for this component.
    pub fn element_id(&self) -> String {
        format!("c_{}", self.0.simple())
    }
}

impl Default for ComponentId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ComponentId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
