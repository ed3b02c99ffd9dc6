//! Peers: per-type synchronization handlers.
//!
//! A peer turns the state of one component type into client operations. It
//! never knows about the planner; the planner asks it for a full render or,
//! when every changed property has a capable participant, lets its
//! [`PartialUpdateManager`] emit property-level updates instead.
//!
//! Peers are registered by type name in a [`PeerRegistry`]. Lookup walks the
//! type hierarchy, so a subtype without a peer of its own is rendered by the
//! nearest supertype's peer.

mod partial;
mod registry;

pub use partial::{PartialUpdateManager, PartialUpdateParticipant, PropertyParticipant};
pub use registry::{global, install_global, PeerRegistry, PeerRegistryBuilder};

use crate::component::ComponentId;
use crate::render::{RenderContext, RenderedContent};

/// Synchronization handler for one component type.
///
/// Implementations are stateless and shared between sessions and threads.
pub trait SynchronizePeer: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Renders the component's own element. Children are rendered by their
    /// own peers and nested by the caller.
    fn render_full(&self, ctx: &RenderContext<'_>, component: ComponentId) -> anyhow::Result<RenderedContent>;

    /// Property-level handlers, if the peer supports partial updates.
    fn partial_participants(&self) -> Option<&PartialUpdateManager> {
        None
    }

    /// Called for each component of a subtree that left the tree.
    fn dispose(&self, _ctx: &mut RenderContext<'_>, _component: ComponentId) -> anyhow::Result<()> {
        Ok(())
    }
}
