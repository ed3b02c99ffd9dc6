use crate::component::{ComponentId, ComponentTree, PropertyValue};
use crate::errors::SyncError;
use crate::peer::{PeerRegistry, SynchronizePeer};
use crate::render::{RenderList, RenderOperation, RenderedContent};
use std::sync::Arc;

/// State handed to peers and participants while a cycle renders.
///
/// Gives read access to the tree and collects the operations produced so
/// far. Peers never mutate the tree.
pub struct RenderContext<'a> {
    tree: &'a ComponentTree,
    peers: &'a PeerRegistry,
    list: RenderList,
}

impl<'a> RenderContext<'a> {
    pub fn new(tree: &'a ComponentTree, peers: &'a PeerRegistry) -> Self {
        Self { tree, peers, list: RenderList::new() }
    }

    pub fn tree(&self) -> &'a ComponentTree {
        self.tree
    }

    /// Resolved property of a component.
    pub fn property(&self, component: ComponentId, name: &str) -> Result<Option<&'a PropertyValue>, SyncError> {
        self.tree.property(component, name)
    }

    /// Resolved property rendered as a client string.
    pub fn property_string(&self, component: ComponentId, name: &str) -> Result<Option<String>, SyncError> {
        Ok(self.property(component, name)?.map(ToString::to_string))
    }

    pub fn push(&mut self, operation: RenderOperation) {
        self.list.add_command(operation);
    }

    /// The peer responsible for a component.
    pub fn peer_for(&self, component: ComponentId) -> Result<&'a Arc<dyn SynchronizePeer>, SyncError> {
        let kind = self.tree.kind(component)?;
        self.peers.resolve(self.tree.types(), kind)
    }

    /// Renders a component's element only, without its children.
    pub fn render_element(&self, component: ComponentId) -> Result<RenderedContent, SyncError> {
        let peer = self.peer_for(component)?;
        peer.render_full(self, component).map_err(|source| SyncError::Render {
            peer: peer.name().to_string(),
            component,
            source,
        })
    }

    /// Renders a component and every visible descendant, in tree order.
    pub fn render_subtree(&self, component: ComponentId) -> Result<RenderedContent, SyncError> {
        let mut content = self.render_element(component)?;
        for child in self.tree.visible_children(component)? {
            content.children.push(self.render_subtree(child)?);
        }
        Ok(content)
    }

    /// Lets the peer of a removed component release what it holds. The
    /// peer is looked up by `kind`, since a destroyed component is no
    /// longer in the tree.
    pub fn dispose(&mut self, component: ComponentId, kind: &str) -> Result<(), SyncError> {
        let peers = self.peers;
        let peer = peers.resolve(self.tree.types(), kind)?;
        peer.dispose(self, component).map_err(|source| SyncError::Render {
            peer: peer.name().to_string(),
            component,
            source,
        })
    }

    pub fn into_list(self) -> RenderList {
        self.list
    }
}
