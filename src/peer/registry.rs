use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, OnceLock};

use crate::component::TypeRegistry;
use crate::errors::SyncError;
use crate::peer::SynchronizePeer;

static GLOBAL: OnceLock<Arc<PeerRegistry>> = OnceLock::new();

/// Maps component type names to peers. Immutable once built.
#[derive(Clone, Default)]
pub struct PeerRegistry {
    peers: HashMap<String, Arc<dyn SynchronizePeer>>,
}

impl Debug for PeerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<&String> = self.peers.keys().collect();
        types.sort();
        f.debug_struct("PeerRegistry").field("types", &types).finish()
    }
}

impl PeerRegistry {
    pub fn builder() -> PeerRegistryBuilder {
        PeerRegistryBuilder::default()
    }

    /// Peer registered for exactly this type name.
    pub fn get(&self, kind: &str) -> Option<&Arc<dyn SynchronizePeer>> {
        self.peers.get(kind)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Peer for `kind`, falling back to the nearest supertype that has one.
    pub fn resolve(&self, types: &TypeRegistry, kind: &str) -> Result<&Arc<dyn SynchronizePeer>, SyncError> {
        types
            .lineage(kind)?
            .into_iter()
            .find_map(|ty| self.peers.get(ty.name()))
            .ok_or_else(|| SyncError::NoPeerRegistered(kind.to_string()))
    }
}

#[derive(Default)]
pub struct PeerRegistryBuilder {
    peers: HashMap<String, Arc<dyn SynchronizePeer>>,
}

impl PeerRegistryBuilder {
    /// Binds `peer` to `kind`, replacing an earlier binding.
    pub fn register(mut self, kind: impl Into<String>, peer: impl SynchronizePeer + 'static) -> Self {
        self.peers.insert(kind.into(), Arc::new(peer));
        self
    }

    /// Binds an already shared peer, e.g. one peer serving several types.
    pub fn register_shared(mut self, kind: impl Into<String>, peer: Arc<dyn SynchronizePeer>) -> Self {
        self.peers.insert(kind.into(), peer);
        self
    }

    pub fn build(self) -> PeerRegistry {
        PeerRegistry { peers: self.peers }
    }
}

/// Installs the process-wide registry. Only the first call succeeds.
pub fn install_global(registry: PeerRegistry) -> Result<Arc<PeerRegistry>, SyncError> {
    let registry = Arc::new(registry);
    GLOBAL
        .set(registry.clone())
        .map_err(|_| SyncError::RegistryAlreadyInstalled)?;
    log::info!("installed global peer registry with {} peers", registry.len());
    Ok(registry)
}

/// The process-wide registry, if one was installed.
pub fn global() -> Option<Arc<PeerRegistry>> {
    GLOBAL.get().cloned()
}
