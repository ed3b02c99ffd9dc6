//! Sessions: one component tree each, plus the cycle that drives it.
//!
//! A cycle reconciles client input, runs the application's mutations and
//! plans the resulting updates. The tree is snapshotted first; if anything
//! in the cycle fails the snapshot is restored, so a client never sees half
//! a cycle.

mod manager;

pub use manager::SessionManager;

use std::fmt::Display;
use std::sync::Arc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::component::{ComponentTree, TypeRegistry};
use crate::errors::SyncError;
use crate::input::{ClientInput, InputReconciler, ReconcileReport};
use crate::peer::PeerRegistry;
use crate::planner::UpdatePlanner;
use crate::render::RenderList;

/// A unique identifier for a session, represented as a UUID.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for SessionId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a committed cycle produced.
#[derive(Debug, Clone, Default)]
pub struct CycleOutput {
    /// Operations to send to the client, in order
    pub operations: RenderList,
    /// How the submitted inputs were handled
    pub inputs: ReconcileReport,
}

pub struct Session {
    /// ID of the session
    pub id: SessionId,
    tree: ComponentTree,
    peers: Arc<PeerRegistry>,
    /// Number of committed cycles
    cycles: u64,
    created_at: OffsetDateTime,
    last_cycle_at: Option<OffsetDateTime>,
}

impl Session {
    /// Creates a session whose tree has a root of type `root_kind`.
    pub fn new(
        types: Arc<TypeRegistry>,
        peers: Arc<PeerRegistry>,
        root_kind: &str,
        max_style_depth: usize,
    ) -> Result<Self, SyncError> {
        Ok(Self {
            id: SessionId::new(),
            tree: ComponentTree::new(types, root_kind, max_style_depth)?,
            peers,
            cycles: 0,
            created_at: OffsetDateTime::now_utc(),
            last_cycle_at: None,
        })
    }

    pub fn tree(&self) -> &ComponentTree {
        &self.tree
    }

    /// Direct tree access. Changes made here are picked up by the next cycle.
    pub fn tree_mut(&mut self) -> &mut ComponentTree {
        &mut self.tree
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    pub fn last_cycle_at(&self) -> Option<OffsetDateTime> {
        self.last_cycle_at
    }

    /// Runs one cycle: apply `inputs`, run `mutate`, plan and render.
    ///
    /// On error the tree, including its pending updates, is restored to the
    /// state it had before the cycle started.
    pub fn run_cycle<F>(&mut self, inputs: Vec<ClientInput>, mutate: F) -> Result<CycleOutput, SyncError>
    where
        F: FnOnce(&mut ComponentTree) -> Result<(), SyncError>,
    {
        let snapshot = self.tree.clone();
        match self.apply(inputs, mutate) {
            Ok(output) => {
                self.cycles += 1;
                self.last_cycle_at = Some(OffsetDateTime::now_utc());
                debug!(
                    "session {}: cycle {} produced {} operations",
                    self.id,
                    self.cycles,
                    output.operations.len()
                );
                Ok(output)
            }
            Err(err) => {
                warn!("session {}: rolling back cycle: {err}", self.id);
                self.tree = snapshot;
                Err(err)
            }
        }
    }

    fn apply<F>(&mut self, inputs: Vec<ClientInput>, mutate: F) -> Result<CycleOutput, SyncError>
    where
        F: FnOnce(&mut ComponentTree) -> Result<(), SyncError>,
    {
        let report = InputReconciler::reconcile(&mut self.tree, inputs)?;
        mutate(&mut self.tree)?;

        let updates = self.tree.take_updates();
        let operations = UpdatePlanner::new(&self.tree, &self.peers).execute(&updates)?;
        Ok(CycleOutput { operations, inputs: report })
    }

    /// Renders the whole tree from scratch, e.g. for a newly connected
    /// client. Pending updates are covered by it and discarded.
    pub fn render_initial(&mut self) -> Result<RenderList, SyncError> {
        let operations = UpdatePlanner::new(&self.tree, &self.peers).render_initial()?;
        self.tree.take_updates();
        Ok(operations)
    }
}
