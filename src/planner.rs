//! Partial update planning.
//!
//! For every component with a pending [`UpdateRecord`] the planner picks one
//! of two strategies:
//!
//! - **Partial** when only properties changed and the component's peer has a
//!   participant able to render every one of them. The participants emit
//!   property-level operations.
//! - **Full** otherwise. The component's element is removed and rendered
//!   again from scratch, visible descendants included. Any pending record of
//!   a descendant is subsumed by that.
//!
//! Components are visited once, in depth-first tree order, so an ancestor is
//! always decided before its descendants.

use std::collections::{HashMap, HashSet};

use log::{debug, trace};

use crate::component::{ComponentId, ComponentTree};
use crate::errors::SyncError;
use crate::peer::PeerRegistry;
use crate::render::{RenderContext, RenderList, RenderOperation};
use crate::update::{UpdateManager, UpdateRecord};

/// How a component's update is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Full,
    Partial,
}

/// Per-component planning state within one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlanState {
    #[default]
    Unvisited,
    FullPending,
    PartialPending,
    /// Terminal; the record is consumed
    Rendered,
}

impl From<Strategy> for PlanState {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Full => PlanState::FullPending,
            Strategy::Partial => PlanState::PartialPending,
        }
    }
}

pub struct UpdatePlanner<'a> {
    tree: &'a ComponentTree,
    peers: &'a PeerRegistry,
    states: HashMap<ComponentId, PlanState>,
}

impl<'a> UpdatePlanner<'a> {
    pub fn new(tree: &'a ComponentTree, peers: &'a PeerRegistry) -> Self {
        Self { tree, peers, states: HashMap::new() }
    }

    pub fn state(&self, component: ComponentId) -> PlanState {
        self.states.get(&component).copied().unwrap_or_default()
    }

    /// Picks the strategy for one record. Only validates participants; none
    /// of them runs here.
    pub fn decide(&self, ctx: &RenderContext<'_>, record: &UpdateRecord) -> Result<Strategy, SyncError> {
        if record.is_structural() {
            return Ok(Strategy::Full);
        }
        let peer = ctx.peer_for(record.component)?;
        match peer.partial_participants() {
            Some(participants) if participants.can_process(ctx, record) => Ok(Strategy::Partial),
            _ => Ok(Strategy::Full),
        }
    }

    /// Renders every pending record of `updates` into a [`RenderList`].
    ///
    /// Peers of removed subtrees are disposed only after everything else
    /// rendered, so a failing render leaves them untouched.
    pub fn execute(mut self, updates: &UpdateManager) -> Result<RenderList, SyncError> {
        let mut ctx = RenderContext::new(self.tree, self.peers);
        let disposals = self.removed_subtrees(updates)?;

        for id in self.tree.depth_first(self.tree.root()) {
            let Some(record) = updates.record(id).filter(|r| !r.is_empty()) else {
                continue;
            };
            if self.state(id) == PlanState::Rendered {
                trace!("update of {id} subsumed by an ancestor refresh");
                continue;
            }
            if !self.tree.is_rendered(id) {
                trace!("dropping update of hidden component {id}");
                self.states.insert(id, PlanState::Rendered);
                continue;
            }

            let strategy = self.decide(&ctx, record)?;
            self.states.insert(id, strategy.into());
            debug!(
                "{} {}: {:?} update ({} properties, structural: {})",
                self.tree.kind(id)?,
                id,
                strategy,
                record.updated_properties.len(),
                record.is_structural()
            );

            match strategy {
                Strategy::Partial => {
                    self.render_partial(&mut ctx, record)?;
                    self.states.insert(id, PlanState::Rendered);
                }
                Strategy::Full => {
                    self.render_full(&mut ctx, id, Some(record))?;
                    for descendant in self.tree.depth_first(id) {
                        self.states.insert(descendant, PlanState::Rendered);
                    }
                }
            }
        }

        let dropped = updates
            .records()
            .filter(|r| self.state(r.component) == PlanState::Unvisited)
            .count();
        if dropped > 0 {
            trace!("dropped {dropped} updates of detached components");
        }

        for (component, kind) in &disposals {
            ctx.dispose(*component, kind)?;
        }
        Ok(ctx.into_list())
    }

    /// Full render of the whole tree, as sent when a client first connects.
    pub fn render_initial(self) -> Result<RenderList, SyncError> {
        let mut ctx = RenderContext::new(self.tree, self.peers);
        self.render_full(&mut ctx, self.tree.root(), None)?;
        Ok(ctx.into_list())
    }

    fn render_partial(&self, ctx: &mut RenderContext<'_>, record: &UpdateRecord) -> Result<(), SyncError> {
        let peer = ctx.peer_for(record.component)?;
        let Some(participants) = peer.partial_participants() else {
            return Ok(());
        };
        participants.process(ctx, record).map_err(|source| SyncError::Render {
            peer: peer.name().to_string(),
            component: record.component,
            source,
        })
    }

    fn render_full(
        &self,
        ctx: &mut RenderContext<'_>,
        id: ComponentId,
        record: Option<&UpdateRecord>,
    ) -> Result<(), SyncError> {
        if id == self.tree.root() {
            // the root element itself stays; refresh its attributes and children
            let element = ctx.render_element(id)?;
            let mut cleared = Vec::new();
            for property in record.map(|r| r.updated_properties.as_slice()).unwrap_or_default() {
                if !element.attributes.contains_key(property) && !self.tree.is_property_set(id, property)? {
                    cleared.push(property.clone());
                }
            }
            for (property, value) in element.attributes {
                ctx.push(RenderOperation::UpdateProperty { component: id, property, value });
            }
            for property in cleared {
                ctx.push(RenderOperation::RemoveProperty { component: id, property });
            }
            ctx.push(RenderOperation::RemoveChildren { component: id });
            for (index, child) in self.tree.visible_children(id)?.into_iter().enumerate() {
                let content = ctx.render_subtree(child)?;
                ctx.push(RenderOperation::AddSubtree { parent: id, index, content });
            }
            return Ok(());
        }

        let Some(parent) = self.tree.parent(id)? else {
            return Ok(());
        };
        let Some(index) = self.tree.visible_index(parent, id)? else {
            return Ok(());
        };
        let content = ctx.render_subtree(id)?;
        ctx.push(RenderOperation::RemoveSubtree { component: id });
        ctx.push(RenderOperation::AddSubtree { parent, index, content });
        Ok(())
    }

    /// Components of subtrees that left the tree during the cycle, deepest
    /// first within each subtree, with their type names. Hidden or
    /// re-attached children are still part of the tree and are kept.
    fn removed_subtrees(&self, updates: &UpdateManager) -> Result<Vec<(ComponentId, String)>, SyncError> {
        let removed: HashSet<ComponentId> = updates.removed_children().collect();
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for child in updates.removed_children() {
            if !seen.insert(child) || !self.tree.contains(child) || self.tree.is_attached(child) {
                continue;
            }
            debug!("disposing detached subtree of {child}");
            for id in self.tree.depth_first(child).into_iter().rev() {
                out.push((id, self.tree.kind(id)?.to_string()));
            }
        }
        // destroyed without ever being removed were never rendered
        for subtree in updates.destroyed() {
            if removed.contains(&subtree.root) {
                debug!("disposing destroyed subtree of {}", subtree.root);
                out.extend(subtree.components.iter().rev().cloned());
            }
        }
        Ok(out)
    }
}
