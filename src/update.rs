//! Per-cycle update accumulation.
//!
//! While a cycle mutates a tree, every change is recorded against the
//! component it affects: property writes against the component itself,
//! child adds/removes/reorders and layout-data changes against the parent.
//! The [`UpdateManager`] keeps one [`UpdateRecord`] per touched component,
//! remembers the order in which components were first touched, and is
//! drained exactly once by the planner when the cycle commits.

use std::collections::HashMap;

use crate::component::ComponentId;

/// Everything that happened to one component during the current cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateRecord {
    pub component: ComponentId,
    /// Children attached in this cycle, in attach order
    pub added: Vec<ComponentId>,
    /// Children detached in this cycle, in detach order
    pub removed: Vec<ComponentId>,
    /// Changed property names, first change first, no duplicates
    pub updated_properties: Vec<String>,
    pub children_reordered: bool,
    /// Layout data of at least one child changed
    pub layout_data_changed: bool,
}

impl UpdateRecord {
    pub fn new(component: ComponentId) -> Self {
        Self { component, ..Self::default() }
    }

    pub fn has_added_children(&self) -> bool {
        !self.added.is_empty()
    }

    pub fn has_removed_children(&self) -> bool {
        !self.removed.is_empty()
    }

    pub fn has_updated_properties(&self) -> bool {
        !self.updated_properties.is_empty()
    }

    pub fn has_updated_property(&self, name: &str) -> bool {
        self.updated_properties.iter().any(|p| p == name)
    }

    /// Anything that changes the set, order or layout of the children.
    pub fn is_structural(&self) -> bool {
        self.has_added_children() || self.has_removed_children() || self.children_reordered || self.layout_data_changed
    }

    pub fn is_empty(&self) -> bool {
        !self.is_structural() && !self.has_updated_properties()
    }
}

/// A subtree dropped from the arena during the cycle. Its components are no
/// longer in the tree, so their types are kept for disposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestroyedSubtree {
    pub root: ComponentId,
    /// `(component, type name)` in depth-first order
    pub components: Vec<(ComponentId, String)>,
}

/// Accumulates [`UpdateRecord`]s for the cycle in flight.
#[derive(Debug, Clone, Default)]
pub struct UpdateManager {
    records: HashMap<ComponentId, UpdateRecord>,
    order: Vec<ComponentId>,
    destroyed: Vec<DestroyedSubtree>,
}

impl UpdateManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn record_mut(&mut self, component: ComponentId) -> &mut UpdateRecord {
        if !self.records.contains_key(&component) {
            self.order.push(component);
        }
        self.records.entry(component).or_insert_with(|| UpdateRecord::new(component))
    }

    /// Marks `property` changed. Repeated changes coalesce into one marker.
    pub fn record_property_change(&mut self, component: ComponentId, property: &str) {
        let record = self.record_mut(component);
        if !record.has_updated_property(property) {
            record.updated_properties.push(property.to_string());
        }
    }

    pub fn record_add(&mut self, parent: ComponentId, child: ComponentId) {
        let record = self.record_mut(parent);
        if !record.added.contains(&child) {
            record.added.push(child);
        }
    }

    /// Records a detach. A child attached earlier in the same cycle never
    /// reached the client, so its add is cancelled instead.
    pub fn record_remove(&mut self, parent: ComponentId, child: ComponentId) {
        let record = self.record_mut(parent);
        if let Some(pos) = record.added.iter().position(|c| *c == child) {
            record.added.remove(pos);
            return;
        }
        if !record.removed.contains(&child) {
            record.removed.push(child);
        }
    }

    pub fn record_reorder(&mut self, parent: ComponentId) {
        self.record_mut(parent).children_reordered = true;
    }

    pub fn record_layout_data_change(&mut self, parent: ComponentId) {
        self.record_mut(parent).layout_data_changed = true;
    }

    pub fn record_destroy(&mut self, root: ComponentId, components: Vec<(ComponentId, String)>) {
        self.destroyed.push(DestroyedSubtree { root, components });
    }

    pub fn record(&self, component: ComponentId) -> Option<&UpdateRecord> {
        self.records.get(&component)
    }

    pub fn has_updated_properties(&self, component: ComponentId) -> bool {
        self.record(component).map(UpdateRecord::has_updated_properties).unwrap_or(false)
    }

    pub fn has_added_children(&self, component: ComponentId) -> bool {
        self.record(component).map(UpdateRecord::has_added_children).unwrap_or(false)
    }

    pub fn has_removed_children(&self, component: ComponentId) -> bool {
        self.record(component).map(UpdateRecord::has_removed_children).unwrap_or(false)
    }

    /// Non-empty records in the order their components were first touched.
    pub fn records(&self) -> impl Iterator<Item = &UpdateRecord> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.records.get(id))
            .filter(|record| !record.is_empty())
    }

    /// Every child removed from any component in this cycle.
    pub fn removed_children(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.records().flat_map(|record| record.removed.iter().copied())
    }

    /// Subtrees destroyed in this cycle, in destroy order.
    pub fn destroyed(&self) -> &[DestroyedSubtree] {
        &self.destroyed
    }

    pub fn is_empty(&self) -> bool {
        self.destroyed.is_empty() && self.records.values().all(UpdateRecord::is_empty)
    }

    pub fn len(&self) -> usize {
        self.records().count()
    }

    /// Drains the accumulator, leaving it ready for the next cycle.
    pub fn take(&mut self) -> UpdateManager {
        std::mem::take(self)
    }
}
