//! The component tree of one session.
//!
//! Components live in an arena keyed by [`ComponentId`]. Parents own the
//! ordered list of their children; each child keeps a back-pointer to its
//! parent. Every mutation goes through [`ComponentTree`] so it can be
//! validated up front and recorded in the tree's [`UpdateManager`].

use std::collections::HashMap;
use std::sync::Arc;

use crate::component::kind::{ChildPolicy, ParentPolicy, TypeFlags, TypeRegistry};
use crate::component::property::PropertyStore;
use crate::component::style::StyleSheet;
use crate::component::value::PropertyValue;
use crate::component::ComponentId;
use crate::errors::{StructuralError, SyncError};
use crate::events::{ListenerId, ListenerList, PropertyChange, PropertyListener};
use crate::update::UpdateManager;

/// A single component.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentNode {
    id: ComponentId,
    /// Registered type name, selects the peer
    kind: String,
    parent: Option<ComponentId>,
    children: Vec<ComponentId>,
    properties: PropertyStore,
    /// Properties the parent reads to lay this component out
    layout_data: PropertyStore,
    visible: bool,
}

impl ComponentNode {
    fn new(id: ComponentId, kind: &str) -> Self {
        Self {
            id,
            kind: kind.to_string(),
            parent: None,
            children: Vec::new(),
            properties: PropertyStore::new(),
            layout_data: PropertyStore::new(),
            visible: true,
        }
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn parent(&self) -> Option<ComponentId> {
        self.parent
    }

    pub fn children(&self) -> &[ComponentId] {
        &self.children
    }

    pub fn properties(&self) -> &PropertyStore {
        &self.properties
    }

    pub fn layout_data(&self) -> &PropertyStore {
        &self.layout_data
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

/// One session's components, styles, pending updates and listeners.
///
/// Cloning a tree produces an independent snapshot (listeners are shared),
/// which is how a failed cycle is rolled back.
#[derive(Debug, Clone)]
pub struct ComponentTree {
    types: Arc<TypeRegistry>,
    nodes: HashMap<ComponentId, ComponentNode>,
    root: ComponentId,
    styles: StyleSheet,
    updates: UpdateManager,
    listeners: ListenerList,
}

impl ComponentTree {
    /// Creates a tree with a root component of type `root_kind`.
    pub fn new(types: Arc<TypeRegistry>, root_kind: &str, max_style_depth: usize) -> Result<Self, SyncError> {
        if !types.contains(root_kind) {
            return Err(SyncError::UnknownType(root_kind.to_string()));
        }
        let root = ComponentId::new();
        let mut nodes = HashMap::new();
        nodes.insert(root, ComponentNode::new(root, root_kind));

        Ok(Self {
            types,
            nodes,
            root,
            styles: StyleSheet::new(max_style_depth),
            updates: UpdateManager::new(),
            listeners: ListenerList::new(),
        })
    }

    pub fn root(&self) -> ComponentId {
        self.root
    }

    pub fn types(&self) -> &Arc<TypeRegistry> {
        &self.types
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: ComponentId) -> Option<&ComponentNode> {
        self.nodes.get(&id)
    }

    fn get(&self, id: ComponentId) -> Result<&ComponentNode, SyncError> {
        self.nodes.get(&id).ok_or(SyncError::ComponentNotFound(id))
    }

    fn get_mut(&mut self, id: ComponentId) -> Result<&mut ComponentNode, SyncError> {
        self.nodes.get_mut(&id).ok_or(SyncError::ComponentNotFound(id))
    }

    pub fn kind(&self, id: ComponentId) -> Result<&str, SyncError> {
        Ok(self.get(id)?.kind())
    }

    pub fn parent(&self, id: ComponentId) -> Result<Option<ComponentId>, SyncError> {
        Ok(self.get(id)?.parent)
    }

    pub fn children(&self, id: ComponentId) -> Result<&[ComponentId], SyncError> {
        Ok(self.get(id)?.children())
    }

    /// Creates a detached component of the given type.
    pub fn create(&mut self, kind: &str) -> Result<ComponentId, SyncError> {
        if !self.types.contains(kind) {
            return Err(SyncError::UnknownType(kind.to_string()));
        }
        let id = ComponentId::new();
        self.nodes.insert(id, ComponentNode::new(id, kind));
        Ok(id)
    }

    /// Attaches `child` to `parent` at `index` (appends when `None`).
    ///
    /// A child that already has a parent is detached from it first. All
    /// checks run before anything is changed.
    pub fn add_child(&mut self, parent: ComponentId, child: ComponentId, index: Option<usize>) -> Result<(), SyncError> {
        let parent_node = self.get(parent)?;
        let child_node = self.get(child)?;

        if parent == child {
            return Err(StructuralError::SelfAttach(child).into());
        }
        if child == self.root || self.types.flags(&child_node.kind)?.contains(TypeFlags::ROOT) {
            return Err(StructuralError::RootCannotBeChild(child).into());
        }
        if self.is_ancestor(child, parent) {
            return Err(StructuralError::WouldCycle { parent, child }.into());
        }

        let already_child = child_node.parent == Some(parent);
        let existing = parent_node.children.len() - usize::from(already_child);

        match self.types.child_policy(&parent_node.kind)? {
            ChildPolicy::None => {
                return Err(StructuralError::ChildrenNotAllowed {
                    parent,
                    parent_kind: parent_node.kind.clone(),
                }
                .into());
            }
            ChildPolicy::AtMost(limit) if existing >= limit => {
                return Err(StructuralError::TooManyChildren {
                    parent,
                    parent_kind: parent_node.kind.clone(),
                    limit,
                }
                .into());
            }
            _ => {}
        }

        if self.types.parent_policy(&child_node.kind)? == ParentPolicy::PaneContainer
            && !self.types.flags(&parent_node.kind)?.contains(TypeFlags::PANE_CONTAINER)
        {
            return Err(StructuralError::ParentRejected {
                child,
                child_kind: child_node.kind.clone(),
                parent_kind: parent_node.kind.clone(),
            }
            .into());
        }

        if let Some(index) = index {
            if index > existing {
                return Err(StructuralError::IndexOutOfBounds { index, len: existing }.into());
            }
        }

        // validated, mutate
        let old_parent = child_node.parent;
        if let Some(old_parent) = old_parent {
            self.detach(old_parent, child)?;
        }
        let parent_node = self.get_mut(parent)?;
        match index {
            Some(index) => parent_node.children.insert(index, child),
            None => parent_node.children.push(child),
        }
        self.get_mut(child)?.parent = Some(parent);
        self.updates.record_add(parent, child);
        Ok(())
    }

    /// Detaches `child` from `parent`. The child and its subtree stay in the
    /// arena and may be attached again.
    pub fn remove_child(&mut self, parent: ComponentId, child: ComponentId) -> Result<(), SyncError> {
        self.get(parent)?;
        if self.get(child)?.parent != Some(parent) {
            return Err(StructuralError::NotAChild { parent, child }.into());
        }
        self.detach(parent, child)
    }

    fn detach(&mut self, parent: ComponentId, child: ComponentId) -> Result<(), SyncError> {
        self.get_mut(parent)?.children.retain(|c| *c != child);
        self.get_mut(child)?.parent = None;
        self.updates.record_remove(parent, child);
        Ok(())
    }

    /// Moves an existing child to `index` among its siblings.
    pub fn move_child(&mut self, parent: ComponentId, child: ComponentId, index: usize) -> Result<(), SyncError> {
        let parent_node = self.get(parent)?;
        let current = parent_node
            .children
            .iter()
            .position(|c| *c == child)
            .ok_or(StructuralError::NotAChild { parent, child })?;
        let len = parent_node.children.len();
        if index >= len {
            return Err(StructuralError::IndexOutOfBounds { index, len }.into());
        }
        if current == index {
            return Ok(());
        }

        let parent_node = self.get_mut(parent)?;
        let moved = parent_node.children.remove(current);
        parent_node.children.insert(index, moved);
        self.updates.record_reorder(parent);
        Ok(())
    }

    /// Drops a detached component and its whole subtree from the arena.
    ///
    /// If the subtree was removed from the tree earlier in the same cycle,
    /// its peers are still disposed when the cycle renders.
    pub fn destroy(&mut self, id: ComponentId) -> Result<(), SyncError> {
        if id == self.root || self.get(id)?.parent.is_some() {
            return Err(StructuralError::StillAttached(id).into());
        }
        let mut components = Vec::new();
        for node in self.depth_first(id) {
            if let Some(removed) = self.nodes.remove(&node) {
                components.push((node, removed.kind));
            }
            self.listeners.remove_component(node);
        }
        self.updates.record_destroy(id, components);
        Ok(())
    }

    /// Shows or hides a component. The parent sees this as the child being
    /// added or removed.
    pub fn set_visible(&mut self, id: ComponentId, visible: bool) -> Result<(), SyncError> {
        let node = self.get_mut(id)?;
        if node.visible == visible {
            return Ok(());
        }
        node.visible = visible;
        let parent = node.parent;
        if let Some(parent) = parent {
            if visible {
                self.updates.record_add(parent, id);
            } else {
                self.updates.record_remove(parent, id);
            }
        }
        Ok(())
    }

    pub fn is_visible(&self, id: ComponentId) -> Result<bool, SyncError> {
        Ok(self.get(id)?.visible)
    }

    /// Visible children in order.
    pub fn visible_children(&self, parent: ComponentId) -> Result<Vec<ComponentId>, SyncError> {
        Ok(self
            .get(parent)?
            .children
            .iter()
            .copied()
            .filter(|c| self.nodes.get(c).map_or(false, |n| n.visible))
            .collect())
    }

    /// Position of `child` among the visible children of `parent`.
    pub fn visible_index(&self, parent: ComponentId, child: ComponentId) -> Result<Option<usize>, SyncError> {
        Ok(self.visible_children(parent)?.iter().position(|c| *c == child))
    }

    /// Pre-order walk starting at `from`, children in insertion order.
    pub fn depth_first(&self, from: ComponentId) -> Vec<ComponentId> {
        let mut out = Vec::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            out.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    fn is_ancestor(&self, ancestor: ComponentId, id: ComponentId) -> bool {
        let mut current = Some(id);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.nodes.get(&c).and_then(|n| n.parent);
        }
        false
    }

    /// Connected to the root.
    pub fn is_attached(&self, id: ComponentId) -> bool {
        self.contains(id) && self.is_ancestor(self.root, id)
    }

    /// Attached, and neither the component nor any ancestor is hidden.
    pub fn is_rendered(&self, id: ComponentId) -> bool {
        let mut current = Some(id);
        while let Some(c) = current {
            let Some(node) = self.nodes.get(&c) else {
                return false;
            };
            if !node.visible {
                return false;
            }
            if c == self.root {
                return true;
            }
            current = node.parent;
        }
        false
    }

    // ---------- Properties ----------

    /// Sets a local property. Records the change and notifies listeners only
    /// when the value actually differs; returns whether it did.
    pub fn set_property(&mut self, id: ComponentId, name: &str, value: impl Into<PropertyValue>) -> Result<bool, SyncError> {
        let value = value.into();
        let node = self.get_mut(id)?;
        if node.properties.local(name) == Some(&value) {
            return Ok(false);
        }
        let old_value = node.properties.set(name, value.clone());
        self.changed(id, name, old_value, Some(value));
        Ok(true)
    }

    /// Removes a local property so it resolves through the style again.
    pub fn clear_property(&mut self, id: ComponentId, name: &str) -> Result<bool, SyncError> {
        let old_value = self.get_mut(id)?.properties.remove(name);
        if old_value.is_none() {
            return Ok(false);
        }
        self.changed(id, name, old_value, None);
        Ok(true)
    }

    pub fn set_indexed_property(
        &mut self,
        id: ComponentId,
        name: &str,
        index: usize,
        value: impl Into<PropertyValue>,
    ) -> Result<bool, SyncError> {
        let value = value.into();
        let node = self.get_mut(id)?;
        if node.properties.local_indexed(name, index) == Some(&value) {
            return Ok(false);
        }
        let old_value = node.properties.set_indexed(name, index, value.clone());
        self.changed(id, name, old_value, Some(value));
        Ok(true)
    }

    fn changed(&mut self, id: ComponentId, name: &str, old_value: Option<PropertyValue>, new_value: Option<PropertyValue>) {
        self.updates.record_property_change(id, name);
        self.listeners.notify(&PropertyChange {
            component: id,
            property: name.to_string(),
            old_value,
            new_value,
        });
    }

    /// Resolved value: local first, then the component's style chain.
    pub fn property(&self, id: ComponentId, name: &str) -> Result<Option<&PropertyValue>, SyncError> {
        self.get(id)?.properties.get(name, &self.styles)
    }

    pub fn indexed_property(&self, id: ComponentId, name: &str, index: usize) -> Result<Option<&PropertyValue>, SyncError> {
        self.get(id)?.properties.get_indexed(name, index, &self.styles)
    }

    pub fn is_property_set(&self, id: ComponentId, name: &str) -> Result<bool, SyncError> {
        self.get(id)?.properties.is_set(name, &self.styles)
    }

    /// Links the component to a named style (or unlinks it). Recorded as a
    /// change of the `style` property.
    pub fn set_style(&mut self, id: ComponentId, style: Option<&str>) -> Result<bool, SyncError> {
        if let Some(name) = style {
            if !self.styles.contains(name) {
                return Err(SyncError::UnknownStyle(name.to_string()));
            }
        }
        let node = self.get_mut(id)?;
        if node.properties.fallback() == style {
            return Ok(false);
        }
        node.properties.set_fallback(style.map(str::to_string));
        self.updates.record_property_change(id, "style");
        Ok(true)
    }

    pub fn styles(&self) -> &StyleSheet {
        &self.styles
    }

    /// Style definitions are shared; editing them does not mark components
    /// that use them.
    pub fn styles_mut(&mut self) -> &mut StyleSheet {
        &mut self.styles
    }

    /// Sets layout data on a component; its parent is marked as having a
    /// child layout change.
    pub fn set_layout_data(&mut self, id: ComponentId, name: &str, value: impl Into<PropertyValue>) -> Result<bool, SyncError> {
        let value = value.into();
        let node = self.get_mut(id)?;
        if node.layout_data.local(name) == Some(&value) {
            return Ok(false);
        }
        node.layout_data.set(name, value);
        let parent = node.parent;
        if let Some(parent) = parent {
            self.updates.record_layout_data_change(parent);
        }
        Ok(true)
    }

    pub fn layout_data(&self, id: ComponentId, name: &str) -> Result<Option<&PropertyValue>, SyncError> {
        Ok(self.get(id)?.layout_data.local(name))
    }

    // ---------- Updates & listeners ----------

    pub fn updates(&self) -> &UpdateManager {
        &self.updates
    }

    /// Drains the pending updates of the current cycle.
    pub fn take_updates(&mut self) -> UpdateManager {
        self.updates.take()
    }

    pub fn add_property_listener(&mut self, component: Option<ComponentId>, listener: PropertyListener) -> ListenerId {
        self.listeners.add(component, listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::kind::ComponentType;
    use std::sync::Mutex;

    fn types() -> Arc<TypeRegistry> {
        let mut types = TypeRegistry::new();
        types.register(ComponentType::new("Component")).unwrap();
        types
            .register(
                ComponentType::new("Window")
                    .extends("Component")
                    .flags(TypeFlags::ROOT | TypeFlags::PANE_CONTAINER),
            )
            .unwrap();
        types.register(ComponentType::new("Column").extends("Component")).unwrap();
        types
            .register(ComponentType::new("Label").extends("Component").children(ChildPolicy::None))
            .unwrap();
        types
            .register(
                ComponentType::new("SplitPane")
                    .extends("Component")
                    .flags(TypeFlags::PANE | TypeFlags::PANE_CONTAINER)
                    .children(ChildPolicy::AtMost(2))
                    .parent(ParentPolicy::PaneContainer),
            )
            .unwrap();
        Arc::new(types)
    }

    fn tree() -> ComponentTree {
        ComponentTree::new(types(), "Window", 8).unwrap()
    }

    #[test]
    fn children_keep_insertion_order() {
        let mut tree = tree();
        let root = tree.root();
        let col = tree.create("Column").unwrap();
        tree.add_child(root, col, None).unwrap();

        let a = tree.create("Label").unwrap();
        let b = tree.create("Label").unwrap();
        let c = tree.create("Label").unwrap();
        tree.add_child(col, a, None).unwrap();
        tree.add_child(col, c, None).unwrap();
        tree.add_child(col, b, Some(1)).unwrap();

        assert_eq!(tree.children(col).unwrap(), &[a, b, c]);
        assert_eq!(tree.depth_first(root), vec![root, col, a, b, c]);
        assert_eq!(tree.updates().record(col).unwrap().added, vec![a, c, b]);

        tree.set_visible(b, false).unwrap();
        assert_eq!(tree.visible_children(col).unwrap(), vec![a, c]);
        assert_eq!(tree.visible_index(col, c).unwrap(), Some(1));
        assert!(!tree.is_rendered(b));
        assert!(tree.is_rendered(c));
    }

    #[test]
    fn rejected_attach_leaves_tree_unchanged() {
        let mut tree = tree();
        let root = tree.root();
        let split = tree.create("SplitPane").unwrap();
        tree.add_child(root, split, None).unwrap();
        let first = tree.create("Label").unwrap();
        let second = tree.create("Label").unwrap();
        let third = tree.create("Label").unwrap();
        tree.add_child(split, first, None).unwrap();
        tree.add_child(split, second, None).unwrap();

        let nodes_before = tree.nodes.clone();
        let updates_before = tree.updates().clone();

        let err = tree.add_child(split, third, None).unwrap_err();
        assert!(matches!(
            err,
            SyncError::Structural(StructuralError::TooManyChildren { limit: 2, .. })
        ));
        assert_eq!(tree.nodes, nodes_before);
        assert_eq!(
            tree.updates().records().collect::<Vec<_>>(),
            updates_before.records().collect::<Vec<_>>()
        );
        assert_eq!(tree.parent(third).unwrap(), None);
    }

    #[test]
    fn structural_checks() {
        let mut tree = tree();
        let root = tree.root();
        let col = tree.create("Column").unwrap();
        let inner = tree.create("Column").unwrap();
        let label = tree.create("Label").unwrap();
        let other = tree.create("Label").unwrap();
        let split = tree.create("SplitPane").unwrap();
        let window = tree.create("Window").unwrap();
        tree.add_child(root, col, None).unwrap();
        tree.add_child(col, inner, None).unwrap();
        tree.add_child(inner, label, None).unwrap();

        let structural = |r: Result<(), SyncError>| match r {
            Err(SyncError::Structural(e)) => e,
            other => panic!("expected structural error, got {other:?}"),
        };

        assert_eq!(structural(tree.add_child(col, col, None)), StructuralError::SelfAttach(col));
        assert_eq!(
            structural(tree.add_child(inner, col, None)),
            StructuralError::WouldCycle { parent: inner, child: col }
        );
        assert_eq!(structural(tree.add_child(col, root, None)), StructuralError::RootCannotBeChild(root));
        assert_eq!(structural(tree.add_child(col, window, None)), StructuralError::RootCannotBeChild(window));
        assert!(matches!(
            structural(tree.add_child(label, other, None)),
            StructuralError::ChildrenNotAllowed { .. }
        ));
        assert!(matches!(
            structural(tree.add_child(col, split, None)),
            StructuralError::ParentRejected { .. }
        ));
        assert_eq!(
            structural(tree.add_child(col, other, Some(5))),
            StructuralError::IndexOutOfBounds { index: 5, len: 1 }
        );
        assert_eq!(
            structural(tree.remove_child(col, label)),
            StructuralError::NotAChild { parent: col, child: label }
        );
        assert!(matches!(
            tree.add_child(col, ComponentId::new(), None),
            Err(SyncError::ComponentNotFound(_))
        ));
        assert!(matches!(tree.create("Slider"), Err(SyncError::UnknownType(_))));
    }

    #[test]
    fn reparenting_detaches_first() {
        let mut tree = tree();
        let root = tree.root();
        let a = tree.create("Column").unwrap();
        let b = tree.create("Column").unwrap();
        let label = tree.create("Label").unwrap();
        tree.add_child(root, a, None).unwrap();
        tree.add_child(a, b, None).unwrap();
        tree.add_child(a, label, None).unwrap();
        tree.take_updates();

        tree.add_child(b, label, None).unwrap();
        assert_eq!(tree.children(a).unwrap(), &[b]);
        assert_eq!(tree.children(b).unwrap(), &[label]);
        assert_eq!(tree.parent(label).unwrap(), Some(b));
        assert_eq!(tree.updates().record(a).unwrap().removed, vec![label]);
        assert_eq!(tree.updates().record(b).unwrap().added, vec![label]);
    }

    #[test]
    fn move_records_reorder() {
        let mut tree = tree();
        let root = tree.root();
        let col = tree.create("Column").unwrap();
        let a = tree.create("Label").unwrap();
        let b = tree.create("Label").unwrap();
        tree.add_child(root, col, None).unwrap();
        tree.add_child(col, a, None).unwrap();
        tree.add_child(col, b, None).unwrap();
        tree.take_updates();

        tree.move_child(col, b, 0).unwrap();
        assert_eq!(tree.children(col).unwrap(), &[b, a]);
        assert!(tree.updates().record(col).unwrap().children_reordered);
        assert!(matches!(
            tree.move_child(col, b, 2),
            Err(SyncError::Structural(StructuralError::IndexOutOfBounds { index: 2, len: 2 }))
        ));
    }

    #[test]
    fn property_setter_notifies_only_on_change() {
        let mut tree = tree();
        let label = tree.create("Label").unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        tree.add_property_listener(
            Some(label),
            Arc::new(move |change| s.lock().unwrap().push(change.new_value.clone())),
        );

        assert!(tree.set_property(label, "text", "A").unwrap());
        assert!(!tree.set_property(label, "text", "A").unwrap());
        assert!(tree.set_property(label, "text", "B").unwrap());
        assert!(tree.clear_property(label, "text").unwrap());
        assert!(!tree.clear_property(label, "text").unwrap());

        assert_eq!(
            *seen.lock().unwrap(),
            vec![Some(PropertyValue::from("A")), Some(PropertyValue::from("B")), None]
        );
        assert_eq!(tree.updates().record(label).unwrap().updated_properties, vec!["text".to_string()]);
    }

    #[test]
    fn properties_resolve_through_styles() {
        let mut tree = tree();
        let label = tree.create("Label").unwrap();
        let mut style = PropertyStore::new();
        style.set("foreground", "#ff0000".into());
        tree.styles_mut().define("alert", style).unwrap();

        assert!(!tree.is_property_set(label, "foreground").unwrap());
        assert!(tree.set_style(label, Some("alert")).unwrap());
        assert_eq!(tree.property(label, "foreground").unwrap(), Some(&PropertyValue::from("#ff0000")));
        assert!(tree.updates().record(label).unwrap().has_updated_property("style"));
        assert!(matches!(tree.set_style(label, Some("nope")), Err(SyncError::UnknownStyle(_))));
    }

    #[test]
    fn layout_data_marks_parent() {
        let mut tree = tree();
        let root = tree.root();
        let col = tree.create("Column").unwrap();
        let label = tree.create("Label").unwrap();
        tree.add_child(root, col, None).unwrap();
        tree.add_child(col, label, None).unwrap();
        tree.take_updates();

        assert!(tree.set_layout_data(label, "alignment", "center").unwrap());
        assert!(tree.updates().record(col).unwrap().layout_data_changed);
        assert!(tree.updates().record(label).is_none());
        assert_eq!(tree.layout_data(label, "alignment").unwrap(), Some(&PropertyValue::from("center")));
    }

    #[test]
    fn destroy_requires_detached() {
        let mut tree = tree();
        let root = tree.root();
        let col = tree.create("Column").unwrap();
        let label = tree.create("Label").unwrap();
        tree.add_child(root, col, None).unwrap();
        tree.add_child(col, label, None).unwrap();

        assert!(matches!(
            tree.destroy(col),
            Err(SyncError::Structural(StructuralError::StillAttached(_)))
        ));
        tree.remove_child(root, col).unwrap();
        assert!(!tree.is_attached(col));
        tree.destroy(col).unwrap();
        assert!(!tree.contains(col));
        assert!(!tree.contains(label));
        assert_eq!(tree.len(), 1);

        let destroyed = &tree.updates().destroyed()[0];
        assert_eq!(destroyed.root, col);
        assert_eq!(destroyed.components, vec![(col, "Column".to_string()), (label, "Label".to_string())]);
    }

    #[test]
    fn indexed_setter_records_changes() {
        let mut tree = tree();
        let label = tree.create("Label").unwrap();

        assert!(tree.set_indexed_property(label, "border", 1, "solid").unwrap());
        assert!(!tree.set_indexed_property(label, "border", 1, "solid").unwrap());
        assert!(tree.set_indexed_property(label, "border", 2, "dotted").unwrap());

        assert_eq!(tree.indexed_property(label, "border", 1).unwrap(), Some(&PropertyValue::from("solid")));
        assert_eq!(tree.indexed_property(label, "border", 3).unwrap(), None);
        assert_eq!(tree.updates().record(label).unwrap().updated_properties, vec!["border".to_string()]);
    }
}
