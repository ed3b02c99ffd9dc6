//! Render operations and rendered content.
//!
//! A cycle produces a [`RenderList`]: an ordered sequence of
//! [`RenderOperation`]s that a client applies to its element tree. The list
//! is transport-agnostic; an external serializer turns it into the wire
//! format (the serde derive gives JSON for free).
//!
//! # Example
//!
//! ```rust
//! use widget_sync::component::ComponentId;
//! use widget_sync::render::{RenderList, RenderOperation};
//!
//! let label = ComponentId::new();
//! let mut list = RenderList::new();
//!
//! list.add_command(RenderOperation::UpdateProperty {
//!     component: label,
//!     property: "text".into(),
//!     value: "Hello".into(),
//! });
//! assert_eq!(list.len(), 1);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::component::ComponentId;

/// A rendered element and its rendered children.
///
/// Peers produce one of these per component; the planner nests the content
/// of visible children into `children` in tree order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedContent {
    /// The component this element was rendered from
    pub component: ComponentId,
    /// Client element id, see [`ComponentId::element_id`]
    pub element_id: String,
    /// Element tag, e.g. `div` or `textarea`
    pub tag: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RenderedContent>,
}

impl RenderedContent {
    pub fn new(component: ComponentId, tag: impl Into<String>) -> Self {
        Self {
            component,
            element_id: component.element_id(),
            tag: tag.into(),
            attributes: BTreeMap::new(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn child(mut self, child: RenderedContent) -> Self {
        self.children.push(child);
        self
    }

    /// Number of elements in this subtree, including itself.
    pub fn element_count(&self) -> usize {
        1 + self.children.iter().map(RenderedContent::element_count).sum::<usize>()
    }
}

/// A single client-side update instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RenderOperation {
    /// Insert `content` as the `index`-th child element of `parent`.
    AddSubtree {
        parent: ComponentId,
        index: usize,
        content: RenderedContent,
    },
    /// Remove the element of `component` with everything below it.
    RemoveSubtree { component: ComponentId },
    /// Remove all child elements of `component`, keeping the element itself.
    RemoveChildren { component: ComponentId },
    /// Replace one rendered attribute of `component`.
    UpdateProperty {
        component: ComponentId,
        property: String,
        value: String,
    },
    /// Drop a rendered attribute of `component` whose property is no longer
    /// set.
    RemoveProperty { component: ComponentId, property: String },
}

impl RenderOperation {
    /// The component whose element the operation touches.
    pub fn target(&self) -> ComponentId {
        match self {
            RenderOperation::AddSubtree { parent, .. } => *parent,
            RenderOperation::RemoveSubtree { component }
            | RenderOperation::RemoveChildren { component }
            | RenderOperation::UpdateProperty { component, .. }
            | RenderOperation::RemoveProperty { component, .. } => *component,
        }
    }

    pub fn is_structural(&self) -> bool {
        !matches!(
            self,
            RenderOperation::UpdateProperty { .. } | RenderOperation::RemoveProperty { .. }
        )
    }
}

/// Ordered operations produced by one cycle.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderList {
    /// Operations in the order the client must apply them.
    pub items: Vec<RenderOperation>,
}

impl RenderList {
    pub fn new() -> Self {
        RenderList { items: Vec::new() }
    }

    /// Appends an operation.
    pub fn add_command(&mut self, command: RenderOperation) {
        self.items.push(command);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RenderOperation> {
        self.items.iter()
    }

    /// Serializes the operation list as a JSON array.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.items)
    }
}

impl IntoIterator for RenderList {
    type Item = RenderOperation;
    type IntoIter = std::vec::IntoIter<RenderOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
