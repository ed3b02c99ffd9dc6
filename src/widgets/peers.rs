use log::trace;

use crate::component::ComponentId;
use crate::peer::{PartialUpdateManager, PeerRegistry, PropertyParticipant, SynchronizePeer};
use crate::render::{RenderContext, RenderedContent};
use crate::widgets::*;

/// A peer that renders one element from a fixed set of properties.
///
/// Each listed attribute property is rendered as an attribute of the same
/// name, the text property (if any) as the element's text. Properties named
/// in `partial` get a participant, so changing only those properties is
/// rendered without replacing the element.
pub struct ElementPeer {
    name: &'static str,
    tag: &'static str,
    class: &'static str,
    text: Option<&'static str>,
    attributes: Vec<&'static str>,
    participants: PartialUpdateManager,
}

impl ElementPeer {
    pub fn new(name: &'static str, tag: &'static str, class: &'static str) -> Self {
        Self {
            name,
            tag,
            class,
            text: None,
            attributes: Vec::new(),
            participants: PartialUpdateManager::new(),
        }
    }

    /// Renders `property` as the element text.
    pub fn text(mut self, property: &'static str) -> Self {
        self.text = Some(property);
        self
    }

    /// Renders `property` as an attribute.
    pub fn attribute(mut self, property: &'static str) -> Self {
        self.attributes.push(property);
        self
    }

    /// Allows `property` (already rendered as text or attribute) to be
    /// updated in place.
    pub fn partial(mut self, property: &'static str) -> Self {
        self.participants.add(property, PropertyParticipant::same(property));
        self
    }
}

impl SynchronizePeer for ElementPeer {
    fn name(&self) -> &'static str {
        self.name
    }

    fn render_full(&self, ctx: &RenderContext<'_>, component: ComponentId) -> anyhow::Result<RenderedContent> {
        let mut content = RenderedContent::new(component, self.tag).attribute("class", self.class);
        for property in &self.attributes {
            if let Some(value) = ctx.property_string(component, property)? {
                content = content.attribute(*property, value);
            }
        }
        if let Some(property) = self.text {
            if let Some(value) = ctx.property_string(component, property)? {
                content = content.text(value);
            }
        }
        Ok(content)
    }

    fn partial_participants(&self) -> Option<&PartialUpdateManager> {
        if self.participants.is_empty() {
            None
        } else {
            Some(&self.participants)
        }
    }

    fn dispose(&self, _ctx: &mut RenderContext<'_>, component: ComponentId) -> anyhow::Result<()> {
        trace!("{} disposed {component}", self.name);
        Ok(())
    }
}

/// Peers for the standard catalog. [`TEXT_AREA_EX`] has none of its own and
/// resolves to the [`TEXT_AREA`] peer.
pub fn standard_peers() -> PeerRegistry {
    PeerRegistry::builder()
        .register(
            WINDOW,
            ElementPeer::new("window", "div", "window")
                .attribute(props::TITLE)
                .partial(props::TITLE),
        )
        .register(
            CONTENT_PANE,
            ElementPeer::new("content-pane", "div", "content-pane")
                .attribute(props::BACKGROUND)
                .attribute(props::FOREGROUND)
                .partial(props::BACKGROUND),
        )
        .register(
            COLUMN,
            ElementPeer::new("column", "div", "column")
                .attribute(props::CELL_SPACING)
                .attribute(props::BACKGROUND),
        )
        .register(
            ROW,
            ElementPeer::new("row", "div", "row")
                .attribute(props::CELL_SPACING)
                .attribute(props::ALIGNMENT)
                .attribute(props::BACKGROUND),
        )
        .register(
            LABEL,
            ElementPeer::new("label", "span", "label")
                .text(props::TEXT)
                .attribute(props::TOOL_TIP_TEXT)
                .attribute(props::FOREGROUND)
                .partial(props::TEXT)
                .partial(props::TOOL_TIP_TEXT),
        )
        .register(
            SPLIT_PANE,
            ElementPeer::new("split-pane", "div", "split-pane")
                .attribute(props::ORIENTATION)
                .attribute(props::RESIZABLE)
                .attribute(props::SEPARATOR_POSITION)
                .partial(props::SEPARATOR_POSITION),
        )
        .register(
            TEXT_AREA,
            ElementPeer::new("text-area", "textarea", "text-area")
                .text(props::TEXT)
                .attribute(props::ENABLED)
                .partial(props::TEXT),
        )
        .register(
            CALENDAR_SELECT,
            ElementPeer::new("calendar-select", "div", "calendar-select")
                .attribute(props::DATE)
                .partial(props::DATE),
        )
        .register(
            PROGRESS_BAR,
            ElementPeer::new("progress-bar", "div", "progress-bar")
                .attribute(props::VALUE)
                .attribute(props::MINIMUM)
                .attribute(props::MAXIMUM)
                .partial(props::VALUE),
        )
        .build()
}
