use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use anyhow::anyhow;

use crate::render::{RenderContext, RenderOperation};
use crate::update::UpdateRecord;

/// Renders changes of a single property without re-rendering the component.
pub trait PartialUpdateParticipant: Send + Sync {
    /// Whether the current change can be rendered incrementally.
    fn can_render_property(&self, ctx: &RenderContext<'_>, update: &UpdateRecord) -> bool;

    fn render_property(&self, ctx: &mut RenderContext<'_>, update: &UpdateRecord) -> anyhow::Result<()>;
}

/// Participants of one peer, keyed by property name.
#[derive(Clone, Default)]
pub struct PartialUpdateManager {
    participants: HashMap<String, Arc<dyn PartialUpdateParticipant>>,
}

impl Debug for PartialUpdateManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.participants.keys().collect();
        names.sort();
        f.debug_struct("PartialUpdateManager").field("properties", &names).finish()
    }
}

impl PartialUpdateManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, property: impl Into<String>, participant: impl PartialUpdateParticipant + 'static) {
        self.participants.insert(property.into(), Arc::new(participant));
    }

    /// Builder form of [`add`](Self::add).
    pub fn with(mut self, property: impl Into<String>, participant: impl PartialUpdateParticipant + 'static) -> Self {
        self.add(property, participant);
        self
    }

    pub fn get(&self, property: &str) -> Option<&Arc<dyn PartialUpdateParticipant>> {
        self.participants.get(property)
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// True only if every changed property has a participant that can render
    /// it. A record without property changes cannot be processed partially.
    pub fn can_process(&self, ctx: &RenderContext<'_>, update: &UpdateRecord) -> bool {
        update.has_updated_properties()
            && update.updated_properties.iter().all(|property| {
                self.get(property)
                    .map_or(false, |participant| participant.can_render_property(ctx, update))
            })
    }

    /// Runs the participant of every changed property, in change order.
    /// Callers check [`can_process`](Self::can_process) first.
    pub fn process(&self, ctx: &mut RenderContext<'_>, update: &UpdateRecord) -> anyhow::Result<()> {
        for property in &update.updated_properties {
            let participant = self
                .get(property)
                .ok_or_else(|| anyhow!("no participant for property `{property}`"))?;
            participant.render_property(ctx, update)?;
        }
        Ok(())
    }
}

/// Mirrors one property into one client attribute.
///
/// Cannot render a property that no longer resolves to a value, which makes
/// clearing a property fall back to a full render.
#[derive(Debug, Clone)]
pub struct PropertyParticipant {
    property: String,
    attribute: String,
}

impl PropertyParticipant {
    pub fn new(property: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self { property: property.into(), attribute: attribute.into() }
    }

    /// Participant whose attribute has the same name as the property.
    pub fn same(property: impl Into<String>) -> Self {
        let property = property.into();
        Self { attribute: property.clone(), property }
    }
}

impl PartialUpdateParticipant for PropertyParticipant {
    fn can_render_property(&self, ctx: &RenderContext<'_>, update: &UpdateRecord) -> bool {
        matches!(ctx.property(update.component, &self.property), Ok(Some(_)))
    }

    fn render_property(&self, ctx: &mut RenderContext<'_>, update: &UpdateRecord) -> anyhow::Result<()> {
        let value = ctx
            .property_string(update.component, &self.property)?
            .ok_or_else(|| anyhow!("property `{}` is not set", self.property))?;
        ctx.push(RenderOperation::UpdateProperty {
            component: update.component,
            property: self.attribute.clone(),
            value,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{ComponentTree, ComponentType, TypeRegistry};
    use crate::peer::PeerRegistry;
    use crate::update::UpdateRecord;

    fn tree() -> ComponentTree {
        let mut types = TypeRegistry::new();
        types.register(ComponentType::new("Component")).unwrap();
        ComponentTree::new(Arc::new(types), "Component", 4).unwrap()
    }

    fn record(component: crate::component::ComponentId, props: &[&str]) -> UpdateRecord {
        let mut record = UpdateRecord::new(component);
        record.updated_properties = props.iter().map(|p| p.to_string()).collect();
        record
    }

    #[test]
    fn every_property_needs_a_capable_participant() {
        let mut tree = tree();
        let c = tree.root();
        tree.set_property(c, "text", "B").unwrap();
        tree.set_property(c, "toolTipText", "tip").unwrap();
        let peers = PeerRegistry::builder().build();
        let ctx = RenderContext::new(&tree, &peers);

        let manager = PartialUpdateManager::new().with("text", PropertyParticipant::same("text"));
        assert!(manager.can_process(&ctx, &record(c, &["text"])));
        assert!(!manager.can_process(&ctx, &record(c, &["text", "toolTipText"])));
        assert!(!manager.can_process(&ctx, &record(c, &[])));
    }

    #[test]
    fn cleared_property_cannot_render_partially() {
        let tree = tree();
        let c = tree.root();
        let peers = PeerRegistry::builder().build();
        let ctx = RenderContext::new(&tree, &peers);

        let manager = PartialUpdateManager::new().with("text", PropertyParticipant::same("text"));
        assert!(!manager.can_process(&ctx, &record(c, &["text"])));
    }

    #[test]
    fn process_emits_update_property() {
        let mut tree = tree();
        let c = tree.root();
        tree.set_property(c, "title", "Hello").unwrap();
        let peers = PeerRegistry::builder().build();
        let mut ctx = RenderContext::new(&tree, &peers);

        let manager = PartialUpdateManager::new().with("title", PropertyParticipant::new("title", "data-title"));
        manager.process(&mut ctx, &record(c, &["title"])).unwrap();
        assert_eq!(
            ctx.into_list().items,
            vec![RenderOperation::UpdateProperty {
                component: c,
                property: "data-title".into(),
                value: "Hello".into()
            }]
        );
    }
}
