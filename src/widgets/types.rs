use crate::component::{
    ChildPolicy, ComponentType, InputConstraint, InputRule, ParentPolicy, TypeFlags, TypeRegistry, ValueKind,
};
use crate::widgets::*;

/// The standard type hierarchy. Every type extends [`COMPONENT`].
pub fn standard_types() -> TypeRegistry {
    let catalog = [
        ComponentType::new(COMPONENT),
        ComponentType::new(WINDOW)
            .extends(COMPONENT)
            .flags(TypeFlags::ROOT | TypeFlags::PANE_CONTAINER)
            .children(ChildPolicy::AtMost(1)),
        ComponentType::new(CONTENT_PANE)
            .extends(COMPONENT)
            .flags(TypeFlags::PANE | TypeFlags::PANE_CONTAINER),
        ComponentType::new(COLUMN).extends(COMPONENT),
        ComponentType::new(ROW).extends(COMPONENT),
        ComponentType::new(LABEL).extends(COMPONENT).children(ChildPolicy::None),
        ComponentType::new(SPLIT_PANE)
            .extends(COMPONENT)
            .flags(TypeFlags::PANE | TypeFlags::PANE_CONTAINER)
            .children(ChildPolicy::AtMost(2))
            .parent(ParentPolicy::PaneContainer)
            .input(
                props::SEPARATOR_POSITION,
                InputRule::new(props::SEPARATOR_POSITION, ValueKind::Extent)
                    .constrain(InputConstraint::NonNegative)
                    .constrain(InputConstraint::PixelsOnly),
            ),
        ComponentType::new(TEXT_AREA)
            .extends(COMPONENT)
            .children(ChildPolicy::None)
            .input(props::TEXT, InputRule::new(props::TEXT, ValueKind::Text)),
        // rendered by the TextArea peer
        ComponentType::new(TEXT_AREA_EX).extends(TEXT_AREA),
        ComponentType::new(CALENDAR_SELECT)
            .extends(COMPONENT)
            .children(ChildPolicy::None)
            .input(props::DATE, InputRule::new(props::DATE, ValueKind::Date)),
        ComponentType::new(PROGRESS_BAR).extends(COMPONENT).children(ChildPolicy::None),
    ];

    let mut types = TypeRegistry::new();
    for ty in catalog {
        let name = ty.name().to_string();
        if let Err(err) = types.register(ty) {
            // the catalog is ordered supertype-first and has unique names
            log::error!("standard type `{name}` not registered: {err}");
        }
    }
    types
}
