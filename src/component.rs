//! Components, their properties and the tree they live in.

pub mod id;
pub mod kind;
pub mod property;
pub mod style;
pub mod tree;
pub mod value;

pub use id::ComponentId;
pub use kind::{ChildPolicy, ComponentType, InputConstraint, InputRule, ParentPolicy, TypeFlags, TypeRegistry};
pub use property::PropertyStore;
pub use style::StyleSheet;
pub use tree::{ComponentNode, ComponentTree};
pub use value::{Color, Extent, ExtentUnit, PropertyValue, ValueError, ValueKind};
