//! Component types and the type hierarchy.
//!
//! Every component carries a type name. The [`TypeRegistry`] maps that name to
//! a [`ComponentType`], which declares the supertype, what children and
//! parents are acceptable, and which client inputs the type understands.
//! Peer lookup, child/parent policies and input rules all walk the
//! supertype chain, so a subtype inherits everything it does not override.

use std::collections::HashMap;

use bitflags::bitflags;

use crate::component::value::ValueKind;
use crate::errors::SyncError;

bitflags! {
    /// Structural roles of a component type.
    #[derive(Default)]
    pub struct TypeFlags: u8 {
        /// Top of a tree; can never be attached as a child.
        const ROOT           = 0b0000_0001;
        /// Fills the whole area of its container.
        const PANE           = 0b0000_0010;
        /// May host components that require a pane container parent.
        const PANE_CONTAINER = 0b0000_0100;
    }
}

/// What children a type accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildPolicy {
    None,
    Any,
    AtMost(usize),
}

/// What parents a type accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentPolicy {
    Any,
    PaneContainer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputConstraint {
    NonNegative,
    PixelsOnly,
}

/// How a named client input is coerced and checked before it is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRule {
    /// Property the input is written to
    pub property: String,
    pub kind: ValueKind,
    pub constraints: Vec<InputConstraint>,
}

impl InputRule {
    pub fn new(property: impl Into<String>, kind: ValueKind) -> Self {
        Self { property: property.into(), kind, constraints: Vec::new() }
    }

    pub fn constrain(mut self, constraint: InputConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }
}

#[derive(Debug, Clone)]
pub struct ComponentType {
    name: String,
    extends: Option<String>,
    children: Option<ChildPolicy>,
    parent: Option<ParentPolicy>,
    flags: TypeFlags,
    inputs: HashMap<String, InputRule>,
}

impl ComponentType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extends: None,
            children: None,
            parent: None,
            flags: TypeFlags::empty(),
            inputs: HashMap::new(),
        }
    }

    pub fn extends(mut self, supertype: impl Into<String>) -> Self {
        self.extends = Some(supertype.into());
        self
    }

    pub fn children(mut self, policy: ChildPolicy) -> Self {
        self.children = Some(policy);
        self
    }

    pub fn parent(mut self, policy: ParentPolicy) -> Self {
        self.parent = Some(policy);
        self
    }

    pub fn flags(mut self, flags: TypeFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Declares a client input `name` handled by this type.
    pub fn input(mut self, name: impl Into<String>, rule: InputRule) -> Self {
        self.inputs.insert(name.into(), rule);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn supertype(&self) -> Option<&str> {
        self.extends.as_deref()
    }
}

/// All component types known to an engine.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<String, ComponentType>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a type. Its supertype must be registered first, which also
    /// keeps the hierarchy acyclic.
    pub fn register(&mut self, ty: ComponentType) -> Result<(), SyncError> {
        if self.types.contains_key(&ty.name) {
            return Err(SyncError::DuplicateType(ty.name));
        }
        if let Some(supertype) = &ty.extends {
            if !self.types.contains_key(supertype) {
                return Err(SyncError::UnknownType(supertype.clone()));
            }
        }
        self.types.insert(ty.name.clone(), ty);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ComponentType> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// The type itself followed by its supertypes, nearest first.
    pub fn lineage(&self, name: &str) -> Result<Vec<&ComponentType>, SyncError> {
        let mut chain = Vec::new();
        let mut next = Some(name);
        while let Some(n) = next {
            let ty = self.types.get(n).ok_or_else(|| SyncError::UnknownType(n.to_string()))?;
            chain.push(ty);
            next = ty.supertype();
        }
        Ok(chain)
    }

    /// Whether `name` is `ancestor` or one of its subtypes.
    pub fn is_a(&self, name: &str, ancestor: &str) -> bool {
        self.lineage(name)
            .map(|chain| chain.iter().any(|ty| ty.name == ancestor))
            .unwrap_or(false)
    }

    pub fn child_policy(&self, name: &str) -> Result<ChildPolicy, SyncError> {
        let chain = self.lineage(name)?;
        Ok(chain.iter().find_map(|ty| ty.children).unwrap_or(ChildPolicy::Any))
    }

    pub fn parent_policy(&self, name: &str) -> Result<ParentPolicy, SyncError> {
        let chain = self.lineage(name)?;
        Ok(chain.iter().find_map(|ty| ty.parent).unwrap_or(ParentPolicy::Any))
    }

    /// Flags accumulated over the whole lineage.
    pub fn flags(&self, name: &str) -> Result<TypeFlags, SyncError> {
        let chain = self.lineage(name)?;
        Ok(chain.iter().fold(TypeFlags::empty(), |acc, ty| acc | ty.flags))
    }

    /// The nearest declaration of input `input` for the type.
    pub fn input_rule(&self, name: &str, input: &str) -> Result<Option<&InputRule>, SyncError> {
        let chain = self.lineage(name)?;
        Ok(chain.into_iter().find_map(|ty| ty.inputs.get(input)))
    }
}
