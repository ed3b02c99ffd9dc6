//! Client input reconciliation.
//!
//! The client submits raw `(component, name, value)` triples. Each one is
//! matched against the input rules of the component's type, coerced to the
//! rule's [`ValueKind`](crate::component::ValueKind), checked against the
//! rule's constraints and then written through the tree's property setter,
//! which records the change and notifies listeners only if the value
//! differs.
//!
//! Unknown components and unrecognized input names are ignored: older
//! clients may still send inputs that a newer server no longer knows.

use log::{trace, warn};
use serde::{Deserialize, Serialize};

use crate::component::{ComponentId, ComponentTree, ExtentUnit, InputConstraint, InputRule, PropertyValue, ValueError};
use crate::errors::SyncError;

/// One raw value submitted by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInput {
    pub component: ComponentId,
    pub name: String,
    pub value: String,
}

impl ClientInput {
    pub fn new(component: ComponentId, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { component, name: name.into(), value: value.into() }
    }

    /// Parses a JSON array of inputs.
    pub fn batch_from_json(json: &str) -> serde_json::Result<Vec<ClientInput>> {
        serde_json::from_str(json)
    }
}

/// Why a recognized input was not applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error(transparent)]
    Value(#[from] ValueError),
    #[error("input `{input}` must not be negative")]
    Negative { input: String },
    #[error("input `{input}` must be given in pixels")]
    NotPixels { input: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    /// Written to the property; `changed` is false when the value was equal
    Applied { changed: bool },
    /// Unknown component or unrecognized name
    Ignored,
    Rejected(InputError),
}

/// Result of reconciling one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub applied: Vec<ClientInput>,
    pub ignored: Vec<ClientInput>,
    pub rejected: Vec<(ClientInput, InputError)>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

pub struct InputReconciler;

impl InputReconciler {
    /// Applies a batch in order. A rejected input does not stop the others.
    pub fn reconcile(tree: &mut ComponentTree, inputs: impl IntoIterator<Item = ClientInput>) -> Result<ReconcileReport, SyncError> {
        let mut report = ReconcileReport::default();
        for input in inputs {
            match Self::process(tree, &input)? {
                InputOutcome::Applied { .. } => report.applied.push(input),
                InputOutcome::Ignored => report.ignored.push(input),
                InputOutcome::Rejected(err) => report.rejected.push((input, err)),
            }
        }
        Ok(report)
    }

    /// Applies a single input.
    pub fn process(tree: &mut ComponentTree, input: &ClientInput) -> Result<InputOutcome, SyncError> {
        let Some(node) = tree.node(input.component) else {
            warn!("ignoring input `{}` for unknown component {}", input.name, input.component);
            return Ok(InputOutcome::Ignored);
        };

        let Some(rule) = tree.types().input_rule(node.kind(), &input.name)?.cloned() else {
            warn!("ignoring unrecognized input `{}` for `{}` {}", input.name, node.kind(), input.component);
            return Ok(InputOutcome::Ignored);
        };

        let value = match coerce(&rule, input) {
            Ok(value) => value,
            Err(err) => {
                warn!("rejecting input `{}` for {}: {}", input.name, input.component, err);
                return Ok(InputOutcome::Rejected(err));
            }
        };

        let changed = tree.set_property(input.component, &rule.property, value)?;
        trace!("applied input `{}` to {} (changed: {changed})", input.name, input.component);
        Ok(InputOutcome::Applied { changed })
    }
}

fn coerce(rule: &InputRule, input: &ClientInput) -> Result<PropertyValue, InputError> {
    let value = rule.kind.coerce(&input.value)?;
    for constraint in &rule.constraints {
        match constraint {
            InputConstraint::NonNegative => {
                let negative = match &value {
                    PropertyValue::Integer(i) => *i < 0,
                    PropertyValue::Extent(e) => e.value < 0,
                    _ => false,
                };
                if negative {
                    return Err(InputError::Negative { input: input.name.clone() });
                }
            }
            InputConstraint::PixelsOnly => {
                if let PropertyValue::Extent(e) = &value {
                    if e.unit != ExtentUnit::Px {
                        return Err(InputError::NotPixels { input: input.name.clone() });
                    }
                }
            }
        }
    }
    Ok(value)
}
