//! Change notification and engine events.
//!
//! Two kinds of observers exist:
//!
//! - [`PropertyListener`]s are attached to a component tree and called
//!   synchronously, in registration order, whenever a property setter
//!   actually changes a value.
//! - [`EngineEvent`]s are published by the [`SyncEngine`](crate::engine::SyncEngine)
//!   over a broadcast channel and describe session lifecycle and cycle
//!   outcomes.

use std::fmt::{Debug, Display};
use std::sync::Arc;

use crate::component::{ComponentId, PropertyValue};
use crate::session::SessionId;

/// A property value that changed.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyChange {
    pub component: ComponentId,
    pub property: String,
    /// Value before the change, `None` when it was unset
    pub old_value: Option<PropertyValue>,
    /// Value after the change, `None` when it was cleared
    pub new_value: Option<PropertyValue>,
}

pub type PropertyListener = Arc<dyn Fn(&PropertyChange) + Send + Sync>;

/// Handle returned when registering a listener, used to remove it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Listeners attached to a tree. Cloning shares the listeners themselves.
#[derive(Clone, Default)]
pub struct ListenerList {
    next_id: u64,
    listeners: Vec<(ListenerId, Option<ComponentId>, PropertyListener)>,
}

impl Debug for ListenerList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerList").field("listeners", &self.listeners.len()).finish()
    }
}

impl ListenerList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener for one component, or for every component when
    /// `component` is `None`.
    pub fn add(&mut self, component: Option<ComponentId>, listener: PropertyListener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, component, listener));
        id
    }

    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _, _)| *lid != id);
        before != self.listeners.len()
    }

    /// Drops listeners bound to `component`.
    pub fn remove_component(&mut self, component: ComponentId) {
        self.listeners.retain(|(_, c, _)| *c != Some(component));
    }

    pub fn notify(&self, change: &PropertyChange) {
        for (_, component, listener) in &self.listeners {
            if component.map_or(true, |c| c == change.component) {
                listener(change);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

/// Events emitted by the engine.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    SessionCreated { session: SessionId },
    SessionRemoved { session: SessionId },
    /// A cycle committed and produced `operations` render operations
    CycleCompleted { session: SessionId, operations: usize },
    /// A cycle failed and the tree was restored
    CycleRolledBack { session: SessionId, error: String },
    /// A client input could not be coerced or violated a constraint
    InputRejected { session: SessionId, component: ComponentId, input: String, reason: String },
}

impl Display for EngineEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineEvent::SessionCreated { session } => write!(f, "session {session} created"),
            EngineEvent::SessionRemoved { session } => write!(f, "session {session} removed"),
            EngineEvent::CycleCompleted { session, operations } => {
                write!(f, "session {session}: cycle completed with {operations} operations")
            }
            EngineEvent::CycleRolledBack { session, error } => {
                write!(f, "session {session}: cycle rolled back: {error}")
            }
            EngineEvent::InputRejected { session, component, input, reason } => {
                write!(f, "session {session}: input `{input}` for {component} rejected: {reason}")
            }
        }
    }
}
