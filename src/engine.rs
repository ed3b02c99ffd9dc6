//! The engine facade.
//!
//! [`SyncEngine`] owns the type catalog, the peer registry and all sessions.
//! Every session cycle goes through it, and it publishes [`EngineEvent`]s
//! on a broadcast bus for anyone who wants to observe sessions and cycles.
//!
//! ```
//! use widget_sync::engine::SyncEngine;
//! use widget_sync::widgets::{self, props};
//!
//! # fn main() -> Result<(), widget_sync::SyncError> {
//! let engine = SyncEngine::with_standard_widgets(None)?;
//! let session = engine.create_session(widgets::WINDOW)?;
//! let initial = engine.render_initial(session)?;
//! assert!(!initial.is_empty());
//!
//! let output = engine.process_cycle(session, vec![], |tree| {
//!     let root = tree.root();
//!     tree.set_property(root, props::TITLE, "Hello")?;
//!     Ok(())
//! })?;
//! assert_eq!(output.operations.len(), 1);
//! # Ok(()) }
//! ```

use std::sync::Arc;

use log::info;
use tokio::sync::broadcast;

use crate::component::{ComponentTree, TypeRegistry};
use crate::config::{validate, EngineConfig};
use crate::errors::SyncError;
use crate::events::EngineEvent;
use crate::input::ClientInput;
use crate::peer::PeerRegistry;
use crate::render::RenderList;
use crate::session::{CycleOutput, Session, SessionId, SessionManager};
use crate::widgets;

pub struct SyncEngine {
    /// Configuration for the whole engine.
    config: Arc<EngineConfig>,
    /// Component types known to every session
    types: Arc<TypeRegistry>,
    /// Peers shared by every session
    peers: Arc<PeerRegistry>,
    sessions: SessionManager,
    /// Event sender
    event_tx: broadcast::Sender<EngineEvent>,
}

impl SyncEngine {
    /// Create a new engine.
    ///
    /// If `config` is `None`, [`EngineConfig::default`] is used.
    pub fn new(config: Option<EngineConfig>, types: TypeRegistry, peers: Arc<PeerRegistry>) -> Result<Self, SyncError> {
        let resolved_config = config.unwrap_or_default();
        validate(&resolved_config)?;

        // Broadcast event bus. Subscribe to receive session and cycle events
        let (event_tx, _first_rx) = broadcast::channel::<EngineEvent>(resolved_config.event_channel_capacity);

        Ok(Self {
            sessions: SessionManager::new(resolved_config.max_sessions),
            config: Arc::new(resolved_config),
            types: Arc::new(types),
            peers,
            event_tx,
        })
    }

    /// Engine with the standard component catalog and its peers.
    pub fn with_standard_widgets(config: Option<EngineConfig>) -> Result<Self, SyncError> {
        Self::new(config, widgets::standard_types(), Arc::new(widgets::standard_peers()))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn types(&self) -> &Arc<TypeRegistry> {
        &self.types
    }

    pub fn peers(&self) -> &Arc<PeerRegistry> {
        &self.peers
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Receiver for engine events. Slow receivers lag rather than block.
    pub fn subscribe_events(&self) -> broadcast::Receiver<EngineEvent> {
        self.event_tx.subscribe()
    }

    /// Creates a session whose tree root is of type `root_kind`.
    pub fn create_session(&self, root_kind: &str) -> Result<SessionId, SyncError> {
        let session = Session::new(self.types.clone(), self.peers.clone(), root_kind, self.config.max_style_depth)?;
        let id = self.sessions.insert(session)?;
        info!("created session {id} with `{root_kind}` root");
        let _ = self.event_tx.send(EngineEvent::SessionCreated { session: id });
        Ok(id)
    }

    pub fn remove_session(&self, id: SessionId) -> Result<(), SyncError> {
        self.sessions.remove(id)?;
        info!("removed session {id}");
        let _ = self.event_tx.send(EngineEvent::SessionRemoved { session: id });
        Ok(())
    }

    /// Exclusive access to one session, outside of a cycle.
    pub fn with_session<R>(&self, id: SessionId, f: impl FnOnce(&mut Session) -> Result<R, SyncError>) -> Result<R, SyncError> {
        self.sessions.with_session(id, f)
    }

    /// Full render of a session's tree.
    pub fn render_initial(&self, id: SessionId) -> Result<RenderList, SyncError> {
        self.sessions.with_session(id, Session::render_initial)
    }

    /// Runs one cycle on a session while holding its lock.
    ///
    /// Rejected inputs are reported and published as events; structural and
    /// configuration errors roll the cycle back and are returned.
    pub fn process_cycle<F>(&self, id: SessionId, inputs: Vec<ClientInput>, mutate: F) -> Result<CycleOutput, SyncError>
    where
        F: FnOnce(&mut ComponentTree) -> Result<(), SyncError>,
    {
        self.sessions.with_session(id, |session| match session.run_cycle(inputs, mutate) {
            Ok(output) => {
                for (input, err) in &output.inputs.rejected {
                    let _ = self.event_tx.send(EngineEvent::InputRejected {
                        session: id,
                        component: input.component,
                        input: input.name.clone(),
                        reason: err.to_string(),
                    });
                }
                let _ = self.event_tx.send(EngineEvent::CycleCompleted {
                    session: id,
                    operations: output.operations.len(),
                });
                Ok(output)
            }
            Err(err) => {
                let _ = self.event_tx.send(EngineEvent::CycleRolledBack { session: id, error: err.to_string() });
                Err(err)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{ComponentId, PropertyValue};
    use crate::config::EngineConfigError;
    use crate::render::RenderOperation;
    use crate::widgets::props;

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn engine() -> SyncEngine {
        init_logs();
        SyncEngine::with_standard_widgets(None).unwrap()
    }

    fn root_of(engine: &SyncEngine, id: SessionId) -> ComponentId {
        engine.with_session(id, |s| Ok(s.tree().root())).unwrap()
    }

    #[test]
    fn two_cycle_scenario() {
        let engine = engine();
        let session = engine.create_session(widgets::WINDOW).unwrap();
        let root = root_of(&engine, session);

        let mut label = None;
        engine
            .process_cycle(session, vec![], |tree| {
                let l = tree.create(widgets::LABEL)?;
                tree.set_property(l, props::TEXT, "A")?;
                tree.add_child(root, l, None)?;
                label = Some(l);
                Ok(())
            })
            .unwrap();
        let label = label.unwrap();

        // cycle 1: property only
        let output = engine
            .process_cycle(session, vec![], |tree| {
                tree.set_property(label, props::TEXT, "B")?;
                Ok(())
            })
            .unwrap();
        assert_eq!(
            output.operations.items,
            vec![RenderOperation::UpdateProperty { component: label, property: "text".into(), value: "B".into() }]
        );

        // cycle 2: replace the label
        let mut replacement = None;
        let output = engine
            .process_cycle(session, vec![], |tree| {
                tree.remove_child(root, label)?;
                let m = tree.create(widgets::LABEL)?;
                tree.set_property(m, props::TEXT, "M")?;
                tree.add_child(root, m, None)?;
                replacement = Some(m);
                Ok(())
            })
            .unwrap();
        let m = replacement.unwrap();

        let ops = &output.operations.items;
        let cleared = ops.iter().position(|op| {
            matches!(op, RenderOperation::RemoveChildren { component } if *component == root)
                || matches!(op, RenderOperation::RemoveSubtree { component } if *component == label)
        });
        let added = ops.iter().position(|op| {
            matches!(op, RenderOperation::AddSubtree { parent, index: 0, content }
                if *parent == root && content.component == m && content.text.as_deref() == Some("M"))
        });
        assert!(cleared.is_some() && added.is_some());
        assert!(cleared < added);
        assert_eq!(ops.iter().filter(|op| matches!(op, RenderOperation::AddSubtree { .. })).count(), 1);
    }

    #[test]
    fn input_reconciliation_scenario() {
        let engine = engine();
        let session = engine.create_session(widgets::WINDOW).unwrap();
        let root = root_of(&engine, session);

        let mut area = None;
        engine
            .process_cycle(session, vec![], |tree| {
                let a = tree.create(widgets::TEXT_AREA)?;
                tree.add_child(root, a, None)?;
                area = Some(a);
                Ok(())
            })
            .unwrap();
        let area = area.unwrap();

        let output = engine
            .process_cycle(session, vec![ClientInput::new(area, "text", "C")], |_| Ok(()))
            .unwrap();
        assert_eq!(output.inputs.applied.len(), 1);
        assert_eq!(
            output.operations.items,
            vec![RenderOperation::UpdateProperty { component: area, property: "text".into(), value: "C".into() }]
        );

        let output = engine
            .process_cycle(session, vec![ClientInput::new(area, "unknownProp", "X")], |_| Ok(()))
            .unwrap();
        assert_eq!(output.inputs.ignored.len(), 1);
        assert!(output.operations.is_empty());

        engine
            .with_session(session, |s| {
                assert_eq!(s.tree().property(area, "text")?, Some(&PropertyValue::from("C")));
                assert!(!s.tree().is_property_set(area, "unknownProp")?);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn subtype_without_peer_uses_supertype_peer() {
        let engine = engine();
        let session = engine.create_session(widgets::WINDOW).unwrap();
        let root = root_of(&engine, session);

        let output = engine
            .process_cycle(session, vec![], |tree| {
                let ex = tree.create(widgets::TEXT_AREA_EX)?;
                tree.set_property(ex, props::TEXT, "extended")?;
                tree.add_child(root, ex, None)?;
                Ok(())
            })
            .unwrap();

        let content = output
            .operations
            .iter()
            .find_map(|op| match op {
                RenderOperation::AddSubtree { content, .. } => Some(content.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(content.tag, "textarea");
        assert_eq!(content.text.as_deref(), Some("extended"));
    }

    #[test]
    fn nested_layout_renders_in_tree_order() {
        let engine = engine();
        let session = engine.create_session(widgets::WINDOW).unwrap();
        let root = root_of(&engine, session);

        let mut ids = Vec::new();
        engine
            .process_cycle(session, vec![], |tree| {
                let pane = tree.create(widgets::CONTENT_PANE)?;
                let split = tree.create(widgets::SPLIT_PANE)?;
                let left = tree.create(widgets::COLUMN)?;
                let right = tree.create(widgets::CALENDAR_SELECT)?;
                tree.add_child(root, pane, None)?;
                tree.add_child(pane, split, None)?;
                tree.add_child(split, left, None)?;
                tree.add_child(split, right, None)?;
                for text in ["one", "two"] {
                    let label = tree.create(widgets::LABEL)?;
                    tree.set_property(label, props::TEXT, text)?;
                    tree.add_child(left, label, None)?;
                }
                ids = vec![pane, split, left, right];
                Ok(())
            })
            .unwrap();

        let initial = engine.render_initial(session).unwrap();
        let RenderOperation::AddSubtree { content, .. } = initial.items.last().unwrap() else {
            panic!("expected an AddSubtree last");
        };
        assert_eq!(content.component, ids[0]);
        let split = &content.children[0];
        assert_eq!(split.children.iter().map(|c| c.component).collect::<Vec<_>>(), vec![ids[2], ids[3]]);
        let texts: Vec<_> = split.children[0].children.iter().map(|c| c.text.clone().unwrap()).collect();
        assert_eq!(texts, vec!["one", "two"]);
    }

    #[test]
    fn separator_drag_round_trip() {
        let engine = engine();
        let session = engine.create_session(widgets::WINDOW).unwrap();
        let root = root_of(&engine, session);

        let mut split = None;
        engine
            .process_cycle(session, vec![], |tree| {
                let s = tree.create(widgets::SPLIT_PANE)?;
                tree.add_child(root, s, None)?;
                split = Some(s);
                Ok(())
            })
            .unwrap();
        let split = split.unwrap();

        let output = engine
            .process_cycle(
                session,
                vec![
                    ClientInput::new(split, props::SEPARATOR_POSITION, "-3"),
                    ClientInput::new(split, props::SEPARATOR_POSITION, "150"),
                ],
                |_| Ok(()),
            )
            .unwrap();
        assert_eq!(output.inputs.rejected.len(), 1);
        assert_eq!(
            output.operations.items,
            vec![RenderOperation::UpdateProperty {
                component: split,
                property: props::SEPARATOR_POSITION.into(),
                value: "150px".into()
            }]
        );
    }

    #[test]
    fn calendar_date_input() {
        let engine = engine();
        let session = engine.create_session(widgets::WINDOW).unwrap();
        let root = root_of(&engine, session);

        let mut calendar = None;
        engine
            .process_cycle(session, vec![], |tree| {
                let c = tree.create(widgets::CALENDAR_SELECT)?;
                tree.add_child(root, c, None)?;
                calendar = Some(c);
                Ok(())
            })
            .unwrap();
        let calendar = calendar.unwrap();

        let output = engine
            .process_cycle(
                session,
                vec![
                    ClientInput::new(calendar, props::DATE, "2024-13-01"),
                    ClientInput::new(calendar, props::DATE, "2024-06-30"),
                ],
                |_| Ok(()),
            )
            .unwrap();
        assert_eq!(output.inputs.rejected.len(), 1);
        assert_eq!(
            output.operations.items,
            vec![RenderOperation::UpdateProperty {
                component: calendar,
                property: props::DATE.into(),
                value: "2024-06-30".into()
            }]
        );
    }

    #[test]
    fn missing_peer_rolls_back_the_cycle() {
        init_logs();
        let mut types = widgets::standard_types();
        types.register(crate::component::ComponentType::new("Slider").extends(widgets::COMPONENT)).unwrap();
        let engine = SyncEngine::new(None, types, Arc::new(widgets::standard_peers())).unwrap();
        let session = engine.create_session(widgets::WINDOW).unwrap();
        let root = root_of(&engine, session);

        let err = engine
            .process_cycle(session, vec![], |tree| {
                let slider = tree.create("Slider")?;
                tree.add_child(root, slider, None)?;
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(err, SyncError::NoPeerRegistered(ref k) if k == "Slider"));
        assert!(err.is_configuration());

        engine
            .with_session(session, |s| {
                assert!(s.tree().children(root)?.is_empty());
                assert!(s.tree().updates().is_empty());
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = EngineConfig { max_sessions: 0, ..EngineConfig::default() };
        let err = SyncEngine::with_standard_widgets(Some(config)).err().unwrap();
        assert!(matches!(err, SyncError::Config(EngineConfigError::ZeroSessions)));
    }

    #[test]
    fn session_limit_and_removal() {
        let config = EngineConfig::builder().max_sessions(1).build().unwrap();
        let engine = SyncEngine::with_standard_widgets(Some(config)).unwrap();
        let first = engine.create_session(widgets::WINDOW).unwrap();
        assert!(matches!(engine.create_session(widgets::WINDOW), Err(SyncError::SessionLimitExceeded)));

        engine.remove_session(first).unwrap();
        assert!(matches!(engine.render_initial(first), Err(SyncError::SessionNotFound)));
        engine.create_session(widgets::WINDOW).unwrap();
        assert!(matches!(engine.create_session("Nope"), Err(SyncError::UnknownType(_))));
    }

    #[tokio::test]
    async fn events_are_broadcast() {
        let engine = engine();
        let mut rx = engine.subscribe_events();

        let session = engine.create_session(widgets::WINDOW).unwrap();
        let root = root_of(&engine, session);
        engine
            .process_cycle(session, vec![ClientInput::new(root, "title", "ignored")], |tree| {
                let area = tree.create(widgets::TEXT_AREA)?;
                tree.add_child(root, area, None)?;
                Ok(())
            })
            .unwrap();
        let _ = engine.process_cycle(session, vec![], |tree| {
            let label = tree.create(widgets::LABEL)?;
            tree.add_child(root, label, None)?; // window holds one child
            Ok(())
        });
        engine.remove_session(session).unwrap();

        assert!(matches!(rx.recv().await.unwrap(), EngineEvent::SessionCreated { session: s } if s == session));
        assert!(matches!(rx.recv().await.unwrap(), EngineEvent::CycleCompleted { operations, .. } if operations > 0));
        assert!(matches!(rx.recv().await.unwrap(), EngineEvent::CycleRolledBack { .. }));
        assert!(matches!(rx.recv().await.unwrap(), EngineEvent::SessionRemoved { .. }));
    }

    #[tokio::test]
    async fn rejected_inputs_are_published() {
        let engine = engine();
        let session = engine.create_session(widgets::WINDOW).unwrap();
        let root = root_of(&engine, session);
        let mut split = None;
        engine
            .process_cycle(session, vec![], |tree| {
                let s = tree.create(widgets::SPLIT_PANE)?;
                tree.add_child(root, s, None)?;
                split = Some(s);
                Ok(())
            })
            .unwrap();
        let split = split.unwrap();

        let mut rx = engine.subscribe_events();
        engine
            .process_cycle(session, vec![ClientInput::new(split, props::SEPARATOR_POSITION, "10%")], |_| Ok(()))
            .unwrap();

        match rx.recv().await.unwrap() {
            EngineEvent::InputRejected { component, input, reason, .. } => {
                assert_eq!(component, split);
                assert_eq!(input, props::SEPARATOR_POSITION);
                assert!(reason.contains("pixels"));
            }
            other => panic!("unexpected event {other}"),
        }
        assert!(matches!(rx.recv().await.unwrap(), EngineEvent::CycleCompleted { operations: 0, .. }));
    }
}
