//! Server-side component synchronization.
//!
//! Components live in a per-session [`ComponentTree`](component::ComponentTree).
//! Each cycle reconciles client input, lets the application mutate the tree,
//! and turns the recorded updates into an ordered list of
//! [`RenderOperation`](render::RenderOperation)s for the client, rendering
//! changed properties in place where the component's peer allows it and
//! re-rendering whole subtrees otherwise.

pub mod component;
pub mod config;
pub mod engine;
pub mod errors;
pub mod events;
pub mod input;
pub mod peer;
pub mod planner;
pub mod render;
pub mod session;
pub mod update;
pub mod widgets;

pub use config::EngineConfig;
pub use engine::SyncEngine;
pub use errors::{StructuralError, SyncError};
