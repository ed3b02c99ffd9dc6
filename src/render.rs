//! Rendering output: the operations a cycle emits and the context peers
//! render into.

mod context;
mod operation;

pub use context::RenderContext;
pub use operation::{RenderList, RenderOperation, RenderedContent};
