use crate::component::ComponentId;
use crate::config::EngineConfigError;

/// Reasons why a parent refused to attach (or detach) a child.
///
/// These are always raised before the tree is touched, so a failed call leaves
/// the tree exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructuralError {
    #[error("Component {0} cannot be attached to itself")]
    SelfAttach(ComponentId),

    #[error("Attaching {child} under {parent} would create a cycle")]
    WouldCycle { parent: ComponentId, child: ComponentId },

    #[error("Root component {0} cannot be attached as a child")]
    RootCannotBeChild(ComponentId),

    #[error("`{parent_kind}` component {parent} does not accept children")]
    ChildrenNotAllowed { parent: ComponentId, parent_kind: String },

    #[error("`{parent_kind}` component {parent} accepts at most {limit} children")]
    TooManyChildren { parent: ComponentId, parent_kind: String, limit: usize },

    #[error("`{child_kind}` component {child} requires a pane container parent, got `{parent_kind}`")]
    ParentRejected { child: ComponentId, child_kind: String, parent_kind: String },

    #[error("Component {child} is not a child of {parent}")]
    NotAChild { parent: ComponentId, child: ComponentId },

    #[error("Index {index} is out of bounds for {len} children")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Component {0} is still attached")]
    StillAttached(ComponentId),
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Structural violation: {0}")]
    Structural(#[from] StructuralError),

    #[error("No peer registered for component type `{0}` or any of its supertypes")]
    NoPeerRegistered(String),

    #[error("Unknown component type `{0}`")]
    UnknownType(String),

    #[error("Component type `{0}` is already registered")]
    DuplicateType(String),

    #[error("Style fallback chain through `{0}` is cyclic")]
    CyclicStyleChain(String),

    #[error("Style fallback chain starting at `{start}` exceeds {limit} levels")]
    StyleChainTooDeep { start: String, limit: usize },

    #[error("Unknown style `{0}`")]
    UnknownStyle(String),

    #[error("A global peer registry is already installed")]
    RegistryAlreadyInstalled,

    #[error("Invalid configuration: {0}")]
    Config(#[from] EngineConfigError),

    #[error("Component not found: {0}")]
    ComponentNotFound(ComponentId),

    #[error("Session not found")]
    SessionNotFound,

    #[error("Session already exists")]
    SessionAlreadyExists,

    #[error("Session limit exceeded")]
    SessionLimitExceeded,

    #[error("Session lock is poisoned")]
    SessionPoisoned,

    #[error("Peer `{peer}` failed on component {component}: {source}")]
    Render {
        peer: String,
        component: ComponentId,
        #[source]
        source: anyhow::Error,
    },
}

impl SyncError {
    /// Invalid parent/child attachment.
    pub fn is_structural(&self) -> bool {
        matches!(self, SyncError::Structural(_))
    }

    /// Missing registrations, broken style chains and invalid settings. Never
    /// recoverable inside the cycle that hit them.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SyncError::NoPeerRegistered(_)
                | SyncError::UnknownType(_)
                | SyncError::DuplicateType(_)
                | SyncError::CyclicStyleChain(_)
                | SyncError::StyleChainTooDeep { .. }
                | SyncError::UnknownStyle(_)
                | SyncError::RegistryAlreadyInstalled
                | SyncError::Config(_)
        )
    }
}
