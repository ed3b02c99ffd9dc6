//! Engine configuration.
//!
//! `EngineConfig` controls the limits of a [`SyncEngine`](crate::engine::SyncEngine):
//! how many sessions it may host, how deep a style fallback chain may go
//! before resolution gives up, and how many engine events can be buffered for
//! slow subscribers.
//!
//! # Examples
//!
//! ## Use defaults
//! ```rust
//! use widget_sync::config::EngineConfig;
//! let cfg = EngineConfig::default();
//! assert_eq!(cfg.max_style_depth, 32);
//! ```
//!
//! ## Customize with the builder
//! ```rust
//! use widget_sync::config::EngineConfig;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = EngineConfig::builder()
//!     .max_sessions(64)
//!     .max_style_depth(8)
//!     .build()?; // returns Result<EngineConfig, EngineConfigError>
//! # Ok(()) }
//! ```
//!
//! # Errors
//!
//! Builder validation returns [`EngineConfigError`] when any limit is zero.

use std::fmt;

/// Default capacity of the engine event channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 128;

/// Default depth cap for style fallback chains.
pub const DEFAULT_MAX_STYLE_DEPTH: usize = 32;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum number of concurrently hosted sessions (component trees)
    pub max_sessions: usize,
    /// Maximum number of styles walked when resolving a property
    pub max_style_depth: usize,
    /// Buffered engine events per subscriber before lagging
    pub event_channel_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_sessions: 1024,
            max_style_depth: DEFAULT_MAX_STYLE_DEPTH,
            event_channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl EngineConfig {
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }
}

/// Builder for [`EngineConfig`].
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    inner: EngineConfig,
}

impl EngineConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut EngineConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn max_sessions(self, n: usize) -> Self { self.map(|c| c.max_sessions = n) }
    pub fn max_style_depth(self, n: usize) -> Self { self.map(|c| c.max_style_depth = n) }
    pub fn event_channel_capacity(self, n: usize) -> Self { self.map(|c| c.event_channel_capacity = n) }

    /// Apply multiple changes in one go.
    pub fn with(self, f: impl FnOnce(&mut EngineConfig)) -> Self { self.map(f) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<EngineConfig, EngineConfigError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

// ---------- Validation ----------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineConfigError {
    ZeroSessions,
    ZeroStyleDepth,
    ZeroChannelCapacity,
}

impl fmt::Display for EngineConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineConfigError::ZeroSessions =>
                write!(f, "max_sessions must be at least 1"),
            EngineConfigError::ZeroStyleDepth =>
                write!(f, "max_style_depth must be at least 1"),
            EngineConfigError::ZeroChannelCapacity =>
                write!(f, "event_channel_capacity must be at least 1"),
        }
    }
}
impl std::error::Error for EngineConfigError {}

pub(crate) fn validate(c: &EngineConfig) -> Result<(), EngineConfigError> {
    if c.max_sessions == 0 {
        return Err(EngineConfigError::ZeroSessions);
    }
    if c.max_style_depth == 0 {
        return Err(EngineConfigError::ZeroStyleDepth);
    }
    if c.event_channel_capacity == 0 {
        return Err(EngineConfigError::ZeroChannelCapacity);
    }
    Ok(())
}
