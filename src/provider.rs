//! Publication of the active configuration.
//!
//! [`ConfigHandle`] owns the one active snapshot. Readers clone an
//! `Arc<MaterialConfiguration>` and keep reading it even if a newer build is
//! published meanwhile. Publishing swaps the `Arc` under a write lock held only
//! for the swap, so a reader sees either the previous snapshot or the new one.
//!
//! Rendering code takes a [`ConfigProvider`] instead of reaching for a global.

use crate::builder::{BuildRequest, ConfigBuilder};
use crate::config::MaterialConfiguration;
use crate::error::BuildError;
use core::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Lifecycle of the most recent build on a handle.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum BuildState {
    /// Nothing has been built yet
    #[default]
    Unbuilt,
    /// Directives are being resolved and derived
    Resolving,
    /// A configuration passed every check and is about to be published
    Validated,
    /// The latest build is the active configuration
    Active,
    /// The latest build failed; any earlier snapshot is still active
    Rejected,
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            BuildState::Unbuilt => "unbuilt",
            BuildState::Resolving => "resolving",
            BuildState::Validated => "validated",
            BuildState::Active => "active",
            BuildState::Rejected => "rejected",
        };
        write!(f, "{s}")
    }
}

/// Anything that can hand out a complete configuration snapshot.
pub trait ConfigProvider {
    fn snapshot(&self) -> Result<Arc<MaterialConfiguration>, BuildError>;
}

impl ConfigProvider for Arc<MaterialConfiguration> {
    fn snapshot(&self) -> Result<Arc<MaterialConfiguration>, BuildError> {
        Ok(Arc::clone(self))
    }
}

/// Holder of the active configuration.
#[derive(Debug, Default)]
pub struct ConfigHandle {
    builder: ConfigBuilder,
    active: RwLock<Option<Arc<MaterialConfiguration>>>,
    state: Mutex<BuildState>,
}

impl ConfigHandle {
    pub fn new(builder: ConfigBuilder) -> Self {
        Self {
            builder,
            active: RwLock::new(None),
            state: Mutex::new(BuildState::Unbuilt),
        }
    }

    pub fn builder(&self) -> &ConfigBuilder {
        &self.builder
    }

    pub fn state(&self) -> BuildState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transition(&self, next: BuildState) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        debug!("Configuration state {} -> {next}", *state);
        *state = next;
    }

    /// The active snapshot, if one has been published.
    pub fn current(&self) -> Option<Arc<MaterialConfiguration>> {
        let active = self.active.read().unwrap_or_else(PoisonError::into_inner);
        active.clone()
    }

    /// Replace the active configuration.
    pub fn set_active(&self, config: Arc<MaterialConfiguration>) {
        {
            let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
            *active = Some(Arc::clone(&config));
        }
        self.transition(BuildState::Active);
        info!(
            "Published configuration: {:.2} x {:.2} x {:.2} mm board, {} dpi",
            config.board.length_mm, config.board.width_mm, config.board.thickness_mm, config.render.dpi
        );
    }

    /// The active configuration, building the registry defaults on first use.
    pub fn get_active(&self) -> Result<Arc<MaterialConfiguration>, BuildError> {
        match self.current() {
            Some(config) => Ok(config),
            None => self.apply(&BuildRequest::new()),
        }
    }

    /// Build `request` and publish the result.
    ///
    /// On failure the handle moves to [`BuildState::Rejected`] and the active
    /// configuration is left as it was.
    pub fn apply(&self, request: &BuildRequest) -> Result<Arc<MaterialConfiguration>, BuildError> {
        self.transition(BuildState::Resolving);
        let built = self
            .builder
            .resolve(request)
            .and_then(|res| self.builder.assemble(&res));
        match built {
            Ok(config) => {
                self.transition(BuildState::Validated);
                let config = Arc::new(config);
                self.set_active(Arc::clone(&config));
                Ok(config)
            }
            Err(e) => {
                self.transition(BuildState::Rejected);
                warn!("Rejected configuration build: {e}");
                Err(e)
            }
        }
    }
}

impl ConfigProvider for ConfigHandle {
    fn snapshot(&self) -> Result<Arc<MaterialConfiguration>, BuildError> {
        self.get_active()
    }
}
