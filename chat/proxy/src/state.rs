//! Shared Proxy State
//!
//! The handler is stateless between requests; this only carries the
//! backend and optional passthrough target into each request.

use std::sync::Arc;

use lanyard_core::{BackendError, BackendKind, CannedBackend, ChatBackend, HttpChatBackend, LanyardConfig};

use crate::passthrough::Passthrough;

/// State handed to every route
#[derive(Clone)]
pub struct ProxyState {
    /// Answers chat queries
    pub backend: Arc<dyn ChatBackend>,
    /// Forwards other `/api/*` paths, when enabled
    pub passthrough: Option<Arc<Passthrough>>,
}

impl std::fmt::Debug for ProxyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyState")
            .field("backend", &self.backend.name())
            .field("passthrough", &self.passthrough)
            .finish()
    }
}

impl ProxyState {
    /// State around an existing backend, passthrough disabled
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            backend,
            passthrough: None,
        }
    }

    /// Enable dev passthrough to `upstream`
    #[must_use]
    pub fn with_passthrough(mut self, passthrough: Passthrough) -> Self {
        self.passthrough = Some(Arc::new(passthrough));
        self
    }

    /// Build state from resolved configuration
    ///
    /// # Errors
    ///
    /// Fails if the upstream URL is unusable or the HTTP client cannot be
    /// built.
    pub fn from_config(config: &LanyardConfig) -> Result<Self, BackendError> {
        let backend: Arc<dyn ChatBackend> = match config.backend {
            BackendKind::Http => Arc::new(HttpChatBackend::new(
                config.upstream_url.as_str(),
                config.upstream_timeout,
            )?),
            BackendKind::Canned => Arc::new(CannedBackend::new(config.owner.as_str())),
        };

        let mut state = Self::new(backend);
        if config.dev_passthrough {
            state = state.with_passthrough(Passthrough::new(
                config.upstream_url.as_str(),
                config.upstream_timeout,
            )?);
        }
        Ok(state)
    }
}
