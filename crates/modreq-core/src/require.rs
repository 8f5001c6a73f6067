//! Top-level entry point for module requests.

use crate::context::Context;
use crate::error::Result;
use crate::loader::{Loader, Resolved};

/// Wraps a [`Loader`] with the execution context of top-level requests.
///
/// Before the context is marked initialized a failed request aborts startup.
/// After that, failures are returned to the caller like any other error.
pub struct Requirer {
    loader: Loader,
    context: Context,
}

impl Requirer {
    pub fn new(loader: Loader, context: Context) -> Self {
        Self { loader, context }
    }

    pub fn loader(&self) -> &Loader {
        &self.loader
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Load `module` at a version compatible with `version`.
    pub fn require(&self, module: &str, version: &str) -> Result<Resolved> {
        let result = self.loader.ensure(module, version);
        if let Err(e) = &result {
            tracing::error!("require {} {}: {}", module, version, e);
            if !self.context.is_initialized() {
                self.context.abort(1);
            }
        }
        result
    }
}
