//! Module registration after its database has been loaded.

use std::sync::Arc;

use crate::config::symbols;
use crate::error::{RequireError, Result};
use crate::native::NativeLibrary;

/// Runs a shell command on behalf of the loader.
pub trait CommandExecutor: Send + Sync {
    fn execute(&self, command: &str) -> std::result::Result<(), String>;
}

/// How the registration entry point is invoked.
#[derive(Clone, Default)]
pub enum Registration {
    /// Look the entry point up in the loaded library and call it.
    #[default]
    Direct,
    /// Hand the entry point name to a command executor.
    Command(Arc<dyn CommandExecutor>),
    /// Skip registration.
    Disabled,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Registration::Direct => write!(f, "Direct"),
            Registration::Command(_) => write!(f, "Command"),
            Registration::Disabled => write!(f, "Disabled"),
        }
    }
}

impl Registration {
    /// Invoke the registration entry point of `module`.
    pub fn register(&self, module: &str, library: &dyn NativeLibrary) -> Result<()> {
        let symbol = symbols::registration(module);
        let outcome = match self {
            Registration::Direct => {
                tracing::info!("Calling {} function", symbol);
                library.call(&symbol)
            }
            Registration::Command(executor) => {
                tracing::info!("Calling {} function", symbol);
                executor.execute(&symbol)
            }
            Registration::Disabled => Ok(()),
        };
        outcome.map_err(|reason| RequireError::Registration { symbol, reason })
    }
}
