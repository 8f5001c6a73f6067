//! Runtime module loader.
//!
//! Loads named modules (a shared library plus optional dependency manifest and
//! database file) from a search path, resolving their dependencies first and
//! keeping a table of what is loaded so that repeated requests are cheap and
//! version conflicts are reported instead of loading two versions of a module.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use modreq_core::prelude::*;
//!
//! let loader = Loader::new(
//!     LoaderConfig::default(),
//!     Arc::new(DlLoader::new()),
//!     Arc::new(DbdFileLoader::new()),
//! );
//! let requirer = Requirer::new(loader, Context::new());
//!
//! requirer.require("asyn", "4.2+")?;
//! requirer.context().mark_initialized();
//! ```

pub mod commands;
pub mod config;
pub mod context;
pub mod database;
pub mod depfile;
pub mod diagnostics;
pub mod error;
pub mod loader;
pub mod native;
pub mod registration;
pub mod require;
pub mod search;
pub mod table;
pub mod version;

pub use error::{RequireError, Result};
pub use loader::{Loader, LoaderConfig, Resolved};
pub use require::Requirer;
pub use table::{LoadTable, LoadedModule};

/// Re-exports commonly used types.
pub mod prelude {
    pub use crate::commands::CommandTable;
    pub use crate::config::{NamingConvention, SearchPathSource};
    pub use crate::context::{Context, ExitHooks};
    pub use crate::database::{DatabaseLoader, DbdFileLoader};
    pub use crate::error::{RequireError, Result};
    pub use crate::loader::{Loader, LoaderConfig, Resolved};
    pub use crate::native::{DlLoader, NativeLibrary, NativeLoader};
    pub use crate::registration::{CommandExecutor, Registration};
    pub use crate::require::Requirer;
    pub use crate::table::{LoadTable, LoadedModule};
}
