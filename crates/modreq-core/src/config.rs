//! Loader configuration: environment variable names, defaults, symbol naming
//! and per-platform artifact naming conventions.

use std::path::Path;

/// Environment variable names.
pub mod env_vars {
    /// Search path for module artifacts.
    pub const DRIVER_PATH: &str = "EPICS_DRIVER_PATH";
    /// Emit JSON log lines from the command-line tool.
    pub const LOG_JSON: &str = "MODREQ_LOG_JSON";
}

/// Default values.
pub mod defaults {
    /// Search path used when none is configured.
    pub const SEARCH_PATH: &str = ".";
    /// Subdirectory holding database files, relative to the artifact directory.
    pub const DB_SUBDIR: &str = "dbd";
    /// Resolved version recorded for artifacts without a version symbol.
    pub const NO_VERSION: &str = "(no version)";
    /// Suffix marking a request as "this version or newer".
    pub const MIN_COMPATIBLE_MARKER: char = '+';
    /// Dependency manifest extension.
    pub const DEP_EXTENSION: &str = ".dep";
    /// Database file extension.
    pub const DB_EXTENSION: &str = ".dbd";
}

/// Symbol names looked up in loaded artifacts.
pub mod symbols {
    /// Release string embedded in a module's library.
    pub fn version(module: &str) -> String {
        format!("_{}LibRelease", module)
    }

    /// Entry point registering a module's database definitions.
    pub fn registration(module: &str) -> String {
        format!("{}_registerRecordDeviceDriver", module)
    }
}

/// Where the search path comes from.
///
/// The value is read on every top-level request, never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchPathSource {
    /// Read from an environment variable.
    Env(String),
    /// A fixed value.
    Fixed(String),
}

impl SearchPathSource {
    /// Current search path. Unset or empty falls back to the current directory.
    pub fn current(&self) -> String {
        let value = match self {
            SearchPathSource::Env(var) => std::env::var(var).ok(),
            SearchPathSource::Fixed(value) => Some(value.clone()),
        };
        value
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| defaults::SEARCH_PATH.to_string())
    }
}

impl Default for SearchPathSource {
    fn default() -> Self {
        SearchPathSource::Env(env_vars::DRIVER_PATH.to_string())
    }
}

/// Platform naming convention for module artifacts.
///
/// Library names are built as `{prefix}{module}{infix}[-{version}]{extension}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamingConvention {
    pub prefix: &'static str,
    pub infix: &'static str,
    pub extension: &'static str,
    /// Separator between search path elements.
    pub path_separator: char,
    /// Also look for the library name with its extension removed.
    pub try_without_extension: bool,
}

impl NamingConvention {
    pub const POSIX: NamingConvention = NamingConvention {
        prefix: "lib",
        infix: "",
        extension: ".so",
        path_separator: ':',
        try_without_extension: false,
    };

    pub const CYGWIN: NamingConvention = NamingConvention {
        prefix: "",
        infix: "",
        extension: ".dll",
        path_separator: ':',
        try_without_extension: false,
    };

    pub const WINDOWS: NamingConvention = NamingConvention {
        prefix: "",
        infix: "",
        extension: ".dll",
        path_separator: ';',
        try_without_extension: false,
    };

    pub const VXWORKS: NamingConvention = NamingConvention {
        prefix: "",
        infix: "Lib",
        extension: ".munch",
        path_separator: ':',
        try_without_extension: true,
    };

    /// Convention of the platform this binary was built for.
    pub fn host() -> NamingConvention {
        if cfg!(windows) {
            Self::WINDOWS
        } else if cfg!(target_os = "cygwin") {
            Self::CYGWIN
        } else if cfg!(target_os = "vxworks") {
            Self::VXWORKS
        } else {
            Self::POSIX
        }
    }

    /// Library file name for a module, with the version segment only when
    /// `version` is non-empty.
    pub fn library_name(&self, module: &str, version: &str) -> String {
        format!(
            "{}{}{}{}{}",
            self.prefix,
            module,
            self.infix,
            version_segment(version),
            self.extension
        )
    }

    /// Dependency manifest file name.
    pub fn dependency_name(&self, module: &str, version: &str) -> String {
        format!(
            "{}{}{}",
            module,
            version_segment(version),
            defaults::DEP_EXTENSION
        )
    }

    /// Database file name.
    pub fn database_name(&self, module: &str, version: &str) -> String {
        format!(
            "{}{}{}",
            module,
            version_segment(version),
            defaults::DB_EXTENSION
        )
    }

    /// Split a search path into its non-empty elements, in order.
    pub fn split_search_path<'a>(&self, search_path: &'a str) -> impl Iterator<Item = &'a Path> {
        search_path
            .split(self.path_separator)
            .filter(|dir| !dir.is_empty())
            .map(Path::new)
    }
}

impl Default for NamingConvention {
    fn default() -> Self {
        Self::host()
    }
}

fn version_segment(version: &str) -> String {
    if version.is_empty() {
        String::new()
    } else {
        format!("-{}", version)
    }
}
