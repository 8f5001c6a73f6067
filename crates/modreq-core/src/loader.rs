//! Module resolution and loading.
//!
//! [`Loader::ensure`] brings a module and its dependencies into the process:
//!
//! 1. An already loaded module is checked for version compatibility and
//!    nothing else happens.
//! 2. Artifact names are derived from the module and the search version.
//! 3. The search path is walked for the library or its dependency manifest.
//! 4. Every dependency in the manifest is ensured first.
//! 5. The library is opened. A manifest without a library is an alias and
//!    stops here.
//! 6. The version embedded in the library is checked against the original
//!    request.
//! 7. The database file next to the library, if present and non-empty, is
//!    loaded and the module's registration entry point is called.
//! 8. The module is recorded in the load table.
//!
//! Nothing is recorded for a module unless all of this succeeds.

use std::cell::RefCell;
use std::path::Path;
use std::sync::Arc;

use parking_lot::{Mutex, ReentrantMutex};
use tracing::{debug, error, info};

use crate::config::{defaults, symbols, NamingConvention, SearchPathSource};
use crate::database::DatabaseLoader;
use crate::depfile;
use crate::error::{RequireError, Result};
use crate::native::{NativeLibrary, NativeLoader};
use crate::registration::Registration;
use crate::search::{self, ArtifactNames};
use crate::table::{LoadTable, LoadedModule};
use crate::version;

/// Loader settings.
#[derive(Debug, Clone, Default)]
pub struct LoaderConfig {
    pub search_path: SearchPathSource,
    pub convention: NamingConvention,
    pub registration: Registration,
}

impl LoaderConfig {
    pub fn with_search_path(mut self, search_path: SearchPathSource) -> Self {
        self.search_path = search_path;
        self
    }

    pub fn with_convention(mut self, convention: NamingConvention) -> Self {
        self.convention = convention;
        self
    }

    pub fn with_registration(mut self, registration: Registration) -> Self {
        self.registration = registration;
        self
    }
}

/// Successful outcome of [`Loader::ensure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// The module was loaded before this request.
    AlreadyLoaded(String),
    /// The module was loaded by this request.
    Loaded(String),
    /// The module is a manifest-only alias; its dependencies were loaded.
    Alias,
}

impl Resolved {
    /// Version of the module now resident, if it has code of its own.
    pub fn version(&self) -> Option<&str> {
        match self {
            Resolved::AlreadyLoaded(v) | Resolved::Loaded(v) => Some(v),
            Resolved::Alias => None,
        }
    }
}

/// Resolves and loads modules.
///
/// Requests are serialised: a single re-entrant lock is held for the whole of
/// each top-level [`ensure`](Loader::ensure), so lookup and commit can't
/// interleave between threads while dependency recursion on the owning thread
/// proceeds. The lock also guards the chain of modules being resolved, used to
/// detect dependency cycles.
pub struct Loader {
    config: LoaderConfig,
    table: Arc<LoadTable>,
    native: Arc<dyn NativeLoader>,
    database: Arc<dyn DatabaseLoader>,
    /// Opened libraries, kept for the life of the process.
    libraries: Mutex<Vec<Arc<dyn NativeLibrary>>>,
    resolving: ReentrantMutex<RefCell<Vec<String>>>,
}

impl Loader {
    pub fn new(
        config: LoaderConfig,
        native: Arc<dyn NativeLoader>,
        database: Arc<dyn DatabaseLoader>,
    ) -> Self {
        Self {
            config,
            table: Arc::new(LoadTable::new()),
            native,
            database,
            libraries: Mutex::new(Vec::new()),
            resolving: ReentrantMutex::new(RefCell::new(Vec::new())),
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn table(&self) -> Arc<LoadTable> {
        self.table.clone()
    }

    /// Number of libraries opened so far.
    pub fn library_count(&self) -> usize {
        self.libraries.lock().len()
    }

    /// Make sure `module` is loaded at a version compatible with `requested`.
    pub fn ensure(&self, module: &str, requested: &str) -> Result<Resolved> {
        if module.is_empty() {
            return Err(RequireError::MissingModuleName);
        }

        let chain = self.resolving.lock();
        debug!("checking module {} version {}", module, requested);

        if let Some(loaded) = self.table.version_of(module) {
            debug!("loaded version of {} is {}", module, loaded);
            if !version::compatible(module, requested, &loaded) {
                return Err(RequireError::Conflict {
                    module: module.to_string(),
                    requested: requested.to_string(),
                    loaded,
                });
            }
            info!("{} {} already loaded", module, loaded);
            return Ok(Resolved::AlreadyLoaded(loaded));
        }

        {
            let mut chain = chain.borrow_mut();
            if let Some(start) = chain.iter().position(|m| m == module) {
                let mut cycle = chain[start..].to_vec();
                cycle.push(module.to_string());
                return Err(RequireError::CircularDependency { chain: cycle });
            }
            chain.push(module.to_string());
        }

        let result = self.resolve(module, requested);
        chain.borrow_mut().pop();
        result
    }

    /// Open a library by path without version checks or a load table entry.
    pub fn load_library(&self, path: &Path) -> Result<()> {
        self.open(path)?;
        info!("Loaded {}", path.display());
        Ok(())
    }

    fn resolve(&self, module: &str, requested: &str) -> Result<Resolved> {
        let convention = &self.config.convention;
        let search_path = self.config.search_path.current();
        debug!("searchpath={}", search_path);

        let names = ArtifactNames::new(convention, module, version::search_version(requested));
        let found = search::locate(convention, &names, &search_path).inspect_err(|e| {
            error!("{}", e);
        })?;

        if let Some(manifest) = &found.dependency_file {
            debug!("parsing dependency file {}", manifest.display());
            for dependency in depfile::read(manifest)? {
                info!(
                    "{} depends on {} {}",
                    module, dependency.module, dependency.version
                );
                self.ensure(&dependency.module, &dependency.version)?;
            }
        }

        let Some(library_path) = found.library.clone() else {
            debug!("no library to load");
            return Ok(Resolved::Alias);
        };

        debug!("loading library {}", library_path.display());
        let library = self.open(&library_path)?;

        let loaded = match library.read_string(&symbols::version(module)) {
            Some(release) => {
                info!("Loading {} (version {})", library_path.display(), release);
                release
            }
            None => {
                info!("Loading {} (no version)", library_path.display());
                defaults::NO_VERSION.to_string()
            }
        };

        if !version::compatible(module, requested, &loaded) {
            let err = RequireError::VersionMismatch {
                module: module.to_string(),
                requested: requested.to_string(),
                found: loaded,
            };
            error!("{}", err);
            return Err(err);
        }

        self.load_database(module, &found.dir, &names, library.as_ref())?;

        self.table.insert(LoadedModule {
            name: module.to_string(),
            version: loaded.clone(),
            path: library_path,
            loaded_at: chrono::Utc::now(),
        });
        Ok(Resolved::Loaded(loaded))
    }

    fn open(&self, path: &Path) -> Result<Arc<dyn NativeLibrary>> {
        let library: Arc<dyn NativeLibrary> = self
            .native
            .open(path)
            .map(Arc::from)
            .map_err(|reason| {
                error!("Loading {} library failed: {}", path.display(), reason);
                RequireError::LoadFailed {
                    path: path.to_path_buf(),
                    reason,
                }
            })?;
        self.libraries.lock().push(library.clone());
        Ok(library)
    }

    /// Load the module's database, then register the module. A missing or
    /// empty database is not an error; a failed registration is only logged.
    fn load_database(
        &self,
        module: &str,
        dir: &Path,
        names: &ArtifactNames,
        library: &dyn NativeLibrary,
    ) -> Result<()> {
        let database = search::locate_database(dir, &names.database).filter(|path| {
            std::fs::metadata(path)
                .map(|meta| meta.len() > 0)
                .unwrap_or(false)
        });
        let Some(path) = database else {
            info!("no dbd file {}", names.database);
            return Ok(());
        };

        info!("Loading {}", path.display());
        self.database.load(&path).map_err(|reason| {
            error!("can't load {}", path.display());
            RequireError::DbLoadFailed {
                path: path.clone(),
                reason,
            }
        })?;

        if let Err(e) = self.config.registration.register(module, library) {
            error!("{}", e);
        }
        Ok(())
    }
}
