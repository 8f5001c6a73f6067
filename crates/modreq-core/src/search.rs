//! Search path traversal.
//!
//! Directories are tried strictly left to right and the first one holding the
//! module's library or, failing that, its dependency manifest wins. There is
//! no scoring between directories.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::{defaults, NamingConvention};
use crate::error::{RequireError, Result};

/// File names derived from a module name and search version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNames {
    pub library: String,
    pub dependency: String,
    pub database: String,
}

impl ArtifactNames {
    pub fn new(convention: &NamingConvention, module: &str, version: &str) -> Self {
        let names = Self {
            library: convention.library_name(module, version),
            dependency: convention.dependency_name(module, version),
            database: convention.database_name(module, version),
        };
        debug!("libname is {}", names.library);
        debug!("depname is {}", names.dependency);
        debug!("dbdname is {}", names.database);
        names
    }
}

/// Where a module was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
    /// Search path element that matched.
    pub dir: PathBuf,
    /// Library artifact, if present in `dir`.
    pub library: Option<PathBuf>,
    /// Dependency manifest, if present in `dir`.
    pub dependency_file: Option<PathBuf>,
}

impl Located {
    /// The module ships no code, only dependencies.
    pub fn is_alias(&self) -> bool {
        self.library.is_none()
    }
}

/// Find the first directory on `search_path` holding the library or manifest.
pub fn locate(
    convention: &NamingConvention,
    names: &ArtifactNames,
    search_path: &str,
) -> Result<Located> {
    for dir in convention.split_search_path(search_path) {
        let library = find_library(convention, dir, &names.library);
        let dependency = dir.join(&names.dependency);
        let dependency_file = if dependency.exists() {
            Some(dependency)
        } else {
            None
        };

        if library.is_some() || dependency_file.is_some() {
            debug!("found in {}", dir.display());
            return Ok(Located {
                dir: dir.to_path_buf(),
                library,
                dependency_file,
            });
        }
    }

    Err(RequireError::NotFound {
        file: names.library.clone(),
        search_path: search_path.to_string(),
    })
}

fn find_library(convention: &NamingConvention, dir: &Path, library: &str) -> Option<PathBuf> {
    let path = dir.join(library);
    debug!("looking for {}", path.display());
    if path.exists() {
        return Some(path);
    }

    if convention.try_without_extension {
        let bare = library.strip_suffix(convention.extension)?;
        let path = dir.join(bare);
        debug!("looking for {}", path.display());
        if path.exists() {
            return Some(path);
        }
    }
    None
}

/// Find the database file for an artifact found in `dir`.
///
/// Checked in order: `dir`, `dir/dbd`, `dir/../dbd`, `dir/../../dbd`.
pub fn locate_database(dir: &Path, database: &str) -> Option<PathBuf> {
    database_candidates(dir, database).find(|path| {
        debug!("looking for {}", path.display());
        path.exists()
    })
}

fn database_candidates<'a>(dir: &'a Path, database: &'a str) -> impl Iterator<Item = PathBuf> + 'a {
    let sub = defaults::DB_SUBDIR;
    [
        dir.to_path_buf(),
        dir.join(sub),
        dir.join("..").join(sub),
        dir.join("..").join("..").join(sub),
    ]
    .into_iter()
    .map(move |base| base.join(database))
}
