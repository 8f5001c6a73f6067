//! Shared fixtures for loader tests.
//!
//! Library files are plain text: the first line is the version the fake
//! library reports (empty for none), and further lines are flags:
//! `corrupt` makes opening fail, `noreg` makes registration fail.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use modreq_core::prelude::*;
use parking_lot::Mutex;
use tempfile::TempDir;

/// Records every library opened and every entry point called.
#[derive(Default)]
pub struct FakeNative {
    pub opened: Mutex<Vec<PathBuf>>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl FakeNative {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// File names of opened libraries, in order.
    pub fn opened_names(&self) -> Vec<String> {
        self.opened
            .lock()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }
}

impl NativeLoader for FakeNative {
    fn open(&self, path: &Path) -> Result<Box<dyn NativeLibrary>, String> {
        let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
        let mut lines = content.lines();
        let version = lines.next().unwrap_or("").trim().to_string();
        let flags: Vec<String> = lines.map(|l| l.trim().to_string()).collect();
        if flags.iter().any(|f| f == "corrupt") {
            return Err(format!("{}: invalid ELF header", path.display()));
        }
        self.opened.lock().push(path.to_path_buf());
        Ok(Box::new(FakeLibrary {
            version: Some(version).filter(|v| !v.is_empty()),
            fail_registration: flags.iter().any(|f| f == "noreg"),
            calls: self.calls.clone(),
        }))
    }
}

struct FakeLibrary {
    version: Option<String>,
    fail_registration: bool,
    calls: Arc<Mutex<Vec<String>>>,
}

impl NativeLibrary for FakeLibrary {
    fn read_string(&self, symbol: &str) -> Option<String> {
        if symbol.ends_with("LibRelease") {
            self.version.clone()
        } else {
            None
        }
    }

    fn call(&self, symbol: &str) -> Result<(), String> {
        if self.fail_registration {
            return Err(format!("can't find {} function", symbol));
        }
        self.calls.lock().push(symbol.to_string());
        Ok(())
    }
}

/// Records loaded database files; files containing `broken` fail to load.
#[derive(Default)]
pub struct FakeDatabase {
    pub loaded: Mutex<Vec<PathBuf>>,
}

impl FakeDatabase {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl DatabaseLoader for FakeDatabase {
    fn load(&self, path: &Path) -> Result<(), String> {
        let text = fs::read_to_string(path).map_err(|e| e.to_string())?;
        if text.contains("broken") {
            return Err("syntax error".to_string());
        }
        self.loaded.lock().push(path.to_path_buf());
        Ok(())
    }
}

/// A directory tree of module artifacts.
pub struct Tree {
    pub root: TempDir,
}

impl Tree {
    pub fn new() -> Self {
        Self {
            root: tempfile::tempdir().unwrap(),
        }
    }

    pub fn dir(&self, name: &str) -> PathBuf {
        let dir = self.root.path().join(name);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Write a file relative to the tree root.
    pub fn file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    /// Search path made of the given subdirectories.
    pub fn search_path(&self, dirs: &[&str]) -> String {
        dirs.iter()
            .map(|d| self.dir(d).display().to_string())
            .collect::<Vec<_>>()
            .join(":")
    }
}

pub fn loader(search_path: &str, native: Arc<FakeNative>, database: Arc<FakeDatabase>) -> Loader {
    let config = LoaderConfig::default()
        .with_search_path(SearchPathSource::Fixed(search_path.to_string()))
        .with_convention(NamingConvention::POSIX);
    Loader::new(config, native, database)
}
