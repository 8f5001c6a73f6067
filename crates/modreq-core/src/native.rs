//! Native library loading.
//!
//! The loader core talks to shared libraries only through [`NativeLoader`] and
//! [`NativeLibrary`]; [`DlLoader`] is the implementation backed by the
//! platform dynamic linker.

use std::ffi::{c_char, CStr};
use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};

/// An opened shared library.
pub trait NativeLibrary: Send + Sync {
    /// Read the NUL-terminated string exported as `symbol`.
    fn read_string(&self, symbol: &str) -> Option<String>;

    /// Call the no-argument function exported as `symbol`.
    fn call(&self, symbol: &str) -> Result<(), String>;
}

/// Opens shared libraries. Errors carry the platform's message verbatim.
pub trait NativeLoader: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn NativeLibrary>, String>;
}

/// Loader backed by `dlopen`/`LoadLibrary`.
///
/// On Unix libraries are opened with `RTLD_NOW | RTLD_GLOBAL` so their symbols
/// resolve for modules loaded after them.
#[derive(Debug, Default, Clone, Copy)]
pub struct DlLoader;

impl DlLoader {
    pub fn new() -> Self {
        Self
    }
}

impl NativeLoader for DlLoader {
    fn open(&self, path: &Path) -> Result<Box<dyn NativeLibrary>, String> {
        #[cfg(unix)]
        let library = unsafe {
            let flags = libloading::os::unix::RTLD_NOW | libloading::os::unix::RTLD_GLOBAL;
            libloading::os::unix::Library::open(Some(path), flags)
                .map(Library::from)
                .map_err(|e| e.to_string())?
        };
        #[cfg(not(unix))]
        let library = unsafe { Library::new(path).map_err(|e| e.to_string())? };

        Ok(Box::new(DlLibrary {
            library,
            path: path.to_path_buf(),
        }))
    }
}

/// A library opened by [`DlLoader`].
pub struct DlLibrary {
    library: Library,
    path: PathBuf,
}

impl NativeLibrary for DlLibrary {
    fn read_string(&self, symbol: &str) -> Option<String> {
        // The symbol is a `char[]`; its address is the start of the string.
        let data: Symbol<*const c_char> = unsafe { self.library.get(symbol.as_bytes()) }.ok()?;
        let ptr = *data;
        if ptr.is_null() {
            return None;
        }
        let value = unsafe { CStr::from_ptr(ptr) };
        Some(value.to_string_lossy().into_owned())
    }

    fn call(&self, symbol: &str) -> Result<(), String> {
        let entry: Symbol<unsafe extern "C" fn()> = unsafe {
            self.library
                .get(symbol.as_bytes())
                .map_err(|e| format!("can't find {} in {}: {}", symbol, self.path.display(), e))?
        };
        unsafe { entry() };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_nonexistent_library() {
        let err = DlLoader::new()
            .open(Path::new("/nonexistent/libnothing.so"))
            .err()
            .unwrap();
        assert!(!err.is_empty());
    }

    #[test]
    fn test_open_non_library_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("libfake.so");
        std::fs::write(&path, "not an object file").unwrap();
        assert!(DlLoader::new().open(&path).is_err());
    }
}
