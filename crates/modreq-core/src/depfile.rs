//! Dependency manifest parsing.
//!
//! A manifest lists one dependency per line as `<module> <version>`. Blank
//! lines and lines starting with `#` are ignored, as is anything after the
//! version token. Every declared version is a lower bound: the
//! minimum-compatible marker is appended to it.
//!
//! Manifests are not required to be UTF-8 as a whole; only the lines that
//! declare a dependency are decoded.

use std::io;
use std::path::Path;

use crate::error::{RequireError, Result};
use crate::version;

/// A module required by a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub module: String,
    /// Version constraint, already marked as a lower bound. Empty when the
    /// manifest line names no version.
    pub version: String,
}

/// Read and parse the manifest at `path`.
pub fn read(path: &Path) -> Result<Vec<Dependency>> {
    let bytes = std::fs::read(path).map_err(|e| RequireError::io(path, e))?;
    parse(&bytes).map_err(|e| RequireError::io(path, e))
}

/// Parse manifest contents into dependencies, in file order.
///
/// Fails with [`io::ErrorKind::InvalidData`] when a declaration line is not
/// valid UTF-8.
pub fn parse(data: &[u8]) -> io::Result<Vec<Dependency>> {
    let mut dependencies = Vec::new();
    for (number, raw) in data.split(|&b| b == b'\n').enumerate() {
        if is_ignored(raw) {
            continue;
        }
        let line = std::str::from_utf8(raw).map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("line {}: {}", number + 1, e))
        })?;
        dependencies.extend(parse_line(line));
    }
    Ok(dependencies)
}

fn is_ignored(raw: &[u8]) -> bool {
    match raw.iter().find(|b| !b.is_ascii_whitespace()) {
        None => true,
        Some(&first) => first == b'#',
    }
}

fn parse_line(line: &str) -> Option<Dependency> {
    let mut tokens = line.split_whitespace();
    let module = tokens.next()?;
    let declared = tokens.next().unwrap_or("");
    Some(Dependency {
        module: module.to_string(),
        version: version::at_least(declared),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest() {
        let text = b"# generated\n\nasyn 4.21\n  calc\t3.4.2   trailing\n#motor 6\n";
        let deps = parse(text).unwrap();
        assert_eq!(
            deps,
            vec![
                Dependency {
                    module: "asyn".into(),
                    version: "4.21+".into()
                },
                Dependency {
                    module: "calc".into(),
                    version: "3.4.2+".into()
                },
            ]
        );
    }

    #[test]
    fn test_missing_version_is_unconstrained() {
        let deps = parse(b"stream\n").unwrap();
        assert_eq!(deps[0].version, "");
    }

    #[test]
    fn test_read_skips_undecodable_comment() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a.dep");
        std::fs::write(&path, b"# maintained by M\xfcller\r\n\nasyn 4.2\r\n").unwrap();
        let deps = read(&path).unwrap();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].module, "asyn");
        assert_eq!(deps[0].version, "4.2+");
    }

    #[test]
    fn test_read_rejects_undecodable_dependency() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a.dep");
        std::fs::write(&path, b"asyn 4.2\nm\xfcller 1\n").unwrap();
        match read(&path) {
            Err(RequireError::Io { source, .. }) => {
                assert_eq!(source.kind(), std::io::ErrorKind::InvalidData);
                assert!(source.to_string().contains("line 2"));
            }
            other => panic!("expected invalid data, got {:?}", other),
        }
    }

    #[test]
    fn test_read_missing_file() {
        let err = read(Path::new("/nonexistent/x.dep")).unwrap_err();
        assert!(matches!(err, RequireError::Io { .. }));
    }
}
