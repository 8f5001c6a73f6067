//! Table of loaded modules.
//!
//! Records are added once per module on a successful load and never change or
//! go away afterwards: loaded code cannot be safely unloaded from a running
//! process.

use std::collections::HashMap;
use std::path::PathBuf;

use parking_lot::RwLock;
use serde::Serialize;

/// A module that has been loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadedModule {
    pub name: String,
    /// Version reported by the artifact, or the "no version" sentinel.
    pub version: String,
    /// Library the module was loaded from.
    pub path: PathBuf,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Default)]
struct Inner {
    records: Vec<LoadedModule>,
    index: HashMap<String, usize>,
}

/// Process-wide record of loaded modules, kept in load order.
#[derive(Default)]
pub struct LoadTable {
    inner: RwLock<Inner>,
}

impl LoadTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Version of `module`, if loaded.
    pub fn version_of(&self, module: &str) -> Option<String> {
        self.get(module).map(|record| record.version)
    }

    pub fn get(&self, module: &str) -> Option<LoadedModule> {
        let inner = self.inner.read();
        inner
            .index
            .get(module)
            .map(|&i| inner.records[i].clone())
    }

    pub fn contains(&self, module: &str) -> bool {
        self.inner.read().index.contains_key(module)
    }

    /// Add a record. Returns `false`, leaving the table untouched, if the
    /// module is already present.
    pub fn insert(&self, record: LoadedModule) -> bool {
        let mut inner = self.inner.write();
        if inner.index.contains_key(&record.name) {
            return false;
        }
        let position = inner.records.len();
        inner.index.insert(record.name.clone(), position);
        inner.records.push(record);
        true
    }

    /// All records in load order.
    pub fn list(&self) -> Vec<LoadedModule> {
        self.inner.read().records.clone()
    }

    /// Records whose name contains `pattern`, in load order.
    pub fn matching(&self, pattern: &str) -> Vec<LoadedModule> {
        self.inner
            .read()
            .records
            .iter()
            .filter(|record| record.name.contains(pattern))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, version: &str) -> LoadedModule {
        LoadedModule {
            name: name.to_string(),
            version: version.to_string(),
            path: PathBuf::from(format!("/lib/lib{}.so", name)),
            loaded_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_insert_once() {
        let table = LoadTable::new();
        assert!(table.insert(record("asyn", "4.2")));
        assert!(!table.insert(record("asyn", "5.0")));
        assert_eq!(table.len(), 1);
        assert_eq!(table.version_of("asyn").as_deref(), Some("4.2"));
    }

    #[test]
    fn test_list_keeps_load_order() {
        let table = LoadTable::new();
        for name in ["c", "b", "a"] {
            table.insert(record(name, "1"));
        }
        let names: Vec<_> = table.list().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_matching_filters_by_substring() {
        let table = LoadTable::new();
        table.insert(record("asyn", "4.2"));
        table.insert(record("motor", "6.9"));
        table.insert(record("asynMotor", "1.0"));
        let names: Vec<_> = table.matching("asyn").into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["asyn", "asynMotor"]);
        assert!(table.matching("calc").is_empty());
    }

    #[test]
    fn test_record_serializes_for_reports() {
        let value = serde_json::to_value(record("asyn", "4.2")).unwrap();
        assert_eq!(value["name"], "asyn");
        assert_eq!(value["version"], "4.2");
        assert!(value["loaded_at"].is_string());
    }
}
