//! Human-readable listings of loader state.

use crate::config::{symbols, NamingConvention};
use crate::table::{LoadTable, LoadedModule};

/// One listing line: the module name right-aligned in 15 columns, then its
/// version.
pub fn format_module(record: &LoadedModule) -> String {
    format!("{:>15} {}", record.name, record.version)
}

/// Loaded modules whose name contains `pattern` (all when `None`), one per
/// line in load order.
pub fn libversion_show(table: &LoadTable, pattern: Option<&str>) -> String {
    let records = match pattern.filter(|p| !p.is_empty()) {
        Some(pattern) => table.matching(pattern),
        None => table.list(),
    };
    records
        .iter()
        .map(format_module)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Usage text for the `require` command.
pub fn require_usage(convention: &NamingConvention, search_path: &str) -> String {
    format!(
        "Usage: require \"<module>\" [, \"<version>\"]\n\
         Loads {}<module>{}[-<version>]{} and dbd/<module>[-<version>].dbd\n\
         And calls {}\n\
         Search path is {}",
        convention.prefix,
        convention.infix,
        convention.extension,
        symbols::registration("<module>"),
        search_path
    )
}
