//! Named commands exposed to an interactive shell.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::diagnostics;
use crate::error::{RequireError, Result};
use crate::require::Requirer;

/// Command handler. Receives the arguments after the command name and returns
/// text to show the user, possibly empty.
pub type Handler = Box<dyn Fn(&[&str]) -> Result<String> + Send + Sync>;

struct Command {
    args: &'static [&'static str],
    handler: Handler,
}

/// Table of shell commands.
#[derive(Default)]
pub struct CommandTable {
    commands: HashMap<String, Command>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with `require`, `libversionShow` and `ld` bound to `requirer`.
    pub fn with_loader_commands(requirer: Arc<Requirer>) -> Self {
        let mut table = Self::new();

        let r = requirer.clone();
        table.register("require", &["module", "version"], move |args| {
            let module = args.first().copied().unwrap_or("");
            let version = args.get(1).copied().unwrap_or("");
            if module.is_empty() {
                let config = r.loader().config();
                tracing::info!(
                    "{}",
                    diagnostics::require_usage(&config.convention, &config.search_path.current())
                );
            }
            r.require(module, version)?;
            Ok(String::new())
        });

        let r = requirer.clone();
        table.register("libversionShow", &["pattern"], move |args| {
            let table = r.loader().table();
            Ok(diagnostics::libversion_show(&table, args.first().copied()))
        });

        let r = requirer;
        table.register("ld", &["library"], move |args| {
            let library = args
                .first()
                .filter(|a| !a.is_empty())
                .ok_or_else(|| RequireError::InvalidArguments("missing library name".into()))?;
            r.loader().load_library(Path::new(library))?;
            Ok(String::new())
        });

        table
    }

    /// Register a command. The first registration of a name wins.
    pub fn register<F>(&mut self, name: &str, args: &'static [&'static str], handler: F) -> bool
    where
        F: Fn(&[&str]) -> Result<String> + Send + Sync + 'static,
    {
        if self.commands.contains_key(name) {
            return false;
        }
        self.commands.insert(
            name.to_string(),
            Command {
                args,
                handler: Box::new(handler),
            },
        );
        true
    }

    /// Run command `name` with `args`.
    pub fn dispatch(&self, name: &str, args: &[&str]) -> Result<String> {
        let command = self
            .commands
            .get(name)
            .ok_or_else(|| RequireError::UnknownCommand(name.to_string()))?;
        if args.len() > command.args.len() {
            return Err(RequireError::InvalidArguments(format!(
                "{} takes at most {} arguments ({}), got {}",
                name,
                command.args.len(),
                command.args.join(", "),
                args.len()
            )));
        }
        (command.handler)(args)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Registered command names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_registration_wins() {
        let mut table = CommandTable::new();
        assert!(table.register("echo", &["text"], |args| Ok(args.join(" "))));
        assert!(!table.register("echo", &["text"], |_| Ok("other".into())));
        assert_eq!(table.dispatch("echo", &["hi"]).unwrap(), "hi");
    }

    #[test]
    fn test_unknown_command() {
        let table = CommandTable::new();
        assert!(matches!(
            table.dispatch("nope", &[]),
            Err(RequireError::UnknownCommand(_))
        ));
    }

    #[test]
    fn test_too_many_arguments() {
        let mut table = CommandTable::new();
        table.register("one", &["a"], |_| Ok(String::new()));
        assert!(matches!(
            table.dispatch("one", &["x", "y"]),
            Err(RequireError::InvalidArguments(_))
        ));
    }
}
