//! Database definition loading.
//!
//! The host process owns the record database; modules only hand it their
//! database file through [`DatabaseLoader`].

use std::path::Path;

/// Loads a module's database definition file into the host database.
pub trait DatabaseLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<(), String>;
}

impl<F> DatabaseLoader for F
where
    F: Fn(&Path) -> Result<(), String> + Send + Sync,
{
    fn load(&self, path: &Path) -> Result<(), String> {
        self(path)
    }
}

/// Reads a database file and rejects it when its quotes, parentheses or
/// braces do not balance. Used where no host database is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct DbdFileLoader;

impl DbdFileLoader {
    pub fn new() -> Self {
        Self
    }
}

impl DatabaseLoader for DbdFileLoader {
    fn load(&self, path: &Path) -> Result<(), String> {
        let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
        let definitions = check_balanced(&text)?;
        tracing::debug!(
            "{}: {} top-level definitions",
            path.display(),
            definitions
        );
        Ok(())
    }
}

/// Count top-level definitions, failing on unbalanced delimiters.
fn check_balanced(text: &str) -> Result<usize, String> {
    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut definitions = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (number, line) in text.lines().enumerate() {
        let number = number + 1;
        for c in line.chars() {
            if in_string {
                match c {
                    _ if escaped => escaped = false,
                    '\\' => escaped = true,
                    '"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match c {
                '#' => break,
                '"' => in_string = true,
                '(' | '{' => {
                    if c == '(' && stack.is_empty() {
                        definitions += 1;
                    }
                    stack.push((c, number));
                }
                ')' | '}' => {
                    let open = if c == ')' { '(' } else { '{' };
                    match stack.pop() {
                        Some((o, _)) if o == open => {}
                        Some((o, at)) => {
                            return Err(format!(
                                "line {}: '{}' does not close '{}' from line {}",
                                number, c, o, at
                            ))
                        }
                        None => return Err(format!("line {}: unexpected '{}'", number, c)),
                    }
                }
                _ => {}
            }
        }
        if in_string {
            return Err(format!("line {}: unterminated string", number));
        }
    }

    match stack.last() {
        Some((open, at)) => Err(format!("'{}' from line {} is never closed", open, at)),
        None => Ok(definitions),
    }
}
