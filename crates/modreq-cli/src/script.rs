//! Startup script lines.
//!
//! Accepts the usual shell spellings of a command:
//! `require asyn 4.2`, `require asyn, 4.2`, `require("asyn", "4.2")`.

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub name: String,
    pub args: Vec<String>,
}

/// Parse one script line. Blank and `#` comment lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Invocation>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let name_end = line
        .find(|c: char| c.is_whitespace() || c == '(')
        .unwrap_or(line.len());
    let name = &line[..name_end];
    let mut rest = line[name_end..].trim();
    if let Some(inner) = rest.strip_prefix('(') {
        rest = inner
            .strip_suffix(')')
            .ok_or_else(|| format!("missing ')' in: {}", line))?;
    }

    Ok(Some(Invocation {
        name: name.to_string(),
        args: split_args(rest)?,
    }))
}

fn split_args(text: &str) -> Result<Vec<String>, String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in text.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if !in_quotes && (c == ',' || c.is_whitespace()) => {
                if has_token {
                    args.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if in_quotes {
        return Err(format!("unterminated string in: {}", text));
    }
    if has_token {
        args.push(current);
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Invocation {
        parse_line(line).unwrap().unwrap()
    }

    #[test]
    fn test_spellings() {
        let expected = Invocation {
            name: "require".into(),
            args: vec!["asyn".into(), "4.2".into()],
        };
        assert_eq!(parse("require asyn 4.2"), expected);
        assert_eq!(parse("require asyn, 4.2"), expected);
        assert_eq!(parse("require(\"asyn\", \"4.2\")"), expected);
        assert_eq!(parse("  require \"asyn\" \"4.2\"  "), expected);
    }

    #[test]
    fn test_no_arguments_and_comments() {
        assert_eq!(parse("iocInit").args, Vec::<String>::new());
        assert_eq!(parse_line("# require asyn").unwrap(), None);
        assert_eq!(parse_line("   ").unwrap(), None);
    }

    #[test]
    fn test_empty_quoted_argument_is_kept() {
        assert_eq!(parse("require m, \"\"").args, vec!["m", ""]);
    }

    #[test]
    fn test_malformed_lines() {
        assert!(parse_line("require(\"asyn\"").is_err());
        assert!(parse_line("require \"asyn").is_err());
    }
}
