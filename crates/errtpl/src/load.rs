//! Override source parsing.
//!
//! One definition per line:
//!
//! ```text
//! [NAMESPACE|]CODE=[ALIAS|]TEMPLATE
//!
//! 10001=test error
//! DB|42=Database|connection to {{.host}} lost
//! ```
//!
//! Blank lines are skipped. Only the first `|` on each side splits, so a
//! template may itself contain `|`. A template may not contain `=`.

use std::path::PathBuf;

use thiserror::Error;

use crate::codes::DEFAULT_NAMESPACE;
use crate::ErrorKey;

/// Failure to load an override source.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read override source {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: {reason}")]
    Syntax { line: usize, reason: SyntaxError },
}

impl LoadError {
    /// The 1-indexed offending line, for syntax errors.
    pub fn line(&self) -> Option<usize> {
        match self {
            LoadError::Io { .. } => None,
            LoadError::Syntax { line, .. } => Some(*line),
        }
    }

    pub fn reason(&self) -> Option<&SyntaxError> {
        match self {
            LoadError::Io { .. } => None,
            LoadError::Syntax { reason, .. } => Some(reason),
        }
    }
}

/// What is wrong with one override line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("column count != 2")]
    ColumnCount,
    #[error("namespace must not be empty before `|`")]
    EmptyNamespace,
    #[error("invalid code `{0}`")]
    InvalidCode(String),
    #[error("code must be > 0")]
    NonPositiveCode,
    #[error("{0} already exists")]
    Duplicate(ErrorKey),
    #[error("namespace {0} is reserved")]
    ReservedNamespace(String),
}

/// One parsed override line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideLine {
    pub namespace: String,
    pub alias: String,
    pub code: u64,
    pub template: String,
}

impl OverrideLine {
    pub fn key(&self) -> ErrorKey {
        ErrorKey::new(self.namespace.as_str(), self.code)
    }
}

/// Parse a single line. `Ok(None)` for blank lines.
pub fn parse_line(line: &str) -> Result<Option<OverrideLine>, SyntaxError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (left, right) = match line.split_once('=') {
        Some((left, right)) if !right.contains('=') => (left.trim(), right.trim()),
        _ => return Err(SyntaxError::ColumnCount),
    };

    let (namespace, code) = match left.split_once('|') {
        Some((namespace, code)) => (namespace.trim(), code.trim()),
        None => (DEFAULT_NAMESPACE, left),
    };
    if namespace.is_empty() {
        return Err(SyntaxError::EmptyNamespace);
    }

    let code: u64 = code
        .parse()
        .map_err(|_| SyntaxError::InvalidCode(code.to_string()))?;
    if code == 0 {
        return Err(SyntaxError::NonPositiveCode);
    }

    let (alias, template) = match right.split_once('|') {
        Some((alias, template)) if !alias.trim().is_empty() => (alias.trim(), template.trim()),
        Some((_, template)) => (namespace, template.trim()),
        None => (namespace, right),
    };

    Ok(Some(OverrideLine {
        namespace: namespace.to_string(),
        alias: alias.to_string(),
        code,
        template: template.to_string(),
    }))
}

/// Parse a whole source, yielding `(line_number, line)` pairs.
///
/// Stops at nothing: each item carries its own result so the caller can
/// decide how far to apply. Line numbers are 1-indexed.
pub fn parse_source(text: &str) -> impl Iterator<Item = (usize, Result<OverrideLine, SyntaxError>)> + '_ {
    text.split('\n')
        .enumerate()
        .filter_map(|(index, line)| match parse_line(line) {
            Ok(None) => None,
            Ok(Some(parsed)) => Some((index + 1, Ok(parsed))),
            Err(reason) => Some((index + 1, Err(reason))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ok(line: &str) -> OverrideLine {
        parse_line(line).unwrap().unwrap()
    }

    #[test]
    fn blank_lines_are_skipped() {
        assert_eq!(parse_line(""), Ok(None));
        assert_eq!(parse_line("   \t\r"), Ok(None));
    }

    #[test]
    fn code_only() {
        let line = ok("10001=test error");
        assert_eq!(line.namespace, "ERR");
        assert_eq!(line.alias, "ERR");
        assert_eq!(line.code, 10001);
        assert_eq!(line.template, "test error");
    }

    #[test]
    fn namespace_and_alias() {
        let line = ok(" DB | 42 = Database | connection to {{.host}} lost \r");
        assert_eq!(line.namespace, "DB");
        assert_eq!(line.alias, "Database");
        assert_eq!(line.code, 42);
        assert_eq!(line.template, "connection to {{.host}} lost");
        assert_eq!(line.key(), ErrorKey::new("DB", 42));
    }

    #[test]
    fn only_first_pipe_splits_template() {
        let line = ok("7=Alias|a | b | c");
        assert_eq!(line.alias, "Alias");
        assert_eq!(line.template, "a | b | c");
    }

    #[test]
    fn empty_alias_defaults_to_namespace() {
        let line = ok("GOOD|1=|haha error");
        assert_eq!(line.alias, "GOOD");
        assert_eq!(line.template, "haha error");
    }

    #[test]
    fn column_count() {
        assert_eq!(parse_line("10001 test error"), Err(SyntaxError::ColumnCount));
        assert_eq!(parse_line("1=a=b"), Err(SyntaxError::ColumnCount));
    }

    #[test]
    fn bad_codes() {
        assert_eq!(parse_line("0=zero"), Err(SyntaxError::NonPositiveCode));
        assert_eq!(parse_line("ERR|0=zero"), Err(SyntaxError::NonPositiveCode));
        assert_eq!(parse_line("-1=neg"), Err(SyntaxError::InvalidCode("-1".into())));
        assert_eq!(parse_line("abc=x"), Err(SyntaxError::InvalidCode("abc".into())));
        assert_eq!(parse_line("A|B|3=x"), Err(SyntaxError::InvalidCode("B|3".into())));
    }

    #[test]
    fn empty_namespace() {
        assert_eq!(parse_line("|3=x"), Err(SyntaxError::EmptyNamespace));
    }

    #[test]
    fn source_line_numbers_are_one_indexed() {
        let text = "1=a\n\n  \n2=b\r\nbroken\n";
        let items: Vec<_> = parse_source(text).collect();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].0, 1);
        assert_eq!(items[1].0, 4);
        assert_eq!(items[2], (5, Err(SyntaxError::ColumnCount)));
    }

    #[test]
    fn load_error_display() {
        let err = LoadError::Syntax { line: 3, reason: SyntaxError::NonPositiveCode };
        assert_eq!(err.to_string(), "line 3: code must be > 0");
        assert_eq!(err.line(), Some(3));
        let dup = SyntaxError::Duplicate(ErrorKey::new("ERR", 5));
        assert_eq!(dup.to_string(), "ERR#5 already exists");
    }

    proptest! {
        #[test]
        fn well_formed_lines_parse(
            namespace in "[A-Z]{1,8}",
            alias in "[A-Za-z]{1,8}",
            code in 1u64..u64::MAX,
            template in "[a-z {}.|]{0,30}",
        ) {
            let line = format!("{}|{}={}|{}", namespace, code, alias, template);
            let parsed = parse_line(&line).unwrap().unwrap();
            prop_assert_eq!(parsed.namespace, namespace);
            prop_assert_eq!(parsed.alias, alias);
            prop_assert_eq!(parsed.code, code);
            prop_assert_eq!(parsed.template, template.trim());
        }
    }
}
