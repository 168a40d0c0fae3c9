//! Statement splitter - cuts a script into batches on separator lines
//!
//! A separator is a line holding nothing but the separator token (default
//! `GO`), compared case-insensitively and ignoring surrounding whitespace.
//! Everything between separators is one statement.

use regex::{Regex, Split};

use crate::domain::result::{Error, Result};

/// Default batch terminator
pub const DEFAULT_SEPARATOR: &str = "GO";

/// Compiled separator pattern, reusable across every script in a run
#[derive(Debug, Clone)]
pub struct StatementSplitter {
    separator: String,
    pattern: Regex,
}

impl StatementSplitter {
    /// Build a splitter for `separator`
    ///
    /// The token is matched literally; regex metacharacters carry no meaning.
    pub fn new(separator: &str) -> Result<Self> {
        let separator = separator.trim();
        if separator.is_empty() {
            return Err(Error::configuration("statement separator is empty"));
        }

        // [^\S\n] is horizontal whitespace plus \r, so CRLF lines match too
        let pattern = Regex::new(&format!(
            r"(?im)^[^\S\n]*{}[^\S\n]*$",
            regex::escape(separator)
        ))
        .map_err(|e| Error::configuration(format!("invalid statement separator: {}", e)))?;

        Ok(Self {
            separator: separator.to_string(),
            pattern,
        })
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Statements of `text`, in order, trimmed, blanks dropped
    pub fn split<'r, 't>(&'r self, text: &'t str) -> Statements<'r, 't> {
        Statements {
            pattern: &self.pattern,
            text,
        }
    }
}

/// Lazy statement sequence over one script
///
/// Nothing is split until iterated. The value is `Copy`, so iterating it a
/// second time starts again from the first statement.
#[derive(Debug, Clone, Copy)]
pub struct Statements<'r, 't> {
    pattern: &'r Regex,
    text: &'t str,
}

impl<'r, 't> Statements<'r, 't> {
    pub fn iter(&self) -> StatementIter<'r, 't> {
        StatementIter {
            inner: self.pattern.split(self.text),
        }
    }

    /// True when the script yields no statements at all
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

impl<'r, 't> IntoIterator for Statements<'r, 't> {
    type Item = &'t str;
    type IntoIter = StatementIter<'r, 't>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator returned by [`Statements::iter`]
#[derive(Debug)]
pub struct StatementIter<'r, 't> {
    inner: Split<'r, 't>,
}

impl<'t> Iterator for StatementIter<'_, 't> {
    type Item = &'t str;

    fn next(&mut self) -> Option<&'t str> {
        self.inner.by_ref().map(str::trim).find(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split_all(separator: &str, text: &str) -> Vec<String> {
        let splitter = StatementSplitter::new(separator).unwrap();
        splitter.split(text).iter().map(str::to_string).collect()
    }

    #[test]
    fn test_splits_on_separator_line() {
        assert_eq!(
            split_all("GO", "select 1\nGO\nselect 2"),
            vec!["select 1", "select 2"]
        );
    }

    #[test]
    fn test_no_separator_is_one_statement() {
        assert_eq!(
            split_all("GO", "create table t (id int);\ninsert into t values (1);"),
            vec!["create table t (id int);\ninsert into t values (1);"]
        );
    }

    #[test]
    fn test_whitespace_only_is_empty() {
        let splitter = StatementSplitter::new(DEFAULT_SEPARATOR).unwrap();
        assert!(splitter.split("  \n\t\n  ").is_empty());
        assert!(splitter.split("").is_empty());
        assert!(splitter.split("GO\n  go  \nGO").is_empty());
    }

    #[test]
    fn test_separator_is_case_insensitive_and_trimmed() {
        assert_eq!(
            split_all("GO", "select 1\n   go   \nselect 2\n\tGo\nselect 3"),
            vec!["select 1", "select 2", "select 3"]
        );
    }

    #[test]
    fn test_separator_inside_a_line_is_not_a_boundary() {
        assert_eq!(
            split_all("GO", "select 'GO' as x\nGOTO label\nselect 1 -- GO"),
            vec!["select 'GO' as x\nGOTO label\nselect 1 -- GO"]
        );
    }

    #[test]
    fn test_crlf_line_endings() {
        assert_eq!(
            split_all("GO", "select 1\r\nGO\r\nselect 2\r\n"),
            vec!["select 1", "select 2"]
        );
    }

    #[test]
    fn test_leading_and_trailing_separators_drop_blanks() {
        assert_eq!(
            split_all("GO", "GO\nselect 1\nGO\n\nGO\nselect 2\nGO\n"),
            vec!["select 1", "select 2"]
        );
    }

    #[test]
    fn test_custom_separator_is_literal() {
        assert_eq!(split_all(";;", "select 1\n;;\nselect 2"), vec!["select 1", "select 2"]);
        // "." must not act as a wildcard
        assert_eq!(split_all(".", "select 1\nx\nselect 2"), vec!["select 1\nx\nselect 2"]);
    }

    #[test]
    fn test_sequence_is_restartable() {
        let splitter = StatementSplitter::new(DEFAULT_SEPARATOR).unwrap();
        let statements = splitter.split("a\nGO\nb");
        let first: Vec<&str> = statements.iter().collect();
        let second: Vec<&str> = statements.into_iter().collect();
        assert_eq!(first, vec!["a", "b"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_blank_separator_is_rejected() {
        assert!(matches!(
            StatementSplitter::new("  "),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_separator_is_stored_trimmed() {
        assert_eq!(StatementSplitter::new(" go ").unwrap().separator(), "go");
    }
}
