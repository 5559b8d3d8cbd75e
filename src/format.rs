//! Parses an examples file into labeled valid/invalid strings.
//!
//! Two line formats are supported: the default `+`/`-` prefix format, and
//! `--resnax`'s tab-separated `valid\tinvalid` row format (spec.md §4.I /
//! the original implementation's `--resnax` batch mode).

use crate::error::ExampleFormatError;

#[derive(Debug, Clone, Default)]
pub struct Examples {
    pub valid: Vec<String>,
    pub invalid: Vec<String>,
}

/// Parse the default format: every non-blank line begins with `+`
/// (followed by a valid example) or `-` (an invalid one).
pub fn parse_default(text: &str) -> Result<Examples, ExampleFormatError> {
    let mut examples = Examples::default();
    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix('+') {
            examples.valid.push(rest.to_string());
        } else if let Some(rest) = line.strip_prefix('-') {
            examples.invalid.push(rest.to_string());
        } else {
            return Err(ExampleFormatError::UnrecognizedLine {
                line_no: i + 1,
                text: line.to_string(),
            });
        }
    }
    if examples.valid.is_empty() {
        return Err(ExampleFormatError::NoValidExamples);
    }
    Ok(examples)
}

/// Parse `--resnax` format: every non-blank line is `valid\tinvalid`,
/// either column optionally empty.
pub fn parse_resnax(text: &str) -> Result<Examples, ExampleFormatError> {
    let mut examples = Examples::default();
    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let mut cols = line.splitn(2, '\t');
        let (valid, invalid) = match (cols.next(), cols.next()) {
            (Some(v), Some(inv)) => (v, inv),
            _ => return Err(ExampleFormatError::MalformedResnaxRow { line_no: i + 1 }),
        };
        if !valid.is_empty() {
            examples.valid.push(valid.to_string());
        }
        if !invalid.is_empty() {
            examples.invalid.push(invalid.to_string());
        }
    }
    if examples.valid.is_empty() {
        return Err(ExampleFormatError::NoValidExamples);
    }
    Ok(examples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_format_splits_on_prefix() {
        let text = "+abc\n-def\n+ghi\n";
        let examples = parse_default(text).unwrap();
        assert_eq!(examples.valid, vec!["abc", "ghi"]);
        assert_eq!(examples.invalid, vec!["def"]);
    }

    #[test]
    fn default_format_rejects_unprefixed_lines() {
        let err = parse_default("abc\n").unwrap_err();
        assert!(matches!(err, ExampleFormatError::UnrecognizedLine { line_no: 1, .. }));
    }

    #[test]
    fn default_format_requires_at_least_one_valid_example() {
        let err = parse_default("-abc\n").unwrap_err();
        assert_eq!(err, ExampleFormatError::NoValidExamples);
    }

    #[test]
    fn resnax_format_splits_on_tab() {
        let text = "abc\tdef\nghi\t\n";
        let examples = parse_resnax(text).unwrap();
        assert_eq!(examples.valid, vec!["abc", "ghi"]);
        assert_eq!(examples.invalid, vec!["def"]);
    }

    #[test]
    fn resnax_format_rejects_rows_without_a_tab() {
        let err = parse_resnax("abc\n").unwrap_err();
        assert!(matches!(err, ExampleFormatError::MalformedResnaxRow { line_no: 1 }));
    }
}
