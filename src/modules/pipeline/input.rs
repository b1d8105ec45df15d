use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::shared::errors::{AppError, AppResult};

/// One candidate pack: `creatorHandle|rkey`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputLine {
    pub creator_handle: String,
    pub rkey: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputLineError {
    #[error("blank line")]
    Blank,
    #[error("invalid line format (expected handle|rkey): {0}")]
    MissingDelimiter(String),
    #[error("missing handle or rkey in line: {0}")]
    MissingField(String),
}

impl InputLine {
    pub fn parse(raw: &str) -> Result<Self, InputLineError> {
        let line = raw.trim();
        if line.is_empty() {
            return Err(InputLineError::Blank);
        }

        let mut fields = line.split('|').map(str::trim);
        let (Some(creator_handle), Some(rkey)) = (fields.next(), fields.next()) else {
            return Err(InputLineError::MissingDelimiter(line.to_string()));
        };

        if creator_handle.is_empty() || rkey.is_empty() {
            return Err(InputLineError::MissingField(line.to_string()));
        }

        Ok(Self {
            creator_handle: creator_handle.to_string(),
            rkey: rkey.to_string(),
        })
    }
}

/// Every raw line of the input file, in order. A missing file is a setup error.
pub fn read_input_lines(path: &Path) -> AppResult<Vec<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content.lines().map(str::to_string).collect()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(AppError::ConfigError(format!(
            "Input file {} not found",
            path.display()
        ))),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trimmed_fields() {
        let line = InputLine::parse("  alice.test | abc123 ").unwrap();
        assert_eq!(line.creator_handle, "alice.test");
        assert_eq!(line.rkey, "abc123");
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!(InputLine::parse("   "), Err(InputLineError::Blank));
        assert!(matches!(
            InputLine::parse("invalidline"),
            Err(InputLineError::MissingDelimiter(_))
        ));
        assert!(matches!(
            InputLine::parse("alice.test|"),
            Err(InputLineError::MissingField(_))
        ));
        assert!(matches!(
            InputLine::parse("|abc123"),
            Err(InputLineError::MissingField(_))
        ));
    }

    #[test]
    fn extra_fields_are_ignored() {
        let line = InputLine::parse("alice.test|abc123|note").unwrap();
        assert_eq!(line.rkey, "abc123");
    }

    #[test]
    fn missing_input_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_input_lines(&dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }

    #[test]
    fn keeps_blank_lines_for_indexing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.txt");
        fs::write(&path, "a|1\n\nb|2\n").unwrap();
        assert_eq!(read_input_lines(&path).unwrap(), vec!["a|1", "", "b|2"]);
    }
}
