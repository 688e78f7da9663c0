//! Failure kinds of a configuration build.
//!
//! Every stage of the pipeline returns [`BuildError`]. None of them is
//! recoverable inside a build: the caller gets the error and the active
//! configuration stays as it was.

use polars::prelude::PolarsError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A raw value failed the type, range or pattern check of a single parameter.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid value '{value}' for --{parameter}: {reason}")]
pub struct ValidationError {
    /// Parameter name as it appears on the flag surface
    pub parameter: String,
    /// The offending raw value
    pub value: String,
    /// Why the value was rejected, including the valid range or set
    pub reason: String,
}

impl ValidationError {
    pub(crate) fn new(parameter: &str, value: &str, reason: impl Into<String>) -> Self {
        Self {
            parameter: parameter.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// A directive names a parameter the registry does not know.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown directive --{name}")]
pub struct UnknownDirectiveError {
    pub name: String,
}

/// A build request names a preset that is not in the preset book.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown preset '{name}' (available: {available})")]
pub struct UnknownPresetError {
    pub name: String,
    pub available: String,
}

/// A cross-field invariant does not hold after derivation.
#[derive(Error, Debug, Clone, PartialEq)]
pub struct ConsistencyError {
    /// Names of every field involved in the violation
    pub fields: Vec<String>,
    pub reason: String,
}

impl ConsistencyError {
    pub(crate) fn new(fields: &[&str], reason: impl Into<String>) -> Self {
        Self {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            reason: reason.into(),
        }
    }

    /// Whether `field` is one of the offending fields.
    pub fn involves(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }
}

impl fmt::Display for ConsistencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "inconsistent configuration [{fields}]: {reason}",
            fields = self.fields.join(", "),
            reason = self.reason
        )
    }
}

/// Any failure that aborts a configuration build.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    UnknownDirective(#[from] UnknownDirectiveError),
    #[error(transparent)]
    UnknownPreset(#[from] UnknownPresetError),
    #[error(transparent)]
    Consistency(#[from] ConsistencyError),
}

/// Failure while writing a table to disk.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_input() {
        let err = BuildError::from(ValidationError::new("dpi", "50", "must be within [72, 1200]"));
        assert_eq!(
            err.to_string(),
            "invalid value '50' for --dpi: must be within [72, 1200]"
        );

        let err = BuildError::from(ConsistencyError::new(
            &["min-pore-radius", "max-pore-radius"],
            "0.08 >= 0.03",
        ));
        assert_eq!(
            err.to_string(),
            "inconsistent configuration [min-pore-radius, max-pore-radius]: 0.08 >= 0.03"
        );
    }

    #[test]
    fn consistency_error_reports_fields() {
        let err = ConsistencyError::new(&["dpi"], "out of range");
        assert!(err.involves("dpi"));
        assert!(!err.involves("alpha"));
    }
}
