//! Source locations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Where a declaration was written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLoc {
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub column: u32,
}

impl SourceLoc {
    pub fn new(file: impl Into<PathBuf>, line: u32, column: u32) -> Self {
        Self {
            file: Some(file.into()),
            line,
            column,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.file
            .as_ref()
            .is_some_and(|f| !f.as_os_str().is_empty())
    }
}

impl fmt::Display for SourceLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) if self.is_valid() => {
                write!(f, "{}:{}:{}", file.display(), self.line, self.column)
            }
            _ => f.write_str("<invalid loc>"),
        }
    }
}
