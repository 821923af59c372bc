//! Soft diagnostics produced while building a snapshot.
//!
//! A diagnostic never aborts a rebuild. Rejected records are logged at `warn`
//! level, duplicates and missing optional data at `info`.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The record's owner project is not registered; the record was dropped.
    OrphanedRecord,
    /// A required field is missing; the record was dropped.
    MalformedRecord,
    /// An optional field is missing; the record was registered anyway.
    MissingOptionalField,
    /// A typekit record exists but its project declares no typekit; dropped.
    ProjectWithoutTypekit,
    /// A second record names an already registered project; ignored.
    DuplicateProject,
    /// A task model was claimed again; the later library now owns it.
    DuplicateTaskModel,
    /// A type name was registered again; ownership kept by the first typekit.
    DuplicateType,
}

impl DiagnosticKind {
    /// Returns `true` if the record that produced this diagnostic was dropped.
    pub fn rejects_record(&self) -> bool {
        matches!(
            self,
            Self::OrphanedRecord | Self::MalformedRecord | Self::ProjectWithoutTypekit
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrphanedRecord => "orphaned-record",
            Self::MalformedRecord => "malformed-record",
            Self::MissingOptionalField => "missing-optional-field",
            Self::ProjectWithoutTypekit => "project-without-typekit",
            Self::DuplicateProject => "duplicate-project",
            Self::DuplicateTaskModel => "duplicate-task-model",
            Self::DuplicateType => "duplicate-type",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One soft problem found during a rebuild.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Name of the record being processed.
    pub record: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, record: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            record: record.into(),
            message: message.into(),
        }
    }

    /// Log the diagnostic at the level its kind calls for.
    pub fn log(&self) {
        if self.kind.rejects_record() {
            warn!(kind = %self.kind, record = %self.record, "{}", self.message);
        } else {
            info!(kind = %self.kind, record = %self.record, "{}", self.message);
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.record, self.message)
    }
}
