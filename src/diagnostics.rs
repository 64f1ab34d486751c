//! Diagnostic events raised while reading snapshots
//!
//! The params core never logs directly. Recoverable problems (a malformed
//! file, an unsupported suffix) are reported as a [`Diagnostic`] to a
//! caller-supplied [`DiagnosticObserver`] and processing continues.

use std::fmt;

use log::debug;

use crate::brancher::SnapshotId;
use crate::path::FileLocation;

/// A recoverable problem encountered during aggregation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A parameters file exists but could not be read or parsed.
    ReadFailed {
        snapshot: SnapshotId,
        location: FileLocation,
        message: String,
    },
    /// The file suffix maps to no known format.
    UnsupportedFormat {
        snapshot: SnapshotId,
        location: FileLocation,
        suffix: String,
    },
    /// The workspace result matched the active snapshot and was hidden.
    WorkspaceHidden { active: SnapshotId },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ReadFailed {
                snapshot,
                location,
                message,
            } => write!(f, "failed to read '{}' on '{}': {}", location, snapshot, message),
            Diagnostic::UnsupportedFormat {
                snapshot,
                location,
                suffix,
            } => write!(
                f,
                "skipping '{}' on '{}': unsupported format '{}'",
                location, snapshot, suffix
            ),
            Diagnostic::WorkspaceHidden { active } => {
                write!(f, "workspace params are identical to '{}', hiding them", active)
            }
        }
    }
}

/// Receives diagnostics from the params core.
pub trait DiagnosticObserver {
    fn observe(&self, diagnostic: Diagnostic);
}

/// Discards every diagnostic.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl DiagnosticObserver for NoopObserver {
    fn observe(&self, _diagnostic: Diagnostic) {}
}

/// Forwards diagnostics to the `log` facade at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl DiagnosticObserver for LogObserver {
    fn observe(&self, diagnostic: Diagnostic) {
        debug!("{}", diagnostic);
    }
}
