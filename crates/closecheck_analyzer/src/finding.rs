//! The kinds of lifecycle violation the rule reports.

use closecheck_diagnostics::{messages, DiagnosticMessage};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FindingKind {
    /// The statement after the declaration is not an `if` testing the error.
    UnhandledError,
    /// No `x.Close()` follows in the same block.
    ResourceNotClosed,
    /// More than one `x.Close()` follows in the same block.
    ResourceDoubleClosed,
}

impl FindingKind {
    pub fn message(self) -> &'static DiagnosticMessage {
        match self {
            FindingKind::UnhandledError => &messages::ERROR_0_NOT_CHECKED_IMMEDIATELY,
            FindingKind::ResourceNotClosed => &messages::_0_CLOSE_NOT_CALLED,
            FindingKind::ResourceDoubleClosed => &messages::_0_CLOSE_CALLED_MULTIPLE_TIMES,
        }
    }

    pub fn code(self) -> u32 {
        self.message().code
    }

    /// Map a diagnostic code back to its finding kind.
    pub fn from_code(code: u32) -> Option<FindingKind> {
        [
            FindingKind::UnhandledError,
            FindingKind::ResourceNotClosed,
            FindingKind::ResourceDoubleClosed,
        ]
        .into_iter()
        .find(|kind| kind.code() == code)
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FindingKind::UnhandledError => "unhandled-error",
            FindingKind::ResourceNotClosed => "resource-not-closed",
            FindingKind::ResourceDoubleClosed => "resource-double-closed",
        };
        write!(f, "{}", name)
    }
}
