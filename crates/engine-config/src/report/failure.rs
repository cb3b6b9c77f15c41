use serde::Serialize;
use std::fmt;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Connection,
    Query,
    Timeout,
    Checksum,
    Cancelled,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::Connection => "connection",
            FailureKind::Query => "query",
            FailureKind::Timeout => "timeout",
            FailureKind::Checksum => "checksum",
            FailureKind::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Source,
    Target,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Source => f.write_str("source"),
            Side::Target => f.write_str("target"),
        }
    }
}

/// Why a single check or benchmark could not produce a clean result.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub side: Side,
    pub message: String,
}

impl Failure {
    pub fn new(kind: FailureKind, side: Side, message: impl Into<String>) -> Self {
        Failure {
            kind,
            side,
            message: message.into(),
        }
    }

    pub fn cancelled(side: Side) -> Self {
        Self::new(FailureKind::Cancelled, side, "run interrupted before completion")
    }

    /// Cancelled work is reported as incomplete rather than failed.
    pub fn is_cancellation(&self) -> bool {
        self.kind == FailureKind::Cancelled
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} failure: {}", self.side, self.kind, self.message)
    }
}
