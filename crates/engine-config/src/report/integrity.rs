use crate::report::failure::Failure;
use model::core::digest::Digest;
use serde::Serialize;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Passed,
    Mismatch,
    Failed,
    Incomplete,
}

/// Outcome of one integrity check. Counts and checksums are compared
/// independently and both are always reported.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct IntegrityResult {
    pub name: String,
    pub source_count: Option<u64>,
    pub target_count: Option<u64>,
    pub source_checksum: Option<Digest>,
    pub target_checksum: Option<Digest>,
    pub counts_match: bool,
    pub checksums_match: bool,
    pub status: CheckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<Failure>,
}

impl IntegrityResult {
    /// Derives both match flags and the status from the observed values.
    /// A missing value on either side never matches.
    pub fn compare(
        name: impl Into<String>,
        source_count: Option<u64>,
        target_count: Option<u64>,
        source_checksum: Option<Digest>,
        target_checksum: Option<Digest>,
        failure: Option<Failure>,
    ) -> Self {
        let counts_match = matches!((source_count, target_count), (Some(s), Some(t)) if s == t);
        let checksums_match =
            matches!((source_checksum, target_checksum), (Some(s), Some(t)) if s == t);

        let status = match &failure {
            Some(f) if f.is_cancellation() => CheckStatus::Incomplete,
            Some(_) => CheckStatus::Failed,
            None if counts_match && checksums_match => CheckStatus::Passed,
            None => CheckStatus::Mismatch,
        };

        IntegrityResult {
            name: name.into(),
            source_count,
            target_count,
            source_checksum,
            target_checksum,
            counts_match,
            checksums_match,
            status,
            failure,
        }
    }

    /// Placeholder for a check that never ran to completion.
    pub fn incomplete(name: impl Into<String>, failure: Failure) -> Self {
        Self::compare(name, None, None, None, None, Some(failure))
    }

    pub fn passed(&self) -> bool {
        self.status == CheckStatus::Passed
    }
}
