//! Optimistic concurrency expectations for stored documents.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Revision a write expects the target document to be at.
///
/// Revision `0` denotes a document that does not exist, so `Exact(0)` is a
/// create-only write.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpectedVersion {
    /// Skip revision checking (last write wins).
    Any,
    /// Require the document to be at an exact revision.
    Exact(u64),
}

impl ExpectedVersion {
    /// Expectation for a document that must not exist yet.
    pub const ABSENT: ExpectedVersion = ExpectedVersion::Exact(0);

    pub fn matches(self, actual: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(v) => v == actual,
        }
    }

    pub fn check(self, actual: u64) -> DomainResult<()> {
        if self.matches(actual) {
            Ok(())
        } else {
            Err(DomainError::conflict(format!(
                "optimistic concurrency check failed (expected: {self:?}, actual: {actual})"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_matches_every_revision() {
        assert!(ExpectedVersion::Any.matches(0));
        assert!(ExpectedVersion::Any.matches(42));
    }

    #[test]
    fn absent_only_matches_zero() {
        assert!(ExpectedVersion::ABSENT.matches(0));
        assert!(!ExpectedVersion::ABSENT.matches(1));
    }

    #[test]
    fn check_reports_conflict_on_mismatch() {
        let err = ExpectedVersion::Exact(3).check(4).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert!(ExpectedVersion::Exact(4).check(4).is_ok());
    }
}
