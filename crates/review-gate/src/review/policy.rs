//! Comment/reason policy: every path that lands on a rejection must carry a
//! non-empty justification before the change commits.

use serde::{Deserialize, Serialize};
use tracing::error;

use super::item::{ItemId, ReviewStatus};
use super::set::{ReviewSet, ValidationError};

/// Response to a rejected item found without a comment outside the guarded path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvariantMode {
    /// Treat it as a programming error and abort.
    Panic,
    /// Log it and force the item back to pending.
    Heal,
}

/// Trimmed justification, or `CommentRequired` when nothing usable was given.
pub fn require_justification(text: Option<&str>) -> Result<String, ValidationError> {
    text.map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .ok_or(ValidationError::CommentRequired)
}

/// Comment to store alongside `status`, if any. Rejections must pass the policy.
pub(crate) fn comment_for(
    status: ReviewStatus,
    comment: Option<&str>,
) -> Result<Option<String>, ValidationError> {
    if status == ReviewStatus::Rejected {
        return require_justification(comment).map(Some);
    }
    Ok(comment
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string))
}

/// Find rejections without a comment and apply `mode` to them.
///
/// Returns the ids that were forced back to pending.
pub(crate) fn enforce_justifications(set: &mut ReviewSet, mode: InvariantMode) -> Vec<ItemId> {
    let offenders: Vec<ItemId> = set
        .items()
        .iter()
        .filter(|item| !item.is_justified())
        .map(|item| item.id().clone())
        .collect();

    if offenders.is_empty() {
        return offenders;
    }

    if mode == InvariantMode::Panic {
        panic!("rejected items without justification: {offenders:?}");
    }

    for id in &offenders {
        error!(item = %id, "rejected item carried no justification; resetting to pending");
        set.force_pending(id);
    }
    offenders
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn justification_is_trimmed_and_required() {
        assert_eq!(
            require_justification(Some("  blurry scan ")),
            Ok("blurry scan".to_string())
        );
        assert_eq!(
            require_justification(Some(" \t ")),
            Err(ValidationError::CommentRequired)
        );
        assert_eq!(
            require_justification(None),
            Err(ValidationError::CommentRequired)
        );
    }

    #[test]
    fn non_rejections_keep_optional_comment() {
        assert_eq!(comment_for(ReviewStatus::Approved, None), Ok(None));
        assert_eq!(comment_for(ReviewStatus::Pending, Some("  ")), Ok(None));
        assert_eq!(
            comment_for(ReviewStatus::Approved, Some("matches bank record")),
            Ok(Some("matches bank record".to_string()))
        );
        assert!(comment_for(ReviewStatus::Rejected, Some("")).is_err());
    }
}
