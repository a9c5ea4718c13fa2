use chrono::{DateTime, Utc};

use crate::models::{Assignment, Status, Submission, WorkflowState};

/// Derives the workflow status of an assignment from its due date and the
/// student's submission. Unknown vendor states fall back to the due-date rule.
pub fn classify(
    assignment: &Assignment,
    submission: Option<&Submission>,
    now: DateTime<Utc>,
) -> Status {
    let is_past_due = assignment.due_at.is_some_and(|due| now > due);
    let fallback = if is_past_due {
        Status::Missing
    } else {
        Status::NotStarted
    };

    match submission.and_then(Submission::state) {
        None => fallback,
        Some(WorkflowState::Submitted | WorkflowState::Graded) => Status::Completed,
        Some(WorkflowState::PendingReview) => Status::InProgress,
        Some(WorkflowState::Unsubmitted | WorkflowState::Unknown(_)) => fallback,
    }
}
