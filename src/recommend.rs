use chrono::{DateTime, Duration, Utc};

use crate::models::{EnrichedAssignment, PriorityTier, Recommendation, RecommendationKind, Status};

const WORKLOAD_THRESHOLD: usize = 5;
const HIGH_VALUE_POINTS: f64 = 50.0;
const WELLNESS_THRESHOLD: usize = 3;

/// Advisory messages for the current assignment set. Each rule is checked
/// on its own, so several may fire in the same pass.
pub fn recommend(assignments: &[EnrichedAssignment], now: DateTime<Utc>) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();
    let next_week = now + Duration::days(7);

    let upcoming: Vec<&EnrichedAssignment> = assignments
        .iter()
        .filter(|item| item.status != Status::Completed)
        .filter(|item| item.assignment.due_at.is_some_and(|due| due > now))
        .collect();

    let due_this_week = upcoming
        .iter()
        .filter(|item| item.assignment.due_at.is_some_and(|due| due <= next_week))
        .count();
    if due_this_week > WORKLOAD_THRESHOLD {
        recommendations.push(Recommendation {
            kind: RecommendationKind::Workload,
            message: format!(
                "You have {due_this_week} assignments due this week. Consider starting early!"
            ),
            tier: PriorityTier::High,
        });
    }

    let highest_value = upcoming
        .iter()
        .filter(|item| item.assignment.points() > HIGH_VALUE_POINTS)
        .fold(None::<&&EnrichedAssignment>, |best, item| match best {
            Some(current) if item.assignment.points() <= current.assignment.points() => Some(current),
            _ => Some(item),
        });
    if let Some(item) = highest_value {
        recommendations.push(Recommendation {
            kind: RecommendationKind::Priority,
            message: format!(
                "Focus on \"{}\" - it's worth {} points!",
                item.assignment.name,
                item.assignment.points()
            ),
            tier: PriorityTier::Medium,
        });
    }

    let overdue = assignments
        .iter()
        .filter(|item| item.status != Status::Completed)
        .filter(|item| item.assignment.due_at.is_some_and(|due| due < now))
        .count();
    if overdue > 0 {
        recommendations.push(Recommendation {
            kind: RecommendationKind::Urgent,
            message: format!(
                "You have {overdue} overdue assignment(s). Contact your instructors immediately!"
            ),
            tier: PriorityTier::Critical,
        });
    }

    let today = now.date_naive();
    let completed_today = assignments
        .iter()
        .filter(|item| item.status == Status::Completed)
        .filter(|item| {
            item.assignment
                .submission
                .as_ref()
                .and_then(|submission| submission.submitted_at)
                .is_some_and(|submitted| submitted.date_naive() == today)
        })
        .count();
    if completed_today >= WELLNESS_THRESHOLD {
        recommendations.push(Recommendation {
            kind: RecommendationKind::Wellness,
            message: format!(
                "Great work! You've completed {completed_today} assignments today. Take a well-deserved break!"
            ),
            tier: PriorityTier::Low,
        });
    }

    recommendations
}
