use chrono::{DateTime, Utc};

use crate::models::{Assignment, PriorityAssessment, PriorityTier};

const MILLIS_PER_HOUR: i64 = 60 * 60 * 1000;
const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;

pub fn assess(assignment: &Assignment, now: DateTime<Utc>) -> PriorityAssessment {
    let Some(due_at) = assignment.due_at else {
        return PriorityAssessment {
            tier: PriorityTier::Low,
            score: 0,
            reason: "No due date".to_string(),
        };
    };

    let remaining = (due_at - now).num_milliseconds();
    let days_until_due = ceil_div(remaining, MILLIS_PER_DAY);
    let hours_until_due = ceil_div(remaining, MILLIS_PER_HOUR);

    let (tier, score, reason) = if days_until_due < 0 {
        (PriorityTier::Critical, 100, "Overdue".to_string())
    } else if hours_until_due <= 24 {
        (
            PriorityTier::Urgent,
            90 - hours_until_due,
            format!("Due in {hours_until_due} hours"),
        )
    } else if days_until_due <= 3 {
        (
            PriorityTier::High,
            80 - days_until_due * 10,
            format!("Due in {days_until_due} days"),
        )
    } else if days_until_due <= 7 {
        (
            PriorityTier::Medium,
            60 - days_until_due * 5,
            format!("Due in {days_until_due} days"),
        )
    } else {
        (
            PriorityTier::Low,
            (40 - days_until_due).max(10),
            format!("Due in {days_until_due} days"),
        )
    };

    PriorityAssessment {
        tier,
        score: score + points_bonus(assignment.points()),
        reason,
    }
}

pub fn points_bonus(points: f64) -> i64 {
    if points > 100.0 {
        20
    } else if points > 50.0 {
        10
    } else {
        0
    }
}

pub fn tier_weight(tier: PriorityTier) -> u8 {
    match tier {
        PriorityTier::Critical => 5,
        PriorityTier::Urgent => 4,
        PriorityTier::High => 3,
        PriorityTier::Medium => 2,
        PriorityTier::Low => 1,
    }
}

// Integer division rounding toward positive infinity; `divisor` is positive.
fn ceil_div(value: i64, divisor: i64) -> i64 {
    let quotient = value / divisor;
    if value % divisor > 0 {
        quotient + 1
    } else {
        quotient
    }
}
