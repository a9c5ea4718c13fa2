//! One ranking pass: classify, assess, estimate, filter, sort, group and
//! recommend. Every pass starts from the raw assignments, so nothing derived
//! in an earlier pass leaks into the next one.

use chrono::{DateTime, Utc};

use crate::estimate::estimate_minutes;
use crate::models::{Assignment, Course, EnrichedAssignment, RankedView};
use crate::priority;
use crate::recommend::recommend;
use crate::status;
use crate::view::{self, SortKey, ViewFilters};

pub fn enrich(assignment: &Assignment, now: DateTime<Utc>) -> EnrichedAssignment {
    EnrichedAssignment {
        status: status::classify(assignment, assignment.submission.as_ref(), now),
        priority: priority::assess(assignment, now),
        estimated_minutes: estimate_minutes(assignment),
        assignment: assignment.clone(),
    }
}

pub fn enrich_all(assignments: &[Assignment], now: DateTime<Utc>) -> Vec<EnrichedAssignment> {
    assignments.iter().map(|assignment| enrich(assignment, now)).collect()
}

pub fn classify_and_rank(
    assignments: &[Assignment],
    courses: &[Course],
    filters: &ViewFilters,
    sort_key: SortKey,
    now: DateTime<Utc>,
) -> RankedView {
    let mut visible = view::apply_filters(enrich_all(assignments, now), filters);
    if visible.is_empty() {
        return RankedView::default();
    }

    view::sort_assignments(&mut visible, sort_key, courses);
    let recommendations = recommend(&visible, now);

    RankedView {
        buckets: view::group_by_status(visible),
        recommendations,
    }
}
