use std::cmp::Ordering;
use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};

use crate::models::{
    Bucket, BucketGroup, Course, EnrichedAssignment, PriorityTier, Status,
};
use crate::priority::tier_weight;

/// Independent, optional filters; every supplied filter must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewFilters {
    pub course_id: Option<i64>,
    pub status: Option<Status>,
    pub tier: Option<PriorityTier>,
}

impl ViewFilters {
    pub fn matches(&self, item: &EnrichedAssignment) -> bool {
        self.course_id
            .map_or(true, |id| item.assignment.course_id == id)
            && self.status.map_or(true, |status| item.status == status)
            && self.tier.map_or(true, |tier| item.priority.tier == tier)
    }

    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(id) = self.course_id {
            parts.push(format!("course {id}"));
        }
        if let Some(status) = self.status {
            parts.push(format!("status {status}"));
        }
        if let Some(tier) = self.tier {
            parts.push(format!("priority {tier}"));
        }
        if parts.is_empty() {
            "all assignments".to_string()
        } else {
            parts.join(", ")
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    AiRecommended,
    DueDate,
    Priority,
    NewestFirst,
    OldestFirst,
    Course,
    /// Keeps input order; also what any unrecognized key parses to.
    Unsorted,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::AiRecommended => "ai-recommended",
            SortKey::DueDate => "due-date",
            SortKey::Priority => "priority",
            SortKey::NewestFirst => "newest-first",
            SortKey::OldestFirst => "oldest-first",
            SortKey::Course => "course",
            SortKey::Unsorted => "unsorted",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(match value.trim() {
            "ai-recommended" => SortKey::AiRecommended,
            "due-date" => SortKey::DueDate,
            "priority" => SortKey::Priority,
            "newest-first" => SortKey::NewestFirst,
            "oldest-first" => SortKey::OldestFirst,
            "course" => SortKey::Course,
            _ => SortKey::Unsorted,
        })
    }
}

pub fn apply_filters(
    items: Vec<EnrichedAssignment>,
    filters: &ViewFilters,
) -> Vec<EnrichedAssignment> {
    items.into_iter().filter(|item| filters.matches(item)).collect()
}

/// Stable sort by `key`; `courses` resolves display names for `SortKey::Course`.
pub fn sort_assignments(items: &mut [EnrichedAssignment], key: SortKey, courses: &[Course]) {
    match key {
        SortKey::AiRecommended => items.sort_by(|a, b| {
            compare_tier(a, b)
                .then_with(|| compare_due(a, b))
                .then_with(|| b.assignment.points().total_cmp(&a.assignment.points()))
        }),
        SortKey::DueDate => items.sort_by(compare_due),
        SortKey::Priority => items.sort_by(|a, b| compare_tier(a, b).then_with(|| compare_due(a, b))),
        SortKey::NewestFirst => items.sort_by(|a, b| compare_created(a, b, true)),
        SortKey::OldestFirst => items.sort_by(|a, b| compare_created(a, b, false)),
        SortKey::Course => {
            let names: HashMap<i64, &str> = courses
                .iter()
                .map(|course| (course.id, course.name.as_str()))
                .collect();
            items.sort_by(|a, b| {
                let left = names.get(&a.assignment.course_id).copied().unwrap_or("");
                let right = names.get(&b.assignment.course_id).copied().unwrap_or("");
                compare_course_names(left, right)
            });
        }
        SortKey::Unsorted => {}
    }
}

/// Partitions already-sorted assignments into the display buckets, keeping
/// sorted order inside each bucket and dropping empty buckets.
pub fn group_by_status(items: Vec<EnrichedAssignment>) -> Vec<BucketGroup> {
    let mut grouped: HashMap<Bucket, Vec<EnrichedAssignment>> = HashMap::new();
    for item in items {
        grouped
            .entry(Bucket::for_status(item.status))
            .or_default()
            .push(item);
    }

    Bucket::ORDER
        .iter()
        .filter_map(|bucket| {
            grouped.remove(bucket).map(|assignments| BucketGroup {
                bucket: *bucket,
                title: bucket.title().to_string(),
                assignments,
            })
        })
        .collect()
}

pub fn due_sort_key(item: &EnrichedAssignment) -> DateTime<Utc> {
    item.assignment.due_at.unwrap_or_else(far_future)
}

fn far_future() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(9999, 12, 31, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

// Case-insensitive, with the raw names breaking ties.
fn compare_course_names(left: &str, right: &str) -> Ordering {
    left.to_lowercase()
        .cmp(&right.to_lowercase())
        .then_with(|| left.cmp(right))
}

fn compare_tier(a: &EnrichedAssignment, b: &EnrichedAssignment) -> Ordering {
    tier_weight(b.priority.tier).cmp(&tier_weight(a.priority.tier))
}

fn compare_due(a: &EnrichedAssignment, b: &EnrichedAssignment) -> Ordering {
    due_sort_key(a).cmp(&due_sort_key(b))
}

fn compare_created(a: &EnrichedAssignment, b: &EnrichedAssignment, newest_first: bool) -> Ordering {
    let stamp = |item: &EnrichedAssignment| item.assignment.created_at.or(item.assignment.due_at);
    match (stamp(a), stamp(b)) {
        (Some(left), Some(right)) if newest_first => right.cmp(&left),
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
