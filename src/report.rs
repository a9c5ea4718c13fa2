use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::calendar::UpcomingAssignment;
use crate::models::{Course, EnrichedAssignment, RankedView};
use crate::view::{SortKey, ViewFilters};

pub fn due_label(item: &EnrichedAssignment) -> String {
    item.assignment
        .due_at
        .map(|due| due.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "no due date".to_string())
}

pub fn course_label<'a>(courses: &'a [Course], course_id: i64) -> &'a str {
    courses
        .iter()
        .find(|course| course.id == course_id)
        .map(|course| course.name.as_str())
        .unwrap_or("Unknown course")
}

pub fn build_report(
    view: &RankedView,
    upcoming: &[UpcomingAssignment],
    courses: &[Course],
    filters: &ViewFilters,
    sort_key: SortKey,
    now: DateTime<Utc>,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Assignment Triage Report");
    let _ = writeln!(
        output,
        "Generated {} for {} (sorted by {})",
        now.format("%Y-%m-%d %H:%M UTC"),
        filters.describe(),
        sort_key
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Recommendations");

    if view.recommendations.is_empty() {
        let _ = writeln!(output, "Nothing to flag right now.");
    } else {
        for recommendation in view.recommendations.iter() {
            let _ = writeln!(
                output,
                "- [{}] {}",
                recommendation.tier, recommendation.message
            );
        }
    }

    if view.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "No assignments found matching these filters.");
    }

    for group in view.buckets.iter() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## {} ({})", group.title, group.assignments.len());
        for item in group.assignments.iter() {
            let _ = writeln!(
                output,
                "- {} ({}) due {}: {} priority, score {} ({}), ~{} min",
                item.assignment.name,
                course_label(courses, item.assignment.course_id),
                due_label(item),
                item.priority.tier,
                item.priority.score,
                item.priority.reason,
                item.estimated_minutes
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Due This Week");

    if upcoming.is_empty() {
        let _ = writeln!(output, "No upcoming assignments. You're all caught up!");
    } else {
        for entry in upcoming.iter() {
            let _ = writeln!(
                output,
                "- {} ({}) due {}",
                entry.name,
                entry.course_name.as_deref().unwrap_or("Unknown course"),
                entry.due_at.format("%b %-d")
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar;
    use crate::models::{Assignment, Submission};
    use crate::pipeline::{classify_and_rank, enrich_all};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    fn sample() -> (Vec<Course>, Vec<Assignment>) {
        let courses = vec![Course {
            id: 4,
            name: "Calculus I".to_string(),
            course_code: "MATH1151".to_string(),
        }];
        let assignments = vec![
            Assignment {
                id: 1,
                name: "Derivatives Homework".to_string(),
                course_id: 4,
                due_at: Some(now() + Duration::days(2)),
                points_possible: Some(60.0),
                description: None,
                submission_types: vec!["online_upload".to_string()],
                created_at: None,
                submission: None,
            },
            Assignment {
                id: 2,
                name: "Limits Quiz".to_string(),
                course_id: 4,
                due_at: Some(now() - Duration::days(3)),
                points_possible: Some(20.0),
                description: None,
                submission_types: Vec::new(),
                created_at: None,
                submission: Some(Submission {
                    workflow_state: Some("unsubmitted".to_string()),
                    submitted_at: None,
                }),
            },
        ];
        (courses, assignments)
    }

    #[test]
    fn report_lists_buckets_and_recommendations() {
        let (courses, assignments) = sample();
        let filters = ViewFilters::default();
        let view = classify_and_rank(&assignments, &courses, &filters, SortKey::AiRecommended, now());
        let upcoming = calendar::upcoming(&enrich_all(&assignments, now()), &courses, now(), 5);
        let report = build_report(&view, &upcoming, &courses, &filters, SortKey::AiRecommended, now());

        assert!(report.starts_with("# Assignment Triage Report"));
        assert!(report.contains("for all assignments (sorted by ai-recommended)"));
        assert!(report.contains("## Missing (1)"));
        assert!(report.contains("## Not Started (1)"));
        assert!(report.contains("- [critical] You have 1 overdue assignment(s)."));
        assert!(report.contains("Limits Quiz (Calculus I) due 2026-03-07 12:00 UTC: critical priority, score 100 (Overdue), ~30 min"));
        assert!(report.contains("- Derivatives Homework (Calculus I) due Mar 12"));
    }

    #[test]
    fn empty_view_is_reported() {
        let (courses, assignments) = sample();
        let filters = ViewFilters {
            course_id: Some(99),
            ..ViewFilters::default()
        };
        let view = classify_and_rank(&assignments, &courses, &filters, SortKey::DueDate, now());
        let report = build_report(&view, &[], &courses, &filters, SortKey::DueDate, now());

        assert!(report.contains("Nothing to flag right now."));
        assert!(report.contains("No assignments found matching these filters."));
        assert!(report.contains("You're all caught up!"));
    }
}
