use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::models::{Course, EnrichedAssignment, Status};

const EVENT_LENGTH_MINUTES: i64 = 60;
const UPCOMING_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderMethod {
    Email,
    Popup,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reminder {
    pub method: ReminderMethod,
    pub minutes: u32,
}

/// A calendar-provider event for one assignment deadline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEvent {
    pub assignment_id: i64,
    pub summary: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub reminders: Vec<Reminder>,
    pub color_id: &'static str,
}

pub fn color_id(status: Status) -> &'static str {
    match status {
        Status::Completed => "2",
        Status::InProgress => "5",
        Status::Missing => "11",
        Status::NotStarted => "1",
    }
}

/// Projects every dated assignment onto a one-hour event ending an hour
/// after the deadline. Undated assignments are skipped.
pub fn build_events(assignments: &[EnrichedAssignment], courses: &[Course]) -> Vec<CalendarEvent> {
    let names = course_names(courses);

    assignments
        .iter()
        .filter_map(|item| {
            let due_at = item.assignment.due_at?;
            let course = names
                .get(&item.assignment.course_id)
                .copied()
                .unwrap_or("Course");
            let points = item
                .assignment
                .points_possible
                .map(|points| points.to_string())
                .unwrap_or_else(|| "N/A".to_string());

            Some(CalendarEvent {
                assignment_id: item.assignment.id,
                summary: format!("📚 {} - {}", item.assignment.name, course),
                description: format!(
                    "Assignment: {}\nCourse: {}\nPoints: {}\nStatus: {}",
                    item.assignment.name,
                    course,
                    points,
                    item.status.label()
                ),
                start: due_at,
                end: due_at + Duration::minutes(EVENT_LENGTH_MINUTES),
                reminders: vec![
                    Reminder {
                        method: ReminderMethod::Email,
                        minutes: 24 * 60,
                    },
                    Reminder {
                        method: ReminderMethod::Popup,
                        minutes: 60,
                    },
                ],
                color_id: color_id(item.status),
            })
        })
        .collect()
}

/// Coarse assignment category guessed from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentKind {
    Homework,
    Writing,
    Project,
    Exam,
    General,
}

impl AssignmentKind {
    pub fn from_name(name: &str) -> Self {
        let name = name.to_lowercase();
        if name.contains("homework") {
            AssignmentKind::Homework
        } else if name.contains("essay") || name.contains("paper") {
            AssignmentKind::Writing
        } else if name.contains("project") {
            AssignmentKind::Project
        } else if name.contains("exam") || name.contains("test") {
            AssignmentKind::Exam
        } else {
            AssignmentKind::General
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpcomingAssignment {
    pub assignment_id: i64,
    pub name: String,
    pub course_name: Option<String>,
    pub due_at: DateTime<Utc>,
    pub kind: AssignmentKind,
}

/// Assignments due in the coming week, soonest first.
pub fn upcoming(
    assignments: &[EnrichedAssignment],
    courses: &[Course],
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<UpcomingAssignment> {
    let names = course_names(courses);
    let horizon = now + Duration::days(UPCOMING_WINDOW_DAYS);

    let mut due_soon: Vec<(&EnrichedAssignment, DateTime<Utc>)> = assignments
        .iter()
        .filter_map(|item| item.assignment.due_at.map(|due| (item, due)))
        .filter(|(_, due)| *due >= now && *due <= horizon)
        .collect();
    due_soon.sort_by_key(|(_, due)| *due);

    due_soon
        .into_iter()
        .take(limit)
        .map(|(item, due_at)| UpcomingAssignment {
            assignment_id: item.assignment.id,
            name: item.assignment.name.clone(),
            course_name: names
                .get(&item.assignment.course_id)
                .map(|name| name.to_string()),
            due_at,
            kind: AssignmentKind::from_name(&item.assignment.name),
        })
        .collect()
}

fn course_names(courses: &[Course]) -> HashMap<i64, &str> {
    courses
        .iter()
        .map(|course| (course.id, course.name.as_str()))
        .collect()
}
