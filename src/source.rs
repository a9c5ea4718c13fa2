//! Where coursework comes from. The ranking pipeline only ever sees the
//! materialized output of [`gather`].

use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::models::{Assignment, Course, Submission};

/// A provider of LMS data: courses, their assignments, and the student's
/// submission for each assignment.
#[async_trait]
pub trait CourseworkSource: Send + Sync {
    async fn fetch_courses(&self) -> anyhow::Result<Vec<Course>>;

    async fn fetch_assignments(&self, course_id: i64) -> anyhow::Result<Vec<Assignment>>;

    /// `Ok(None)` means the student has no submission, which is not an error.
    async fn fetch_submission(
        &self,
        course_id: i64,
        assignment_id: i64,
    ) -> anyhow::Result<Option<Submission>>;
}

/// Walks every course and attaches submissions to its assignments.
///
/// A course whose assignments cannot be fetched contributes nothing; a
/// submission that cannot be fetched is treated as absent. Only a failure to
/// list courses is returned to the caller.
pub async fn gather<S>(source: &S) -> anyhow::Result<(Vec<Course>, Vec<Assignment>)>
where
    S: CourseworkSource + ?Sized,
{
    let courses = source
        .fetch_courses()
        .await
        .context("failed to fetch courses")?;
    let mut assignments = Vec::new();

    for course in &courses {
        let course_assignments = match source.fetch_assignments(course.id).await {
            Ok(list) => list,
            Err(err) => {
                warn!(course_id = course.id, error = %err, "failed to fetch assignments");
                continue;
            }
        };

        for mut assignment in course_assignments {
            assignment.course_id = course.id;
            assignment.submission = match source.fetch_submission(course.id, assignment.id).await {
                Ok(submission) => submission,
                Err(err) => {
                    warn!(
                        course_id = course.id,
                        assignment_id = assignment.id,
                        error = %err,
                        "failed to fetch submission"
                    );
                    None
                }
            };
            assignments.push(assignment);
        }
        debug!(course_id = course.id, course = %course.name, "course loaded");
    }

    info!(
        courses = courses.len(),
        assignments = assignments.len(),
        "coursework gathered"
    );
    Ok((courses, assignments))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub submissions: Vec<SubmissionRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub course_id: i64,
    pub assignment_id: i64,
    #[serde(flatten)]
    pub submission: Submission,
}

/// Coursework read from a JSON export of the LMS.
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    snapshot: Snapshot,
}

impl SnapshotSource {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let snapshot: Snapshot =
            serde_json::from_str(json).context("snapshot is not valid coursework JSON")?;
        Ok(Self::new(snapshot))
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read snapshot {}", path.display()))?;
        Self::from_json(&json)
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

#[async_trait]
impl CourseworkSource for SnapshotSource {
    async fn fetch_courses(&self) -> anyhow::Result<Vec<Course>> {
        Ok(self.snapshot.courses.clone())
    }

    async fn fetch_assignments(&self, course_id: i64) -> anyhow::Result<Vec<Assignment>> {
        Ok(self
            .snapshot
            .assignments
            .iter()
            .filter(|assignment| assignment.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn fetch_submission(
        &self,
        course_id: i64,
        assignment_id: i64,
    ) -> anyhow::Result<Option<Submission>> {
        let record = self
            .snapshot
            .submissions
            .iter()
            .find(|record| record.course_id == course_id && record.assignment_id == assignment_id)
            .map(|record| record.submission.clone());

        // Exports may also embed the submission on the assignment itself.
        Ok(record.or_else(|| {
            self.snapshot
                .assignments
                .iter()
                .find(|assignment| {
                    assignment.course_id == course_id && assignment.id == assignment_id
                })
                .and_then(|assignment| assignment.submission.clone())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "courses": [
            {"id": 1, "name": "Introduction to Computer Science", "course_code": "CS101"},
            {"id": 2, "name": "Calculus I", "course_code": "MATH1151"}
        ],
        "assignments": [
            {"id": 11, "name": "Lab 1", "course_id": 1, "due_at": "2026-03-12T23:59:00Z", "points_possible": 20},
            {"id": 12, "name": "Project", "course_id": 1, "points_possible": 150,
             "submission": {"workflow_state": "pending_review"}},
            {"id": 21, "name": "Quiz 1", "course_id": 2, "due_at": "2026-03-01T09:00:00Z"}
        ],
        "submissions": [
            {"course_id": 1, "assignment_id": 11, "workflow_state": "submitted",
             "submitted_at": "2026-03-10T08:00:00Z"}
        ]
    }"#;

    struct FlakySource;

    #[async_trait]
    impl CourseworkSource for FlakySource {
        async fn fetch_courses(&self) -> anyhow::Result<Vec<Course>> {
            Ok(vec![
                Course {
                    id: 1,
                    name: "Physics I".to_string(),
                    course_code: "PHYS1250".to_string(),
                },
                Course {
                    id: 2,
                    name: "English Composition".to_string(),
                    course_code: "ENG1100".to_string(),
                },
            ])
        }

        async fn fetch_assignments(&self, course_id: i64) -> anyhow::Result<Vec<Assignment>> {
            if course_id == 2 {
                anyhow::bail!("HTTP 500");
            }
            Ok((1..=2)
                .map(|id| Assignment {
                    id,
                    name: format!("Problem Set {id}"),
                    course_id: 0,
                    due_at: None,
                    points_possible: None,
                    description: None,
                    submission_types: Vec::new(),
                    created_at: None,
                    submission: None,
                })
                .collect())
        }

        async fn fetch_submission(
            &self,
            _course_id: i64,
            assignment_id: i64,
        ) -> anyhow::Result<Option<Submission>> {
            if assignment_id == 2 {
                anyhow::bail!("session expired");
            }
            Ok(Some(Submission {
                workflow_state: Some("graded".to_string()),
                submitted_at: None,
            }))
        }
    }

    #[tokio::test]
    async fn snapshot_attaches_submissions() {
        let source = SnapshotSource::from_json(SNAPSHOT).unwrap();
        let (courses, assignments) = gather(&source).await.unwrap();

        assert_eq!(courses.len(), 2);
        assert_eq!(assignments.len(), 3);

        let lab = assignments.iter().find(|a| a.id == 11).unwrap();
        assert_eq!(
            lab.submission.as_ref().and_then(|s| s.workflow_state.as_deref()),
            Some("submitted")
        );
        let project = assignments.iter().find(|a| a.id == 12).unwrap();
        assert_eq!(
            project.submission.as_ref().and_then(|s| s.workflow_state.as_deref()),
            Some("pending_review")
        );
        let quiz = assignments.iter().find(|a| a.id == 21).unwrap();
        assert!(quiz.submission.is_none());
    }

    #[tokio::test]
    async fn failures_degrade_instead_of_aborting() {
        let (courses, assignments) = gather(&FlakySource).await.unwrap();

        assert_eq!(courses.len(), 2);
        assert_eq!(assignments.len(), 2);
        assert!(assignments.iter().all(|a| a.course_id == 1));
        assert!(assignments[0].submission.is_some());
        assert!(assignments[1].submission.is_none());
    }

    #[test]
    fn invalid_json_is_reported() {
        let err = SnapshotSource::from_json("{\"courses\": 3}").unwrap_err();
        assert!(err.to_string().contains("snapshot is not valid coursework JSON"));
    }
}
