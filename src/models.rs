use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub course_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: i64,
    pub name: String,
    pub course_id: i64,
    #[serde(default)]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub points_possible: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub submission_types: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub submission: Option<Submission>,
}

impl Assignment {
    /// Point value with a missing value counted as zero.
    pub fn points(&self) -> f64 {
        self.points_possible.unwrap_or(0.0)
    }
}

/// The student's submission for one assignment, as reported by the LMS.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default)]
    pub workflow_state: Option<String>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl Submission {
    /// Typed workflow state; `None` when the vendor sent nothing usable.
    pub fn state(&self) -> Option<WorkflowState> {
        self.workflow_state
            .as_deref()
            .filter(|value| !value.is_empty())
            .map(WorkflowState::from)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowState {
    Submitted,
    Graded,
    PendingReview,
    Unsubmitted,
    Unknown(String),
}

impl From<&str> for WorkflowState {
    fn from(value: &str) -> Self {
        match value {
            "submitted" => WorkflowState::Submitted,
            "graded" => WorkflowState::Graded,
            "pending_review" => WorkflowState::PendingReview,
            "unsubmitted" => WorkflowState::Unsubmitted,
            other => WorkflowState::Unknown(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Completed,
    InProgress,
    Missing,
    NotStarted,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Completed => "completed",
            Status::InProgress => "in_progress",
            Status::Missing => "missing",
            Status::NotStarted => "not_started",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Completed => "Completed",
            Status::InProgress => "In Progress",
            Status::Missing => "Missing",
            Status::NotStarted => "Not Started",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "completed" => Ok(Status::Completed),
            "in_progress" => Ok(Status::InProgress),
            "missing" => Ok(Status::Missing),
            "not_started" => Ok(Status::NotStarted),
            other => Err(format!(
                "unknown status '{other}' (expected completed, in_progress, missing or not_started)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityTier {
    Critical,
    Urgent,
    High,
    Medium,
    Low,
}

impl PriorityTier {
    pub fn as_str(self) -> &'static str {
        match self {
            PriorityTier::Critical => "critical",
            PriorityTier::Urgent => "urgent",
            PriorityTier::High => "high",
            PriorityTier::Medium => "medium",
            PriorityTier::Low => "low",
        }
    }
}

impl fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriorityTier {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "critical" => Ok(PriorityTier::Critical),
            "urgent" => Ok(PriorityTier::Urgent),
            "high" => Ok(PriorityTier::High),
            "medium" => Ok(PriorityTier::Medium),
            "low" => Ok(PriorityTier::Low),
            other => Err(format!(
                "unknown priority '{other}' (expected critical, urgent, high, medium or low)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityAssessment {
    pub tier: PriorityTier,
    pub score: i64,
    pub reason: String,
}

/// An assignment together with the fields derived for one ranking pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedAssignment {
    #[serde(flatten)]
    pub assignment: Assignment,
    pub status: Status,
    pub priority: PriorityAssessment,
    pub estimated_minutes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Missing,
    InProgress,
    NotStarted,
    Completed,
}

impl Bucket {
    /// Display order of the grouped view.
    pub const ORDER: [Bucket; 4] = [
        Bucket::Missing,
        Bucket::InProgress,
        Bucket::NotStarted,
        Bucket::Completed,
    ];

    pub fn for_status(status: Status) -> Self {
        match status {
            Status::Missing => Bucket::Missing,
            Status::InProgress => Bucket::InProgress,
            Status::NotStarted => Bucket::NotStarted,
            Status::Completed => Bucket::Completed,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Bucket::Missing => "Missing",
            Bucket::InProgress => "In Progress",
            Bucket::NotStarted => "Not Started",
            Bucket::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketGroup {
    pub bucket: Bucket,
    pub title: String,
    pub assignments: Vec<EnrichedAssignment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Workload,
    Priority,
    Urgent,
    Wellness,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub message: String,
    pub tier: PriorityTier,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RankedView {
    pub buckets: Vec<BucketGroup>,
    pub recommendations: Vec<Recommendation>,
}

impl RankedView {
    pub fn assignment_count(&self) -> usize {
        self.buckets.iter().map(|group| group.assignments.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
