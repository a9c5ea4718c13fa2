//! Assignment triage for LMS coursework: derives a status, priority and time
//! estimate for each assignment, then builds a filtered, sorted and grouped
//! view with a few recommendations on top.

pub mod calendar;
pub mod db;
pub mod estimate;
pub mod models;
pub mod pipeline;
pub mod priority;
pub mod recommend;
pub mod report;
pub mod source;
pub mod status;
pub mod view;

pub use models::{
    Assignment, Bucket, BucketGroup, Course, EnrichedAssignment, PriorityAssessment,
    PriorityTier, RankedView, Recommendation, RecommendationKind, Status, Submission,
};
pub use pipeline::classify_and_rank;
pub use view::{SortKey, ViewFilters};
