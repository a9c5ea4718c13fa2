use std::path::PathBuf;

use assignment_triage::calendar::{self, AssignmentKind};
use assignment_triage::pipeline::enrich_all;
use assignment_triage::source::{gather, SnapshotSource};
use assignment_triage::{
    classify_and_rank, Assignment, Bucket, Course, PriorityTier, RecommendationKind, SortKey,
    Status, ViewFilters,
};
use chrono::{DateTime, TimeZone, Utc};

fn fixture_path(rel: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(rel)
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
}

async fn load() -> (Vec<Course>, Vec<Assignment>) {
    let source = SnapshotSource::from_path(&fixture_path("snapshot.json")).expect("fixture");
    gather(&source).await.expect("gather fixture")
}

fn bucket_ids(view: &assignment_triage::RankedView, bucket: Bucket) -> Vec<i64> {
    view.buckets
        .iter()
        .find(|group| group.bucket == bucket)
        .map(|group| group.assignments.iter().map(|item| item.assignment.id).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn ai_recommended_view_of_snapshot() {
    let (courses, assignments) = load().await;
    assert_eq!(courses.len(), 3);
    assert_eq!(assignments.len(), 7);

    let view = classify_and_rank(
        &assignments,
        &courses,
        &ViewFilters::default(),
        SortKey::AiRecommended,
        now(),
    );

    let order: Vec<Bucket> = view.buckets.iter().map(|group| group.bucket).collect();
    assert_eq!(
        order,
        vec![
            Bucket::Missing,
            Bucket::InProgress,
            Bucket::NotStarted,
            Bucket::Completed
        ]
    );
    assert_eq!(bucket_ids(&view, Bucket::Missing), vec![201]);
    assert_eq!(bucket_ids(&view, Bucket::InProgress), vec![102]);
    assert_eq!(bucket_ids(&view, Bucket::NotStarted), vec![202, 101, 301, 302]);
    assert_eq!(bucket_ids(&view, Bucket::Completed), vec![103]);
    assert_eq!(view.assignment_count(), assignments.len());

    let kinds: Vec<RecommendationKind> = view.recommendations.iter().map(|rec| rec.kind).collect();
    assert_eq!(
        kinds,
        vec![RecommendationKind::Priority, RecommendationKind::Urgent]
    );
    assert_eq!(
        view.recommendations[0].message,
        "Focus on \"Programming Project 2\" - it's worth 150 points!"
    );
}

#[tokio::test]
async fn derived_fields_match_the_rules() {
    let (_, assignments) = load().await;
    let enriched = enrich_all(&assignments, now());
    let by_id = |id: i64| {
        enriched
            .iter()
            .find(|item| item.assignment.id == id)
            .expect("assignment in fixture")
    };

    let lab = by_id(102);
    assert_eq!(lab.status, Status::InProgress);
    assert_eq!(lab.priority.tier, PriorityTier::Urgent);
    assert_eq!(lab.priority.score, 88);

    let project = by_id(101);
    assert_eq!(project.priority.tier, PriorityTier::Medium);
    assert_eq!(project.priority.score, 50);
    assert_eq!(project.estimated_minutes, 150);

    let midterm = by_id(202);
    assert_eq!(midterm.priority.tier, PriorityTier::High);
    assert_eq!(midterm.priority.score, 70);

    let essay = by_id(301);
    assert_eq!(essay.priority.score, 34);
    assert_eq!(essay.estimated_minutes, 120);

    let journal = by_id(302);
    assert_eq!(journal.status, Status::NotStarted);
    assert_eq!(journal.priority.tier, PriorityTier::Low);
    assert_eq!(journal.priority.score, 0);

    assert_eq!(by_id(201).status, Status::Missing);
    assert_eq!(by_id(103).status, Status::Completed);
}

#[tokio::test]
async fn filters_narrow_the_view() {
    let (courses, assignments) = load().await;

    let cs_only = ViewFilters {
        course_id: Some(1),
        ..ViewFilters::default()
    };
    let view = classify_and_rank(&assignments, &courses, &cs_only, SortKey::DueDate, now());
    assert_eq!(view.assignment_count(), 3);
    // Nothing in CS101 is overdue and unfinished.
    assert!(view
        .recommendations
        .iter()
        .all(|rec| rec.kind != RecommendationKind::Urgent));

    let critical = ViewFilters {
        tier: Some(PriorityTier::Critical),
        ..ViewFilters::default()
    };
    let view = classify_and_rank(&assignments, &courses, &critical, SortKey::DueDate, now());
    assert_eq!(bucket_ids(&view, Bucket::Completed), vec![103]);
    assert_eq!(bucket_ids(&view, Bucket::Missing), vec![201]);
}

#[tokio::test]
async fn course_sort_orders_by_course_name() {
    let (courses, assignments) = load().await;
    let filters = ViewFilters {
        status: Some(Status::NotStarted),
        ..ViewFilters::default()
    };
    let view = classify_and_rank(&assignments, &courses, &filters, SortKey::Course, now());
    // Calculus I < English Composition < Introduction to Computer Science
    assert_eq!(bucket_ids(&view, Bucket::NotStarted), vec![202, 301, 302, 101]);
}

#[tokio::test]
async fn calendar_views_of_snapshot() {
    let (courses, assignments) = load().await;
    let enriched = enrich_all(&assignments, now());

    let events = calendar::build_events(&enriched, &courses);
    assert_eq!(events.len(), 6);
    let missing = events
        .iter()
        .find(|event| event.assignment_id == 201)
        .expect("event for 201");
    assert_eq!(missing.color_id, "11");
    assert_eq!(missing.summary, "📚 Derivatives Homework - Calculus I");

    let upcoming = calendar::upcoming(&enriched, &courses, now(), 5);
    let ids: Vec<i64> = upcoming.iter().map(|entry| entry.assignment_id).collect();
    assert_eq!(ids, vec![102, 202, 101]);
    assert_eq!(upcoming[1].kind, AssignmentKind::Exam);
    assert_eq!(upcoming[2].kind, AssignmentKind::Project);
}
