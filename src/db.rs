use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{Assignment, Course, Submission};
use crate::source::{CourseworkSource, Snapshot};

pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .context("failed to connect to Postgres")
}

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Coursework previously imported into Postgres.
#[derive(Debug, Clone)]
pub struct PgSource {
    pool: PgPool,
}

impl PgSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CourseworkSource for PgSource {
    async fn fetch_courses(&self) -> anyhow::Result<Vec<Course>> {
        let rows = sqlx::query(
            "SELECT id, name, course_code FROM assignment_triage.courses ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Course {
                id: row.get("id"),
                name: row.get("name"),
                course_code: row.get("course_code"),
            })
            .collect())
    }

    async fn fetch_assignments(&self, course_id: i64) -> anyhow::Result<Vec<Assignment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, course_id, name, due_at, points_possible, description,
                   submission_types, created_at
            FROM assignment_triage.assignments
            WHERE course_id = $1
            ORDER BY id
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("failed to load assignments for course {course_id}"))?;

        let mut assignments = Vec::with_capacity(rows.len());
        for row in rows {
            assignments.push(Assignment {
                id: row.get("id"),
                name: row.get("name"),
                course_id: row.get("course_id"),
                due_at: row.get("due_at"),
                points_possible: row.get("points_possible"),
                description: row.get("description"),
                submission_types: row.get("submission_types"),
                created_at: row.get("created_at"),
                submission: None,
            });
        }

        Ok(assignments)
    }

    async fn fetch_submission(
        &self,
        course_id: i64,
        assignment_id: i64,
    ) -> anyhow::Result<Option<Submission>> {
        let row = sqlx::query(
            r#"
            SELECT workflow_state, submitted_at
            FROM assignment_triage.submissions
            WHERE course_id = $1 AND assignment_id = $2
            "#,
        )
        .bind(course_id)
        .bind(assignment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| Submission {
            workflow_state: row.get("workflow_state"),
            submitted_at: row.get("submitted_at"),
        }))
    }
}

/// Upserts a JSON snapshot. Returns the number of assignments written.
pub async fn load_snapshot(pool: &PgPool, snapshot: &Snapshot) -> anyhow::Result<usize> {
    let mut tx = pool.begin().await?;

    for course in &snapshot.courses {
        sqlx::query(
            r#"
            INSERT INTO assignment_triage.courses (id, name, course_code)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name, course_code = EXCLUDED.course_code
            "#,
        )
        .bind(course.id)
        .bind(&course.name)
        .bind(&course.course_code)
        .execute(&mut *tx)
        .await?;
    }

    for assignment in &snapshot.assignments {
        sqlx::query(
            r#"
            INSERT INTO assignment_triage.assignments
            (id, course_id, name, due_at, points_possible, description,
             submission_types, created_at, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE
            SET course_id = EXCLUDED.course_id,
                name = EXCLUDED.name,
                due_at = EXCLUDED.due_at,
                points_possible = EXCLUDED.points_possible,
                description = EXCLUDED.description,
                submission_types = EXCLUDED.submission_types,
                created_at = EXCLUDED.created_at
            "#,
        )
        .bind(assignment.id)
        .bind(assignment.course_id)
        .bind(&assignment.name)
        .bind(assignment.due_at)
        .bind(assignment.points_possible)
        .bind(assignment.description.as_deref())
        .bind(&assignment.submission_types)
        .bind(assignment.created_at)
        .bind(format!("snapshot-{}", assignment.id))
        .execute(&mut *tx)
        .await
        .with_context(|| format!("failed to store assignment {}", assignment.id))?;

        if let Some(submission) = &assignment.submission {
            upsert_submission(&mut tx, assignment.course_id, assignment.id, submission).await?;
        }
    }

    for record in &snapshot.submissions {
        upsert_submission(&mut tx, record.course_id, record.assignment_id, &record.submission)
            .await?;
    }

    tx.commit().await?;
    info!(
        courses = snapshot.courses.len(),
        assignments = snapshot.assignments.len(),
        "snapshot stored"
    );
    Ok(snapshot.assignments.len())
}

/// One row of a coursework CSV export.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ImportRow {
    pub course_id: i64,
    pub course_name: String,
    #[serde(default)]
    pub course_code: String,
    pub assignment_name: String,
    #[serde(default)]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub points_possible: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub submission_types: Option<String>,
    /// Left empty when the export has no creation time, so created-at
    /// sorts fall back to the due date.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub workflow_state: Option<String>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub source_key: Option<String>,
}

impl ImportRow {
    pub fn to_assignment(&self, id: i64) -> Assignment {
        Assignment {
            id,
            name: self.assignment_name.clone(),
            course_id: self.course_id,
            due_at: self.due_at,
            points_possible: self.points_possible,
            description: self.description.clone().filter(|text| !text.is_empty()),
            submission_types: split_submission_types(self.submission_types.as_deref()),
            created_at: self.created_at,
            submission: None,
        }
    }
}

pub fn read_import_rows<R: std::io::Read>(
    reader: &mut csv::Reader<R>,
) -> anyhow::Result<Vec<ImportRow>> {
    let mut rows = Vec::new();
    for (index, result) in reader.deserialize::<ImportRow>().enumerate() {
        rows.push(result.with_context(|| format!("invalid CSV record {}", index + 1))?);
    }
    Ok(rows)
}

/// Imports coursework rows from a CSV export. Returns how many assignments
/// were new; rows whose `source_key` is already known only refresh the
/// submission state.
pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let rows = read_import_rows(&mut reader)?;
    let mut tx = pool.begin().await?;
    let mut inserted = 0usize;

    for row in rows {
        sqlx::query(
            r#"
            INSERT INTO assignment_triage.courses (id, name, course_code)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name, course_code = EXCLUDED.course_code
            "#,
        )
        .bind(row.course_id)
        .bind(&row.course_name)
        .bind(&row.course_code)
        .execute(&mut *tx)
        .await?;

        let source_key = row
            .source_key
            .clone()
            .filter(|key| !key.is_empty())
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));
        let assignment = row.to_assignment(0);

        let new_id: Option<i64> = sqlx::query(
            r#"
            INSERT INTO assignment_triage.assignments
            (course_id, name, due_at, points_possible, description,
             submission_types, created_at, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (source_key) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(assignment.course_id)
        .bind(&assignment.name)
        .bind(assignment.due_at)
        .bind(assignment.points_possible)
        .bind(assignment.description.as_deref())
        .bind(&assignment.submission_types)
        .bind(assignment.created_at)
        .bind(&source_key)
        .fetch_optional(&mut *tx)
        .await?
        .map(|record| record.get("id"));

        let assignment_id: i64 = match new_id {
            Some(id) => {
                inserted += 1;
                id
            }
            None => {
                debug!(source_key = %source_key, "assignment already imported");
                sqlx::query(
                    "SELECT id FROM assignment_triage.assignments WHERE source_key = $1",
                )
                .bind(&source_key)
                .fetch_one(&mut *tx)
                .await?
                .get("id")
            }
        };

        if row.workflow_state.is_some() || row.submitted_at.is_some() {
            let submission = Submission {
                workflow_state: row.workflow_state,
                submitted_at: row.submitted_at,
            };
            upsert_submission(&mut tx, row.course_id, assignment_id, &submission).await?;
        }
    }

    tx.commit().await?;
    Ok(inserted)
}

async fn upsert_submission(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    course_id: i64,
    assignment_id: i64,
    submission: &Submission,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO assignment_triage.submissions
        (course_id, assignment_id, workflow_state, submitted_at)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (course_id, assignment_id) DO UPDATE
        SET workflow_state = EXCLUDED.workflow_state,
            submitted_at = EXCLUDED.submitted_at
        "#,
    )
    .bind(course_id)
    .bind(assignment_id)
    .bind(submission.workflow_state.as_deref())
    .bind(submission.submitted_at)
    .execute(&mut **tx)
    .await
    .with_context(|| format!("failed to store submission for assignment {assignment_id}"))?;
    Ok(())
}

fn split_submission_types(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(';')
        .map(str::trim)
        .filter(|kind| !kind.is_empty())
        .map(str::to_string)
        .collect()
}
