use std::path::{Path, PathBuf};

use anyhow::Context;
use assignment_triage::models::{Assignment, Course, PriorityTier, Status};
use assignment_triage::source::{self, SnapshotSource};
use assignment_triage::view::{SortKey, ViewFilters};
use assignment_triage::{calendar, db, pipeline, report};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "assignment-triage")]
#[command(about = "Rank LMS assignments by status and urgency", long_about = None)]
struct Cli {
    /// Read coursework from a JSON snapshot instead of Postgres
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,
    /// Evaluate as of this RFC 3339 timestamp instead of the current time
    #[arg(long, global = true)]
    now: Option<DateTime<Utc>>,
    #[arg(long, global = true, default_value_t = 5)]
    max_connections: u32,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ViewArgs {
    #[arg(long)]
    course: Option<i64>,
    /// completed, in_progress, missing or not_started
    #[arg(long)]
    status: Option<Status>,
    /// critical, urgent, high, medium or low
    #[arg(long)]
    priority: Option<PriorityTier>,
    /// ai-recommended, due-date, priority, newest-first, oldest-first or course
    #[arg(long, default_value = "ai-recommended")]
    sort: SortKey,
}

impl ViewArgs {
    fn filters(&self) -> ViewFilters {
        ViewFilters {
            course_id: self.course,
            status: self.status,
            tier: self.priority,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Import courses, assignments and submissions from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Store a JSON coursework snapshot in Postgres
    LoadSnapshot {
        #[arg(long)]
        path: PathBuf,
    },
    /// Print assignments grouped by status with recommendations
    Rank {
        #[command(flatten)]
        view: ViewArgs,
        /// Print the ranked view as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        view: ViewArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Export assignment deadlines as calendar events
    Calendar {
        #[arg(long, default_value = "events.json")]
        out: PathBuf,
    },
    /// List assignments due in the next seven days
    Upcoming {
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let now = cli.now.unwrap_or_else(Utc::now);

    match cli.command {
        Commands::InitDb => {
            let pool = db::connect(&database_url()?, cli.max_connections).await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Import { csv } => {
            let pool = db::connect(&database_url()?, cli.max_connections).await?;
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} assignments from {}.", csv.display());
        }
        Commands::LoadSnapshot { path } => {
            let source = SnapshotSource::from_path(&path)?;
            let pool = db::connect(&database_url()?, cli.max_connections).await?;
            let stored = db::load_snapshot(&pool, source.snapshot()).await?;
            println!("Stored {stored} assignments from {}.", path.display());
        }
        Commands::Rank { view, json } => {
            let (courses, assignments) =
                load_coursework(cli.snapshot.as_deref(), cli.max_connections).await?;
            let ranked = pipeline::classify_and_rank(
                &assignments,
                &courses,
                &view.filters(),
                view.sort,
                now,
            );
            info!(
                assignments = ranked.assignment_count(),
                recommendations = ranked.recommendations.len(),
                sort = %view.sort,
                "ranking pass complete"
            );

            if json {
                println!("{}", serde_json::to_string_pretty(&ranked)?);
                return Ok(());
            }

            if ranked.is_empty() {
                println!("No assignments found matching your filters.");
                return Ok(());
            }

            for recommendation in ranked.recommendations.iter() {
                println!("[{}] {}", recommendation.tier, recommendation.message);
            }
            for group in ranked.buckets.iter() {
                println!();
                println!("{} ({}):", group.title, group.assignments.len());
                for item in group.assignments.iter() {
                    println!(
                        "- {} ({}) due {} | {} {} ({}) | ~{} min",
                        item.assignment.name,
                        report::course_label(&courses, item.assignment.course_id),
                        report::due_label(item),
                        item.priority.tier,
                        item.priority.score,
                        item.priority.reason,
                        item.estimated_minutes
                    );
                }
            }
        }
        Commands::Report { view, out } => {
            let (courses, assignments) =
                load_coursework(cli.snapshot.as_deref(), cli.max_connections).await?;
            let filters = view.filters();
            let ranked =
                pipeline::classify_and_rank(&assignments, &courses, &filters, view.sort, now);
            let upcoming = calendar::upcoming(
                &pipeline::enrich_all(&assignments, now),
                &courses,
                now,
                5,
            );
            let markdown =
                report::build_report(&ranked, &upcoming, &courses, &filters, view.sort, now);
            std::fs::write(&out, markdown)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Calendar { out } => {
            let (courses, assignments) =
                load_coursework(cli.snapshot.as_deref(), cli.max_connections).await?;
            let events =
                calendar::build_events(&pipeline::enrich_all(&assignments, now), &courses);
            std::fs::write(&out, serde_json::to_string_pretty(&events)?)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Wrote {} calendar events to {}.", events.len(), out.display());
        }
        Commands::Upcoming { limit } => {
            let (courses, assignments) =
                load_coursework(cli.snapshot.as_deref(), cli.max_connections).await?;
            let upcoming = calendar::upcoming(
                &pipeline::enrich_all(&assignments, now),
                &courses,
                now,
                limit,
            );

            if upcoming.is_empty() {
                println!("No upcoming assignments. You're all caught up!");
                return Ok(());
            }

            println!("Due in the next 7 days:");
            for entry in upcoming.iter() {
                println!(
                    "- {} ({}) due {}",
                    entry.name,
                    entry.course_name.as_deref().unwrap_or("Unknown course"),
                    entry.due_at.format("%a %b %-d %H:%M UTC")
                );
            }
        }
    }

    Ok(())
}

fn database_url() -> anyhow::Result<String> {
    std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set unless --snapshot is given")
}

async fn load_coursework(
    snapshot: Option<&Path>,
    max_connections: u32,
) -> anyhow::Result<(Vec<Course>, Vec<Assignment>)> {
    match snapshot {
        Some(path) => {
            let source = SnapshotSource::from_path(path)?;
            source::gather(&source).await
        }
        None => {
            let pool = db::connect(&database_url()?, max_connections).await?;
            source::gather(&db::PgSource::new(pool)).await
        }
    }
}
