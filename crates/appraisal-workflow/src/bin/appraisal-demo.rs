//! Prints a snapshot of the demo dashboard data: seeded assignments,
//! the task board, and one user's notification feed.
//!
//! ```sh
//! cargo run -p appraisal-workflow --bin appraisal-demo
//! RUST_LOG=debug cargo run -p appraisal-workflow --bin appraisal-demo
//! ```

use anyhow::Result;
use chrono::Utc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use appraisal_workflow::{demo, projection};

const DEMO_SEED: u64 = 42;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let now = Utc::now();
    let store = demo::demo_store(DEMO_SEED, now)?;

    info!(
        employees = store.employees().len(),
        templates = store.templates().len(),
        assignments = store.assignments().len(),
        "demo store initialized"
    );

    println!("== Appraisals ==");
    for appraisal in store.appraisals() {
        let rating = appraisal
            .overall_rating
            .map(|r| format!("{r:.1}"))
            .unwrap_or_else(|| "-".into());
        println!(
            "{:<18} {:<32} {:<12} rating {:<4} {}",
            appraisal.employee_name,
            appraisal.template_name,
            appraisal.status.to_string(),
            rating,
            appraisal.comments,
        );
    }

    println!();
    println!("== Task board ==");
    let tasks = store.tasks(now);
    for status in [
        projection::TaskStatus::Overdue,
        projection::TaskStatus::InProgress,
        projection::TaskStatus::Pending,
        projection::TaskStatus::Completed,
        projection::TaskStatus::Cancelled,
    ] {
        let column: Vec<_> = tasks.iter().filter(|t| t.status == status).collect();
        println!("{} ({})", status, column.len());
        for task in column {
            let due = task
                .due_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".into());
            println!("  {:<24} {:<12} due {}", task.name, task.employee_id, due);
        }
    }

    println!();
    println!("== Notifications for emp-idris ==");
    let seed = demo::static_notifications("emp-idris", now);
    for notification in store.notifications("emp-idris", now, seed) {
        println!(
            "[{}] {:<22} {}",
            notification.created_at.format("%Y-%m-%d"),
            notification.kind.to_string(),
            notification.title,
        );
    }

    Ok(())
}
