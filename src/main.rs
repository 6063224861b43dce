use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod error;
mod grading;
mod import;
mod models;
mod report;
mod roster;
mod store;
mod view;

use error::RosterError;
use models::{RecordId, SortMode, StudentInput};
use roster::{Outcome, Roster};
use store::SqliteSlotStore;

#[derive(Parser)]
#[command(name = "grade-roster")]
#[command(about = "Student grade roster for Group Scholar", long_about = None)]
struct Cli {
    /// SQLite database holding the roster slot
    #[arg(
        long,
        global = true,
        env = "GRADE_ROSTER_DATABASE_URL",
        default_value = "sqlite://grade-roster.db"
    )]
    database_url: String,

    /// Storage key the roster is saved under
    #[arg(long, global = true, env = "GRADE_ROSTER_SLOT", default_value = store::DEFAULT_SLOT)]
    slot: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a student with three subject grades
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, allow_hyphen_values = true)]
        math: String,
        #[arg(long, allow_hyphen_values = true)]
        english: String,
        #[arg(long, allow_hyphen_values = true)]
        science: String,
    },
    /// Edit a student; omitted fields keep their current values
    Edit {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        math: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        english: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        science: Option<String>,
    },
    /// Delete one student by id
    Delete {
        #[arg(long)]
        id: String,
    },
    /// Delete every student (requires --yes)
    Reset {
        #[arg(long)]
        yes: bool,
    },
    /// List students, optionally filtered by name and sorted
    List {
        #[arg(long)]
        search: Option<String>,
        /// newest, oldest, avgHigh, avgLow, nameAZ or nameZA
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Write an HTML report of the current view
    Report {
        #[arg(long)]
        search: Option<String>,
        /// newest, oldest, avgHigh, avgLow, nameAZ or nameZA
        #[arg(long)]
        sort: Option<String>,
        #[arg(long, default_value = "roster.html")]
        out: PathBuf,
    },
    /// Import students from a CSV file with name,math,english,science columns
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Load a small sample roster
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let store = SqliteSlotStore::connect(&cli.database_url)
        .await
        .with_context(|| format!("failed to open roster database {}", cli.database_url))?;
    store
        .init_db()
        .await
        .context("failed to prepare roster schema")?;
    let mut roster = Roster::open(store, cli.slot).await;

    match cli.command {
        Commands::Add {
            name,
            math,
            english,
            science,
        } => {
            let input = StudentInput {
                name,
                math,
                english,
                science,
            };
            match roster.add(&input).await {
                Ok(outcome) => {
                    let student = &outcome.value;
                    println!(
                        "Added {} ({}) total {} avg {:.2} grade {}.",
                        student.name,
                        student.id,
                        report::format_total(student.total),
                        student.avg,
                        student.grade
                    );
                    warn_if_unsaved(&outcome);
                }
                Err(err) => show_rejection(err),
            }
        }
        Commands::Edit {
            id,
            name,
            math,
            english,
            science,
        } => {
            let id = RecordId::from(id);
            let Some(current) = roster.get(&id) else {
                return Ok(());
            };
            let mut input = StudentInput::from_record(current);
            if let Some(name) = name {
                input.name = name;
            }
            if let Some(math) = math {
                input.math = math;
            }
            if let Some(english) = english {
                input.english = english;
            }
            if let Some(science) = science {
                input.science = science;
            }

            match roster.edit(&id, &input).await {
                Ok(outcome) => {
                    let student = &outcome.value;
                    println!(
                        "Updated {} ({}) total {} avg {:.2} grade {}.",
                        student.name,
                        student.id,
                        report::format_total(student.total),
                        student.avg,
                        student.grade
                    );
                    warn_if_unsaved(&outcome);
                }
                Err(err) => show_rejection(err),
            }
        }
        Commands::Delete { id } => match roster.delete(&RecordId::from(id)).await {
            Ok(outcome) => {
                println!("Deleted {}.", outcome.value.name);
                warn_if_unsaved(&outcome);
            }
            Err(err) => show_rejection(err),
        },
        Commands::Reset { yes } => {
            let outcome = roster.reset_all(yes).await;
            match outcome {
                Some(outcome) => {
                    println!("Removed {} student(s).", outcome.value);
                    warn_if_unsaved(&outcome);
                }
                None => println!(
                    "Reset not confirmed; pass --yes to delete ALL {} student(s).",
                    roster.students().len()
                ),
            }
        }
        Commands::List {
            search,
            sort,
            limit,
        } => {
            let mode = sort.as_deref().map(SortMode::parse).unwrap_or_default();
            let (list, stats) = roster.view(search.as_deref().unwrap_or(""), mode);
            print!("{}", report::render_list(&list, stats, limit));
        }
        Commands::Report { search, sort, out } => {
            let mode = sort.as_deref().map(SortMode::parse).unwrap_or_default();
            let (list, stats) = roster.view(search.as_deref().unwrap_or(""), mode);
            let html = report::build_html_report(search.as_deref(), mode, &list, stats);
            std::fs::write(&out, html)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Import { csv } => {
            let rows = import::read_csv(&csv)?;
            let outcome = roster.add_batch(&rows).await;
            println!(
                "Imported {} student(s) from {}.",
                outcome.value.added,
                csv.display()
            );
            for (row, reason) in outcome.value.rejected.iter() {
                println!("- row {row} skipped: {reason}");
            }
            warn_if_unsaved(&outcome);
        }
        Commands::Seed => {
            let rows: Vec<import::CsvRow> = import::sample_roster().into_iter().map(Ok).collect();
            let outcome = roster.add_batch(&rows).await;
            println!("Seeded {} student(s).", outcome.value.added);
            warn_if_unsaved(&outcome);
        }
    }

    Ok(())
}

/// Validation messages are shown inline; a missing record is a silent no-op.
fn show_rejection(err: RosterError) {
    if err.is_validation() {
        println!("{err}");
    }
}

fn warn_if_unsaved<T>(outcome: &Outcome<T>) {
    if let Some(err) = &outcome.write_warning {
        eprintln!("Warning: {err}. The change is not saved.");
    }
}
