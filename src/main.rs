//! Tasktrack CLI - command-line interface for the project/task tracker

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use tasktrack::config;
use tasktrack::storage::DbStats;
use tasktrack::{Column, FieldValue, NewProject, NewTask, Row, Store, Table};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "tasktrack")]
#[command(version)]
#[command(about = "Minimal project/task tracker backed by a single SQLite file")]
#[command(long_about = r#"
Tasktrack keeps projects and their tasks in one SQLite file.

Example usage:
  tasktrack init
  tasktrack add-project "Jazda na rowerze" --start "2020-05-17 00:00:00"
  tasktrack add-task 1 "Wycieczka rowerowa" --status started --start "2020-05-11 12:00:00" --end "2020-05-11 15:00:00"
  tasktrack list tasks --where project_id=1
  tasktrack update tasks 1 --set status=done
  tasktrack delete projects --where "name=Jazda na rowerze"
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the database file (overrides the config file)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "text")]
    format: OutputMode,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputMode {
    Text,
    Json,
}

impl OutputMode {
    fn is_human(&self) -> bool {
        *self == OutputMode::Text
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create the projects and tasks tables if they are missing
    Init,

    /// Add a project and print its id
    AddProject {
        name: String,

        /// Start timestamp, e.g. "2020-05-11 00:00:00"
        #[arg(long)]
        start: Option<String>,

        /// End timestamp
        #[arg(long)]
        end: Option<String>,
    },

    /// Add a task under an existing project and print its id
    AddTask {
        project_id: i64,

        name: String,

        #[arg(long)]
        description: Option<String>,

        #[arg(long, default_value = "started")]
        status: String,

        #[arg(long)]
        start: String,

        #[arg(long)]
        end: String,
    },

    /// List rows of a table, optionally filtered by column=value predicates
    List {
        table: String,

        /// column=value, repeatable; all predicates must match
        #[arg(short = 'w', long = "where", value_name = "COLUMN=VALUE")]
        filters: Vec<String>,
    },

    /// Set fields on one row
    Update {
        table: String,

        id: i64,

        /// column=value, repeatable
        #[arg(short = 's', long = "set", value_name = "COLUMN=VALUE", required = true)]
        fields: Vec<String>,
    },

    /// Delete matching rows, or every row with --all
    Delete {
        table: String,

        /// column=value, repeatable; all predicates must match
        #[arg(short = 'w', long = "where", value_name = "COLUMN=VALUE")]
        filters: Vec<String>,

        #[arg(long, conflicts_with = "filters")]
        all: bool,
    },

    /// Insert the sample projects and tasks
    Seed,

    /// Show row counts
    Stats,
}

/// Result of one command, rendered after the store is closed
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Outcome {
    Initialized,
    Created { table: Table, id: i64 },
    Rows { table: Table, rows: Vec<Row> },
    Updated { table: Table, id: i64 },
    Deleted { table: Table, count: usize },
    Seeded { projects: Vec<i64>, tasks: Vec<i64> },
    Stats { stats: DbStats },
}

/// A command with its table and predicates already validated
enum Plan {
    Init,
    AddProject(NewProject),
    AddTask(NewTask),
    List { table: Table, filters: Vec<(Column, FieldValue)> },
    Update { table: Table, id: i64, fields: Vec<(Column, FieldValue)> },
    DeleteWhere { table: Table, filters: Vec<(Column, FieldValue)> },
    DeleteAll(Table),
    Seed,
    Stats,
}

fn main() {
    let cli = Cli::parse();
    let mode = cli.format;
    if let Err(e) = run(cli) {
        if mode.is_human() {
            tasktrack::ui::error(&format!("{:#}", e));
        } else {
            let envelope = serde_json::json!({ "ok": false, "error": format!("{:#}", e) });
            println!("{}", envelope);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let file_config = config::load_config(cli.config.as_deref())?;
    let database = config::resolve_database_path(cli.database.as_deref(), file_config.as_ref());
    config::ensure_db_dir(&database)?;

    let name = command_name(&cli.command);
    let plan = match plan(cli.command) {
        Ok(plan) => plan,
        Err(e) => {
            tracing::warn!("Rejected {}: {}", name, e);
            return Err(e.into());
        }
    };

    tracing::debug!("Running {} against {:?}", name, database);
    let outcome = match plan {
        Plan::Init => {
            let store = Store::connect(&database)?;
            let created = store.create_schema();
            store.close()?;
            created?;
            Outcome::Initialized
        }
        plan => Store::with_store(&database, |store| execute(store, plan))?,
    };
    render(cli.format, name, &database, outcome)
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Init => "init",
        Commands::AddProject { .. } => "add-project",
        Commands::AddTask { .. } => "add-task",
        Commands::List { .. } => "list",
        Commands::Update { .. } => "update",
        Commands::Delete { .. } => "delete",
        Commands::Seed => "seed",
        Commands::Stats => "stats",
    }
}

/// Split `column=value` and resolve both halves against the table
fn parse_assignment(table: Table, raw: &str) -> tasktrack::Result<(Column, FieldValue)> {
    let (name, value) = raw.split_once('=').ok_or_else(|| tasktrack::Error::UnknownColumn {
        table: table.to_string(),
        column: raw.to_string(),
    })?;
    let column = table.column(name.trim())?;
    Ok((column, FieldValue::parse_for(column, value)?))
}

fn parse_assignments(table: Table, raw: &[String]) -> tasktrack::Result<Vec<(Column, FieldValue)>> {
    raw.iter().map(|r| parse_assignment(table, r)).collect()
}

fn plan(command: Commands) -> tasktrack::Result<Plan> {
    Ok(match command {
        Commands::Init => Plan::Init,
        Commands::AddProject { name, start, end } => {
            Plan::AddProject(NewProject::new(name, start.as_deref(), end.as_deref()))
        }
        Commands::AddTask { project_id, name, description, status, start, end } => {
            Plan::AddTask(NewTask::new(project_id, name, description.as_deref(), status, start, end))
        }
        Commands::List { table, filters } => {
            let table: Table = table.parse()?;
            let filters = parse_assignments(table, &filters)?;
            Plan::List { table, filters }
        }
        Commands::Update { table, id, fields } => {
            let table: Table = table.parse()?;
            let fields = parse_assignments(table, &fields)?;
            Plan::Update { table, id, fields }
        }
        Commands::Delete { table, filters, all } => {
            let table: Table = table.parse()?;
            if all {
                Plan::DeleteAll(table)
            } else if filters.is_empty() {
                return Err(tasktrack::Error::EmptyPredicate("delete"));
            } else {
                Plan::DeleteWhere { table, filters: parse_assignments(table, &filters)? }
            }
        }
        Commands::Seed => Plan::Seed,
        Commands::Stats => Plan::Stats,
    })
}

fn execute(store: &Store, plan: Plan) -> tasktrack::Result<Outcome> {
    Ok(match plan {
        Plan::Init => Outcome::Initialized,
        Plan::AddProject(project) => Outcome::Created {
            table: Table::Projects,
            id: store.insert_project(&project)?,
        },
        Plan::AddTask(task) => Outcome::Created {
            table: Table::Tasks,
            id: store.insert_task(&task)?,
        },
        Plan::List { table, filters } => {
            let rows = if filters.is_empty() {
                store.select_all(table)?
            } else {
                store.select_where(table, &filters)?
            };
            Outcome::Rows { table, rows }
        }
        Plan::Update { table, id, fields } => {
            store.update(table, id, &fields)?;
            Outcome::Updated { table, id }
        }
        Plan::DeleteWhere { table, filters } => Outcome::Deleted {
            table,
            count: store.delete_where(table, &filters)?,
        },
        Plan::DeleteAll(table) => Outcome::Deleted {
            table,
            count: store.delete_all(table)?,
        },
        Plan::Seed => seed(store)?,
        Plan::Stats => Outcome::Stats { stats: store.stats()? },
    })
}

fn seed(store: &Store) -> tasktrack::Result<Outcome> {
    let projects = [
        NewProject::new("Powtórka z angielskiego", Some("2020-05-11 00:00:00"), Some("2020-05-13 00:00:00")),
        NewProject::new("Jazda na rowerze", Some("2020-05-17 00:00:00"), Some("2020-05-20 00:00:00")),
        NewProject::new("Czytanie książek", Some("2020-05-01 00:00:00"), Some("2021-05-01 00:00:00")),
    ];
    let project_ids = projects
        .iter()
        .map(|p| store.insert_project(p))
        .collect::<tasktrack::Result<Vec<_>>>()?;

    let tasks = [
        (project_ids[0], "Czasowniki regularne", "Zapamiętaj czasowniki ze strony 30"),
        (project_ids[1], "Wycieczka rowerowa", "Przejechać 100 km"),
        (project_ids[2], "Przeczytać powieść 'Komu bije dzwon'", "Przeczytać 400 stron"),
    ];
    let task_ids = tasks
        .iter()
        .map(|(project_id, name, description)| {
            store.insert_task(&NewTask::new(
                *project_id,
                *name,
                Some(*description),
                "started",
                "2020-05-11 12:00:00",
                "2020-05-11 15:00:00",
            ))
        })
        .collect::<tasktrack::Result<Vec<_>>>()?;

    Ok(Outcome::Seeded { projects: project_ids, tasks: task_ids })
}

fn emit_success(command: &str, outcome: &Outcome) -> anyhow::Result<()> {
    let envelope = serde_json::json!({
        "ok": true,
        "command": command,
        "data": outcome,
    });
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

fn render(mode: OutputMode, command: &str, database: &std::path::Path, outcome: Outcome) -> anyhow::Result<()> {
    use tasktrack::ui;

    if !mode.is_human() {
        return emit_success(command, &outcome);
    }

    match outcome {
        Outcome::Initialized => {
            ui::success("Schema ready");
            ui::info("Database", &database.display().to_string());
        }
        Outcome::Created { table, id } => {
            ui::created(table, id);
        }
        Outcome::Rows { table, rows } => {
            if rows.is_empty() {
                ui::empty(table);
            } else {
                println!("{}", ui::rows_table(table, &rows));
            }
        }
        Outcome::Updated { table, id } => {
            ui::updated(table, id);
        }
        Outcome::Deleted { table, count } => {
            ui::deleted(table, count);
        }
        Outcome::Seeded { projects, tasks } => {
            ui::header("Sample data inserted");
            ui::summary_row("Projects:", &format!("{:?}", projects));
            ui::summary_row("Tasks:", &format!("{:?}", tasks));
        }
        Outcome::Stats { stats } => {
            ui::section(&format!("{} {}", ui::Icons::STATS, database.display()));
            let projects = stats.projects.to_string();
            let tasks = stats.tasks.to_string();
            println!("{}", ui::stats_table(&[("Projects", &projects), ("Tasks", &tasks)]));
        }
    }
    Ok(())
}
