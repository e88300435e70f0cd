//! Command-line front end for the technology tracker.
//!
//! # Responsibility
//! - Map subcommands onto `techtracker_core` record store and transfer APIs.
//! - Render lists, stats and persistence warnings as plain text.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use techtracker_core::{
    build_export, default_log_level, export_file_name, import_into, init_logging, to_pretty_json,
    Clock, ExportDocument, KvStore, NewTechnology, PersistenceWarning, Preferences, RecordStore,
    SqliteKvStore, TechId, TechStatus, TechnologyPatch, TechnologyRecord,
};

const DEFAULT_DB_FILE: &str = "tech-tracker.sqlite3";

/// Track progress learning technologies.
#[derive(Parser)]
#[command(name = "techtracker", version, long_about = None)]
struct Cli {
    /// SQLite file holding the key-value store.
    #[arg(long, global = true, default_value = DEFAULT_DB_FILE)]
    db: PathBuf,

    /// Absolute directory for rolling log files; logging is off when omitted.
    #[arg(long, global = true)]
    log_dir: Option<String>,

    /// Log level (trace|debug|info|warn|error).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a technology (starts as not-started).
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// frontend|backend|mobile|devops|database|tools, or any label.
        #[arg(long, default_value = "frontend")]
        category: String,
        /// beginner|intermediate|advanced, or any label.
        #[arg(long, default_value = "beginner")]
        difficulty: String,
        /// Target date, e.g. 2026-12-31.
        #[arg(long)]
        deadline: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// List technologies in insertion order.
    List {
        /// Only show records with this status.
        #[arg(long)]
        status: Option<String>,
    },

    /// Edit fields of an existing technology.
    Edit {
        id: TechId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        difficulty: Option<String>,
        #[arg(long, conflicts_with = "clear_deadline")]
        deadline: Option<String>,
        #[arg(long)]
        clear_deadline: bool,
        #[arg(long, conflicts_with = "clear_notes")]
        notes: Option<String>,
        #[arg(long)]
        clear_notes: bool,
    },

    /// Set status to not-started, in-progress or completed.
    Status { id: TechId, status: String },

    /// Move to the next status (not-started -> in-progress -> completed -> not-started).
    Advance { id: TechId },

    /// Delete a technology. Unknown ids are ignored.
    Delete { id: TechId },

    /// Delete every technology.
    Clear {
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },

    /// Show progress statistics.
    Stats,

    /// Export all technologies to a JSON file.
    Export {
        /// Output path; defaults to tech-tracker-export-<date>.json.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Replace all technologies with the contents of an export file.
    Import { file: PathBuf },

    /// Show or change the dark mode preference.
    Theme {
        #[arg(value_enum, default_value_t = ThemeAction::Show)]
        action: ThemeAction,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ThemeAction {
    Show,
    On,
    Off,
    Toggle,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir)?;
    }

    let kv = SqliteKvStore::open(&cli.db)
        .map_err(|err| format!("failed to open {}: {err}", cli.db.display()))?;

    let mut store = RecordStore::load(&kv);
    match cli.command {
        Commands::Add {
            title,
            description,
            category,
            difficulty,
            deadline,
            notes,
        } => {
            let mut input = NewTechnology::new(title, description)
                .with_category(category)
                .with_difficulty(difficulty);
            input.deadline = deadline;
            input.notes = notes;
            let record = store.create(input).map_err(|err| err.to_string())?;
            println!("added {}", format_record(&record));
        }
        Commands::List { status } => {
            let filter = status
                .map(|text| {
                    TechStatus::parse(&text).ok_or_else(|| format!("unknown status `{text}`"))
                })
                .transpose()?;
            let records: Vec<&TechnologyRecord> = match filter {
                Some(status) => store.by_status(status).collect(),
                None => store.list().iter().collect(),
            };
            if records.is_empty() {
                println!("no technologies yet");
            }
            for record in records {
                println!("{}", format_record(record));
            }
        }
        Commands::Edit {
            id,
            title,
            description,
            category,
            difficulty,
            deadline,
            clear_deadline,
            notes,
            clear_notes,
        } => {
            let patch = TechnologyPatch {
                title,
                description,
                category: category.map(Into::into),
                difficulty: difficulty.map(Into::into),
                deadline: if clear_deadline { Some(None) } else { deadline.map(Some) },
                notes: if clear_notes { Some(None) } else { notes.map(Some) },
            };
            if patch.is_empty() {
                return Err("nothing to update; pass at least one field flag".to_string());
            }
            let record = store.update(id, patch).map_err(|err| err.to_string())?;
            println!("updated {}", format_record(&record));
        }
        Commands::Status { id, status } => {
            let record = store
                .set_status(id, &status)
                .map_err(|err| err.to_string())?;
            println!("{}", format_record(&record));
        }
        Commands::Advance { id } => {
            let record = store.advance_status(id).map_err(|err| err.to_string())?;
            println!("{}", format_record(&record));
        }
        Commands::Delete { id } => {
            store.delete(id);
            println!("deleted {id}");
        }
        Commands::Clear { yes } => {
            if !yes {
                return Err(format!(
                    "refusing to delete {} technologies without --yes",
                    store.len()
                ));
            }
            store.clear();
            println!("cleared");
        }
        Commands::Stats => {
            let stats = store.stats();
            println!("total:       {}", stats.total);
            println!("completed:   {}", stats.completed);
            println!("in progress: {}", stats.in_progress);
            println!("not started: {}", stats.not_started);
            println!("progress:    {}%", stats.progress_percent);
        }
        Commands::Export { out } => {
            if store.is_empty() {
                return Err("nothing to export".to_string());
            }
            let (document, default_name) = snapshot(&store);
            let json = to_pretty_json(&document).map_err(|err| err.to_string())?;
            let path = out.unwrap_or_else(|| PathBuf::from(default_name));
            std::fs::write(&path, json)
                .map_err(|err| format!("failed to write {}: {err}", path.display()))?;
            println!(
                "exported {} technologies to {}",
                document.stats.total,
                path.display()
            );
        }
        Commands::Import { file } => {
            let payload = std::fs::read(&file)
                .map_err(|err| format!("failed to read {}: {err}", file.display()))?;
            let count = import_into(&mut store, &payload).map_err(|err| err.to_string())?;
            println!("imported {count} technologies");
        }
        Commands::Theme { action } => return run_theme(&kv, action),
    }

    report_warning(store.persistence_warning());
    Ok(())
}

fn run_theme<S: KvStore>(kv: S, action: ThemeAction) -> Result<(), String> {
    let mut prefs = Preferences::load(kv);
    match action {
        ThemeAction::Show => {}
        ThemeAction::On => prefs.set_dark_mode(true),
        ThemeAction::Off => prefs.set_dark_mode(false),
        ThemeAction::Toggle => {
            prefs.toggle_dark_mode();
        }
    }
    println!("dark mode: {}", if prefs.dark_mode() { "on" } else { "off" });
    report_warning(prefs.persistence_warning());
    Ok(())
}

/// Export document and its default file name, both taken at one instant.
fn snapshot<S: KvStore, C: Clock>(store: &RecordStore<S, C>) -> (ExportDocument, String) {
    let now = store.clock().now();
    (build_export(store.list(), now), export_file_name(now))
}

fn report_warning(warning: Option<&PersistenceWarning>) {
    if let Some(warning) = warning {
        eprintln!("warning: {warning}");
    }
}

fn format_record(record: &TechnologyRecord) -> String {
    let mut line = format!("[{}] {} ({})", record.id, record.title, record.status);
    if let Some(category) = &record.category {
        line.push_str(&format!(" {category}"));
    }
    if let Some(difficulty) = &record.difficulty {
        line.push_str(&format!("/{difficulty}"));
    }
    if let Some(deadline) = &record.deadline {
        line.push_str(&format!(" due {deadline}"));
    }
    line
}
