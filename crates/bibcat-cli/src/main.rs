use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bibcat_core::{AppConfig, CatalogStore, Database, ExitCode};
use bibcat_ingest::{import_h_index_file, ImportSummary, Importer, IngestError, SlugAllocator};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "bibcat",
    about = "Publication catalog fed from Web of Science exports",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format.
    /// Also enabled by setting BIBCAT_JSON=1.
    #[arg(long, global = true)]
    json: bool,

    /// Use this database file instead of the configured one.
    #[arg(long, global = true)]
    database: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a Web of Science tagged export (savedrecs.txt).
    Import {
        file: PathBuf,
        /// Treat indented lines as continuations of the previous tag.
        #[arg(long)]
        continuation_lines: bool,
    },

    /// Import author h-index values from a `name,h_index` CSV file.
    ImportHIndex { file: PathBuf },

    /// Show catalog statistics.
    Stats,

    /// Show a publication and its authors.
    Show {
        #[arg(long)]
        doi: String,
    },

    /// Config management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration.
    Show,
    /// Print the config file location.
    Path,
}

// ─── Main ────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let start = Instant::now();
    let cli = Cli::parse();

    let json_output = cli.json || std::env::var("BIBCAT_JSON").as_deref() == Ok("1");

    let mut config = AppConfig::load()?;
    if let Some(path) = &cli.database {
        config.core.database_path = Some(path.to_string_lossy().to_string());
    }
    init_logging(&config);

    match cli.command {
        Commands::Import {
            file,
            continuation_lines,
        } => {
            let mut db = exit_on_missing_input(open_db_for_input(&config, &file), &file, json_output)?;
            let mut import_config = config.import.clone();
            import_config.continuation_lines |= continuation_lines;

            let result = Importer::new(&mut db, &import_config).import_file(&file);
            let summary = exit_on_missing_input(result, &file, json_output)?;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({"status":"ok","data":summary,"meta":{"duration_ms":dur}}))?;
            } else {
                print_summary(&summary);
            }
        }

        Commands::ImportHIndex { file } => {
            let mut db = exit_on_missing_input(open_db_for_input(&config, &file), &file, json_output)?;
            let mut slugs = SlugAllocator::new(config.import.slug_max_attempts);

            let result = import_h_index_file(&mut db, &mut slugs, &file);
            let summary = exit_on_missing_input(result, &file, json_output)?;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({"status":"ok","data":summary,"meta":{"duration_ms":dur}}))?;
            } else {
                println!("Rows:     {}", summary.total);
                println!("Created:  {}", summary.created);
                println!("Updated:  {}", summary.updated);
                println!("Skipped:  {}", summary.skipped);
            }
        }

        Commands::Stats => {
            let db = open_db(&config)?;
            let stats = db.stats()?;
            let migrations = db.applied_migrations()?;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status":"ok",
                    "data":{"database":db.path(),"stats":stats,"applied_migrations":migrations},
                    "meta":{"duration_ms":dur}
                }))?;
            } else {
                println!("Catalog statistics ({}):", db.path().unwrap_or(":memory:"));
                println!("  Publications:  {}", stats.publications);
                println!("    with DOI:    {}", stats.with_doi);
                println!("    with date:   {}", stats.with_date);
                println!("  Authors:       {}", stats.authors);
                println!("  Authorships:   {}", stats.authorships);
                println!("  Schema:        v{}", migrations.last().copied().unwrap_or(0));
            }
        }

        Commands::Show { doi } => {
            let db = open_db(&config)?;
            let Some(publication) = db.find_publication_by_doi(&doi)? else {
                let dur = start.elapsed().as_millis();
                if json_output {
                    print_json(&serde_json::json!({"status":"error","error":"not_found","message":format!("No publication with DOI {doi}"),"meta":{"duration_ms":dur}}))?;
                } else {
                    eprintln!("No publication with DOI {doi}");
                }
                std::process::exit(ExitCode::NotFound as i32);
            };
            let authors = db.publication_authors(&publication)?;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status":"ok",
                    "data":{"publication":publication,"authors":authors},
                    "meta":{"duration_ms":dur}
                }))?;
            } else {
                println!("{}", publication.title);
                if let Some(source) = &publication.source {
                    println!("  Source:  {source}");
                }
                if let Some(date) = publication.publication_date {
                    println!("  Date:    {date}");
                }
                let volume = publication.volume.as_deref().unwrap_or("-");
                let issue = publication.issue.as_deref().unwrap_or("-");
                let pages = publication.pages.as_deref().unwrap_or("-");
                println!("  Vol/Iss: {volume}/{issue}  pp. {pages}");
                println!("  DOI:     {doi}");
                for (i, author) in authors.iter().enumerate() {
                    let h = author.h_index.map(|h| format!("  h={h}")).unwrap_or_default();
                    println!("  {}. {} [{}]{h}", i + 1, author.name, author.slug);
                }
            }
        }

        Commands::Config { action } => {
            let dur = start.elapsed().as_millis();
            match action {
                ConfigAction::Show => {
                    if json_output {
                        print_json(&serde_json::json!({"status":"ok","data":config,"meta":{"duration_ms":dur}}))?;
                    } else {
                        println!("library_path       = {}", config.core.library_path);
                        println!("database_path      = {}", config.database_path().display());
                        println!("slug_max_attempts  = {}", config.import.slug_max_attempts);
                        println!("continuation_lines = {}", config.import.continuation_lines);
                        println!("log level          = {}", config.logging.level);
                    }
                }
                ConfigAction::Path => {
                    let path = AppConfig::config_path();
                    if json_output {
                        print_json(&serde_json::json!({"status":"ok","data":{"path":path},"meta":{"duration_ms":dur}}))?;
                    } else {
                        println!("{}", path.display());
                    }
                }
            }
        }
    }

    Ok(())
}

// ─── Helpers ────────────────────────────────────────────────────────────────

/// `BIBCAT_LOG` wins over the configured level. Logs go to stderr so JSON
/// output on stdout stays clean.
fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_env("BIBCAT_LOG")
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn exit_on_missing_input<T>(result: bibcat_ingest::Result<T>, file: &Path, json_output: bool) -> Result<T> {
    match result {
        Err(IngestError::InputNotFound(_)) => {
            let message = format!("File not found: {}", file.display());
            if json_output {
                print_json(&serde_json::json!({"status":"error","error":"file_not_found","message":message}))?;
            } else {
                eprintln!("{message}");
            }
            std::process::exit(ExitCode::FileSystemError as i32);
        }
        other => Ok(other?),
    }
}

fn print_summary(summary: &ImportSummary) {
    println!("Records:  {} ({} imported)", summary.total, summary.processed());
    println!("Created:  {}", summary.created);
    println!("Updated:  {}", summary.updated);
    println!("Authors:  {} new", summary.authors_created);
    println!("Skipped:  {}", summary.skipped_count());
    for skipped in &summary.skipped {
        println!("  #{} (line {}): {}", skipped.index, skipped.line, skipped.reason);
    }
    if let Some(line) = summary.dangling_line {
        println!("Warning: record starting at line {line} has no ER marker and was not imported");
    }
}

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}

fn open_db(config: &AppConfig) -> Result<Database> {
    Ok(Database::open(&config.database_path())?)
}

/// Opens the catalog only once `file` is known to exist, so a bad path
/// leaves no database or library directory behind.
fn open_db_for_input(config: &AppConfig, file: &Path) -> bibcat_ingest::Result<Database> {
    if !file.is_file() {
        return Err(IngestError::InputNotFound(file.to_path_buf()));
    }
    Ok(Database::open(&config.database_path())?)
}
