use clap::{Parser, ValueEnum};
use colored::Colorize;
use rusqlite::Connection;
use sqlab::repl::render_table;
use sqlab::{InteractiveRepl, QueryExecutor, SessionRegistry, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sqlab", version, about = "Session-scoped SQL lab over an embedded SQLite database")]
struct Cli {
    /// SQLite database file to open for the lab session (in-memory when
    /// omitted)
    #[arg(long, env = "SQLAB_DB")]
    db: Option<PathBuf>,

    /// Run a single statement and exit instead of entering the lab
    #[arg(long)]
    eval: Option<String>,

    /// Output format for --eval
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sqlab=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if !atty::is(atty::Stream::Stdout) {
        colored::control::set_override(false);
    }

    if let Err(e) = run(Cli::parse()) {
        eprintln!("{}", e.to_string().red());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> sqlab::Result<()> {
    // The CLI owns the connection lifetime; the lab only ever borrows it
    // through the registry.
    let conn = match &cli.db {
        Some(path) => Connection::open(path)?,
        None => Connection::open_in_memory()?,
    };

    let registry = Arc::new(SessionRegistry::new());
    let session_id = registry.register(conn);

    match cli.eval {
        Some(sql) => eval_once(registry, &session_id, &sql, cli.format),
        None => InteractiveRepl::new(registry, session_id).run(),
    }
}

fn eval_once(
    registry: Arc<SessionRegistry>,
    session_id: &str,
    sql: &str,
    format: OutputFormat,
) -> sqlab::Result<()> {
    let executor = QueryExecutor::new(registry);
    let result = executor.execute(session_id, sql)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        OutputFormat::Table => {
            let rows: Vec<&Vec<Value>> = result.rows.iter().collect();
            println!("{}", render_table(&result, &rows));
            println!("{} rows ({} ms)", result.row_count, result.elapsed_ms);
        }
    }
    Ok(())
}
