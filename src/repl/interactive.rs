use super::commands::ReplCommand;
use super::render::{render_schema, render_table, render_table_list};
use crate::error::Result;
use crate::executor::{QueryExecutor, SchemaIntrospector, MAX_RESULT_ROWS};
use crate::session::SessionRegistry;
use crate::view::{ResultView, SystemClipboard};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

const PROMPT: &str = "sqlab> ";

const HELP: &str = "\
Enter a SELECT statement to run it against the session database.
Commands:
  .tables          list user tables
  .schema [table]  show column metadata
  .sort <column>   sort the last result by column name or 1-based index
                   (repeat to flip direction)
  .nosort          clear the sort
  .copy            copy the last result to the clipboard as CSV
  .help            show this help
  .quit            leave the lab";

/// Interactive lab session over one registered database.
pub struct InteractiveRepl {
    executor: QueryExecutor,
    introspector: SchemaIntrospector,
    view: ResultView,
    clipboard: SystemClipboard,
    session_id: String,
}

impl InteractiveRepl {
    pub fn new(registry: Arc<SessionRegistry>, session_id: impl Into<String>) -> Self {
        Self {
            executor: QueryExecutor::new(Arc::clone(&registry)),
            introspector: SchemaIntrospector::new(registry),
            view: ResultView::new(),
            clipboard: SystemClipboard::new(),
            session_id: session_id.into(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let mut editor = DefaultEditor::new()?;
        let history_path = history_path();
        if let Some(path) = &history_path {
            // A missing history file on first run is not an error.
            let _ = editor.load_history(path);
        }

        println!("{}", "sqlab — type .help for commands".dimmed());
        loop {
            match editor.readline(PROMPT) {
                Ok(line) => {
                    let Some(command) = ReplCommand::parse(&line) else {
                        continue;
                    };
                    let _ = editor.add_history_entry(line.trim());
                    if !self.dispatch(command) {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            }
        }

        if let Some(path) = &history_path {
            if let Err(e) = editor.save_history(path) {
                debug!(error = %e, "could not persist repl history");
            }
        }
        Ok(())
    }

    /// Returns false when the loop should end.
    fn dispatch(&mut self, command: ReplCommand) -> bool {
        match command {
            ReplCommand::Query(sql) => self.run_query(&sql),
            ReplCommand::Tables => self.show_tables(),
            ReplCommand::Schema(table) => self.show_schema(table.as_deref()),
            ReplCommand::Sort(column) => self.sort_by(&column),
            ReplCommand::ResetSort => {
                self.view.reset_sort();
                self.print_current();
            }
            ReplCommand::Copy => {
                if self.view.copy_to_clipboard(&mut self.clipboard) {
                    println!("{}", "Result copied to clipboard as CSV".green());
                }
            }
            ReplCommand::Help => println!("{HELP}"),
            ReplCommand::Quit => return false,
        }
        true
    }

    fn run_query(&mut self, sql: &str) {
        // New query: the coordinator clears the view's sort state.
        self.view.reset_sort();
        match self.executor.execute(&self.session_id, sql) {
            Ok(result) => self.view.set_result(result),
            Err(e) => self.view.set_error(e.to_string()),
        }
        self.print_current();
    }

    fn print_current(&self) {
        if let Some(message) = self.view.error() {
            println!("{}", message.red());
            return;
        }
        let Some(result) = self.view.result() else {
            println!("{}", "No result yet".dimmed());
            return;
        };

        println!("{}", render_table(result, &self.view.sorted_rows()));
        println!(
            "{}",
            format!("{} rows ({} ms)", result.row_count, result.elapsed_ms).dimmed()
        );
        if result.limited {
            println!(
                "{}",
                format!("Results are limited to the first {MAX_RESULT_ROWS} rows").yellow()
            );
        }
    }

    fn show_tables(&mut self) {
        match self.introspector.table_schemas(&self.session_id) {
            Ok(schemas) => println!("{}", render_table_list(&schemas)),
            Err(e) => println!("{}", e.to_string().red()),
        }
    }

    fn show_schema(&mut self, table: Option<&str>) {
        let schemas = match self.introspector.table_schemas(&self.session_id) {
            Ok(schemas) => schemas,
            Err(e) => {
                println!("{}", e.to_string().red());
                return;
            }
        };
        match table {
            Some(name) => match schemas.iter().find(|s| s.name == name) {
                Some(schema) => println!("{}", render_schema(schema)),
                None => println!("{}", format!("No such table: {name}").red()),
            },
            None => {
                for schema in &schemas {
                    println!("{}", schema.name.bold());
                    println!("{}", render_schema(schema));
                }
            }
        }
    }

    fn sort_by(&mut self, column: &str) {
        let Some(result) = self.view.result() else {
            println!("{}", "Nothing to sort; run a query first".dimmed());
            return;
        };
        let index = result
            .columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(column))
            .or_else(|| {
                column
                    .parse::<usize>()
                    .ok()
                    .filter(|n| (1..=result.columns.len()).contains(n))
                    .map(|n| n - 1)
            });
        match index {
            Some(index) => {
                self.view.toggle_sort(index);
                self.print_current();
            }
            None => println!("{}", format!("No such column: {column}").red()),
        }
    }
}

fn history_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".sqlab_history"))
}
