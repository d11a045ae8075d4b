mod commands;
mod interactive;
mod render;

pub use commands::ReplCommand;
pub use interactive::InteractiveRepl;
pub use render::{render_schema, render_table, render_table_list};
