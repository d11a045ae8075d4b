pub mod error;
pub mod executor;
pub mod repl;
pub mod session;
pub mod value;
pub mod view;

pub use error::{Result, SqlabError};
pub use executor::{
    enforce_limit, ColumnMeta, LimitRewrite, QueryExecutor, QueryResult, SchemaIntrospector,
    TableSchema, MAX_RESULT_ROWS, QUERY_TIMEOUT_MS,
};
pub use repl::{InteractiveRepl, ReplCommand};
pub use session::{SessionHandle, SessionRegistry};
pub use value::Value;
pub use view::{ClipboardSink, MemoryClipboard, ResultView, SortDirection, SystemClipboard};
