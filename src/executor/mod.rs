mod introspect;
mod limit;
mod query;

pub use introspect::{ColumnMeta, SchemaIntrospector, TableSchema};
pub use limit::{enforce_limit, LimitRewrite, MAX_RESULT_ROWS};
pub use query::{QueryExecutor, QueryResult, QUERY_TIMEOUT_MS};
