use super::limit::{enforce_limit, MAX_RESULT_ROWS};
use crate::error::{Result, SqlabError};
use crate::session::SessionRegistry;
use crate::value::Value;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Advisory budget per query. Enforcement is the invoking context's job;
/// execution here is single-shot and blocking.
pub const QUERY_TIMEOUT_MS: u64 = 10_000;

static ENGINE_CODE_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:SQLITE_[A-Z0-9_]+|Error code \d+):\s*")
        .expect("engine code prefix regex is valid")
});

#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub row_count: usize,
    pub elapsed_ms: u64,
    /// True when the result was constrained relative to an unconstrained
    /// run, whether by rewrite or by hitting the cap organically.
    pub limited: bool,
}

/// Runs read-only statements against registered sessions. Validation is a
/// leading-keyword prefix check, not a parse: statements disguised via
/// comments or whitespace tricks are out of scope.
pub struct QueryExecutor {
    registry: Arc<SessionRegistry>,
}

impl QueryExecutor {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry }
    }

    pub fn execute(&self, session_id: &str, sql: &str) -> Result<QueryResult> {
        let trimmed = sql.trim();
        let keyword: String = trimmed
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect();
        if !keyword.eq_ignore_ascii_case("select") {
            return Err(SqlabError::Validation(
                "Only SELECT statements are allowed".to_string(),
            ));
        }

        let rewrite = enforce_limit(trimmed, MAX_RESULT_ROWS);
        debug!(session_id, sql = %rewrite.sql, "executing lab query");

        self.registry.with_connection(session_id, |conn| {
            let started = Instant::now();

            let mut stmt = conn
                .prepare(&rewrite.sql)
                .map_err(|e| SqlabError::Execution(sanitize_engine_error(&e.to_string())))?;
            let columns: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
            let column_count = columns.len();

            let mut rows = Vec::new();
            let mut raw_rows = stmt
                .query([])
                .map_err(|e| SqlabError::Execution(sanitize_engine_error(&e.to_string())))?;
            loop {
                let row = raw_rows
                    .next()
                    .map_err(|e| SqlabError::Execution(sanitize_engine_error(&e.to_string())))?;
                let Some(row) = row else { break };
                let mut cells = Vec::with_capacity(column_count);
                for idx in 0..column_count {
                    let cell = row
                        .get_ref(idx)
                        .map_err(|e| SqlabError::Execution(sanitize_engine_error(&e.to_string())))?;
                    cells.push(Value::from(cell));
                }
                rows.push(cells);
            }

            let elapsed_ms = started.elapsed().as_millis() as u64;
            let row_count = rows.len();
            let limited = rewrite.limited || row_count >= MAX_RESULT_ROWS;

            Ok(QueryResult {
                columns,
                rows,
                row_count,
                elapsed_ms,
                limited,
            })
        })
    }
}

/// Rewrite an engine error for users: read-only violations become a human
/// phrase, and internal error-code prefixes are stripped. Raw engine codes
/// never reach the caller.
pub(crate) fn sanitize_engine_error(message: &str) -> String {
    if message.contains("SQLITE_READONLY") || message.contains("readonly database") {
        return "The session database is read-only".to_string();
    }
    ENGINE_CODE_PREFIX.replace(message, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn seeded_lab() -> (QueryExecutor, String) {
        let conn = Connection::open_in_memory().expect("in-memory database opens");
        conn.execute_batch(
            "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, score REAL);
             INSERT INTO users (id, name, score) VALUES
                 (1, 'ada', 9.5),
                 (2, 'brian', NULL),
                 (3, 'grace', 7.0);",
        )
        .expect("seed schema");

        let registry = Arc::new(SessionRegistry::new());
        let session_id = registry.register(conn);
        (QueryExecutor::new(registry), session_id)
    }

    #[test]
    fn test_unknown_session_is_not_found() {
        let registry = Arc::new(SessionRegistry::new());
        let executor = QueryExecutor::new(registry);
        let err = executor.execute("missing", "SELECT 1").unwrap_err();
        assert!(matches!(err, SqlabError::SessionNotFound(_)));
    }

    #[test]
    fn test_non_select_rejected_before_engine() {
        let (executor, session) = seeded_lab();
        // DROP on a missing table would be an engine error if it ever ran;
        // validation must fire first.
        for sql in ["DROP TABLE does_not_exist", "delete from users", "  Update users SET score = 0"] {
            let err = executor.execute(&session, sql).unwrap_err();
            assert!(matches!(err, SqlabError::Validation(_)), "{sql}");
        }
    }

    #[test]
    fn test_select_collects_columns_and_rows() {
        let (executor, session) = seeded_lab();
        let result = executor
            .execute(&session, "SELECT id, name, score FROM users ORDER BY id")
            .unwrap();

        assert_eq!(result.columns, vec!["id", "name", "score"]);
        assert_eq!(result.row_count, 3);
        assert!(result.rows.iter().all(|r| r.len() == result.columns.len()));
        assert_eq!(result.rows[0][1], Value::Text("ada".to_string()));
        assert_eq!(result.rows[1][2], Value::Null);
        assert_eq!(result.rows[2][2], Value::Real(7.0));
        // No LIMIT in the input, so the appended ceiling marks the result.
        assert!(result.limited);
    }

    #[test]
    fn test_explicit_limit_within_cap_not_marked() {
        let (executor, session) = seeded_lab();
        let result = executor
            .execute(&session, "SELECT name FROM users LIMIT 2")
            .unwrap();
        assert_eq!(result.row_count, 2);
        assert!(!result.limited);
    }

    #[test]
    fn test_organic_cap_hit_marks_limited() {
        let conn = Connection::open_in_memory().expect("in-memory database opens");
        conn.execute_batch(
            "CREATE TABLE n (x INTEGER);
             WITH RECURSIVE seq(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM seq WHERE x < 1000)
             INSERT INTO n SELECT x FROM seq;",
        )
        .expect("seed 1000 rows");
        let registry = Arc::new(SessionRegistry::new());
        let session = registry.register(conn);
        let executor = QueryExecutor::new(registry);

        // Within the cap per the rewrite, but the returned row count sits at
        // the ceiling, so the result is still marked.
        let result = executor
            .execute(&session, "SELECT x FROM n LIMIT 1000")
            .unwrap();
        assert_eq!(result.row_count, 1000);
        assert!(result.limited);

        let result = executor
            .execute(&session, "SELECT x FROM n LIMIT 999")
            .unwrap();
        assert_eq!(result.row_count, 999);
        assert!(!result.limited);
    }

    #[test]
    fn test_engine_error_is_sanitized() {
        let (executor, session) = seeded_lab();
        let err = executor
            .execute(&session, "SELECT * FROM no_such_table")
            .unwrap_err();
        let SqlabError::Execution(message) = err else {
            panic!("expected execution error, got {err:?}");
        };
        assert!(message.contains("no_such_table"));
        assert!(!message.contains("SQLITE"));
        assert!(!message.starts_with("Error code"));
    }

    #[test]
    fn test_sanitize_strips_code_prefixes() {
        assert_eq!(
            sanitize_engine_error("SQLITE_ERROR: no such table: x"),
            "no such table: x"
        );
        assert_eq!(
            sanitize_engine_error("Error code 1: near \"FRM\": syntax error"),
            "near \"FRM\": syntax error"
        );
        assert_eq!(sanitize_engine_error("no such column: y"), "no such column: y");
    }

    #[test]
    fn test_sanitize_translates_readonly_violation() {
        assert_eq!(
            sanitize_engine_error("SQLITE_READONLY: attempt to write a readonly database"),
            "The session database is read-only"
        );
        assert_eq!(
            sanitize_engine_error("attempt to write a readonly database"),
            "The session database is read-only"
        );
    }
}
