use super::query::sanitize_engine_error;
use crate::error::{Result, SqlabError};
use crate::session::SessionRegistry;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct ColumnMeta {
    pub name: String,
    /// Declared type, free-text as written in the schema.
    pub column_type: String,
    pub not_null: bool,
    pub primary_key: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnMeta>,
}

/// Lists user tables and their column metadata for a session. Recomputed on
/// every call; internal `sqlite_*` objects are excluded.
pub struct SchemaIntrospector {
    registry: Arc<SessionRegistry>,
}

impl SchemaIntrospector {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry }
    }

    pub fn table_schemas(&self, session_id: &str) -> Result<Vec<TableSchema>> {
        self.registry.with_connection(session_id, |conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT name FROM sqlite_master \
                     WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
                     ORDER BY name",
                )
                .map_err(|e| SqlabError::Execution(sanitize_engine_error(&e.to_string())))?;
            let names = stmt
                .query_map([], |row| row.get::<_, String>(0))
                .and_then(|rows| rows.collect::<rusqlite::Result<Vec<String>>>())
                .map_err(|e| SqlabError::Execution(sanitize_engine_error(&e.to_string())))?;

            names
                .into_iter()
                .map(|name| {
                    let columns = table_columns(conn, &name)?;
                    Ok(TableSchema { name, columns })
                })
                .collect()
        })
    }
}

fn table_columns(conn: &rusqlite::Connection, table: &str) -> Result<Vec<ColumnMeta>> {
    let pragma = format!("PRAGMA table_info(\"{}\")", table.replace('"', "\"\""));
    let mut stmt = conn
        .prepare(&pragma)
        .map_err(|e| SqlabError::Execution(sanitize_engine_error(&e.to_string())))?;
    stmt.query_map([], |row| {
        Ok(ColumnMeta {
            name: row.get(1)?,
            column_type: row.get(2)?,
            not_null: row.get::<_, i64>(3)? != 0,
            primary_key: row.get::<_, i64>(5)? > 0,
        })
    })
    .and_then(|rows| rows.collect::<rusqlite::Result<Vec<ColumnMeta>>>())
    .map_err(|e| SqlabError::Execution(sanitize_engine_error(&e.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn seeded_introspector() -> (SchemaIntrospector, String) {
        let conn = Connection::open_in_memory().expect("in-memory database opens");
        conn.execute_batch(
            "CREATE TABLE zones (id INTEGER PRIMARY KEY AUTOINCREMENT, label TEXT NOT NULL);
             CREATE TABLE areas (code TEXT, size REAL NOT NULL, PRIMARY KEY (code));
             CREATE INDEX idx_zones_label ON zones (label);",
        )
        .expect("seed schema");

        let registry = Arc::new(SessionRegistry::new());
        let session_id = registry.register(conn);
        (SchemaIntrospector::new(registry), session_id)
    }

    #[test]
    fn test_unknown_session_is_not_found() {
        let registry = Arc::new(SessionRegistry::new());
        let introspector = SchemaIntrospector::new(registry);
        let err = introspector.table_schemas("missing").unwrap_err();
        assert!(matches!(err, SqlabError::SessionNotFound(_)));
    }

    #[test]
    fn test_tables_ordered_by_name_and_internals_excluded() {
        let (introspector, session) = seeded_introspector();
        let schemas = introspector.table_schemas(&session).unwrap();

        // AUTOINCREMENT creates sqlite_sequence; it must not show up, and
        // neither does the index.
        let names: Vec<&str> = schemas.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["areas", "zones"]);
    }

    #[test]
    fn test_column_metadata() {
        let (introspector, session) = seeded_introspector();
        let schemas = introspector.table_schemas(&session).unwrap();

        let zones = schemas.iter().find(|s| s.name == "zones").unwrap();
        assert_eq!(zones.columns.len(), 2);
        let id = &zones.columns[0];
        assert_eq!(id.name, "id");
        assert_eq!(id.column_type, "INTEGER");
        assert!(id.primary_key);
        let label = &zones.columns[1];
        assert_eq!(label.name, "label");
        assert!(label.not_null);
        assert!(!label.primary_key);

        let areas = schemas.iter().find(|s| s.name == "areas").unwrap();
        let code = &areas.columns[0];
        assert!(code.primary_key);
        assert!(!code.not_null);
        let size = &areas.columns[1];
        assert_eq!(size.column_type, "REAL");
        assert!(size.not_null);
        assert!(!size.primary_key);
    }
}
