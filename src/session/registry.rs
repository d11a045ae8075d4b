use crate::error::{Result, SqlabError};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use uuid::Uuid;

/// An already-open database handle registered under a session id. The
/// registry stores handles it is given; opening and closing them is the
/// business of whoever registered them.
#[derive(Clone)]
pub struct SessionHandle {
    conn: Arc<Mutex<Connection>>,
    created_at: DateTime<Utc>,
}

impl SessionHandle {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            created_at: Utc::now(),
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Maps session ids to open connections. Injected into the query and schema
/// collaborators rather than looked up ambiently.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection under a fresh v4 id and return the id.
    pub fn register(&self, conn: Connection) -> String {
        let id = Uuid::new_v4().to_string();
        self.register_as(&id, conn);
        id
    }

    /// Register a connection under a caller-chosen id, replacing any
    /// previous handle with that id.
    pub fn register_as(&self, id: &str, conn: Connection) {
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        sessions.insert(id.to_string(), SessionHandle::new(conn));
    }

    pub fn deregister(&self, id: &str) -> bool {
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        sessions.remove(id).is_some()
    }

    pub fn session_ids(&self) -> Vec<String> {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<String> = sessions.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn contains(&self, id: &str) -> bool {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        sessions.contains_key(id)
    }

    /// Run `f` against the session's connection, serializing access to the
    /// handle. Fails with `SessionNotFound` when the id is unknown.
    pub fn with_connection<T>(
        &self,
        id: &str,
        f: impl FnOnce(&Connection) -> Result<T>,
    ) -> Result<T> {
        let handle = {
            let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
            sessions
                .get(id)
                .cloned()
                .ok_or_else(|| SqlabError::SessionNotFound(id.to_string()))?
        };
        let conn = handle.conn.lock().unwrap_or_else(PoisonError::into_inner);
        f(&conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_memory() -> Connection {
        Connection::open_in_memory().expect("in-memory database opens")
    }

    #[test]
    fn test_handle_stamps_creation_time() {
        let handle = SessionHandle::new(open_memory());
        assert!(handle.created_at() <= Utc::now());
    }

    #[test]
    fn test_register_and_query_roundtrip() {
        let registry = SessionRegistry::new();
        let id = registry.register(open_memory());

        let answer: i64 = registry
            .with_connection(&id, |conn| {
                conn.query_row("SELECT 40 + 2", [], |row| row.get(0))
                    .map_err(Into::into)
            })
            .unwrap();
        assert_eq!(answer, 42);
    }

    #[test]
    fn test_unknown_session_is_not_found() {
        let registry = SessionRegistry::new();
        let err = registry
            .with_connection("nope", |_| Ok(()))
            .unwrap_err();
        assert!(matches!(err, SqlabError::SessionNotFound(ref id) if id == "nope"));
    }

    #[test]
    fn test_deregister_removes_session() {
        let registry = SessionRegistry::new();
        registry.register_as("lab", open_memory());
        assert!(registry.contains("lab"));
        assert!(registry.deregister("lab"));
        assert!(!registry.contains("lab"));
        assert!(!registry.deregister("lab"));
    }

    #[test]
    fn test_file_backed_session_roundtrip() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("lab.db");
        {
            let conn = Connection::open(&path).expect("create database");
            conn.execute_batch("CREATE TABLE t (x INTEGER); INSERT INTO t VALUES (7);")
                .expect("seed");
        }

        let registry = SessionRegistry::new();
        let id = registry.register(Connection::open(&path).expect("reopen database"));
        let x: i64 = registry
            .with_connection(&id, |conn| {
                conn.query_row("SELECT x FROM t", [], |row| row.get(0))
                    .map_err(Into::into)
            })
            .unwrap();
        assert_eq!(x, 7);
    }

    #[test]
    fn test_session_ids_sorted() {
        let registry = SessionRegistry::new();
        registry.register_as("b", open_memory());
        registry.register_as("a", open_memory());
        assert_eq!(registry.session_ids(), vec!["a", "b"]);
    }
}
