// SQLite persistence for draft sessions and their accepted actions.

use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Context, Result};
use nexus_draft::{DraftAction, DraftState, Phase, Side};
use rusqlite::{params, Connection};

/// A session row that has not been closed.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSession {
    pub session_id: String,
    /// State the session was created from, when it did not start empty.
    pub initial_state: Option<DraftState>,
}

/// SQLite-backed log of draft sessions. Only actions are stored; states are
/// rebuilt by replaying them through the draft sequence.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) the database at `path`. Pass `":memory:"` for an
    /// ephemeral database.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS draft_sessions (
                session_id    TEXT PRIMARY KEY,
                initial_state TEXT,
                closed        INTEGER NOT NULL DEFAULT 0,
                created_at    TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE TABLE IF NOT EXISTS draft_actions (
                session_id TEXT NOT NULL REFERENCES draft_sessions(session_id),
                seq        INTEGER NOT NULL,
                phase      TEXT NOT NULL,
                side       TEXT NOT NULL,
                champion   TEXT NOT NULL,
                timestamp  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                PRIMARY KEY (session_id, seq)
            );
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Panics if the mutex is poisoned.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    /// Register a new session. `initial` is stored when the session resumes a
    /// partially played draft.
    pub fn create_session(&self, session_id: &str, initial: Option<&DraftState>) -> Result<()> {
        let conn = self.conn();
        let initial_json = initial
            .map(serde_json::to_string)
            .transpose()
            .context("failed to serialize initial state")?;
        conn.execute(
            "INSERT INTO draft_sessions (session_id, initial_state) VALUES (?1, ?2)",
            params![session_id, initial_json],
        )
        .context("failed to create draft session")?;
        Ok(())
    }

    /// Record the `seq`-th accepted action of a session. Re-recording the
    /// same `seq` is a no-op.
    pub fn record_action(&self, session_id: &str, seq: usize, action: &DraftAction) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT OR IGNORE INTO draft_actions (session_id, seq, phase, side, champion)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                session_id,
                seq as i64,
                action.phase.label(),
                action.side.label(),
                action.champion,
            ],
        )
        .context("failed to record draft action")?;
        Ok(())
    }

    /// Actions of one session in the order they were accepted.
    pub fn load_actions(&self, session_id: &str) -> Result<Vec<DraftAction>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT phase, side, champion FROM draft_actions
                 WHERE session_id = ?1 ORDER BY seq",
            )
            .context("failed to prepare load_actions query")?;

        let rows = stmt
            .query_map(params![session_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .context("failed to query draft actions")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map draft action rows")?;

        rows.into_iter()
            .map(|(phase, side, champion)| {
                let phase = Phase::from_str_phase(&phase)
                    .ok_or_else(|| anyhow!("stored action has unknown phase '{phase}'"))?;
                let side = Side::from_str_side(&side)
                    .ok_or_else(|| anyhow!("stored action has unknown side '{side}'"))?;
                Ok(DraftAction::new(phase, side, champion))
            })
            .collect()
    }

    /// Sessions not yet closed, oldest first.
    pub fn open_sessions(&self) -> Result<Vec<StoredSession>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT session_id, initial_state FROM draft_sessions
                 WHERE closed = 0 ORDER BY created_at, session_id",
            )
            .context("failed to prepare open_sessions query")?;

        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
            })
            .context("failed to query draft sessions")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map draft session rows")?;

        rows.into_iter()
            .map(|(session_id, initial_json)| {
                let initial_state = initial_json
                    .map(|json| serde_json::from_str::<DraftState>(&json))
                    .transpose()
                    .with_context(|| format!("failed to parse initial state of {session_id}"))?;
                Ok(StoredSession {
                    session_id,
                    initial_state,
                })
            })
            .collect()
    }

    /// Whether a session row exists, open or closed.
    pub fn session_exists(&self, session_id: &str) -> Result<bool> {
        let conn = self.conn();
        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM draft_sessions WHERE session_id = ?1)",
                params![session_id],
                |row| row.get(0),
            )
            .context("failed to check draft session existence")?;
        Ok(exists)
    }

    pub fn action_count(&self, session_id: &str) -> Result<usize> {
        let conn = self.conn();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM draft_actions WHERE session_id = ?1",
                params![session_id],
                |row| row.get(0),
            )
            .context("failed to count draft actions")?;
        Ok(count as usize)
    }

    /// Mark a session closed so recovery skips it. Its actions are kept.
    pub fn close_session(&self, session_id: &str) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "UPDATE draft_sessions SET closed = 1 WHERE session_id = ?1",
            params![session_id],
        )
        .context("failed to close draft session")?;
        Ok(())
    }

    /// New session id from the current UTC time, e.g.
    /// `session_20260228_143022_123`.
    pub fn generate_session_id() -> String {
        chrono::Utc::now()
            .format("session_%Y%m%d_%H%M%S_%3f")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_draft::{DraftFormat, DraftSequence};

    fn test_db() -> Database {
        Database::open(":memory:").expect("in-memory database should open")
    }

    #[test]
    fn open_creates_tables() {
        let db = test_db();
        let conn = db.conn();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert!(tables.contains(&"draft_sessions".to_string()));
        assert!(tables.contains(&"draft_actions".to_string()));
    }

    #[test]
    fn actions_round_trip_in_order() {
        let db = test_db();
        db.create_session("s1", None).unwrap();
        db.record_action("s1", 1, &DraftAction::ban(Side::Team2, "Zed")).unwrap();
        db.record_action("s1", 0, &DraftAction::ban(Side::Team1, "Ahri")).unwrap();

        let actions = db.load_actions("s1").unwrap();
        assert_eq!(
            actions,
            vec![
                DraftAction::ban(Side::Team1, "Ahri"),
                DraftAction::ban(Side::Team2, "Zed"),
            ]
        );
        assert_eq!(db.action_count("s1").unwrap(), 2);
    }

    #[test]
    fn record_action_is_idempotent() {
        let db = test_db();
        db.create_session("s1", None).unwrap();
        let action = DraftAction::ban(Side::Team1, "Ahri");
        db.record_action("s1", 0, &action).unwrap();
        db.record_action("s1", 0, &action).unwrap();
        assert_eq!(db.action_count("s1").unwrap(), 1);
    }

    #[test]
    fn actions_scoped_to_session() {
        let db = test_db();
        db.create_session("a", None).unwrap();
        db.create_session("b", None).unwrap();
        db.record_action("a", 0, &DraftAction::ban(Side::Team1, "Ahri")).unwrap();
        assert_eq!(db.load_actions("a").unwrap().len(), 1);
        assert!(db.load_actions("b").unwrap().is_empty());
    }

    #[test]
    fn foreign_keys_enforced() {
        let db = test_db();
        let result = db.record_action("missing", 0, &DraftAction::ban(Side::Team1, "Ahri"));
        assert!(result.is_err());
    }

    #[test]
    fn closed_sessions_are_not_open() {
        let db = test_db();
        db.create_session("a", None).unwrap();
        db.create_session("b", None).unwrap();
        db.close_session("a").unwrap();

        let open = db.open_sessions().unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].session_id, "b");
        assert!(db.session_exists("a").unwrap());
        assert!(!db.session_exists("c").unwrap());
    }

    #[test]
    fn initial_state_is_preserved() {
        let db = test_db();
        let sequence = DraftSequence::new(DraftFormat::standard());
        let state = sequence
            .apply(&sequence.start(), &DraftAction::ban(Side::Team1, "Ahri"))
            .unwrap();
        db.create_session("s1", Some(&state)).unwrap();

        let open = db.open_sessions().unwrap();
        assert_eq!(open[0].initial_state.as_ref(), Some(&state));
    }

    #[test]
    fn duplicate_session_id_is_rejected() {
        let db = test_db();
        db.create_session("s1", None).unwrap();
        assert!(db.create_session("s1", None).is_err());
    }

    #[test]
    fn generate_session_id_format() {
        let id = Database::generate_session_id();
        assert!(id.starts_with("session_"), "unexpected id: {id}");
        assert_eq!(id.len(), "session_20260228_143022_123".len());
    }
}
