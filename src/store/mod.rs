//! SQLite-backed persistence for thoughts, synthesis events, latency
//! history, and governance state flags.
#![allow(dead_code)]

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, ToSql};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::validate::Priority;
use crate::error::Error;

/// A buffered thought.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thought {
    pub id: i64,
    pub agent_id: String,
    pub channel: String,
    pub target: String,
    pub content: String,
    pub priority: Priority,
    pub created_at: String,
    pub status: ThoughtStatus,
}

/// Thought lifecycle state. The pending to synthesized transition is
/// one-way; thoughts are never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThoughtStatus {
    Pending,
    Synthesized,
}

impl ThoughtStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThoughtStatus::Pending => "pending",
            ThoughtStatus::Synthesized => "synthesized",
        }
    }
}

impl ToSql for ThoughtStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ThoughtStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "pending" => Ok(ThoughtStatus::Pending),
            "synthesized" => Ok(ThoughtStatus::Synthesized),
            other => Err(FromSqlError::Other(
                format!("unknown thought status: {}", other).into(),
            )),
        }
    }
}

/// Audit record written once per successful flush of a non-empty backlog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisEvent {
    pub id: i64,
    pub agent_id: String,
    pub thoughts_count: i64,
    pub final_output: String,
    pub triggered_at: String,
}

/// Handle on the governance database.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create a database at the given path. Parent directories are
    /// created as needed; `:memory:` is supported for tests.
    pub fn open(path: &Path) -> Result<Self, Error> {
        if path != Path::new(":memory:") {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)
            .map_err(|e| Error::Store(format!("sqlite open: {}", e)))?;

        // PRAGMA journal_mode returns the resulting mode as a row.
        let _mode: String = conn
            .query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))
            .map_err(|e| Error::Store(format!("sqlite wal mode: {}", e)))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS buffered_thoughts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                agent_id TEXT NOT NULL,
                channel TEXT NOT NULL,
                target TEXT DEFAULT '',
                content TEXT NOT NULL,
                priority TEXT DEFAULT 'P1' CHECK(priority IN ('P0', 'P1', 'P2')),
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                status TEXT DEFAULT 'pending'
            );
            CREATE INDEX IF NOT EXISTS idx_pending
                ON buffered_thoughts(agent_id, status) WHERE status = 'pending';

            CREATE TABLE IF NOT EXISTS network_metrics (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                latency_ms INTEGER NOT NULL,
                recorded_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS synthesis_events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                agent_id TEXT NOT NULL,
                thoughts_count INTEGER,
                final_output TEXT,
                triggered_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS state (
                key TEXT PRIMARY KEY,
                value TEXT
            );
            "#,
        )
        .map_err(|e| Error::Store(format!("sqlite init: {}", e)))?;

        Ok(Self { conn })
    }

    /// Current journal mode ("wal" for file-backed databases).
    pub fn journal_mode(&self) -> Result<String, Error> {
        self.conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .map_err(|e| Error::Store(format!("sqlite journal mode: {}", e)))
    }

    /// Insert a new pending thought and return its id.
    pub fn insert_thought(
        &self,
        agent_id: &str,
        channel: &str,
        target: &str,
        content: &str,
        priority: Priority,
    ) -> Result<i64, Error> {
        self.conn
            .execute(
                "INSERT INTO buffered_thoughts (agent_id, channel, target, content, priority) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![agent_id, channel, target, content, priority],
            )
            .map_err(|e| Error::Store(format!("sqlite insert thought: {}", e)))?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Pending thoughts for an agent, ranked by priority tier, creation
    /// time, then id.
    pub fn pending_thoughts(&self, agent_id: &str) -> Result<Vec<Thought>, Error> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, agent_id, channel, target, content, priority, created_at, status \
                 FROM buffered_thoughts \
                 WHERE agent_id = ?1 AND status = 'pending' \
                 ORDER BY \
                     CASE priority WHEN 'P0' THEN 0 WHEN 'P1' THEN 1 WHEN 'P2' THEN 2 END, \
                     created_at ASC, \
                     id ASC",
            )
            .map_err(|e| Error::Store(format!("sqlite prepare thoughts: {}", e)))?;

        let rows = stmt
            .query_map(params![agent_id], |row| {
                Ok(Thought {
                    id: row.get(0)?,
                    agent_id: row.get(1)?,
                    channel: row.get(2)?,
                    target: row.get(3)?,
                    content: row.get(4)?,
                    priority: row.get(5)?,
                    created_at: row.get(6)?,
                    status: row.get(7)?,
                })
            })
            .map_err(|e| Error::Store(format!("sqlite query thoughts: {}", e)))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::Store(format!("sqlite read thoughts: {}", e)))
    }

    /// Count pending thoughts, for one agent or across all agents.
    pub fn pending_count(&self, agent_id: Option<&str>) -> Result<i64, Error> {
        let count = match agent_id {
            Some(agent) => self.conn.query_row(
                "SELECT COUNT(*) FROM buffered_thoughts WHERE agent_id = ?1 AND status = 'pending'",
                params![agent],
                |row| row.get(0),
            ),
            None => self.conn.query_row(
                "SELECT COUNT(*) FROM buffered_thoughts WHERE status = 'pending'",
                [],
                |row| row.get(0),
            ),
        };
        count.map_err(|e| Error::Store(format!("sqlite count pending: {}", e)))
    }

    /// Distinct agent ids with a pending backlog.
    pub fn pending_agents(&self) -> Result<Vec<String>, Error> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT DISTINCT agent_id FROM buffered_thoughts \
                 WHERE status = 'pending' ORDER BY agent_id",
            )
            .map_err(|e| Error::Store(format!("sqlite prepare agents: {}", e)))?;

        let rows = stmt
            .query_map([], |row| row.get(0))
            .map_err(|e| Error::Store(format!("sqlite query agents: {}", e)))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::Store(format!("sqlite read agents: {}", e)))
    }

    /// Mark the agent's pending backlog synthesized and record one
    /// synthesis event. Returns the number of thoughts transitioned.
    ///
    /// Runs in a single transaction; two racing flushes cannot both claim
    /// the same rows, and the loser records no event.
    pub fn mark_synthesized(&mut self, agent_id: &str, output: &str) -> Result<usize, Error> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| Error::Store(format!("sqlite begin: {}", e)))?;

        let changed = tx
            .execute(
                "UPDATE buffered_thoughts SET status = 'synthesized' \
                 WHERE agent_id = ?1 AND status = 'pending'",
                params![agent_id],
            )
            .map_err(|e| Error::Store(format!("sqlite mark synthesized: {}", e)))?;

        if changed > 0 {
            tx.execute(
                "INSERT INTO synthesis_events (agent_id, thoughts_count, final_output) \
                 VALUES (?1, ?2, ?3)",
                params![agent_id, changed as i64, output],
            )
            .map_err(|e| Error::Store(format!("sqlite insert event: {}", e)))?;
        }

        tx.commit()
            .map_err(|e| Error::Store(format!("sqlite commit: {}", e)))?;
        Ok(changed)
    }

    /// Recent synthesis events for an agent, newest first.
    pub fn synthesis_events(
        &self,
        agent_id: &str,
        limit: usize,
    ) -> Result<Vec<SynthesisEvent>, Error> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, agent_id, thoughts_count, final_output, triggered_at \
                 FROM synthesis_events \
                 WHERE agent_id = ?1 \
                 ORDER BY triggered_at DESC, id DESC \
                 LIMIT ?2",
            )
            .map_err(|e| Error::Store(format!("sqlite prepare events: {}", e)))?;

        let rows = stmt
            .query_map(params![agent_id, limit as i64], |row| {
                Ok(SynthesisEvent {
                    id: row.get(0)?,
                    agent_id: row.get(1)?,
                    thoughts_count: row.get::<_, Option<i64>>(2)?.unwrap_or(0),
                    final_output: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                    triggered_at: row.get(4)?,
                })
            })
            .map_err(|e| Error::Store(format!("sqlite query events: {}", e)))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::Store(format!("sqlite read events: {}", e)))
    }

    /// Append one durable latency sample.
    pub fn record_latency(&self, latency_ms: i64) -> Result<(), Error> {
        self.conn
            .execute(
                "INSERT INTO network_metrics (latency_ms) VALUES (?1)",
                params![latency_ms],
            )
            .map_err(|e| Error::Store(format!("sqlite record latency: {}", e)))?;
        Ok(())
    }

    /// Average latency over the trailing window, 0 when no samples.
    pub fn average_latency(&self, window_minutes: i64) -> Result<i64, Error> {
        let avg: Option<f64> = self
            .conn
            .query_row(
                "SELECT AVG(latency_ms) FROM network_metrics \
                 WHERE recorded_at > datetime('now', '-' || ?1 || ' minutes')",
                params![window_minutes],
                |row| row.get(0),
            )
            .map_err(|e| Error::Store(format!("sqlite average latency: {}", e)))?;
        Ok(avg.map(|v| v as i64).unwrap_or(0))
    }

    /// Maximum latency over the trailing window, 0 when no samples.
    pub fn max_latency(&self, window_minutes: i64) -> Result<i64, Error> {
        let max: Option<i64> = self
            .conn
            .query_row(
                "SELECT MAX(latency_ms) FROM network_metrics \
                 WHERE recorded_at > datetime('now', '-' || ?1 || ' minutes')",
                params![window_minutes],
                |row| row.get(0),
            )
            .map_err(|e| Error::Store(format!("sqlite max latency: {}", e)))?;
        Ok(max.unwrap_or(0))
    }

    fn get_state(&self, key: &str) -> Result<Option<String>, Error> {
        self.conn
            .query_row(
                "SELECT value FROM state WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| Error::Store(format!("sqlite read state: {}", e)))
    }

    fn set_state(&self, key: &str, value: &str) -> Result<(), Error> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO state (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .map_err(|e| Error::Store(format!("sqlite write state: {}", e)))?;
        Ok(())
    }

    pub fn is_halted(&self) -> Result<bool, Error> {
        Ok(self.get_state("halted")?.as_deref() == Some("true"))
    }

    pub fn set_halted(&self, halted: bool) -> Result<(), Error> {
        self.set_state("halted", if halted { "true" } else { "false" })
    }

    pub fn is_forced_buffering(&self) -> Result<bool, Error> {
        Ok(self.get_state("forced_buffering")?.as_deref() == Some("true"))
    }

    pub fn set_forced_buffering(&self, forced: bool) -> Result<(), Error> {
        self.set_state("forced_buffering", if forced { "true" } else { "false" })
    }

    pub fn simulated_latency(&self) -> Result<i64, Error> {
        Ok(self
            .get_state("simulated_ms")?
            .and_then(|v| v.parse().ok())
            .unwrap_or(0))
    }

    pub fn set_simulated_latency(&self, ms: i64) -> Result<(), Error> {
        self.set_state("simulated_ms", &ms.to_string())
    }
}
