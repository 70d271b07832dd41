//! SQLite-backed venture persistence.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use foundry_ventures::{Venture, VentureDraft};
use rusqlite::{params, Connection, OptionalExtension, Row};
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
/// Enumerates supported `StoreError` values.
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("metrics column is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("last_update column is not an ISO date: {0}")]
    InvalidDate(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Field a listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    Name,
    Pod,
    Stage,
    Status,
    LastUpdate,
}

impl OrderField {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "name" => Some(Self::Name),
            "pod" => Some(Self::Pod),
            "stage" => Some(Self::Stage),
            "status" => Some(Self::Status),
            "last_update" => Some(Self::LastUpdate),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Pod => "pod",
            Self::Stage => "stage",
            Self::Status => "status",
            Self::LastUpdate => "last_update",
        }
    }
}

/// Filter and ordering for `VentureStore::list`. Substring filters match
/// case-insensitively; the default ordering is newest `last_update` first
/// with `id` as a stable tiebreak.
#[derive(Debug, Clone)]
pub struct VentureQuery {
    pub pod: Option<String>,
    pub stage: Option<String>,
    pub status: Option<String>,
    pub order_by: OrderField,
    pub descending: bool,
}

impl Default for VentureQuery {
    fn default() -> Self {
        Self {
            pod: None,
            stage: None,
            status: None,
            order_by: OrderField::LastUpdate,
            descending: true,
        }
    }
}

const VENTURE_COLUMNS: &str =
    "venture_id, name, pod, stage, founder, status, last_update, metrics_json";

/// Durable venture storage. Every call opens a fresh WAL-mode connection;
/// there is no shared handle to synchronize between requests.
#[derive(Debug, Clone)]
pub struct VentureStore {
    db_path: PathBuf,
}

impl VentureStore {
    /// Opens the store at `path`, creating the parent directory and schema
    /// if needed.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db_path = path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let store = Self { db_path };
        let connection = store.open_connection()?;
        store.initialize_schema(&connection)?;
        Ok(store)
    }

    fn open_connection(&self) -> StoreResult<Connection> {
        let connection = Connection::open(&self.db_path)?;
        connection.busy_timeout(Duration::from_secs(5))?;
        connection.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            "#,
        )?;
        Ok(connection)
    }

    fn initialize_schema(&self, connection: &Connection) -> StoreResult<()> {
        connection.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS ventures (
                venture_id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                pod TEXT NOT NULL,
                stage TEXT NOT NULL,
                founder TEXT NOT NULL,
                status TEXT NOT NULL,
                last_update TEXT NOT NULL,
                metrics_json TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_ventures_last_update
                ON ventures (last_update DESC, venture_id DESC);
            "#,
        )?;
        Ok(())
    }

    pub fn list(&self, query: &VentureQuery) -> StoreResult<Vec<Venture>> {
        let connection = self.open_connection()?;

        let mut sql = format!("SELECT {VENTURE_COLUMNS} FROM ventures");
        let mut clauses = Vec::new();
        let mut filters: Vec<&str> = Vec::new();
        if let Some(pod) = query.pod.as_deref() {
            clauses.push("instr(lower(pod), lower(?)) > 0");
            filters.push(pod);
        }
        if let Some(stage) = query.stage.as_deref() {
            clauses.push("instr(lower(stage), lower(?)) > 0");
            filters.push(stage);
        }
        if let Some(status) = query.status.as_deref() {
            clauses.push("instr(lower(status), lower(?)) > 0");
            filters.push(status);
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        let direction = if query.descending { "DESC" } else { "ASC" };
        sql.push_str(&format!(
            " ORDER BY {} {direction}, venture_id {direction}",
            query.order_by.column()
        ));

        let mut statement = connection.prepare(&sql)?;
        let rows = statement.query_map(rusqlite::params_from_iter(filters), venture_from_row)?;

        let mut ventures = Vec::new();
        for row in rows {
            ventures.push(row??);
        }
        Ok(ventures)
    }

    pub fn get(&self, id: i64) -> StoreResult<Option<Venture>> {
        let connection = self.open_connection()?;
        let row = connection
            .query_row(
                &format!("SELECT {VENTURE_COLUMNS} FROM ventures WHERE venture_id = ?1"),
                params![id],
                venture_from_row,
            )
            .optional()?;
        row.transpose()
    }

    pub fn create(&self, draft: &VentureDraft) -> StoreResult<Venture> {
        let connection = self.open_connection()?;
        insert_draft(&connection, draft)?;
        let id = connection.last_insert_rowid();
        Ok(Venture::from_draft(id, draft.clone()))
    }

    /// Inserts a batch of drafts inside one transaction and returns how many
    /// rows landed.
    pub fn create_batch(&self, drafts: &[VentureDraft]) -> StoreResult<u64> {
        let mut connection = self.open_connection()?;
        let transaction = connection.transaction()?;
        for draft in drafts {
            insert_draft(&transaction, draft)?;
        }
        transaction.commit()?;
        Ok(drafts.len() as u64)
    }

    /// Full-record update. Returns `None` when the id is unknown.
    pub fn update(&self, id: i64, draft: &VentureDraft) -> StoreResult<Option<Venture>> {
        let connection = self.open_connection()?;
        let changed = connection.execute(
            r#"
            UPDATE ventures
            SET name = ?1, pod = ?2, stage = ?3, founder = ?4, status = ?5,
                last_update = ?6, metrics_json = ?7
            WHERE venture_id = ?8
            "#,
            params![
                draft.name,
                draft.pod,
                draft.stage,
                draft.founder,
                draft.status,
                draft.last_update.to_string(),
                serde_json::to_string(&draft.metrics)?,
                id,
            ],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        Ok(Some(Venture::from_draft(id, draft.clone())))
    }

    /// Returns false when the id was already gone.
    pub fn delete(&self, id: i64) -> StoreResult<bool> {
        let connection = self.open_connection()?;
        let changed = connection.execute("DELETE FROM ventures WHERE venture_id = ?1", params![id])?;
        Ok(changed > 0)
    }

    pub fn count(&self) -> StoreResult<u64> {
        let connection = self.open_connection()?;
        let count: i64 =
            connection.query_row("SELECT COUNT(*) FROM ventures", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }
}

fn insert_draft(connection: &Connection, draft: &VentureDraft) -> StoreResult<()> {
    connection.execute(
        r#"
        INSERT INTO ventures (name, pod, stage, founder, status, last_update, metrics_json)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
        params![
            draft.name,
            draft.pod,
            draft.stage,
            draft.founder,
            draft.status,
            draft.last_update.to_string(),
            serde_json::to_string(&draft.metrics)?,
        ],
    )?;
    Ok(())
}

fn venture_from_row(row: &Row<'_>) -> rusqlite::Result<StoreResult<Venture>> {
    let id: i64 = row.get(0)?;
    let name: String = row.get(1)?;
    let pod: String = row.get(2)?;
    let stage: String = row.get(3)?;
    let founder: String = row.get(4)?;
    let status: String = row.get(5)?;
    let last_update_raw: String = row.get(6)?;
    let metrics_raw: String = row.get(7)?;

    Ok(decode_row(
        id,
        name,
        pod,
        stage,
        founder,
        status,
        last_update_raw,
        metrics_raw,
    ))
}

#[allow(clippy::too_many_arguments)]
fn decode_row(
    id: i64,
    name: String,
    pod: String,
    stage: String,
    founder: String,
    status: String,
    last_update_raw: String,
    metrics_raw: String,
) -> StoreResult<Venture> {
    let last_update: NaiveDate = last_update_raw
        .parse()
        .map_err(|_| StoreError::InvalidDate(last_update_raw))?;
    let metrics: BTreeMap<String, f64> = serde_json::from_str(&metrics_raw)?;
    Ok(Venture {
        id,
        name,
        pod,
        stage,
        founder,
        status,
        last_update,
        metrics,
    })
}
