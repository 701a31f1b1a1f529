//! SQLite-backed ticket store implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};
use rusqlite::{params, types::Type, Connection, OptionalExtension};

use super::lifecycle::is_legal_transition;
use super::{NewTicket, Ticket, TicketError, TicketFilter, TicketPatch, TicketStatus, TicketStore};

const SELECT_COLUMNS: &str =
    "SELECT id, client_name, address, description, status, created_at, updated_at FROM chamados";

/// SQLite-backed ticket store.
pub struct SqliteTicketStore {
    conn: Mutex<Connection>,
}

impl SqliteTicketStore {
    /// Create a new SQLite ticket store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, TicketError> {
        let conn = Connection::open(path).map_err(|e| TicketError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite ticket store (useful for testing).
    pub fn in_memory() -> Result<Self, TicketError> {
        let conn =
            Connection::open_in_memory().map_err(|e| TicketError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), TicketError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS chamados (
                id TEXT PRIMARY KEY,
                client_name TEXT NOT NULL,
                address TEXT NOT NULL,
                description TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'open',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_chamados_created_at ON chamados(created_at DESC);
            CREATE INDEX IF NOT EXISTS idx_chamados_status ON chamados(status);
            "#,
        )
        .map_err(|e| TicketError::Database(e.to_string()))?;

        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, TicketError> {
        self.conn
            .lock()
            .map_err(|_| TicketError::Database("connection lock poisoned".to_string()))
    }

    fn build_where_clause(filter: &TicketFilter) -> (String, Vec<String>) {
        match filter.status {
            Some(status) => ("WHERE status = ?".to_string(), vec![status.as_str().to_string()]),
            None => (String::new(), Vec::new()),
        }
    }

    fn row_to_ticket(row: &rusqlite::Row) -> rusqlite::Result<Ticket> {
        let status_str: String = row.get(4)?;
        let status = status_str
            .parse::<TicketStatus>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

        Ok(Ticket {
            id: row.get(0)?,
            client_name: row.get(1)?,
            address: row.get(2)?,
            description: row.get(3)?,
            status,
            created_at: parse_timestamp(row, 5)?,
            updated_at: parse_timestamp(row, 6)?,
        })
    }

    fn fetch(conn: &Connection, id: &str) -> Result<Option<Ticket>, TicketError> {
        conn.query_row(
            &format!("{} WHERE id = ?", SELECT_COLUMNS),
            params![id],
            Self::row_to_ticket,
        )
        .optional()
        .map_err(|e| TicketError::Database(e.to_string()))
    }
}

fn parse_timestamp(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Current time at storage precision.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// A timestamp strictly after `previous`, even if the clock has not moved.
fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let candidate = now();
    if candidate > previous {
        candidate
    } else {
        previous + Duration::microseconds(1)
    }
}

impl TicketStore for SqliteTicketStore {
    fn create(&self, ticket: NewTicket) -> Result<Ticket, TicketError> {
        let conn = self.conn()?;

        let id = uuid::Uuid::new_v4().to_string();
        let now = now();
        let status = TicketStatus::Open;

        conn.execute(
            "INSERT INTO chamados
             (id, client_name, address, description, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                id,
                ticket.client_name,
                ticket.address,
                ticket.description,
                status.as_str(),
                format_timestamp(&now),
                format_timestamp(&now),
            ],
        )
        .map_err(|e| TicketError::Database(e.to_string()))?;

        Ok(Ticket {
            id,
            client_name: ticket.client_name,
            address: ticket.address,
            description: ticket.description,
            status,
            created_at: now,
            updated_at: now,
        })
    }

    fn get(&self, id: &str) -> Result<Option<Ticket>, TicketError> {
        let conn = self.conn()?;
        Self::fetch(&conn, id)
    }

    fn list(&self, filter: &TicketFilter) -> Result<Vec<Ticket>, TicketError> {
        let conn = self.conn()?;

        let (where_clause, params) = Self::build_where_clause(filter);
        let sql = format!(
            "{} {} ORDER BY created_at DESC, rowid DESC",
            SELECT_COLUMNS, where_clause
        );

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| TicketError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(rusqlite::params_from_iter(params.iter()), Self::row_to_ticket)
            .map_err(|e| TicketError::Database(e.to_string()))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| TicketError::Database(e.to_string()))
    }

    fn count(&self, filter: &TicketFilter) -> Result<i64, TicketError> {
        let conn = self.conn()?;

        let (where_clause, params) = Self::build_where_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM chamados {}", where_clause);

        conn.query_row(&sql, rusqlite::params_from_iter(params.iter()), |row| {
            row.get(0)
        })
        .map_err(|e| TicketError::Database(e.to_string()))
    }

    fn update(&self, id: &str, patch: TicketPatch) -> Result<Ticket, TicketError> {
        let conn = self.conn()?;

        let current =
            Self::fetch(&conn, id)?.ok_or_else(|| TicketError::NotFound(id.to_string()))?;

        // A status change must be exactly the next step; re-sending the current one is rejected.
        if let Some(to) = patch.status {
            if !is_legal_transition(current.status, to) {
                return Err(TicketError::InvalidTransition {
                    ticket_id: id.to_string(),
                    from: current.status,
                    to,
                });
            }
        }

        let mut updated = current.clone();
        patch.apply_to(&mut updated);
        if updated == current {
            return Ok(current);
        }
        updated.updated_at = next_timestamp(current.updated_at);

        conn.execute(
            "UPDATE chamados
             SET client_name = ?, address = ?, description = ?, status = ?, updated_at = ?
             WHERE id = ?",
            params![
                updated.client_name,
                updated.address,
                updated.description,
                updated.status.as_str(),
                format_timestamp(&updated.updated_at),
                id,
            ],
        )
        .map_err(|e| TicketError::Database(e.to_string()))?;

        Ok(updated)
    }

    fn delete(&self, id: &str) -> Result<Ticket, TicketError> {
        let conn = self.conn()?;

        let ticket =
            Self::fetch(&conn, id)?.ok_or_else(|| TicketError::NotFound(id.to_string()))?;

        conn.execute("DELETE FROM chamados WHERE id = ?", params![id])
            .map_err(|e| TicketError::Database(e.to_string()))?;

        Ok(ticket)
    }
}
