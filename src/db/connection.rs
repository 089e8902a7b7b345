use rusqlite::Connection;
use std::path::Path;
use tracing::debug;

use crate::errors::Result;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS transactions (
    id TEXT PRIMARY KEY,
    date TEXT NOT NULL,
    category TEXT NOT NULL,
    kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
    amount TEXT NOT NULL,
    description TEXT NOT NULL
)";

/// Opens (or creates) the ledger database and ensures the schema exists.
/// A missing file is not an error: the first run starts with an empty ledger.
pub fn establish_connection(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.execute(SCHEMA, [])?;
    debug!(path = %path.display(), "opened ledger database");
    Ok(conn)
}

#[cfg(test)]
pub fn establish_test_connection() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.execute(SCHEMA, [])?;
    Ok(conn)
}
