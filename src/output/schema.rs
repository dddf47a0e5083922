//! Database schema for the SQLite product sink

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per parsed product; repeated runs append
CREATE TABLE IF NOT EXISTS products (
    row_id INTEGER PRIMARY KEY AUTOINCREMENT,
    id INTEGER NOT NULL,
    name TEXT NOT NULL,
    price TEXT NOT NULL,
    parsed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_products_id ON products(id);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
