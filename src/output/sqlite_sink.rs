//! SQLite product sink
//!
//! This module provides a SQLite-based implementation of the ProductSink trait.

use crate::crawler::Product;
use crate::output::schema::initialize_schema;
use crate::output::traits::{OutputResult, ProductSink};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

/// Inserts each product as a row in the `products` table
pub struct SqliteSink {
    conn: Mutex<Option<Connection>>,
}

impl SqliteSink {
    /// Opens or creates the database at `path`
    pub fn open(path: &Path) -> OutputResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )?;

        initialize_schema(&conn)?;
        Ok(Self::from_connection(conn))
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> OutputResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(Some(conn)),
        }
    }

    /// Number of stored products
    pub fn count_products(&self) -> OutputResult<u64> {
        let guard = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(conn) => {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
                Ok(count as u64)
            }
            None => Ok(0),
        }
    }
}

impl ProductSink for SqliteSink {
    fn write_product(&self, product: &Product) -> OutputResult<()> {
        let guard = self.conn.lock().unwrap_or_else(PoisonError::into_inner);

        let Some(conn) = guard.as_ref() else {
            tracing::warn!("Database already closed, dropping product {}", product.id());
            return Ok(());
        };

        let id = i64::try_from(product.id())
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        conn.execute(
            "INSERT INTO products (id, name, price, parsed_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                id,
                product.name(),
                product.price(),
                Utc::now().to_rfc3339()
            ],
        )?;

        Ok(())
    }

    fn close(&self) -> OutputResult<()> {
        let conn = self
            .conn
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(conn) = conn {
            conn.close().map_err(|(_, e)| e)?;
        }

        Ok(())
    }
}
