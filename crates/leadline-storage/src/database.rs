// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use leadline_core::LeadlineError;
use tracing::debug;

use crate::migrations;

/// Handle to the SQLite database used by every query module.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path`, applying PRAGMAs and running
    /// any pending migrations.
    pub async fn open(path: &str) -> Result<Self, LeadlineError> {
        // Migrations run on a short-lived blocking connection before the
        // long-lived async connection opens.
        let migration_path = path.to_string();
        tokio::task::spawn_blocking(move || -> Result<(), LeadlineError> {
            let mut conn =
                rusqlite::Connection::open(&migration_path).map_err(|e| LeadlineError::Storage {
                    source: Box::new(e),
                })?;
            conn.execute_batch("PRAGMA journal_mode = WAL;")
                .map_err(|e| LeadlineError::Storage {
                    source: Box::new(e),
                })?;
            migrations::run_migrations(&mut conn)
        })
        .await
        .map_err(|e| LeadlineError::Internal(format!("migration task panicked: {e}")))??;

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| map_tr_err(e.into()))?;

        conn.call(|conn| {
            conn.execute_batch(
                "PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;",
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        debug!(path, "database opened");
        Ok(Self { conn })
    }

    /// The underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL before dropping the connection handle.
    pub async fn close(self) -> Result<(), LeadlineError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

/// Convert a tokio-rusqlite error into the workspace error type.
pub fn map_tr_err(err: tokio_rusqlite::Error) -> LeadlineError {
    LeadlineError::Storage {
        source: Box::new(err),
    }
}
