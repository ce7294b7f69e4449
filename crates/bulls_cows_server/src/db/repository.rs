//! Database repository for the best-record row.

use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument};

use crate::db::{BestRecordRow, DbError, DbErrorKind, NewBestRecord, schema};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Primary key of the only row in `best_records`.
const RECORD_ROW_ID: i32 = 1;

/// Repository for the persisted best records.
///
/// Opens a fresh SQLite connection per operation, so the path must name a
/// file; `":memory:"` would lose the schema between calls.
#[derive(Debug, Clone)]
pub struct RecordRepository {
    db_path: String,
}

impl RecordRepository {
    /// Opens the database at `db_path`, creating it and applying pending
    /// migrations as needed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the file cannot be opened or migrated.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn open(db_path: String) -> Result<Self, DbError> {
        info!(path = %db_path, "Opening record repository");
        let repository = Self { db_path };
        let mut conn = repository.connection()?;
        let applied = conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            DbError::new(DbErrorKind::Migration, format!("Migrations failed: {}", e))
        })?;
        info!(count = applied.len(), "Migrations applied");
        Ok(repository)
    }

    /// Path of the underlying database file.
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path).map_err(|e| {
            DbError::new(
                DbErrorKind::Connection,
                format!("Failed to connect to '{}': {}", self.db_path, e),
            )
        })
    }

    /// Loads the best-record row. Returns `None` before the first save.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn load(&self) -> Result<Option<BestRecordRow>, DbError> {
        let mut conn = self.connection()?;

        let row = schema::best_records::table
            .find(RECORD_ROW_ID)
            .select(BestRecordRow::as_select())
            .first(&mut conn)
            .optional()?;

        debug!(found = row.is_some(), "Best records loaded");
        Ok(row)
    }

    /// Writes the best values, replacing any previous row.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn save(
        &self,
        best_attempts: Option<i32>,
        best_time: Option<i64>,
    ) -> Result<(), DbError> {
        let mut conn = self.connection()?;

        let row = NewBestRecord::new(RECORD_ROW_ID, best_attempts, best_time);
        diesel::replace_into(schema::best_records::table)
            .values(&row)
            .execute(&mut conn)?;

        info!(?best_attempts, ?best_time, "Best records saved");
        Ok(())
    }

    /// Deletes the stored records. Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn clear(&self) -> Result<usize, DbError> {
        let mut conn = self.connection()?;
        let removed = diesel::delete(schema::best_records::table).execute(&mut conn)?;
        info!(removed, "Best records cleared");
        Ok(removed)
    }
}
