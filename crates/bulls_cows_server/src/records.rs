//! Best-record tracking across all won games.

use std::sync::{Mutex, MutexGuard, PoisonError};

use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::db::{BestRecordRow, DbError, RecordRepository};

/// Best attempts and best time over every reported win.
///
/// Serializes as `{"best_attempts": .., "best_time": ..}` with `null` for
/// values never set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    best_attempts: Option<u32>,
    best_time: Option<u64>,
}

impl Record {
    /// Builds a record from explicit best values.
    pub fn new(best_attempts: Option<u32>, best_time: Option<u64>) -> Self {
        Self {
            best_attempts,
            best_time,
        }
    }

    /// Fewest attempts in any win.
    pub fn best_attempts(&self) -> Option<u32> {
        self.best_attempts
    }

    /// Shortest elapsed time in seconds of any win.
    pub fn best_time(&self) -> Option<u64> {
        self.best_time
    }

    /// Folds one win in. Each field keeps its own minimum, so the two bests
    /// may come from different games.
    pub fn with_win(self, attempts: u32, elapsed_seconds: u64) -> Self {
        Self {
            best_attempts: Some(self.best_attempts.map_or(attempts, |b| b.min(attempts))),
            best_time: Some(self.best_time.map_or(elapsed_seconds, |b| b.min(elapsed_seconds))),
        }
    }
}

fn record_from_row(row: &BestRecordRow) -> Result<Record, DbError> {
    let best_attempts = row
        .best_attempts()
        .map(|v| u32::try_from(v).map_err(|_| DbError::corrupt("best_attempts", v)))
        .transpose()?;
    let best_time = row
        .best_time()
        .map(|v| u64::try_from(v).map_err(|_| DbError::corrupt("best_time", v)))
        .transpose()?;
    Ok(Record::new(best_attempts, best_time))
}

fn record_to_columns(record: &Record) -> Result<(Option<i32>, Option<i64>), DbError> {
    let attempts = record
        .best_attempts
        .map(|v| i32::try_from(v).map_err(|_| DbError::corrupt("best_attempts", v)))
        .transpose()?;
    let time = record
        .best_time
        .map(|v| i64::try_from(v).map_err(|_| DbError::corrupt("best_time", v)))
        .transpose()?;
    Ok((attempts, time))
}

/// Record storage failed.
#[derive(Debug, Clone, Display, Error, From)]
#[display("Record storage failed: {}", _0)]
pub struct RecordError(DbError);

/// Process-wide best records, optionally backed by SQLite.
///
/// Every update holds one lock across read, persist and write, so concurrent
/// wins cannot lose an improvement. The in-memory value only changes after
/// the database accepted it.
#[derive(Debug)]
pub struct RecordStore {
    best: Mutex<Record>,
    repository: Option<RecordRepository>,
}

impl RecordStore {
    /// Records kept only in memory.
    #[instrument]
    pub fn in_memory() -> Self {
        info!("Creating in-memory record store");
        Self {
            best: Mutex::new(Record::default()),
            repository: None,
        }
    }

    /// Records persisted through `repository`, starting from its stored row.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] if the stored row cannot be read.
    #[instrument(skip(repository), fields(db_path = %repository.db_path()))]
    pub fn persistent(repository: RecordRepository) -> Result<Self, RecordError> {
        let best = match repository.load()? {
            Some(row) => record_from_row(&row)?,
            None => Record::default(),
        };
        info!(?best, "Loaded persisted records");
        Ok(Self {
            best: Mutex::new(best),
            repository: Some(repository),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Record> {
        // The guarded value is only assigned whole, so a poisoned lock still
        // holds a consistent record.
        self.best.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reports a win. Returns `true` if either best value improved.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] if persisting an improvement fails; the
    /// in-memory record is left unchanged in that case.
    #[instrument(skip(self))]
    pub fn report_win(&self, attempts: u32, elapsed_seconds: u64) -> Result<bool, RecordError> {
        let mut best = self.lock();
        let next = best.with_win(attempts, elapsed_seconds);
        if next == *best {
            debug!("No improvement");
            return Ok(false);
        }

        if let Some(repository) = &self.repository {
            let (attempts, time) = record_to_columns(&next)?;
            repository.save(attempts, time)?;
        }

        info!(
            best_attempts = ?next.best_attempts,
            best_time = ?next.best_time,
            "New record"
        );
        *best = next;
        Ok(true)
    }

    /// Current best values.
    pub fn best(&self) -> Record {
        *self.lock()
    }

    /// Forgets every record, including the persisted row.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] if the persisted row cannot be deleted.
    #[instrument(skip(self))]
    pub fn reset(&self) -> Result<(), RecordError> {
        let mut best = self.lock();
        if let Some(repository) = &self.repository {
            repository.clear()?;
        }
        *best = Record::default();
        info!("Records reset");
        Ok(())
    }
}
