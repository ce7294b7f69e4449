//! Database models for the best-record row.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;

use crate::db::schema;

/// The single persisted best-record row.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::best_records)]
pub struct BestRecordRow {
    id: i32,
    best_attempts: Option<i32>,
    best_time: Option<i64>,
    updated_at: NaiveDateTime,
}

/// Insertable best-record row. `updated_at` is filled by the database.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::best_records)]
pub struct NewBestRecord {
    id: i32,
    best_attempts: Option<i32>,
    best_time: Option<i64>,
}
