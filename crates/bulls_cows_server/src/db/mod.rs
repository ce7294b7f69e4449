//! Database persistence for the best-record aggregate.

mod error;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only

pub use error::{DbError, DbErrorKind};
pub use models::{BestRecordRow, NewBestRecord};
pub use repository::RecordRepository;
