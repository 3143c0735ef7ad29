use chrono::NaiveDateTime;
use sea_orm::{DbErr, SqlErr, TransactionError};

use crate::forms::FormError;

pub mod artist;
pub mod show;
pub mod venue;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("Invalid submission: {0}")]
    InvalidForm(#[from] FormError),
    #[error("Referenced row is missing or still in use: {0}")]
    ConstraintViolation(String),
    #[error("Database error: {0}")]
    Database(DbErr),
}

impl From<DbErr> for ServiceError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                Self::ConstraintViolation(detail)
            }
            _ => Self::Database(err),
        }
    }
}

impl From<TransactionError<ServiceError>> for ServiceError {
    fn from(err: TransactionError<ServiceError>) -> Self {
        match err {
            TransactionError::Connection(err) => err.into(),
            TransactionError::Transaction(err) => err,
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// A show is upcoming only when it starts strictly after `now`.
pub fn is_upcoming(start_time: NaiveDateTime, now: NaiveDateTime) -> bool {
    start_time > now
}

/// Unicode-aware, case-insensitive substring match of a trimmed search term.
/// A blank term matches every name.
pub fn name_matches(name: &str, term: &str) -> bool {
    name.to_lowercase().contains(&term.trim().to_lowercase())
}

/// Split shows into `(upcoming, past)`, keeping their relative order.
///
/// Every item lands in exactly one of the two lists.
pub fn partition_shows<T>(
    shows: impl IntoIterator<Item = (NaiveDateTime, T)>,
    now: NaiveDateTime,
) -> (Vec<T>, Vec<T>) {
    let mut upcoming = Vec::new();
    let mut past = Vec::new();

    for (start_time, show) in shows {
        if is_upcoming(start_time, now) {
            upcoming.push(show);
        } else {
            past.push(show);
        }
    }

    (upcoming, past)
}
