use time::OffsetDateTime;

use crate::application::repos::RepoError;

pub fn map_sqlx_error(err: sqlx::Error) -> RepoError {
    match err {
        sqlx::Error::RowNotFound => RepoError::NotFound,
        sqlx::Error::Database(db) if db.message().contains("UNIQUE constraint failed") => {
            RepoError::Duplicate {
                constraint: db.constraint().unwrap_or("unknown").to_string(),
            }
        }
        sqlx::Error::Database(db)
            if db.message().contains("NOT NULL constraint failed")
                || db.message().contains("CHECK constraint failed") =>
        {
            RepoError::InvalidInput {
                message: db.message().to_string(),
            }
        }
        sqlx::Error::Database(db) if db.message().contains("database is locked") => {
            RepoError::Timeout
        }
        other => RepoError::from_persistence(other),
    }
}

/// Timestamps are stored as unix nanoseconds so ordering is total and
/// free of string-format pitfalls.
pub(crate) fn to_stored_timestamp(at: OffsetDateTime) -> i64 {
    at.unix_timestamp_nanos() as i64
}

pub(crate) fn from_stored_timestamp(nanos: i64) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(nanos))
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn timestamp_round_trips() {
        let at = datetime!(2026-08-26 10:15:30.123456789 UTC);
        assert_eq!(from_stored_timestamp(to_stored_timestamp(at)), at);
    }
}
