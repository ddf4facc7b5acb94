//! Translation of sqlx failures into repository errors.

use sqlx::error::ErrorKind;
use sqlx::migrate::MigrateError;

use crate::domain::checkout::RepositoryError;

/// Map a driver error onto the repository taxonomy.
///
/// Constraint failures reported by the database become
/// `ConstraintViolation`, decode failures become `InvalidRecord`, and
/// everything else (pool, I/O, protocol) is `BackendUnavailable`.
#[must_use]
pub fn translate_error(err: sqlx::Error) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db_err) => match db_err.kind() {
            ErrorKind::UniqueViolation
            | ErrorKind::ForeignKeyViolation
            | ErrorKind::NotNullViolation
            | ErrorKind::CheckViolation => RepositoryError::constraint(db_err.message()),
            _ if is_sqlite_constraint(db_err.code().as_deref()) => {
                RepositoryError::constraint(db_err.message())
            }
            _ => RepositoryError::unavailable(db_err.message()),
        },
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::ColumnIndexOutOfBounds { .. } => {
            RepositoryError::invalid_record(err.to_string())
        }
        _ => RepositoryError::unavailable(err.to_string()),
    }
}

/// SQLite extended result codes keep the primary code in the low byte.
fn is_sqlite_constraint(code: Option<&str>) -> bool {
    const SQLITE_CONSTRAINT: i32 = 19;

    code.and_then(|c| c.parse::<i32>().ok())
        .is_some_and(|c| c & 0xff == SQLITE_CONSTRAINT)
}

/// Migration failures mean the store cannot be used at all.
#[must_use]
pub fn translate_migrate_error(err: MigrateError) -> RepositoryError {
    RepositoryError::unavailable(format!("migration failed: {err}"))
}
