//! Conversions from external infrastructure errors into domain errors.

use deskline_domain::DesklineError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can
/// be converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub DesklineError);

impl From<InfraError> for DesklineError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<DesklineError> for InfraError {
    fn from(value: DesklineError) -> Self {
        InfraError(value)
    }
}

impl From<SqlError> for InfraError {
    fn from(err: SqlError) -> Self {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        let domain_err = match err {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => DesklineError::Database("database is busy".into()),
                    (ErrorCode::DatabaseLocked, _) => {
                        DesklineError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067) => {
                        DesklineError::Database("unique constraint violation".into())
                    }
                    (ErrorCode::ConstraintViolation, 787) => {
                        DesklineError::Database("foreign key constraint violation".into())
                    }
                    _ => DesklineError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => DesklineError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                DesklineError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                DesklineError::Database(format!("invalid column type: {ty}"))
            }
            RE::Utf8Error(_) => DesklineError::Database("invalid UTF-8 returned from sqlite".into()),
            other => DesklineError::Database(other.to_string()),
        };
        InfraError(domain_err)
    }
}

impl From<r2d2::Error> for InfraError {
    fn from(err: r2d2::Error) -> Self {
        InfraError(DesklineError::Database(format!("connection pool error: {err}")))
    }
}
