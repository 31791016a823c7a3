//! Shared Diesel error mapping for repositories with basic query semantics.

use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Map common Diesel error variants into query/connection constructors.
///
/// Captures the repeated mapping used by repositories where `NotFound` and
/// query-builder failures should map to query errors. The underlying detail
/// goes to the debug log, never into the returned error.
pub fn map_basic_diesel_error<E, Q, C>(error: diesel::result::Error, query: Q, connection: C) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
{
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => query("database error"),
        _ => query("database error"),
    }
}

/// Whether the error is a unique-constraint violation.
///
/// Repositories turn this into their domain-specific duplicate variants;
/// concurrent inserts racing onto the same key all collapse here.
pub fn is_unique_violation(error: &diesel::result::Error) -> bool {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    #[derive(Debug, PartialEq, Eq)]
    enum TestError {
        Query(&'static str),
        Connection(String),
    }

    #[test]
    fn pool_errors_map_to_connection() {
        let mapped: TestError =
            map_basic_pool_error(PoolError::checkout("timed out"), TestError::Connection);
        assert_eq!(mapped, TestError::Connection("timed out".into()));
    }

    #[test]
    fn not_found_maps_to_query() {
        let mapped: TestError = map_basic_diesel_error(
            DieselError::NotFound,
            TestError::Query,
            |m| TestError::Connection(m.into()),
        );
        assert_eq!(mapped, TestError::Query("record not found"));
    }

    #[test]
    fn unique_violations_are_detected() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key".to_owned()),
        );
        assert!(is_unique_violation(&error));
        assert!(!is_unique_violation(&DieselError::NotFound));
    }
}
