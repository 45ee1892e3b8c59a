//! Shared classification of pool and Diesel failures.
//!
//! Repositories turn a [`DbFailure`] into their own port error, picking out
//! the constraint violations that carry domain meaning.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// What went wrong, stripped of driver detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DbFailure {
    /// The connection dropped or could not be used.
    Connection(String),
    /// A unique index rejected the write.
    UniqueViolation { constraint: Option<String> },
    /// A foreign key rejected the write.
    ForeignKeyViolation { constraint: Option<String> },
    /// Anything else, with a client-safe description.
    Query(String),
}

impl DbFailure {
    /// Whether this is a unique violation on `constraint`.
    pub(crate) fn is_unique(&self, constraint: &str) -> bool {
        matches!(self, Self::UniqueViolation { constraint: Some(name) } if name == constraint)
    }

    /// Whether this is a foreign key violation on `constraint`.
    pub(crate) fn is_foreign_key(&self, constraint: &str) -> bool {
        matches!(self, Self::ForeignKeyViolation { constraint: Some(name) } if name == constraint)
    }
}

/// Message carried by a pool failure.
pub(crate) fn pool_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

/// Classify a Diesel error, logging the raw detail at debug level.
pub(crate) fn classify(error: DieselError) -> DbFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => DbFailure::Query(String::from("record not found")),
        DieselError::QueryBuilderError(_) => DbFailure::Query(String::from("database query error")),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DbFailure::Connection(String::from("database connection error"))
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DbFailure::UniqueViolation {
                constraint: info.constraint_name().map(str::to_owned),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            DbFailure::ForeignKeyViolation {
                constraint: info.constraint_name().map(str::to_owned),
            }
        }
        _ => DbFailure::Query(String::from("database error")),
    }
}

/// Collapse a failure into connection/query constructors.
pub(crate) fn basic<E>(
    failure: DbFailure,
    connection: impl FnOnce(String) -> E,
    query: impl FnOnce(String) -> E,
) -> E {
    match failure {
        DbFailure::Connection(message) => connection(message),
        DbFailure::UniqueViolation { .. } => query(String::from("unique constraint violated")),
        DbFailure::ForeignKeyViolation { .. } => {
            query(String::from("foreign key constraint violated"))
        }
        DbFailure::Query(message) => query(message),
    }
}

/// Convert a `COUNT(*)` result into a page total.
pub(crate) fn count_to_total(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn missing_rows_are_query_failures() {
        assert_eq!(
            classify(DieselError::NotFound),
            DbFailure::Query(String::from("record not found"))
        );
    }

    #[rstest]
    fn pool_failures_keep_their_message() {
        assert_eq!(pool_message(PoolError::checkout("refused")), "refused");
    }

    #[rstest]
    fn constraint_matching_is_exact() {
        let failure = DbFailure::UniqueViolation {
            constraint: Some(String::from("users_email_key")),
        };
        assert!(failure.is_unique("users_email_key"));
        assert!(!failure.is_unique("products_slug_key"));
        assert!(!failure.is_foreign_key("users_email_key"));
    }

    #[rstest]
    fn basic_mapping_hides_constraint_names() {
        let failure = DbFailure::ForeignKeyViolation {
            constraint: Some(String::from("products_category_id_fkey")),
        };
        let message = basic(failure, |m| format!("conn: {m}"), |m| format!("query: {m}"));
        assert_eq!(message, "query: foreign key constraint violated");
    }
}
