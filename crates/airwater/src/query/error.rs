use thiserror::Error;

pub type Result<T> = std::result::Result<T, QueryError>;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("no rows found for country: {country}")]
    NotFound { country: String },

    #[error("query execution failed: {context}")]
    Execution {
        context: String,
        #[source]
        source: rusqlite::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    QueryExecution,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::NotFound => "not_found",
            Self::QueryExecution => "query_execution",
        }
    }

    #[must_use]
    pub const fn is_user_correctable(self) -> bool {
        matches!(self, Self::InvalidArgument | Self::NotFound)
    }
}

impl QueryError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Execution { .. } => ErrorKind::QueryExecution,
        }
    }

    pub(crate) fn execution(context: impl Into<String>) -> impl FnOnce(rusqlite::Error) -> Self {
        let context = context.into();
        move |source| Self::Execution { context, source }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::{ErrorKind, QueryError};

    #[test]
    fn execution_errors_preserve_the_store_cause() {
        let error = QueryError::execution("failed to load rows")(
            rusqlite::Error::InvalidColumnName("Nope".to_string()),
        );

        assert_eq!(error.kind(), ErrorKind::QueryExecution);
        assert_eq!(error.to_string(), "query execution failed: failed to load rows");
        let cause = error.source().expect("store cause should be kept");
        assert!(cause.to_string().contains("Nope"), "unexpected cause: {cause}");
    }

    #[test]
    fn not_found_names_the_country() {
        let error = QueryError::NotFound {
            country: "Nowhereland".to_string(),
        };

        assert_eq!(error.kind().code(), "not_found");
        assert!(error.kind().is_user_correctable());
        assert!(error.to_string().contains("Nowhereland"));
    }
}
