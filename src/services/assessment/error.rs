use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AssessmentError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    AlreadyExists(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] sqlx::Error),
}

impl AssessmentError {
    /// Stable label used for metrics and structured logs.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::AlreadyExists(_) => "already_exists",
            Self::InvalidInput(_) => "invalid_input",
            Self::StoreUnavailable(_) => "store_unavailable",
        }
    }

    /// Classifies a failed write: unique violations become `AlreadyExists`, foreign key
    /// violations become `NotFound(missing)`, check violations become `InvalidInput`.
    pub(crate) fn from_write(
        err: sqlx::Error,
        conflict: &str,
        missing: &'static str,
    ) -> Self {
        let Some(db_err) = err.as_database_error() else {
            return Self::StoreUnavailable(err);
        };

        if db_err.is_unique_violation() {
            Self::AlreadyExists(conflict.to_string())
        } else if db_err.is_foreign_key_violation() {
            Self::NotFound(missing)
        } else if db_err.is_check_violation() {
            Self::InvalidInput(db_err.message().to_string())
        } else {
            Self::StoreUnavailable(err)
        }
    }
}

impl From<validator::ValidationErrors> for AssessmentError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::InvalidInput(errors.to_string())
    }
}
