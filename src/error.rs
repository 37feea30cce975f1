use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("cannot convert {value:?} to an id")]
    Conversion { value: String },
    #[error("content {content_id} belongs to collection {actual}, not {expected}")]
    Mismatch {
        content_id: u64,
        expected: u64,
        actual: u64,
    },
    #[error("persistence error: {0}")]
    Persistence(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        StoreError::Validation(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Largest id SQLite can store in an INTEGER PRIMARY KEY.
pub const MAX_ID: u64 = i64::MAX as u64;

/// Parses a decimal id as submitted by forms, paths, CLI arguments and
/// stored reference values. Ids above [`MAX_ID`] are rejected.
pub fn parse_id(value: &str) -> StoreResult<u64> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|id| *id <= MAX_ID)
        .ok_or_else(|| StoreError::Conversion {
            value: value.to_string(),
        })
}

/// Rejects empty (or whitespace-only) required text inputs.
pub fn require_non_empty(what: &str, value: &str) -> StoreResult<()> {
    if value.trim().is_empty() {
        return Err(StoreError::validation(format!("no {what} given")));
    }
    Ok(())
}
