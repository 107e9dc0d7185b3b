use thiserror::Error;

/// Failures that the map pipeline knows how to classify.
///
/// None of these abort rendering: a failed feed leaves its layer empty and a
/// malformed record is either rendered degenerate or skipped, depending on
/// the configured policy.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuakeMapError {
    /// A feed could not be fetched or decoded
    #[error("failed to fetch {source_name}: {reason}")]
    FetchFailed { source_name: String, reason: String },

    /// A feature is missing a property or geometry the styler needs
    #[error("malformed record #{index}: {reason}")]
    MalformedRecord { index: usize, reason: String },

    #[error("invalid color scale: {0}")]
    InvalidColorScale(String),

    #[error("template error: {0}")]
    Template(String),
}

impl QuakeMapError {
    pub fn fetch_failed(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::FetchFailed {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn malformed(index: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            index,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, QuakeMapError>;
