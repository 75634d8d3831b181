use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Source unavailable: {}: {reason}", .path.display())]
    SourceUnavailable { path: PathBuf, reason: String },

    #[error("Schema mismatch in {dataset}: missing column(s) {}", .missing.join(", "))]
    SchemaMismatch { dataset: String, missing: Vec<String> },

    #[error("No production rows matched a field geometry")]
    EmptyJoinResult,

    #[error("Year {0} is not one of the configured years")]
    UnknownYear(i32),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl PipelineError {
    pub fn unavailable(path: &Path, reason: impl ToString) -> Self {
        PipelineError::SourceUnavailable {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub fn schema(dataset: &str, missing: Vec<String>) -> Self {
        PipelineError::SchemaMismatch {
            dataset: dataset.to_string(),
            missing,
        }
    }

    /// Fatal errors abort startup; the rest are reported and the session
    /// carries on.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PipelineError::SourceUnavailable { .. }
                | PipelineError::SchemaMismatch { .. }
                | PipelineError::Config(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_mismatch_lists_missing_columns() {
        let err = PipelineError::schema("production", vec!["prfYear".into(), "prfPrdOeNetMillSm3".into()]);
        assert_eq!(
            err.to_string(),
            "Schema mismatch in production: missing column(s) prfYear, prfPrdOeNetMillSm3"
        );
        assert!(err.is_fatal());
    }

    #[test]
    fn empty_join_and_unknown_year_are_not_fatal() {
        assert!(!PipelineError::EmptyJoinResult.is_fatal());
        assert!(!PipelineError::UnknownYear(1999).is_fatal());
        assert!(PipelineError::unavailable(Path::new("x.csv"), "gone").is_fatal());
    }
}
