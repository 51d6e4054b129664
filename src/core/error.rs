//! Error types for the butterfly-facade library
//!
//! Load-time failures abort facade construction. `DatasetDisabled` is the only
//! error a constructed facade ever returns, and only from accessors bound to an
//! optional dataset.

use thiserror::Error;

/// Errors raised while loading a region or reading from a facade built on it
#[derive(Debug, Error)]
pub enum FacadeError {
    /// A mandatory dataset is not present in the region index
    #[error("dataset not found: {0}")]
    DatasetNotFound(String),

    /// The region was built without this optional dataset
    #[error("dataset {0} is disabled for this region")]
    DatasetDisabled(&'static str),

    /// Stored element size disagrees with the record type it is viewed as
    #[error("dataset {name} has element size {found}, expected {expected}")]
    LayoutMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    /// The byte range cannot be reinterpreted as the requested record type
    #[error("dataset {name} cannot be viewed in place: {reason}")]
    Misaligned { name: String, reason: String },

    /// Cross-block invariants (length agreement, sortedness) do not hold
    #[error("dataset {name} is malformed: {reason}")]
    InvalidDataset { name: String, reason: String },

    /// Header, checksum or block bounds of the region are wrong
    #[error("invalid region: {0}")]
    InvalidRegion(String),

    /// Neither `/mld/connectivity_checksum` nor `/ch/connectivity_checksum` is indexed
    #[error("region carries no connectivity checksum")]
    MissingChecksum,

    /// The profile has fewer excludable class combinations than requested
    #[error("exclude index {index} out of range ({available} available)")]
    ExcludeIndexOutOfRange { index: usize, available: usize },

    /// Two blocks with the same name were added to a region builder
    #[error("dataset {0} was added twice")]
    DuplicateDataset(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("dataset index is corrupt: {0}")]
    Index(#[from] serde_json::Error),
}

impl FacadeError {
    pub(crate) fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        FacadeError::InvalidDataset {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// True if the error only signals a feature missing from this build of the data
    pub fn is_disabled_dataset(&self) -> bool {
        matches!(self, FacadeError::DatasetDisabled(_))
    }
}

/// Result type alias for facade operations
pub type Result<T> = std::result::Result<T, FacadeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FacadeError::DatasetNotFound("/common/names".to_string());
        assert_eq!(err.to_string(), "dataset not found: /common/names");

        let err = FacadeError::DatasetDisabled("TurnData");
        assert_eq!(err.to_string(), "dataset TurnData is disabled for this region");
        assert!(err.is_disabled_dataset());
    }

    #[test]
    fn test_layout_mismatch_display() {
        let err = FacadeError::LayoutMismatch {
            name: "/common/nbn_data/coordinates".to_string(),
            expected: 8,
            found: 4,
        };
        assert!(err.to_string().contains("element size 4, expected 8"));
        assert!(!err.is_disabled_dataset());
    }
}
