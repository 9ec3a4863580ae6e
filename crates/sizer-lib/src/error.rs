//! Error types for engine construction
//!
//! Estimation itself never fails. These errors only come out of building
//! an engine from configuration, a catalog or a preset table.

use thiserror::Error;

/// Result type alias for sizer operations
pub type Result<T> = std::result::Result<T, SizerError>;

#[derive(Error, Debug)]
pub enum SizerError {
    #[error("Instance catalog is empty")]
    EmptyCatalog,

    #[error("Instance catalog is not ascending at position {index}: {previous} vCPU followed by {current} vCPU")]
    UnorderedCatalog {
        index: usize,
        previous: u64,
        current: u64,
    },

    #[error("Invalid configuration: {field}, reason: {reason}")]
    InvalidConfiguration { field: String, reason: String },

    #[error("Unknown sizing model version: {0}")]
    UnknownModelVersion(String),

    #[error("Failed to read configuration: {0}")]
    ConfigRead(String),
}

impl SizerError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        SizerError::InvalidConfiguration {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SizerError::UnorderedCatalog {
            index: 3,
            previous: 16,
            current: 8,
        };
        assert_eq!(
            err.to_string(),
            "Instance catalog is not ascending at position 3: 16 vCPU followed by 8 vCPU"
        );

        let err = SizerError::invalid("aggregation.ram_headroom", "must be > 0");
        assert!(err.to_string().contains("aggregation.ram_headroom"));
    }
}
