//! Error types for reconciliation runs.
//!
//! Errors are split by who has to act on them: the caller fixing their
//! declared intent, or the collaborator that talks to the device.

use thiserror::Error;

/// Categories of reconciliation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The declared intent or invocation parameters are invalid
    UserInput,
    /// Facts could not be gathered from the device or raw text
    Facts,
    /// Commands could not be applied to the device
    Apply,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::UserInput => "Invalid invocation",
            Self::Facts => "Fact gathering failed",
            Self::Apply => "Applying commands failed",
        }
    }

    /// Get actionable advice for resolving this error category.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::UserInput => "Fix the declared configuration and run again",
            Self::Facts => "Check the device connection or the supplied running-config",
            Self::Apply => "Inspect the device; commands may have been partially applied",
        }
    }
}

/// Errors that can occur while reconciling spanning-tree configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// A state that computes commands was invoked without any records
    #[error("value of config parameter must not be empty for state {state}")]
    EmptyConfig {
        /// The requested state
        state: String,
    },

    /// The parsed state was invoked without a raw running-config
    #[error("value of running_config parameter must not be empty for state parsed")]
    MissingRunningConfig,

    /// Two declared records share the same name
    #[error("duplicate record name in config: {name}")]
    DuplicateName {
        /// The repeated name
        name: String,
    },

    /// A declared record failed validation
    #[error("invalid record '{name}': {message}")]
    InvalidRecord {
        /// Name of the offending record
        name: String,
        /// What is wrong with it
        message: String,
    },

    /// Unknown state verb
    #[error("unknown state '{0}' (expected merged, replaced, overridden, deleted, rendered, gathered or parsed)")]
    UnknownState(String),

    /// The fact source failed
    #[error("failed to gather facts: {0}")]
    Facts(String),

    /// The command executor failed
    #[error("failed to apply commands: {0}")]
    Apply(String),
}

impl Error {
    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Facts(_) => ErrorCategory::Facts,
            Error::Apply(_) => ErrorCategory::Apply,
            _ => ErrorCategory::UserInput,
        }
    }

    pub(crate) fn invalid(name: &str, message: impl Into<String>) -> Self {
        Error::InvalidRecord {
            name: name.to_string(),
            message: message.into(),
        }
    }
}

/// Result type for reconciliation operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category() {
        assert_eq!(Error::MissingRunningConfig.category(), ErrorCategory::UserInput);
        assert_eq!(
            Error::EmptyConfig {
                state: "merged".into()
            }
            .category(),
            ErrorCategory::UserInput
        );
        assert_eq!(Error::Facts("timeout".into()).category(), ErrorCategory::Facts);
        assert_eq!(Error::Apply("denied".into()).category(), ErrorCategory::Apply);
    }

    #[test]
    fn test_empty_config_message() {
        let err = Error::EmptyConfig {
            state: "replaced".into(),
        };
        assert_eq!(
            err.to_string(),
            "value of config parameter must not be empty for state replaced"
        );
    }
}
