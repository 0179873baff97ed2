//! Unified error handling for fancontrol-cfg
//!
//! One error type shared by the configuration core and the command line
//! front end. Hardware point reads never surface here: they degrade to an
//! empty value at the attribute layer.

use std::io;
use std::path::PathBuf;

/// Result type alias using FanConfigError
pub type Result<T> = std::result::Result<T, FanConfigError>;

/// Unified error type for all fancontrol-cfg operations
#[derive(thiserror::Error, Debug)]
pub enum FanConfigError {
    // ============================================================================
    // Missing or unreadable persisted state
    // ============================================================================
    #[error("Fancontrol file not found: {0}. Install fancontrol and run pwmconfig first")]
    ControlFileMissing(PathBuf),

    #[error("Failed to read fancontrol file {path}: {source}")]
    ControlFileRead {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: io::Error,
    },

    // ============================================================================
    // Malformed persisted state
    // ============================================================================
    #[error("Failed to parse preferences file {path}: {reason}")]
    PreferencesParse {
        path: PathBuf,
        reason: String,
    },

    // ============================================================================
    // Write failures
    // ============================================================================
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Permission denied writing {0}, run as super user")]
    PermissionDenied(PathBuf),

    // ============================================================================
    // Client errors
    // ============================================================================
    #[error("Invalid settings format: {0}")]
    InvalidUpdate(String),

    #[error("Unknown fan control: {0}")]
    UnknownFanControl(String),
}

impl FanConfigError {
    /// Map a write failure, keeping permission problems distinct so callers can
    /// tell the user to retry with elevated rights.
    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::PermissionDenied {
            Self::PermissionDenied(path)
        } else {
            Self::FileWrite { path, source }
        }
    }

    /// Create an invalid update error from a string
    pub fn invalid_update(msg: impl Into<String>) -> Self {
        Self::InvalidUpdate(msg.into())
    }

    /// True for the fatal "cannot establish a model" class of errors.
    pub fn is_fatal_load(&self) -> bool {
        matches!(
            self,
            Self::ControlFileMissing(_) | Self::ControlFileRead { .. } | Self::PreferencesParse { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_denied_is_kept_distinct() {
        let err = FanConfigError::write(
            "/etc/fancontrol",
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(err, FanConfigError::PermissionDenied(_)));

        let err = FanConfigError::write("/etc/fancontrol", io::Error::from(io::ErrorKind::Other));
        assert!(matches!(err, FanConfigError::FileWrite { .. }));
    }

    #[test]
    fn load_errors_are_fatal() {
        assert!(FanConfigError::ControlFileMissing("/etc/fancontrol".into()).is_fatal_load());
        assert!(FanConfigError::PreferencesParse {
            path: "/etc/fancontrol.xml".into(),
            reason: "unexpected eof".into(),
        }
        .is_fatal_load());
        assert!(!FanConfigError::invalid_update("bogus").is_fatal_load());
    }

    #[test]
    fn display_mentions_path() {
        let err = FanConfigError::ControlFileMissing("/tmp/x/fancontrol".into());
        assert!(err.to_string().contains("/tmp/x/fancontrol"));
    }
}
