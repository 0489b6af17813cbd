//! Error taxonomy for the viewer
//!
//! Fatal conditions abort the mount and surface to the host; recoverable
//! conditions are reported as warnings and rendering proceeds with
//! substituted defaults.

use thiserror::Error;

/// Fatal viewer errors
///
/// Anything that makes it impossible to present frames aborts the mount.
/// Recoverable configuration problems are [`ConfigIssue`]s, not errors.
#[derive(Debug, Error)]
pub enum ViewerError {
    /// No usable rendering backend (surface, adapter or device request failed).
    ///
    /// Nothing is rendered in this state; the mount fails immediately rather
    /// than retrying a blank frame.
    #[error("rendering backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The windowing event loop could not be created or run.
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// Window creation failed before a surface could be mounted.
    #[error("window creation failed: {0}")]
    WindowCreation(String),
}

/// Recoverable configuration issues
///
/// Collected while resolving a [`ViewerConfig`](crate::config::ViewerConfig)
/// and while the lighting stage looks up its preset. Every variant has a
/// well-defined substitution, so rendering always proceeds.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigIssue {
    /// Environment preset name not in the preset table; a flat neutral-gray
    /// environment is used instead.
    UnknownPreset { requested: String },

    /// A value was outside its valid range and was clamped or replaced.
    InvalidConfigValue {
        field: &'static str,
        supplied: String,
        substituted: String,
    },
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigIssue::UnknownPreset { requested } => {
                write!(
                    f,
                    "unknown environment preset '{}', falling back to neutral gray",
                    requested
                )
            }
            ConfigIssue::InvalidConfigValue {
                field,
                supplied,
                substituted,
            } => {
                write!(
                    f,
                    "invalid value for '{}': {} (using {})",
                    field, supplied, substituted
                )
            }
        }
    }
}

/// Logs every issue at warning level.
pub fn report_issues(issues: &[ConfigIssue]) {
    for issue in issues {
        log::warn!("{}", issue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_preset_display() {
        let issue = ConfigIssue::UnknownPreset {
            requested: "moonbase".to_string(),
        };
        let text = issue.to_string();
        assert!(text.contains("moonbase"));
        assert!(text.contains("neutral gray"));
    }

    #[test]
    fn test_invalid_value_display_names_field() {
        let issue = ConfigIssue::InvalidConfigValue {
            field: "opacity",
            supplied: "5".to_string(),
            substituted: "1".to_string(),
        };
        assert!(issue.to_string().contains("opacity"));
    }

    #[test]
    fn test_backend_unavailable_message() {
        let err = ViewerError::BackendUnavailable("no adapter".to_string());
        assert!(err.to_string().contains("no adapter"));
    }
}
