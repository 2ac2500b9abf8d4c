// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Waypost.

use thiserror::Error;

use crate::types::ScreenId;

/// Why a visit failed. This is the taxonomy shared with the embedded runtime,
/// which reports failures as a single integer status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VisitError {
    #[error("a network error occurred")]
    Network,

    #[error("a network timeout occurred")]
    Timeout,

    #[error("the server returned an invalid content type")]
    ContentTypeMismatch,

    #[error("the page could not be loaded because the embedded runtime never became ready")]
    PageLoadFailure,

    #[error("there was an HTTP error ({0})")]
    Http(i32),
}

impl VisitError {
    /// Map a status code reported by the embedded runtime.
    ///
    /// `0` is a network failure, `-1` a timeout and `-2` a content type
    /// mismatch; every other value is carried as an HTTP status.
    pub fn from_status_code(status_code: i32) -> Self {
        match status_code {
            0 => Self::Network,
            -1 => Self::Timeout,
            -2 => Self::ContentTypeMismatch,
            code => Self::Http(code),
        }
    }

    /// The HTTP status, if this is an HTTP failure.
    pub fn status_code(&self) -> Option<i32> {
        match self {
            Self::Http(code) => Some(*code),
            _ => None,
        }
    }
}

/// Top-level error type for all Waypost operations.
#[derive(Debug, Error)]
pub enum WaypostError {
    // -- Navigation --
    #[error("visit failed: {0}")]
    Visit(#[from] VisitError),

    #[error("visitable screen {0} has no location")]
    MissingLocation(ScreenId),

    // -- Script bridge --
    #[error("script evaluation failed: {0}")]
    ScriptEvaluation(String),

    #[error("malformed script message: {0}")]
    MalformedMessage(String),

    // -- Input / persistence --
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, WaypostError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_network_failure() {
        assert_eq!(VisitError::from_status_code(0), VisitError::Network);
    }

    #[test]
    fn negative_codes_map_to_runtime_failures() {
        assert_eq!(VisitError::from_status_code(-1), VisitError::Timeout);
        assert_eq!(
            VisitError::from_status_code(-2),
            VisitError::ContentTypeMismatch
        );
    }

    #[test]
    fn other_codes_are_http() {
        let err = VisitError::from_status_code(404);
        assert_eq!(err, VisitError::Http(404));
        assert_eq!(err.status_code(), Some(404));
        assert_eq!(err.to_string(), "there was an HTTP error (404)");
    }

    #[test]
    fn visit_error_converts_into_top_level() {
        let err: WaypostError = VisitError::PageLoadFailure.into();
        assert!(matches!(err, WaypostError::Visit(VisitError::PageLoadFailure)));
    }
}
