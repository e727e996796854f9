//! Error types for locator operations.

use thiserror::Error;

use crate::models::GeometryKind;

/// Errors surfaced by the locator to its callers.
#[derive(Debug, Error)]
pub enum LocatorError {
    /// Fewer coordinates than the geometry kind requires
    #[error("{kind} requires at least {min} coordinates, got {got}")]
    TooFewCoordinates {
        kind: GeometryKind,
        min: usize,
        got: usize,
    },

    /// A coordinate that is not a finite `[lng, lat]` pair
    #[error("malformed coordinate at position {index}: {reason}")]
    MalformedCoordinate { index: usize, reason: String },

    /// A coordinate outside the configured area of operation
    #[error("coordinate ({lng}, {lat}) is outside the supported bounds")]
    OutOfBounds { lng: f64, lat: f64 },

    /// The catalog store failed to answer a lookup
    #[error("catalog lookup failed: {0}")]
    Catalog(String),

    /// Geometry evaluation failed on the input
    #[error("error analyzing {kind}: {message}")]
    Processing { kind: GeometryKind, message: String },
}

impl LocatorError {
    /// Whether the request was rejected before any geometry was evaluated.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            LocatorError::TooFewCoordinates { .. }
                | LocatorError::MalformedCoordinate { .. }
                | LocatorError::OutOfBounds { .. }
        )
    }

    pub(crate) fn processing(kind: GeometryKind, message: impl Into<String>) -> Self {
        LocatorError::Processing {
            kind,
            message: message.into(),
        }
    }
}

pub type Result<T, E = LocatorError> = std::result::Result<T, E>;
