use thiserror::Error;

use crate::model::RouteKey;

/// Precondition violations a caller can check for up front. Operations that
/// simply find nothing return `None`/empty results instead.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error("{kind} radius must be positive, got {radius}")]
    DegenerateRadius { kind: &'static str, radius: f64 },

    #[error("arc start and end angles coincide at {angle} degrees")]
    ZeroLengthArc { angle: f64 },

    #[error("parameter '{0}' must be finite")]
    NonFinite(&'static str),

    #[error("tolerance '{name}' must be finite and positive, got {value}")]
    InvalidTolerance { name: &'static str, value: f64 },

    #[error("no model or path at route {0}")]
    RouteNotFound(RouteKey),

    #[error("{what} exceeds the limit of {limit}")]
    LimitExceeded { what: &'static str, limit: usize },

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

pub(crate) fn check_tolerance(name: &'static str, value: f64) -> Result<(), KernelError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(KernelError::InvalidTolerance { name, value })
    }
}
