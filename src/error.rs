//! Error types for propagation and configuration.

use crate::geometry::Point3;
use thiserror::Error;

/// All errors that can occur while assembling a propagator or
/// transporting a particle.
#[derive(Error, Debug)]
pub enum TransportError {
    /// No sector geometry encloses the given position.
    #[error("no sector defined at particle position {0}")]
    NoSectorAtPosition(Point3),
    /// The iterative border crossing search stopped improving before
    /// reaching the particle position resolution.
    #[error(
        "border crossing search did not converge within {max_iterations} \
         iterations (last correction was {last_correction} cm)"
    )]
    BorderCrossingDiverged {
        max_iterations: usize,
        last_correction: f64,
    },
    /// An assembled configuration is inconsistent or refers to an
    /// unknown name.
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for results with a [`TransportError`] error type.
pub type TransportResult<T> = Result<T, TransportError>;
