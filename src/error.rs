use thiserror::Error;

/// Top-level error type for the sightline engine.
///
/// Every variant is a contract violation by the caller. A sweep that finds
/// nothing blocking it is a normal result, never an error.
#[derive(Debug, Error)]
pub enum SightlineError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Edge(#[from] EdgeError),

    #[error(transparent)]
    Clip(#[from] ClipError),

    #[error(transparent)]
    Sweep(#[from] SweepError),
}

/// Errors related to geometric input.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate edge: both endpoints at ({x}, {y})")]
    DegenerateEdge { x: f64, y: f64 },

    #[error("non-finite coordinate in {0}")]
    NonFinite(&'static str),

    #[error("invalid shape: {0}")]
    InvalidShape(String),
}

/// Errors related to the edge store.
#[derive(Debug, Error)]
pub enum EdgeError {
    #[error("edge not found in store")]
    NotFound,
}

/// Errors related to polygon clipping.
#[derive(Debug, Error)]
pub enum ClipError {
    #[error("clip shape must be convex")]
    NonConvexClipShape,

    #[error("clip shape needs at least 3 points, got {0}")]
    TooFewPoints(usize),
}

/// Errors related to sweep configuration and sequencing.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("invalid sweep configuration: {0}")]
    InvalidConfig(String),

    #[error("sweep polygon has not been initialized")]
    NotInitialized,
}

/// Convenience type alias for results using [`SightlineError`].
pub type Result<T> = std::result::Result<T, SightlineError>;
