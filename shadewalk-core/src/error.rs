use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Walkway graph is empty")]
    EmptyGraph,
    #[error("No path between ({:.3}, {:.3}) and ({:.3}, {:.3})", .from.x(), .from.y(), .to.x(), .to.y())]
    NoPath {
        from: geo::Point<f64>,
        to: geo::Point<f64>,
    },
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("Unsupported geometry: {0}")]
    UnsupportedGeometry(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Stable machine-readable name of the failure class
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "invalid-input",
            Error::NoPath { .. } => "no-path",
            Error::UpstreamUnavailable(_) => "upstream-unavailable",
            Error::UnsupportedGeometry(_) => "unsupported-geometry",
            Error::EmptyGraph
            | Error::InvalidData(_)
            | Error::GeoJsonError(_)
            | Error::Internal(_) => "internal",
        }
    }
}
