//! Map-subsystem error type.

use thiserror::Error;

/// Errors produced by `cm-map`.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "osm")]
    #[error("OSM parse error: {0}")]
    Osm(String),
}

pub type MapResult<T> = Result<T, MapError>;
