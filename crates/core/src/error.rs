//! Error types for Molchan forecast evaluation

use thiserror::Error;

/// Boxed error raised by an external raster or reconstruction service
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for Molchan operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Raster size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error("CRS mismatch: {0} vs {1}")]
    CrsMismatch(String, String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// A fraction was requested over zero samples
    #[error("Empty sample: {0} has no samples to normalise by")]
    EmptySample(&'static str),

    /// Wrong cardinality or shape of caller input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Two raster sequences do not share the same epochs
    #[error("Raster sequence keys differ: {left:?} vs {right:?}")]
    KeyMismatch { left: Vec<f64>, right: Vec<f64> },

    /// An observation refers to an epoch absent from the raster sequence
    #[error("No raster for epoch {time} in sequence")]
    MissingEpoch { time: f64 },

    /// Failure surfaced unchanged from an external collaborator
    #[error("{name} failed: {source}")]
    Collaborator {
        name: &'static str,
        #[source]
        source: BoxedSource,
    },

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Wrap a collaborator failure without altering it
    pub fn collaborator<E>(name: &'static str, source: E) -> Self
    where
        E: Into<BoxedSource>,
    {
        Error::Collaborator {
            name,
            source: source.into(),
        }
    }
}

/// Result type alias for Molchan operations
pub type Result<T> = std::result::Result<T, Error>;
