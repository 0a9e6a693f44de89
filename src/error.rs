//! Error type shared by every part of the regression core.

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while aligning data, fitting models or resolving selections.
///
/// All of them are deterministic consequences of the data or the selection,
/// so callers should surface them instead of retrying.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Requested years are not covered by the source series
    #[error("Year range {start}..={end} not covered: {reason}")]
    Range { start: i32, end: i32, reason: String },

    /// Inverse prediction on a line with zero slope
    #[error("Cannot invert a regression line with zero slope")]
    Division,

    /// The predictors do not determine a unique fit
    #[error("Degenerate fit: {0}")]
    DegenerateFit(String),

    /// A model was requested before every choice was made
    #[error("Selection incomplete: no {missing} chosen")]
    SelectionIncomplete { missing: &'static str },

    /// Unknown region, species or gas
    #[error("Unknown {kind} '{name}'")]
    Lookup { kind: &'static str, name: String },

    /// Not enough observations for the requested fit
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Malformed input data
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Two emission records for the same region and year
    #[error("Duplicate record for year {year} in region '{region}'")]
    DuplicateYear { region: String, year: i32 },

    /// Configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    pub(crate) fn lookup(kind: &'static str, name: impl Into<String>) -> Self {
        CoreError::Lookup {
            kind,
            name: name.into(),
        }
    }
}
