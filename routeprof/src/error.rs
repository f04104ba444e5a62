use thiserror::Error;

/// Structural failures that abort a profiling request.
///
/// Missing data and degenerate regressions are not errors; they are
/// encoded as `None` in the resulting [Profile](crate::Profile).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProfileError {
    #[error("route needs at least 2 usable points, found {usable_points}")]
    InvalidRoute { usable_points: usize },

    #[error("route length is zero")]
    ZeroLengthRoute,

    #[error("no raster or contour source to sample")]
    NoFieldSource,

    #[error("missing required parameter '{0}'")]
    Builder(&'static str),

    #[error("parameter '{name}' must be positive, got {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}
