use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RasterError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("invalid HGT name {0}")]
    HgtName(PathBuf),

    #[error("invalid HGT file len {0} for {1}")]
    HgtLen(u64, PathBuf),

    #[error("invalid ASCII grid header, {0}")]
    AscHeader(String),

    #[error("ASCII grid has {found} samples, expected {expected}")]
    AscData { expected: usize, found: usize },

    #[error("{cols}x{rows} grid needs {expected} samples, got {found}")]
    Dimensions {
        cols: usize,
        rows: usize,
        expected: usize,
        found: usize,
    },

    #[error("cell size must be positive, got ({0}, {1})")]
    CellSize(f64, f64),
}
