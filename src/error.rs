//! Engine error type

use thiserror::Error;

use crate::board::{Stone, BOARD_SIZE};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("position ({row}, {col}) is outside the {}x{} board", BOARD_SIZE, BOARD_SIZE)]
    OutOfBounds { row: i32, col: i32 },

    #[error(
        "board must be {}x{} cells, got {rows} rows (offending row has {cols} cells)",
        BOARD_SIZE,
        BOARD_SIZE
    )]
    MalformedBoard { rows: usize, cols: usize },

    #[error("color to move must be black or white")]
    InvalidColor,

    #[error("no legal move for {0:?}")]
    NoLegalMove(Stone),

    #[error("unknown difficulty `{0}`")]
    UnknownDifficulty(String),

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse difficulty table: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("search panicked: {0}")]
    SearchPanicked(String),

    #[error("engine worker has stopped")]
    WorkerStopped,
}
