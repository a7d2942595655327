//! エラー型定義

use crate::session::Phase;
use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Score out of range (1-10): {0}")]
    ScoreOutOfRange(u8),

    #[error("Row not found: {0}")]
    UnknownRow(usize),

    #[error("Action not allowed while {actual} (expected {expected})")]
    WrongPhase { expected: Phase, actual: Phase },

    #[error("All queued rows have been graded")]
    QueueExhausted,

    #[error("A yes/no judgment is required when the model selected categories you did not")]
    JudgmentRequired,

    #[error("Refusing to overwrite the input file: {0}")]
    OverwriteInput(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
