//! Grading Common Library
//!
//! CLIとデスクトップ版で共有される採点ワークフローのコア:
//! - categories: `|`区切りカテゴリ文字列の変換
//! - dataset: CSVテーブルのメモリ上ストア
//! - queue: 採点対象行のキューとカーソル
//! - session: 1行ごとの2段階採点ステートマシン
//! - export: スナップショット出力

pub mod categories;
pub mod dataset;
pub mod error;
pub mod export;
pub mod queue;
pub mod session;
pub mod types;

pub use dataset::Dataset;
pub use error::{Error, Result};
pub use export::{default_export_path, write_snapshot};
pub use queue::{DatasetSummary, GradingQueue};
pub use session::{GradeRecord, GradingSession, Judgment, Phase, SessionStats, Submission};
pub use types::{CategoryScope, GradingItem, Score};
