//! 採点キュー
//!
//! セッション開始時に一度だけ採点対象行を抽出し、カーソルで進捗を管理する。
//! 抽出後の行の更新はキューの構成に影響しない。

use crate::dataset::Dataset;
use crate::types::columns;
use serde::Serialize;

/// 採点対象かどうか
///
/// 採点者1・採点者2のカテゴリがともに欠損で、モデルのカテゴリがある行のみ対象。
pub fn is_eligible(dataset: &Dataset, row: usize) -> bool {
    dataset.cell(row, columns::GRADER1_CATEGORIES).is_none()
        && dataset.cell(row, columns::GRADER2_CATEGORIES).is_none()
        && dataset.cell(row, columns::MODEL_CATEGORIES).is_some()
}

/// 採点対象行の固定リストとカーソル
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GradingQueue {
    rows: Vec<usize>,
    cursor: usize,
}

impl GradingQueue {
    /// データセットから採点対象行を抽出（元の行順を保持）
    pub fn from_dataset(dataset: &Dataset) -> Self {
        Self::from_rows(
            dataset
                .row_ids()
                .filter(|&row| is_eligible(dataset, row))
                .collect(),
        )
    }

    pub fn from_rows(rows: Vec<usize>) -> Self {
        Self { rows, cursor: 0 }
    }

    /// 現在の行。全行完了ならNone
    pub fn current(&self) -> Option<usize> {
        self.rows.get(self.cursor).copied()
    }

    pub fn advance(&mut self) {
        if self.cursor < self.rows.len() {
            self.cursor += 1;
        }
    }

    /// カーソル位置（= 採点済み件数）
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn total(&self) -> usize {
        self.rows.len()
    }

    pub fn remaining(&self) -> usize {
        self.rows.len() - self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.rows.len()
    }

    /// 進捗率（0.0〜1.0）。対象0件なら1.0
    pub fn progress(&self) -> f32 {
        if self.rows.is_empty() {
            1.0
        } else {
            self.cursor as f32 / self.rows.len() as f32
        }
    }

    pub fn rows(&self) -> &[usize] {
        &self.rows
    }
}

/// `status`コマンド用のデータセット集計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    pub total_rows: usize,
    /// 採点対象
    pub eligible: usize,
    /// 採点者1または採点者2の注釈あり
    pub already_graded: usize,
    /// 未採点かつモデル判定なし
    pub missing_model: usize,
}

impl DatasetSummary {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let mut summary = Self {
            total_rows: dataset.len(),
            ..Default::default()
        };
        for row in dataset.row_ids() {
            let graded = dataset.cell(row, columns::GRADER1_CATEGORIES).is_some()
                || dataset.cell(row, columns::GRADER2_CATEGORIES).is_some();
            if graded {
                summary.already_graded += 1;
            } else if dataset.cell(row, columns::MODEL_CATEGORIES).is_some() {
                summary.eligible += 1;
            } else {
                summary.missing_model += 1;
            }
        }
        summary
    }
}
