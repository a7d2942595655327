//! 採点セッションのステートマシン
//!
//! 1行ごとに2段階で採点する:
//! 1. `AwaitingInput`: 採点値とカテゴリを、モデルの判定を見せずに入力させる
//! 2. `AwaitingFinalization`: モデルとの差分を計算し、モデルが余分に選んだ
//!    カテゴリがあれば許容できるかの判断（＋任意コメント）を求める
//!
//! 確定（finalize）したときだけデータセットに書き込み、カーソルを進める。
//! キューを使い切ると`Done`になり、以降の操作は受け付けない。

use crate::categories;
use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::export;
use crate::queue::GradingQueue;
use crate::types::{columns, CategoryScope, GradingItem, Score};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// セッションの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingInput,
    AwaitingFinalization,
    Done,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::AwaitingInput => write!(f, "awaiting input"),
            Phase::AwaitingFinalization => write!(f, "awaiting finalization"),
            Phase::Done => write!(f, "done"),
        }
    }
}

/// モデルが余分に選んだカテゴリに対する採点者の判断
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Judgment {
    Acceptable,
    NotAcceptable,
}

impl Judgment {
    /// `acceptable`列に書き込む値
    pub fn flag(self) -> u8 {
        match self {
            Judgment::Acceptable => 1,
            Judgment::NotAcceptable => 0,
        }
    }
}

/// 1段階目の入力（確定まで保持）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub score: Score,
    pub selected: Vec<String>,
    /// モデルが選び、採点者が選ばなかったカテゴリ
    pub missing: Vec<String>,
}

impl Submission {
    /// 採点者の選択がモデルの選択を包含している
    pub fn agrees(&self) -> bool {
        self.missing.is_empty()
    }
}

/// 確定した1行分の採点結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeRecord {
    pub row_id: usize,
    pub score: Score,
    pub categories: String,
    pub acceptable: u8,
    pub comment: String,
}

/// セッション中の集計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub graded: usize,
    /// モデルとの差分なし
    pub agreed: usize,
    /// 差分ありで許容
    pub accepted: usize,
    /// 差分ありで不可
    pub rejected: usize,
}

/// 1人の採点者・1ファイル分のセッション
#[derive(Debug, Clone)]
pub struct GradingSession {
    dataset: Dataset,
    queue: GradingQueue,
    scope: CategoryScope,
    /// `CategoryScope::Dataset`用の語彙（セッション開始時に固定）
    vocabulary: Vec<String>,
    submission: Option<Submission>,
    revealed: bool,
    stats: SessionStats,
    source: Option<PathBuf>,
}

impl GradingSession {
    pub fn new(dataset: Dataset, scope: CategoryScope) -> Self {
        let queue = GradingQueue::from_dataset(&dataset);
        let vocabulary = match scope {
            CategoryScope::Row => Vec::new(),
            CategoryScope::Dataset => dataset.category_vocabulary(),
        };
        info!(rows = dataset.len(), queued = queue.total(), %scope, "grading session started");
        Self {
            dataset,
            queue,
            scope,
            vocabulary,
            submission: None,
            revealed: false,
            stats: SessionStats::default(),
            source: None,
        }
    }

    /// CSVファイルを読み込んでセッションを開始
    pub fn open(path: &Path, scope: CategoryScope) -> Result<Self> {
        let dataset = Dataset::load(path)?;
        let mut session = Self::new(dataset, scope);
        session.source = Some(path.to_path_buf());
        Ok(session)
    }

    pub fn phase(&self) -> Phase {
        if self.queue.current().is_none() {
            Phase::Done
        } else if self.submission.is_some() {
            Phase::AwaitingFinalization
        } else {
            Phase::AwaitingInput
        }
    }

    pub fn is_done(&self) -> bool {
        self.phase() == Phase::Done
    }

    /// 1段階目を送信済みか
    pub fn is_submitted(&self) -> bool {
        self.submission.is_some()
    }

    pub fn queue(&self) -> &GradingQueue {
        &self.queue
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn into_dataset(self) -> Dataset {
        self.dataset
    }

    pub fn scope(&self) -> CategoryScope {
        self.scope
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// 現在の行のデータ
    pub fn current_item(&self) -> Option<GradingItem> {
        self.queue.current().and_then(|row| self.dataset.item(row))
    }

    /// 現在の行で提示するカテゴリの選択肢
    pub fn category_options(&self) -> Vec<String> {
        match self.scope {
            CategoryScope::Dataset => self.vocabulary.clone(),
            CategoryScope::Row => {
                let mut options: Vec<String> = Vec::new();
                if let Some(item) = self.current_item() {
                    for category in item.categories {
                        if !category.is_empty() && !options.contains(&category) {
                            options.push(category);
                        }
                    }
                }
                options
            }
        }
    }

    fn expect_phase(&self, expected: Phase) -> Result<()> {
        match self.phase() {
            Phase::Done => Err(Error::QueueExhausted),
            actual if actual != expected => Err(Error::WrongPhase { expected, actual }),
            _ => Ok(()),
        }
    }

    /// 1段階目: 採点値と選択カテゴリを送信
    ///
    /// 何も書き込まず、モデルとの差分を計算して確定待ちに移る。
    pub fn submit(&mut self, score: Score, selected: Vec<String>) -> Result<&Submission> {
        self.expect_phase(Phase::AwaitingInput)?;
        let item = self.current_item().ok_or(Error::QueueExhausted)?;
        let missing = categories::missing_from(&item.model_categories, &selected);
        debug!(
            row = item.row_id,
            score = score.value(),
            selected = selected.len(),
            missing = missing.len(),
            "submitted"
        );
        self.revealed = false;
        Ok(&*self.submission.insert(Submission {
            score,
            selected,
            missing,
        }))
    }

    pub fn submission(&self) -> Option<&Submission> {
        self.submission.as_ref()
    }

    /// モデルが選び、採点者が選ばなかったカテゴリ（送信前は空）
    pub fn missing_from_grader(&self) -> &[String] {
        self.submission
            .as_ref()
            .map(|s| s.missing.as_slice())
            .unwrap_or_default()
    }

    /// モデルのカテゴリを開示（確定待ちの間のみ）
    pub fn reveal(&mut self) -> Result<Vec<String>> {
        self.expect_phase(Phase::AwaitingFinalization)?;
        self.revealed = true;
        let item = self.current_item().ok_or(Error::QueueExhausted)?;
        debug!(row = item.row_id, "model categories revealed");
        Ok(item.model_categories)
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// 開示済みのときだけモデルのカテゴリを返す
    pub fn revealed_model_categories(&self) -> Option<Vec<String>> {
        if self.revealed && self.phase() == Phase::AwaitingFinalization {
            self.current_item().map(|item| item.model_categories)
        } else {
            None
        }
    }

    /// 2段階目: 確定して書き込み、次の行へ進む
    ///
    /// 差分がある場合は`judgment`が必須。差分がなければ`judgment`と`comment`は
    /// 無視され、acceptable=1・コメント空で書き込む。
    pub fn finalize(&mut self, judgment: Option<Judgment>, comment: &str) -> Result<GradeRecord> {
        self.expect_phase(Phase::AwaitingFinalization)?;
        let row_id = self.queue.current().ok_or(Error::QueueExhausted)?;
        let submission = self.submission.as_ref().ok_or(Error::WrongPhase {
            expected: Phase::AwaitingFinalization,
            actual: Phase::AwaitingInput,
        })?;

        let (acceptable, comment) = if submission.agrees() {
            (1, String::new())
        } else {
            let judgment = judgment.ok_or(Error::JudgmentRequired)?;
            (judgment.flag(), comment.to_string())
        };

        let record = GradeRecord {
            row_id,
            score: submission.score,
            categories: categories::serialize(&submission.selected),
            acceptable,
            comment,
        };

        self.dataset
            .set(row_id, columns::GRADE1_RATING, record.score.to_string())?;
        self.dataset
            .set(row_id, columns::GRADER1_CATEGORIES, record.categories.clone())?;
        self.dataset
            .set(row_id, columns::ACCEPTABLE, record.acceptable.to_string())?;
        self.dataset
            .set(row_id, columns::GRADER1_COMMENT, record.comment.clone())?;

        if submission.agrees() {
            self.stats.agreed += 1;
        } else if record.acceptable == 1 {
            self.stats.accepted += 1;
        } else {
            self.stats.rejected += 1;
        }
        self.stats.graded += 1;

        self.submission = None;
        self.revealed = false;
        self.queue.advance();

        info!(
            row = row_id,
            score = record.score.value(),
            acceptable = record.acceptable,
            position = self.queue.position(),
            total = self.queue.total(),
            "row finalized"
        );
        Ok(record)
    }

    /// 現在のテーブル全体をスナップショットとして書き出す
    pub fn export(&self, output: &Path) -> Result<()> {
        export::write_snapshot(&self.dataset, output, self.source.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::tests::{sample_csv, HEADER};

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn score(value: u8) -> Score {
        Score::new(value).unwrap()
    }

    /// row5: model "A|B"、row9: model "X"、それ以外は対象外
    fn ten_row_session() -> GradingSession {
        let mut lines = vec![HEADER.to_string()];
        for i in 0..10 {
            let line = match i {
                5 => "P5,Q5,A5,A|B|C,,,,A|B,".to_string(),
                9 => "P9,Q9,A9,X|Y,,,,X,".to_string(),
                _ => format!("P{i},Q{i},A{i},A|B,5,A,,A,1"),
            };
            lines.push(line);
        }
        let dataset = Dataset::from_csv_str(&lines.join("\n")).unwrap();
        GradingSession::new(dataset, CategoryScope::Row)
    }

    #[test]
    fn test_disagreement_rejected_scenario() {
        let mut session = ten_row_session();
        assert_eq!(session.queue().rows(), &[5, 9]);
        assert_eq!(session.phase(), Phase::AwaitingInput);

        let submission = session.submit(score(7), labels(&["A"])).unwrap();
        assert_eq!(submission.missing, labels(&["B"]));
        assert_eq!(session.queue().position(), 0);

        let record = session
            .finalize(Some(Judgment::NotAcceptable), "B is wrong")
            .unwrap();
        assert_eq!(record.row_id, 5);

        let dataset = session.dataset();
        assert_eq!(dataset.cell(5, columns::GRADE1_RATING), Some("7"));
        assert_eq!(dataset.cell(5, columns::GRADER1_CATEGORIES), Some("A"));
        assert_eq!(dataset.cell(5, columns::ACCEPTABLE), Some("0"));
        assert_eq!(dataset.cell(5, columns::GRADER1_COMMENT), Some("B is wrong"));
        assert_eq!(session.queue().position(), 1);
        assert!(!session.is_submitted());
    }

    #[test]
    fn test_superset_auto_accepts_and_finishes() {
        let mut session = ten_row_session();
        session.submit(score(7), labels(&["A"])).unwrap();
        session.finalize(Some(Judgment::NotAcceptable), "").unwrap();

        let submission = session.submit(score(9), labels(&["X", "Y"])).unwrap();
        assert!(submission.agrees());

        // 差分なしなら判断・コメントは無視される
        let record = session
            .finalize(Some(Judgment::NotAcceptable), "ignored")
            .unwrap();
        assert_eq!(record.acceptable, 1);
        assert_eq!(record.comment, "");
        assert_eq!(session.dataset().cell(9, columns::ACCEPTABLE), Some("1"));
        assert_eq!(session.dataset().cell(9, columns::GRADER1_COMMENT), None);
        assert_eq!(session.dataset().cell(9, columns::GRADER1_CATEGORIES), Some("X|Y"));

        assert_eq!(session.queue().position(), 2);
        assert_eq!(session.phase(), Phase::Done);
        assert!(session.current_item().is_none());
        assert_eq!(
            session.stats(),
            SessionStats {
                graded: 2,
                agreed: 1,
                accepted: 0,
                rejected: 1,
            }
        );
    }

    #[test]
    fn test_judgment_is_required_on_disagreement() {
        let mut session = ten_row_session();
        session.submit(score(3), Vec::new()).unwrap();
        assert_eq!(session.missing_from_grader(), labels(&["A", "B"]).as_slice());

        assert!(matches!(
            session.finalize(None, "no judgment"),
            Err(Error::JudgmentRequired)
        ));
        // 失敗しても送信内容とカーソルは保持
        assert!(session.is_submitted());
        assert_eq!(session.queue().position(), 0);

        let record = session.finalize(Some(Judgment::Acceptable), "").unwrap();
        assert_eq!(record.acceptable, 1);
        assert_eq!(record.categories, "");
    }

    #[test]
    fn test_cursor_only_advances_on_finalize() {
        let mut session = ten_row_session();
        session.submit(score(5), labels(&["A", "B"])).unwrap();
        assert_eq!(session.queue().position(), 0);
        assert_eq!(session.phase(), Phase::AwaitingFinalization);

        // 確定待ちで再送信はできない
        assert!(matches!(
            session.submit(score(6), labels(&["A"])),
            Err(Error::WrongPhase { .. })
        ));
        assert_eq!(session.queue().position(), 0);

        session.finalize(None, "").unwrap();
        assert_eq!(session.queue().position(), 1);
        assert_eq!(session.phase(), Phase::AwaitingInput);
    }

    #[test]
    fn test_finalize_before_submit_is_rejected() {
        let mut session = ten_row_session();
        assert!(matches!(
            session.finalize(Some(Judgment::Acceptable), ""),
            Err(Error::WrongPhase {
                expected: Phase::AwaitingFinalization,
                actual: Phase::AwaitingInput,
            })
        ));
    }

    #[test]
    fn test_reveal_is_explicit() {
        let mut session = ten_row_session();
        assert!(session.reveal().is_err());

        session.submit(score(7), labels(&["A"])).unwrap();
        assert!(!session.is_revealed());
        assert!(session.revealed_model_categories().is_none());

        assert_eq!(session.reveal().unwrap(), labels(&["A", "B"]));
        assert_eq!(session.revealed_model_categories(), Some(labels(&["A", "B"])));

        // 次の行では再び非表示
        session.finalize(Some(Judgment::Acceptable), "").unwrap();
        session.submit(score(7), labels(&["X"])).unwrap();
        assert!(!session.is_revealed());
    }

    #[test]
    fn test_done_session_rejects_actions() {
        let mut session = ten_row_session();
        for _ in 0..2 {
            session.submit(score(5), labels(&["A", "B", "X"])).unwrap();
            session.finalize(None, "").unwrap();
        }
        assert!(session.is_done());
        assert!(matches!(
            session.submit(score(5), Vec::new()),
            Err(Error::QueueExhausted)
        ));
        assert!(matches!(session.finalize(None, ""), Err(Error::QueueExhausted)));
    }

    #[test]
    fn test_row_scope_options_come_from_current_row() {
        let mut session = ten_row_session();
        assert_eq!(session.category_options(), labels(&["A", "B", "C"]));
        session.submit(score(5), labels(&["A", "B"])).unwrap();
        session.finalize(None, "").unwrap();
        assert_eq!(session.category_options(), labels(&["X", "Y"]));
    }

    #[test]
    fn test_dataset_scope_pools_all_categories() {
        let dataset = Dataset::from_csv_str(&sample_csv()).unwrap();
        let session = GradingSession::new(dataset, CategoryScope::Dataset);
        assert_eq!(
            session.category_options(),
            labels(&["A", "B", "C", "X", "Y", "Z"])
        );
    }

    #[test]
    fn test_graded_rows_are_not_requeued() {
        let mut session = ten_row_session();
        session.submit(score(8), labels(&["A", "B"])).unwrap();
        session.finalize(None, "").unwrap();

        let next = GradingSession::new(session.into_dataset(), CategoryScope::Row);
        assert_eq!(next.queue().rows(), &[9]);
    }
}
