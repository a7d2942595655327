//! 採点データの型定義
//!
//! - columns: CSVの列名
//! - Score: 1〜10の採点値
//! - CategoryScope: カテゴリ選択肢の範囲（行ごと / データセット全体）
//! - GradingItem: 採点画面に表示する1行分のデータ

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// CSV列名
pub mod columns {
    pub const PROMPT: &str = "prompt";
    pub const QUESTION: &str = "question";
    pub const STUDENTS_ANSWER: &str = "students_answer";
    pub const CATEGORIES: &str = "categories";
    pub const GRADE1_RATING: &str = "grade1_rating";
    pub const GRADER1_CATEGORIES: &str = "grader1_categories";
    pub const GRADER2_CATEGORIES: &str = "grader2_categories";
    pub const MODEL_CATEGORIES: &str = "model_categories";
    pub const ACCEPTABLE: &str = "acceptable";
    /// 欠けていれば空列として追加される
    pub const GRADER1_COMMENT: &str = "grader1_comment";
}

/// 読み込み時に必須の列
pub const REQUIRED_COLUMNS: [&str; 9] = [
    columns::PROMPT,
    columns::QUESTION,
    columns::STUDENTS_ANSWER,
    columns::CATEGORIES,
    columns::GRADE1_RATING,
    columns::GRADER1_CATEGORIES,
    columns::GRADER2_CATEGORIES,
    columns::MODEL_CATEGORIES,
    columns::ACCEPTABLE,
];

/// 採点値（1〜10）
///
/// 範囲外の値は構築できない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score(u8);

impl Score {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn new(value: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::ScoreOutOfRange(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// 選択肢として提示する全採点値（昇順）
    pub fn all() -> impl Iterator<Item = Score> {
        (Self::MIN..=Self::MAX).map(Score)
    }
}

impl Default for Score {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl TryFrom<u8> for Score {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> u8 {
        score.0
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// カテゴリ選択肢の範囲
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryScope {
    /// その行の`categories`列のみ（デフォルト）
    #[default]
    Row,
    /// 全行の`categories`列の和集合（ソート済み）
    Dataset,
}

impl std::str::FromStr for CategoryScope {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "row" => Ok(CategoryScope::Row),
            "dataset" | "all" => Ok(CategoryScope::Dataset),
            _ => Err(format!("Unknown category scope: {}. Use row or dataset", s)),
        }
    }
}

impl std::fmt::Display for CategoryScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryScope::Row => write!(f, "row"),
            CategoryScope::Dataset => write!(f, "dataset"),
        }
    }
}

/// 採点画面に表示する1行分のデータ
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GradingItem {
    /// 元テーブル上の行番号（0始まり、ヘッダー除く）
    pub row_id: usize,
    pub prompt: String,
    pub question: String,
    pub students_answer: String,
    /// この行で選択可能なカテゴリ
    pub categories: Vec<String>,
    /// モデルが選択したカテゴリ（採点者には明示的に開示するまで見せない）
    pub model_categories: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_range() {
        assert!(Score::new(0).is_err());
        assert_eq!(Score::new(1).unwrap().value(), 1);
        assert_eq!(Score::new(10).unwrap().value(), 10);
        assert!(matches!(Score::new(11), Err(Error::ScoreOutOfRange(11))));
    }

    #[test]
    fn test_score_all() {
        let all: Vec<u8> = Score::all().map(u8::from).collect();
        assert_eq!(all, (1..=10).collect::<Vec<u8>>());
    }

    #[test]
    fn test_category_scope_from_str() {
        assert_eq!("row".parse::<CategoryScope>().unwrap(), CategoryScope::Row);
        assert_eq!("Dataset".parse::<CategoryScope>().unwrap(), CategoryScope::Dataset);
        assert!("global".parse::<CategoryScope>().is_err());
    }

    #[test]
    fn test_category_scope_display_roundtrip() {
        for scope in [CategoryScope::Row, CategoryScope::Dataset] {
            assert_eq!(scope.to_string().parse::<CategoryScope>().unwrap(), scope);
        }
    }
}
