use std::collections::BTreeSet;
use std::path::PathBuf;

use grading_common::{CategoryScope, GradingSession, Judgment, Score};

/// 1行分のフォーム入力（行が進むたびにリセット）
#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub score: Score,
    pub selected: BTreeSet<String>,
    pub judgment: Option<Judgment>,
    pub comment: String,
}

impl FormState {
    /// 選択肢の順序で選択済みカテゴリを返す
    pub fn selected_in_order(&self, options: &[String]) -> Vec<String> {
        options
            .iter()
            .filter(|o| self.selected.contains(*o))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct AppState {
    pub session: Option<GradingSession>,
    pub source_path: Option<PathBuf>,
    pub scope: CategoryScope,
    pub form: FormState,
    pub last_export: Option<PathBuf>,
}
