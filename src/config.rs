use crate::error::{GradingError, Result};
use grading_common::{default_export_path, CategoryScope};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// カテゴリ選択肢の範囲（row / dataset）
    pub category_scope: CategoryScope,
    /// 出力ファイル名に付ける接尾辞
    pub export_suffix: String,
    /// RUST_LOG未設定時のログレベル
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    /// 設定を読み込む。読めなければデフォルト値と読み込みエラーを返す
    ///
    /// 壊れた設定ファイルを`config`サブコマンドで上書きできるようにするためのもの。
    pub fn load_or_default() -> Result<(Self, Option<GradingError>)> {
        Ok(Self::load_or_default_from(&Self::config_path()?))
    }

    pub fn load_or_default_from(config_path: &Path) -> (Self, Option<GradingError>) {
        match Self::load_from(config_path) {
            Ok(config) => (config, None),
            Err(err) => (Self::default_config(), Some(err)),
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| GradingError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("grading-rust").join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            category_scope: CategoryScope::Row,
            export_suffix: "_UPDATED".into(),
            log_level: "info".into(),
        }
    }

    /// 入力CSVに対応する出力先
    pub fn export_path_for(&self, input: &Path) -> PathBuf {
        default_export_path(input, &self.export_suffix)
    }

    pub fn set_export_suffix(&mut self, suffix: String) -> Result<()> {
        if suffix.is_empty() {
            // 接尾辞なしだと入力ファイルと同名になる
            return Err(GradingError::Config("出力接尾辞は空にできません".into()));
        }
        self.export_suffix = suffix;
        Ok(())
    }

    /// ログレベルを設定（`info`のような単独レベルか`target=level`形式のみ）
    pub fn set_log_level(&mut self, level: String) -> Result<()> {
        let level = level.trim().to_string();
        let bare_levels_valid = level
            .split(',')
            .filter(|directive| !directive.contains('='))
            .all(|directive| directive.trim().parse::<LevelFilter>().is_ok());

        if level.is_empty() || !bare_levels_valid || EnvFilter::try_new(&level).is_err() {
            return Err(GradingError::Config(format!("不正なログレベル: {}", level)));
        }
        self.log_level = level;
        Ok(())
    }
}
