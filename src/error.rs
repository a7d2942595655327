use thiserror::Error;

#[derive(Error, Debug)]
pub enum GradingError {
    #[error(transparent)]
    Common(#[from] grading_common::Error),

    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("入力操作エラー: {0}")]
    Prompt(String),

    #[error("ログ初期化エラー: {0}")]
    Logging(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GradingError>;
