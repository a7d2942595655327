use crate::error::{GradingError, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// ログ出力を初期化（stderrへ。対話プロンプトと混ざらないように）
///
/// RUST_LOGが設定されていればそれを優先し、なければ`level`を使う。
/// `verbose`ならdebugに引き上げる。
pub fn init(level: &str, verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { level };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| GradingError::Logging(err.to_string()))
}
