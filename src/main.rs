use clap::Parser;
use grading_common::{Dataset, DatasetSummary};
use grading_rust::{cli, config, error, grade, logging};
use cli::{Cli, Commands};
use config::Config;
use error::{GradingError, Result};
use tracing::warn;

fn main() {
    if let Err(err) = run() {
        eprintln!("✗ {}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    // configサブコマンドは壊れた設定ファイルを上書きできるようにデフォルト値で続行する
    let (config, load_error) = match &cli.command {
        Commands::Config { .. } => Config::load_or_default()?,
        _ => (Config::load()?, None),
    };
    logging::init(&config.log_level, cli.verbose)?;
    if let Some(err) = load_error {
        warn!(%err, "設定ファイルを読み込めないためデフォルト値を使います");
    }

    match cli.command {
        Commands::Grade { input, output, scope } => {
            println!("📋 grading-rust - 採点\n");
            let scope = scope.unwrap_or(config.category_scope);
            grade::run_interactive_grading(&input, output.as_deref(), &config, scope)?;
        }

        Commands::Status { input } => {
            if !input.exists() {
                return Err(GradingError::FileNotFound(input.display().to_string()));
            }
            let dataset = Dataset::load(&input)?;
            let summary = DatasetSummary::from_dataset(&dataset);

            println!("採点キュー: {}", input.display());
            println!("  全行数: {}", summary.total_rows);
            println!("  採点対象: {}", summary.eligible);
            println!("  採点済み: {}", summary.already_graded);
            println!("  モデル判定なし: {}", summary.missing_model);
        }

        Commands::Config { show, set_scope, set_export_suffix, set_log_level } => {
            let mut config = config;
            let mut changed = false;

            if let Some(scope) = set_scope {
                config.category_scope = scope;
                changed = true;
            }
            if let Some(suffix) = set_export_suffix {
                config.set_export_suffix(suffix)?;
                changed = true;
            }
            if let Some(level) = set_log_level {
                config.set_log_level(level)?;
                changed = true;
            }

            if changed {
                config.save()?;
                println!("✔ 設定を保存しました: {}", Config::config_path()?.display());
            }

            if show || !changed {
                println!("設定:");
                println!("  カテゴリ範囲: {}", config.category_scope);
                println!("  出力接尾辞: {}", config.export_suffix);
                println!("  ログレベル: {}", config.log_level);
            }
        }
    }

    Ok(())
}
