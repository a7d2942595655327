use clap::{Parser, Subcommand};
use grading_common::CategoryScope;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "grading-rust")]
#[command(about = "CSV採点ワークフロー（ブラインド採点とモデル判定の比較）", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 未採点の行を対話的に採点
    Grade {
        /// 採点データCSV
        #[arg(default_value = "grading_data.csv")]
        input: PathBuf,

        /// 出力CSV（デフォルト: 入力ファイル名 + 接尾辞）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// カテゴリ選択肢の範囲 (row/dataset)
        #[arg(long)]
        scope: Option<CategoryScope>,
    },

    /// 採点キューの状況を表示
    Status {
        /// 採点データCSV
        #[arg(default_value = "grading_data.csv")]
        input: PathBuf,
    },

    /// 設定を表示/編集
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// カテゴリ選択肢の範囲を設定 (row/dataset)
        #[arg(long)]
        set_scope: Option<CategoryScope>,

        /// 出力ファイル名の接尾辞を設定
        #[arg(long)]
        set_export_suffix: Option<String>,

        /// ログレベルを設定 (error/warn/info/debug/trace)
        #[arg(long)]
        set_log_level: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_defaults() {
        let cli = Cli::try_parse_from(["grading-rust", "grade"]).unwrap();
        match cli.command {
            Commands::Grade { input, output, scope } => {
                assert_eq!(input, PathBuf::from("grading_data.csv"));
                assert!(output.is_none());
                assert!(scope.is_none());
            }
            _ => panic!("expected grade"),
        }
    }

    #[test]
    fn test_grade_with_scope() {
        let cli = Cli::try_parse_from([
            "grading-rust", "-v", "grade", "data.csv", "-o", "out.csv", "--scope", "dataset",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Grade { input, output, scope } => {
                assert_eq!(input, PathBuf::from("data.csv"));
                assert_eq!(output, Some(PathBuf::from("out.csv")));
                assert_eq!(scope, Some(CategoryScope::Dataset));
            }
            _ => panic!("expected grade"),
        }
    }

    #[test]
    fn test_invalid_scope_rejected() {
        assert!(Cli::try_parse_from(["grading-rust", "grade", "--scope", "global"]).is_err());
    }
}
