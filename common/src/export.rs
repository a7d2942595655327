//! スナップショット出力
//!
//! 採点結果を含むテーブル全体を新しいCSVとして書き出す。入力ファイルへの上書きは拒否する。

use crate::dataset::Dataset;
use crate::error::{Error, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;

/// 入力パスから出力パスを決める（`grading_data.csv` → `grading_data_UPDATED.csv`）
pub fn default_export_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("grading_data");
    let extension = input
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("csv");
    input.with_file_name(format!("{stem}{suffix}.{extension}"))
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// テーブル全体を書き出す
///
/// `source`が指定されていて`output`と同じファイルを指す場合はエラー。
pub fn write_snapshot(dataset: &Dataset, output: &Path, source: Option<&Path>) -> Result<()> {
    if let Some(source) = source {
        if same_file(source, output) {
            return Err(Error::OverwriteInput(output.display().to_string()));
        }
    }

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(output)?;
    dataset.write_to(BufWriter::new(file))?;
    info!(path = %output.display(), rows = dataset.len(), "snapshot exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::tests::sample_csv;
    use tempfile::tempdir;

    #[test]
    fn test_default_export_path() {
        assert_eq!(
            default_export_path(Path::new("data/grading_data.csv"), "_UPDATED"),
            PathBuf::from("data/grading_data_UPDATED.csv")
        );
        assert_eq!(
            default_export_path(Path::new("scores"), "_graded"),
            PathBuf::from("scores_graded.csv")
        );
    }

    #[test]
    fn test_write_snapshot_refuses_input_path() {
        let dir = tempdir().expect("Failed to create temp dir");
        let input = dir.path().join("grading_data.csv");
        std::fs::write(&input, sample_csv()).unwrap();

        let dataset = Dataset::load(&input).unwrap();
        let err = write_snapshot(&dataset, &input, Some(&input)).unwrap_err();
        assert!(matches!(err, Error::OverwriteInput(_)));

        // 入力ファイルは変更されていない
        assert_eq!(std::fs::read_to_string(&input).unwrap(), sample_csv());
    }

    #[test]
    fn test_write_snapshot_creates_parent_dirs() {
        let dir = tempdir().expect("Failed to create temp dir");
        let output = dir.path().join("out").join("graded.csv");

        let dataset = Dataset::from_csv_str(&sample_csv()).unwrap();
        write_snapshot(&dataset, &output, None).unwrap();

        let reloaded = Dataset::load(&output).unwrap();
        assert_eq!(reloaded.len(), dataset.len());
    }
}
