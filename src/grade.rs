//! 対話式採点モジュール
//!
//! 採点対象の行を1件ずつ表示し、採点値とカテゴリを入力させた後で
//! モデルの判定と比較する。モデルのカテゴリは明示的に開示を選んだときだけ表示する。

use crate::config::Config;
use crate::error::{GradingError, Result};
use dialoguer::{Confirm, Input, MultiSelect, Select};
use grading_common::{CategoryScope, GradeRecord, GradingItem, GradingSession, Judgment, Score};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::debug;

/// 採点値プロンプトの結果
pub enum ScoreAction {
    Score(Score),
    /// 保存して終了
    Quit,
}

/// 1行分の処理結果
pub enum RowOutcome {
    Finalized(GradeRecord),
    Quit,
}

fn prompt_error(e: dialoguer::Error) -> GradingError {
    GradingError::Prompt(e.to_string())
}

/// 対話式で採点
pub fn run_interactive_grading(
    input_path: &Path,
    output_path: Option<&Path>,
    config: &Config,
    scope: CategoryScope,
) -> Result<()> {
    if !input_path.exists() {
        return Err(GradingError::FileNotFound(input_path.display().to_string()));
    }

    let mut session = GradingSession::open(input_path, scope)?;
    let total = session.queue().total();
    let output = output_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.export_path_for(input_path));

    if total == 0 {
        println!("✓ 採点対象の行はありません");
        finish_session(&session, &output, confirm_export)?;
        return Ok(());
    }

    println!("📝 採点対象: {}件 (カテゴリ範囲: {})", total, scope);
    println!("---\n");

    let bar = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} 採点済み") {
        bar.set_style(style);
    }

    while let Some(item) = session.current_item() {
        let position = session.queue().position();
        let outcome = bar.suspend(|| grade_row(&mut session, &item, position, total))?;

        match outcome {
            RowOutcome::Finalized(record) => {
                debug!(row = record.row_id, "graded");
                bar.inc(1);
            }
            RowOutcome::Quit => break,
        }
    }
    bar.finish_and_clear();

    finish_session(&session, &output, confirm_export)?;
    Ok(())
}

/// 採点の終了処理（完了表示 → 集計 → 保存確認 → 書き出し）
///
/// 採点件数が0件でも保存の確認は行う。
/// `confirm`が保存先を受け取りtrueを返したときだけ書き出し、その場合trueを返す。
pub fn finish_session<F>(session: &GradingSession, output: &Path, confirm: F) -> Result<bool>
where
    F: FnOnce(&Path) -> Result<bool>,
{
    if session.is_done() {
        println!("\n🎉 すべての行を採点しました");
    } else {
        println!(
            "\n保存して終了します（残り{}件）",
            session.queue().remaining()
        );
    }
    print_stats(session);

    if !confirm(output)? {
        println!("⚠ 保存せずに終了しました（採点結果は破棄されます）");
        return Ok(false);
    }

    session.export(output)?;
    println!("✓ 保存しました: {}", output.display());
    Ok(true)
}

fn confirm_export(output: &Path) -> Result<bool> {
    Confirm::new()
        .with_prompt(format!("{} に保存しますか?", output.display()))
        .default(true)
        .interact()
        .map_err(prompt_error)
}

/// 1行分の採点（入力 → 比較 → 確定）
fn grade_row(
    session: &mut GradingSession,
    item: &GradingItem,
    position: usize,
    total: usize,
) -> Result<RowOutcome> {
    print_item(item, position, total);

    let score = match prompt_score()? {
        ScoreAction::Score(score) => score,
        ScoreAction::Quit => return Ok(RowOutcome::Quit),
    };

    let options = session.category_options();
    let selected = prompt_categories(&options)?;

    let agrees = session.submit(score, selected)?.agrees();
    println!();

    let record = if agrees {
        println!("✓ モデルと同じカテゴリを選択しています");
        session.finalize(None, "")?
    } else {
        println!("⚠ モデルがあなたの選択していないカテゴリを選んでいます");

        let reveal = Confirm::new()
            .with_prompt("モデルのカテゴリを表示しますか?")
            .default(false)
            .interact()
            .map_err(prompt_error)?;
        if reveal {
            let model = session.reveal()?;
            println!("  モデルのカテゴリ: {}", model.join(", "));
        }

        let judgment = prompt_judgment()?;
        let comment = prompt_comment()?;
        session.finalize(Some(judgment), &comment)?
    };

    println!("  → 採点 {} / acceptable={}\n", record.score, record.acceptable);
    Ok(RowOutcome::Finalized(record))
}

fn print_item(item: &GradingItem, position: usize, total: usize) {
    println!("[{}/{}] 行 #{}", position + 1, total, item.row_id);
    println!("■ Prompt\n{}\n", item.prompt);
    println!("■ Question\n{}\n", item.question);
    println!("■ Student Answer\n{}\n", item.students_answer);
}

/// 採点値プロンプト（1〜10、末尾に「保存して終了」）
fn prompt_score() -> Result<ScoreAction> {
    let scores: Vec<Score> = Score::all().collect();
    let mut items: Vec<String> = scores.iter().map(|s| s.to_string()).collect();
    items.push("保存して終了".to_string());

    let index = Select::new()
        .with_prompt("採点 (1–10)")
        .items(&items)
        .default(0)
        .interact()
        .map_err(prompt_error)?;

    Ok(scores
        .get(index)
        .copied()
        .map(ScoreAction::Score)
        .unwrap_or(ScoreAction::Quit))
}

/// カテゴリ選択プロンプト（スペースで選択、Enterで確定）
fn prompt_categories(options: &[String]) -> Result<Vec<String>> {
    if options.is_empty() {
        println!("  (この行には選択可能なカテゴリがありません)");
        return Ok(Vec::new());
    }

    let indices = MultiSelect::new()
        .with_prompt("カテゴリを選択 (Space:選択 Enter:確定)")
        .items(options)
        .interact()
        .map_err(prompt_error)?;

    Ok(indices
        .into_iter()
        .filter_map(|i| options.get(i).cloned())
        .collect())
}

/// モデルが余分に選んだカテゴリを許容するか
fn prompt_judgment() -> Result<Judgment> {
    let index = Select::new()
        .with_prompt("モデルの追加カテゴリは許容できますか?")
        .items(&["Yes", "No"])
        .interact()
        .map_err(prompt_error)?;

    Ok(if index == 0 {
        Judgment::Acceptable
    } else {
        Judgment::NotAcceptable
    })
}

fn prompt_comment() -> Result<String> {
    let comment: String = Input::new()
        .with_prompt("相違についてのメモ（任意）")
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_error)?;
    Ok(comment.trim().to_string())
}

fn print_stats(session: &GradingSession) {
    let stats = session.stats();
    println!("採点結果:");
    println!("  採点件数: {}", stats.graded);
    println!("  モデルと一致: {}", stats.agreed);
    println!("  相違あり・許容: {}", stats.accepted);
    println!("  相違あり・不可: {}", stats.rejected);
}
