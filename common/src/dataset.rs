//! 採点データセットのメモリ上ストア
//!
//! CSVを一度だけ読み込み、セッション中はメモリ上で行を更新する。
//! 書き出しは`export`モジュールから明示的に行う（入力ファイルは変更しない）。

use crate::categories;
use crate::error::{Error, Result};
use crate::types::{columns, GradingItem, REQUIRED_COLUMNS};
use csv::{ReaderBuilder, WriterBuilder};
use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::ops::Range;
use std::path::Path;
use tracing::{debug, info};

/// 欠損値として扱うセル文字列（空・空白のみも欠損）
const NULL_MARKERS: &[&str] = &["NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "None", "<NA>"];

/// セルが欠損かどうか
pub fn is_absent(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || NULL_MARKERS.contains(&trimmed)
}

/// CSVテーブル全体
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    headers: Vec<String>,
    /// 列名 → 列番号（重複列名は先勝ち）
    columns: HashMap<String, usize>,
    records: Vec<Vec<String>>,
}

impl Dataset {
    /// CSVファイルから読み込み
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let dataset = Self::from_reader(BufReader::new(file))?;
        info!(path = %path.display(), rows = dataset.len(), "dataset loaded");
        Ok(dataset)
    }

    /// CSV文字列から読み込み
    pub fn from_csv_str(content: &str) -> Result<Self> {
        Self::from_reader(content.as_bytes())
    }

    /// 任意のリーダーから読み込み
    ///
    /// 必須列が欠けていればその列名で`MissingColumn`を返す。
    /// `grader1_comment`列がなければ空列を追加する。
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new().flexible(true).from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            // 短い行は空セルで埋める
            if row.len() < headers.len() {
                row.resize(headers.len(), String::new());
            }
            records.push(row);
        }

        let mut dataset = Self::from_parts(headers, records);
        dataset.validate()?;
        if dataset.ensure_column(columns::GRADER1_COMMENT, "") {
            debug!("added missing column {}", columns::GRADER1_COMMENT);
        }
        Ok(dataset)
    }

    fn from_parts(headers: Vec<String>, records: Vec<Vec<String>>) -> Self {
        let mut column_map = HashMap::new();
        for (i, name) in headers.iter().enumerate() {
            column_map.entry(name.clone()).or_insert(i);
        }
        Self {
            headers,
            columns: column_map,
            records,
        }
    }

    fn validate(&self) -> Result<()> {
        for column in REQUIRED_COLUMNS {
            if !self.columns.contains_key(column) {
                return Err(Error::MissingColumn(column.to_string()));
            }
        }
        Ok(())
    }

    /// 列がなければデフォルト値で追加。追加した場合はtrue
    pub fn ensure_column(&mut self, name: &str, default: &str) -> bool {
        if self.columns.contains_key(name) {
            return false;
        }
        let index = self.headers.len();
        self.headers.push(name.to_string());
        self.columns.insert(name.to_string(), index);
        for row in &mut self.records {
            row.resize(index, String::new());
            row.push(default.to_string());
        }
        true
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_ids(&self) -> Range<usize> {
        0..self.records.len()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// セルの生の文字列（欠損マーカーもそのまま返す）
    pub fn raw(&self, row: usize, column: &str) -> Option<&str> {
        let index = *self.columns.get(column)?;
        self.records.get(row)?.get(index).map(String::as_str)
    }

    /// セルの値。欠損ならNone
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        self.raw(row, column).filter(|v| !is_absent(v))
    }

    /// セルを更新
    pub fn set(&mut self, row: usize, column: &str, value: impl Into<String>) -> Result<()> {
        let index = *self
            .columns
            .get(column)
            .ok_or_else(|| Error::MissingColumn(column.to_string()))?;
        let record = self.records.get_mut(row).ok_or(Error::UnknownRow(row))?;
        if record.len() <= index {
            record.resize(index + 1, String::new());
        }
        record[index] = value.into();
        Ok(())
    }

    /// カテゴリ列をリストとして取得
    pub fn categories(&self, row: usize, column: &str) -> Vec<String> {
        categories::parse(self.cell(row, column))
    }

    /// 採点画面用の1行分のデータ
    pub fn item(&self, row: usize) -> Option<GradingItem> {
        if row >= self.records.len() {
            return None;
        }
        // 自由記述の列は欠損マーカーを解釈せずそのまま表示する
        let text = |column: &str| self.raw(row, column).unwrap_or_default().to_string();
        Some(GradingItem {
            row_id: row,
            prompt: text(columns::PROMPT),
            question: text(columns::QUESTION),
            students_answer: text(columns::STUDENTS_ANSWER),
            categories: self.categories(row, columns::CATEGORIES),
            model_categories: self.categories(row, columns::MODEL_CATEGORIES),
        })
    }

    /// 全行の`categories`列の和集合（ソート済み・重複なし・空ラベル除外）
    pub fn category_vocabulary(&self) -> Vec<String> {
        self.row_ids()
            .flat_map(|row| self.categories(row, columns::CATEGORIES))
            .filter(|c| !c.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// テーブル全体をCSVとして書き出し
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = WriterBuilder::new().flexible(true).from_writer(writer);
        writer.write_record(&self.headers)?;
        for row in &self.records {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// CSV文字列として取得
    pub fn to_csv_string(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
