//! 検査データシートの読み込み
//!
//! ワークブック（.xlsx）の矩形領域を行単位で読み出す。セル値は
//! 読み込み時点で一度だけ文字列に正規化する（数値の`5`と文字列の
//! `"5"`は同じキー`"5"`になる）。

use crate::error::{RailReportError, Result};
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// フィールド→列位置マッピング
///
/// 位置は1始まり。ヘッダ行からは導出せず、設定で固定する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub inspection_id: u32,
    pub user_name: u32,
    pub train_no: u32,
    pub location: u32,
    pub car_body: u32,
    pub section_name: u32,
    pub subsystem_name: u32,
    pub serial_number: u32,
    pub subcomponent: u32,
    pub condition: u32,
    pub defect_type: u32,
    pub remarks: u32,
    pub image_url: u32,
}

impl ColumnMapping {
    /// 全フィールドの (名前, 位置) 一覧
    pub fn positions(&self) -> [(&'static str, u32); 13] {
        [
            ("Inspection ID", self.inspection_id),
            ("UserName", self.user_name),
            ("trainNo", self.train_no),
            ("Location", self.location),
            ("CarBody", self.car_body),
            ("SectionName", self.section_name),
            ("SubsystemName", self.subsystem_name),
            ("SerialNumber", self.serial_number),
            ("Subcomponent", self.subcomponent),
            ("Condition", self.condition),
            ("DefectType", self.defect_type),
            ("Remarks", self.remarks),
            ("ImageURL", self.image_url),
        ]
    }

    /// 位置が1以上かつ重複なしであることを確認
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for (name, pos) in self.positions() {
            if pos < 1 {
                return Err(RailReportError::Config(format!(
                    "列位置は1以上が必要です: {}",
                    name
                )));
            }
            if !seen.insert(pos) {
                return Err(RailReportError::Config(format!(
                    "列位置が重複しています: {} (列{})",
                    name, pos
                )));
            }
        }
        Ok(())
    }
}

impl Default for ColumnMapping {
    fn default() -> Self {
        // 元の運用シートの列配置
        Self {
            inspection_id: 2,  // B列
            user_name: 5,      // E列
            train_no: 7,       // G列
            location: 8,       // H列
            car_body: 11,      // K列
            section_name: 13,  // M列
            subsystem_name: 15, // O列
            serial_number: 16, // P列
            subcomponent: 18,  // R列
            condition: 19,     // S列
            defect_type: 20,   // T列
            remarks: 21,       // U列
            image_url: 27,     // AA列
        }
    }
}

/// 検査データ1行
///
/// 読み込み時に文字列化したセル列。以後は不変。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectionRow {
    cells: Vec<String>,
}

impl InspectionRow {
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    /// 1始まりの列位置でフィールドを参照。範囲外は空文字
    pub fn field(&self, position: u32) -> &str {
        if position < 1 {
            return "";
        }
        self.cells
            .get((position - 1) as usize)
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    /// 全セルが空白か
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.trim().is_empty())
    }
}

/// セル値を文字列へ正規化
///
/// 整数値の数値は小数点なしで表記する（`5.0` → `"5"`）。
fn cell_to_string(data: &Data) -> String {
    match data {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => format_number(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => format_number(dt.as_f64()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    }
}

fn format_number(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        (f as i64).to_string()
    } else {
        f.to_string()
    }
}

/// ワークシートの読み取り専用ビュー
pub struct XlsxSource {
    range: Range<Data>,
}

impl XlsxSource {
    /// ワークブックを開いて指定シートを読み込む
    pub fn open(path: &Path, sheet_name: &str) -> Result<Self> {
        if !path.exists() {
            return Err(RailReportError::WorkbookNotFound(
                path.display().to_string(),
            ));
        }

        let mut workbook: Xlsx<_> = open_workbook(path)
            .map_err(|e| RailReportError::SheetRead(format!("{}: {}", path.display(), e)))?;

        if !workbook.sheet_names().iter().any(|n| n == sheet_name) {
            return Err(RailReportError::WorksheetNotFound(sheet_name.to_string()));
        }

        let range = workbook
            .worksheet_range(sheet_name)
            .map_err(|e| RailReportError::SheetRead(format!("{}: {}", sheet_name, e)))?;

        Ok(Self { range })
    }

    #[cfg(test)]
    fn from_range(range: Range<Data>) -> Self {
        Self { range }
    }

    /// データの存在する最終行（1始まり）。空シートは0
    pub fn last_row(&self) -> u32 {
        self.range.end().map(|(row, _)| row + 1).unwrap_or(0)
    }

    /// データの存在する最終列（1始まり）。空シートは0
    pub fn last_column(&self) -> u32 {
        self.range.end().map(|(_, col)| col + 1).unwrap_or(0)
    }

    /// `start_row`（1始まり）から最大`count`行を読み出す
    ///
    /// 行はシートの列範囲全体で切り出し、セルは文字列化する。
    pub fn read_rows(&self, start_row: u32, count: u32) -> Vec<InspectionRow> {
        let last_row = self.last_row();
        let last_col = self.last_column();
        if start_row < 1 || start_row > last_row || count == 0 {
            return Vec::new();
        }

        let end_row = std::cmp::min(start_row + count - 1, last_row);
        let mut rows = Vec::with_capacity((end_row - start_row + 1) as usize);

        for row in start_row..=end_row {
            let mut cells = Vec::with_capacity(last_col as usize);
            for col in 1..=last_col {
                let value = self
                    .range
                    .get_value((row - 1, col - 1))
                    .map(cell_to_string)
                    .unwrap_or_default();
                cells.push(value);
            }
            rows.push(InspectionRow::new(cells));
        }

        rows
    }
}
