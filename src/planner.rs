//! バッチの採番とファイル名の決定
//!
//! 開始項目番号は呼び出し側が前回実行から持ち越す状態で、ここでは
//! 導出しない。終了項目番号だけを呼び出し側へ返す。

use crate::cli::ReportKind;
use crate::error::{RailReportError, Result};
use crate::sheet::{ColumnMapping, InspectionRow};

/// 1回の実行で確定するバッチ計画
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPlan {
    pub train_no: String,
    pub start_item_no: u32,
    pub end_item_no: u32,
    pub file_name: String,
}

/// バッチを検証して採番とファイル名を確定する
///
/// 失敗条件（いずれも再実行前提の報告であって、プロセスは落とさない）:
/// - バッチが空
/// - 開始項目番号が0（未設定扱い）
/// - バッチ先頭行の列車番号が空
pub fn plan_batch(
    batch: &[InspectionRow],
    columns: &ColumnMapping,
    kind: ReportKind,
    start_item_no: u32,
) -> Result<BatchPlan> {
    if batch.is_empty() {
        return Err(RailReportError::NoData);
    }

    if start_item_no < 1 {
        return Err(RailReportError::InvalidStartItemNo);
    }

    let train_no = batch[0].field(columns.train_no).trim().to_string();
    if train_no.is_empty() {
        return Err(RailReportError::MissingTrainNo);
    }

    let end_item_no = start_item_no + batch.len() as u32 - 1;

    let file_name = format!(
        "{}-Inspection_Report_for_{}_{}-{}",
        kind.prefix(),
        train_no,
        start_item_no,
        end_item_no
    );

    Ok(BatchPlan {
        train_no,
        start_item_no,
        end_item_no,
        file_name,
    })
}
