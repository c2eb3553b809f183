//! バッチの行をレポート表へ描画
//!
//! 行ごとに11個のテキストセルと画像セル1個を組み立てて追加する。
//! 画像の取得失敗は行単位のプレースホルダに落とし、残りの行の
//! 描画は止めない。

use crate::document::{CellContent, ReportDocument, TableRow};
use crate::error::{RailReportError, Result};
use crate::fetcher::ContentFetcher;
use crate::sheet::{ColumnMapping, InspectionRow};
use indicatif::ProgressBar;
use std::time::Instant;

/// 画像なし行のプレースホルダ
const NO_IMAGE_PLACEHOLDER: &str = "No image available";
/// 画像以外のコンテンツが返ったときのプレースホルダ
const INVALID_IMAGE_PLACEHOLDER: &str = "Invalid image content";

/// 描画オプション
pub struct RenderOptions {
    /// 埋め込み画像の枠（px）。縦横比は維持せず枠サイズへ合わせる
    pub max_image_width: u32,
    pub max_image_height: u32,
    /// 実行時間上限。超過後の画像取得はスキップする
    pub deadline: Option<Instant>,
    /// 進捗バーを表示するか
    pub show_progress: bool,
}

/// バッチの全行を表へ追加し、最後にプレースホルダ行を除去する
///
/// 項目番号は行の持つ値ではなく位置から振る（`start_item_no + index`）。
pub fn append_report_rows<F: ContentFetcher>(
    doc: &mut ReportDocument,
    batch: &[InspectionRow],
    columns: &ColumnMapping,
    start_item_no: u32,
    fetcher: &mut F,
    options: &RenderOptions,
) -> Result<()> {
    let progress = if options.show_progress {
        ProgressBar::new(batch.len() as u64)
    } else {
        ProgressBar::hidden()
    };

    for (index, row) in batch.iter().enumerate() {
        let mut table_row = TableRow::new();

        table_row.append_text_cell((start_item_no + index as u32).to_string()); // No
        table_row.append_text_cell(row.field(columns.location)); // Loc
        table_row.append_text_cell(row.field(columns.car_body)); // Car
        table_row.append_text_cell(row.field(columns.user_name)); // PIC
        table_row.append_text_cell(row.field(columns.section_name)); // Section
        table_row.append_text_cell(row.field(columns.subsystem_name)); // Sub System
        table_row.append_text_cell(row.field(columns.serial_number)); // Serial No
        table_row.append_text_cell(row.field(columns.subcomponent)); // Sub Component
        table_row.append_text_cell(row.field(columns.condition)); // Condition
        table_row.append_text_cell(row.field(columns.defect_type)); // Defect
        table_row.append_text_cell(row.field(columns.remarks)); // Remarks

        let image_url = row.field(columns.image_url).trim().to_string();
        table_row.append_cell(resolve_image_cell(&image_url, fetcher, options));

        doc.append_table_row(table_row);
        progress.inc(1);
    }

    progress.finish_and_clear();

    // データ追加後にプレースホルダ行を除去（表が空のままなら何もしない）
    if doc.num_rows() > 1 {
        doc.remove_row(0);
    }

    Ok(())
}

/// 画像セルの内容を決める
///
/// - URLが空: "No image available"
/// - 取得成功かつ画像: 枠サイズへスケールして埋め込み
/// - 取得成功だが画像でない（またはデコード不能）: "Invalid image content"
/// - 取得失敗: 失敗理由つきのプレースホルダ
fn resolve_image_cell<F: ContentFetcher>(
    image_url: &str,
    fetcher: &mut F,
    options: &RenderOptions,
) -> CellContent {
    if image_url.is_empty() {
        return CellContent::Text(NO_IMAGE_PLACEHOLDER.to_string());
    }

    if let Some(deadline) = options.deadline {
        if Instant::now() >= deadline {
            return CellContent::Text(
                "Error fetching image: execution time limit exceeded".to_string(),
            );
        }
    }

    let content = match fetcher.fetch(image_url) {
        Ok(content) => content,
        Err(err) => {
            let reason = match err {
                RailReportError::Fetch(reason) => reason,
                other => other.to_string(),
            };
            return CellContent::Text(format!("Error fetching image: {}", reason));
        }
    };

    if !content.is_image() {
        return CellContent::Text(INVALID_IMAGE_PLACEHOLDER.to_string());
    }

    // 寸法を取ってスケールを決める。デコードできないなら画像扱いしない
    let decoded = match image::load_from_memory(&content.bytes) {
        Ok(img) => img,
        Err(_) => return CellContent::Text(INVALID_IMAGE_PLACEHOLDER.to_string()),
    };

    let scale_width = options.max_image_width as f64 / decoded.width().max(1) as f64;
    let scale_height = options.max_image_height as f64 / decoded.height().max(1) as f64;

    CellContent::Image {
        data: content.bytes,
        scale_width,
        scale_height,
        height_px: options.max_image_height,
    }
}
