//! Excel書き出し
//!
//! メモリ上のドキュメントを1シートのExcelに描画する。

use super::{CellContent, ReportDocument};
use crate::error::{RailReportError, Result};
use rust_xlsxwriter::{
    Color, Format, FormatAlign, FormatBorder, Image, ObjectMovement, Workbook,
};
use std::path::Path;

const SHEET_NAME: &str = "Report";

/// 列幅（文字数単位）
const ITEM_COL_WIDTH: f64 = 6.0;
const TEXT_COL_WIDTH: f64 = 12.0;
const REMARKS_COL_WIDTH: f64 = 24.0;
const IMAGE_COL_WIDTH: f64 = 18.0;

pub(super) fn write_document(doc: &ReportDocument, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(SHEET_NAME)
        .map_err(|e| RailReportError::ExcelGeneration(format!("シート名設定エラー: {}", e)))?;

    // フォーマット定義
    let header_format = Format::new()
        .set_bold()
        .set_font_size(13.0)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);

    let heading_format = Format::new()
        .set_bold()
        .set_font_size(9.0)
        .set_font_color(Color::RGB(0x555555))
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Hair)
        .set_border_color(Color::RGB(0xAAAAAA));

    let value_format = Format::new()
        .set_font_size(10.0)
        .set_align(FormatAlign::Left)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap()
        .set_border(FormatBorder::Hair)
        .set_border_color(Color::RGB(0xCCCCCC));

    let num_columns = doc.headings().len().max(1) as u16;

    // ヘッダ（表の全幅にマージ）
    if num_columns > 1 {
        worksheet
            .merge_range(0, 0, 0, num_columns - 1, doc.header(), &header_format)
            .map_err(|e| {
                RailReportError::ExcelGeneration(format!("ヘッダ書き込みエラー: {}", e))
            })?;
    } else {
        worksheet
            .write_string_with_format(0, 0, doc.header(), &header_format)
            .map_err(|e| {
                RailReportError::ExcelGeneration(format!("ヘッダ書き込みエラー: {}", e))
            })?;
    }

    // 見出し行
    for (col, heading) in doc.headings().iter().enumerate() {
        worksheet
            .write_string_with_format(1, col as u16, heading, &heading_format)
            .map_err(|e| {
                RailReportError::ExcelGeneration(format!("見出し書き込みエラー: {}", e))
            })?;
    }

    // 列幅設定（末尾は画像列、その手前は備考列）
    for col in 0..num_columns {
        let width = if col == 0 {
            ITEM_COL_WIDTH
        } else if col + 1 == num_columns {
            IMAGE_COL_WIDTH
        } else if col + 2 == num_columns {
            REMARKS_COL_WIDTH
        } else {
            TEXT_COL_WIDTH
        };
        worksheet
            .set_column_width(col, width)
            .map_err(|e| RailReportError::ExcelGeneration(format!("列幅設定エラー: {}", e)))?;
    }

    // データ行
    for (index, row) in doc.rows().iter().enumerate() {
        let out_row = (index + 2) as u32;
        let mut row_height_px: Option<u32> = None;

        for (col, cell) in row.cells().iter().enumerate() {
            let col = col as u16;
            match cell {
                CellContent::Text(text) => {
                    worksheet
                        .write_string_with_format(out_row, col, text, &value_format)
                        .map_err(|e| {
                            RailReportError::ExcelGeneration(format!(
                                "セル書き込みエラー: {}",
                                e
                            ))
                        })?;
                }
                CellContent::Image {
                    data,
                    scale_width,
                    scale_height,
                    height_px,
                } => {
                    let image = Image::new_from_buffer(data).map_err(|e| {
                        RailReportError::ExcelGeneration(format!("画像読み込みエラー: {}", e))
                    })?;
                    let image = image
                        .set_scale_width(*scale_width)
                        .set_scale_height(*scale_height)
                        .set_object_movement(ObjectMovement::DontMoveOrSizeWithCells);

                    worksheet
                        .insert_image_with_offset(out_row, col, &image, 2, 2)
                        .map_err(|e| {
                            RailReportError::ExcelGeneration(format!(
                                "画像埋め込みエラー: {}",
                                e
                            ))
                        })?;
                    row_height_px = Some((*height_px).max(row_height_px.unwrap_or(0)));
                }
            }
        }

        // 画像のある行は枠の高さに合わせる
        if let Some(height) = row_height_px {
            worksheet
                .set_row_height_pixels(out_row, (height + 4).min(u16::MAX as u32) as u16)
                .map_err(|e| {
                    RailReportError::ExcelGeneration(format!("行高さ設定エラー: {}", e))
                })?;
        }
    }

    workbook
        .save(path)
        .map_err(|e| RailReportError::ExcelGeneration(format!("Excel保存エラー: {}", e)))?;

    Ok(())
}
