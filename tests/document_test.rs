//! ドキュメント書き出しの統合テスト

use rail_report_rust::document::{CellContent, ReportDocument, ReportTemplate, TableRow};
use std::io::Cursor;
use tempfile::tempdir;

fn png_bytes() -> Vec<u8> {
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::new(2, 2));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .expect("PNG生成失敗");
    buf
}

fn text_row(values: &[&str]) -> TableRow {
    let mut row = TableRow::new();
    for v in values {
        row.append_text_cell(*v);
    }
    row
}

#[test]
fn test_save_text_only_document() {
    let dir = tempdir().expect("tempdir作成失敗");

    let mut doc = ReportDocument::from_template(&ReportTemplate::default(), "text_only");
    doc.replace_header_text("{{trainNo}}", "T5 (Visual Inspection)");
    doc.append_table_row(text_row(&[
        "1", "Depot", "Car 2", "aoki", "Brakes", "Pneumatic", "SN-9", "Valve", "NG", "Leak",
        "re-check", "No image available",
    ]));
    doc.remove_row(0);

    let path = doc.save(dir.path()).expect("保存失敗");

    assert!(path.exists(), "Excelファイルが作成されていない");
    assert_eq!(path.file_name().unwrap(), "text_only.xlsx");

    let metadata = std::fs::metadata(&path).expect("ファイルメタデータ取得失敗");
    assert!(metadata.len() > 0, "Excelファイルが空");
}

#[test]
fn test_save_document_with_image_cell() {
    let dir = tempdir().expect("tempdir作成失敗");

    let mut doc = ReportDocument::from_template(&ReportTemplate::default(), "with_image");
    let mut row = text_row(&[
        "1", "Depot", "Car 1", "sato", "Doors", "Electric", "SN-1", "Motor", "OK", "-", "-",
    ]);
    row.append_cell(CellContent::Image {
        data: png_bytes(),
        scale_width: 50.0,
        scale_height: 50.0,
        height_px: 100,
    });
    doc.append_table_row(row);
    doc.remove_row(0);

    let path = doc.save(dir.path()).expect("保存失敗");
    assert!(path.exists(), "Excelファイルが作成されていない");

    let metadata = std::fs::metadata(&path).expect("ファイルメタデータ取得失敗");
    assert!(metadata.len() > 0, "Excelファイルが空");
}

#[test]
fn test_save_document_with_placeholder_row_still_present() {
    // データ行ゼロでもプレースホルダ行ごと書き出せる
    let dir = tempdir().expect("tempdir作成失敗");

    let doc = ReportDocument::from_template(&ReportTemplate::default(), "placeholder_only");
    let path = doc.save(dir.path()).expect("保存失敗");
    assert!(path.exists());
}
