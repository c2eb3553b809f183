//! レポートドキュメントのモデル
//!
//! テンプレートから作ったドキュメントをメモリ上で組み立て、最後に
//! Excelへ書き出す。表はプレースホルダ行1行で始まり、データ行を
//! 追加し終えたらレンダラがプレースホルダ行を除去する。

mod xlsx;

use crate::error::{RailReportError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// レポートの雛形
///
/// ヘッダ文・見出し行・プレースホルダ行だけを持つ。レイアウトは
/// 1種類（表形式）に固定で、汎用テンプレートエンジンではない。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportTemplate {
    /// ドキュメント先頭のヘッダ文（`{{trainNo}}`トークンを含む）
    pub header: String,
    /// 表の見出し行
    pub headings: Vec<String>,
    /// データ追加後に除去するプレースホルダ行
    pub placeholder_row: Vec<String>,
}

impl ReportTemplate {
    /// テンプレートJSONを読み込む。見つからなければエラー
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RailReportError::TemplateNotFound(
                path.display().to_string(),
            ));
        }

        let content = std::fs::read_to_string(path)?;
        let template: ReportTemplate = serde_json::from_str(&content)
            .map_err(|e| RailReportError::InvalidTemplate(e.to_string()))?;

        if template.headings.is_empty() {
            return Err(RailReportError::InvalidTemplate(
                "見出し行が空です".to_string(),
            ));
        }

        Ok(template)
    }
}

impl Default for ReportTemplate {
    fn default() -> Self {
        Self {
            header: "Inspection Report for {{trainNo}}".to_string(),
            headings: [
                "No",
                "Loc",
                "Car",
                "PIC",
                "Section",
                "Sub System",
                "Serial No",
                "Sub Component",
                "Condition",
                "Defect",
                "Remarks",
                "Image",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            placeholder_row: [
                "{{item No}}",
                "{{Location}}",
                "{{Car Body}}",
                "{{UserName}}",
                "{{Section Name}}",
                "{{Subsystem Name}}",
                "{{Serial Number}}",
                "{{Subcomponent}}",
                "{{Condition}}",
                "{{Defect Type}}",
                "{{Remarks}}",
                "{{Image URL}}",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// 表セルの中身
#[derive(Debug, Clone)]
pub enum CellContent {
    Text(String),
    /// 取得済み画像。倍率は枠サイズに合わせて算出済み
    Image {
        data: Vec<u8>,
        scale_width: f64,
        scale_height: f64,
        height_px: u32,
    },
}

impl CellContent {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellContent::Text(s) => Some(s),
            CellContent::Image { .. } => None,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, CellContent::Image { .. })
    }
}

/// 表の1行
#[derive(Debug, Clone, Default)]
pub struct TableRow {
    cells: Vec<CellContent>,
}

impl TableRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_text_cell(&mut self, text: impl Into<String>) {
        self.cells.push(CellContent::Text(text.into()));
    }

    pub fn append_cell(&mut self, cell: CellContent) {
        self.cells.push(cell);
    }

    pub fn cells(&self) -> &[CellContent] {
        &self.cells
    }
}

/// 組み立て中のレポートドキュメント
#[derive(Debug, Clone)]
pub struct ReportDocument {
    name: String,
    header: String,
    headings: Vec<String>,
    rows: Vec<TableRow>,
}

impl ReportDocument {
    /// テンプレートの複製としてドキュメントを作る
    ///
    /// 表はテンプレートのプレースホルダ行1行で始まる。
    pub fn from_template(template: &ReportTemplate, name: &str) -> Self {
        let mut placeholder = TableRow::new();
        for cell in &template.placeholder_row {
            placeholder.append_text_cell(cell.clone());
        }

        Self {
            name: name.to_string(),
            header: template.header.clone(),
            headings: template.headings.clone(),
            rows: vec![placeholder],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn headings(&self) -> &[String] {
        &self.headings
    }

    /// ヘッダ文中のトークンを置換
    pub fn replace_header_text(&mut self, needle: &str, replacement: &str) {
        self.header = self.header.replace(needle, replacement);
    }

    pub fn append_table_row(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// 行を位置指定で除去。範囲外なら何もしない
    pub fn remove_row(&mut self, index: usize) {
        if index < self.rows.len() {
            self.rows.remove(index);
        }
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// `.xlsx`へ書き出し、保存先パスを返す
    pub fn save(&self, folder: &Path) -> Result<PathBuf> {
        let path = folder.join(format!("{}.xlsx", self.name));
        xlsx::write_document(self, &path)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_shape() {
        let template = ReportTemplate::default();
        assert_eq!(template.headings.len(), 12);
        assert_eq!(template.placeholder_row.len(), 12);
        assert!(template.header.contains("{{trainNo}}"));
    }

    #[test]
    fn test_from_template_starts_with_placeholder_row() {
        let doc = ReportDocument::from_template(&ReportTemplate::default(), "test");
        assert_eq!(doc.num_rows(), 1);
        assert_eq!(doc.rows()[0].cells()[0].as_text(), Some("{{item No}}"));
    }

    #[test]
    fn test_replace_header_text() {
        let mut doc = ReportDocument::from_template(&ReportTemplate::default(), "test");
        doc.replace_header_text("{{trainNo}}", "T123 (Visual Inspection)");
        assert_eq!(doc.header(), "Inspection Report for T123 (Visual Inspection)");
    }

    #[test]
    fn test_remove_row_out_of_range_is_noop() {
        let mut doc = ReportDocument::from_template(&ReportTemplate::default(), "test");
        doc.remove_row(5);
        assert_eq!(doc.num_rows(), 1);
        doc.remove_row(0);
        assert_eq!(doc.num_rows(), 0);
        doc.remove_row(0);
        assert_eq!(doc.num_rows(), 0);
    }

    #[test]
    fn test_template_load_missing() {
        let result = ReportTemplate::load(Path::new("/nonexistent/template.json"));
        assert!(matches!(
            result,
            Err(RailReportError::TemplateNotFound(_))
        ));
    }

    #[test]
    fn test_template_load_roundtrip() {
        let temp_dir = std::env::temp_dir().join("rail-report-test-template");
        std::fs::create_dir_all(&temp_dir).unwrap();
        let path = temp_dir.join("template.json");

        let template = ReportTemplate::default();
        std::fs::write(&path, serde_json::to_string(&template).unwrap()).unwrap();

        let loaded = ReportTemplate::load(&path).unwrap();
        assert_eq!(loaded.headings, template.headings);
        assert_eq!(loaded.header, template.header);

        std::fs::remove_dir_all(&temp_dir).ok();
    }

    #[test]
    fn test_template_load_invalid_json() {
        let temp_dir = std::env::temp_dir().join("rail-report-test-template-invalid");
        std::fs::create_dir_all(&temp_dir).unwrap();
        let path = temp_dir.join("template.json");
        std::fs::write(&path, "{not json").unwrap();

        let result = ReportTemplate::load(&path);
        assert!(matches!(result, Err(RailReportError::InvalidTemplate(_))));

        std::fs::remove_dir_all(&temp_dir).ok();
    }
}
