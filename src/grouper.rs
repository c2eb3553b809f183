//! 検査IDによるグループ化と重複除去
//!
//! 同じ検査IDの行は1つの検査イベントを表す。グループ内に画像付きの
//! 行が1つでもあれば、画像なしの行（検査情報だけの行）は落とし、
//! 画像付きの行だけを残す。画像が1枚もないグループはそのまま通す。

use crate::sheet::{ColumnMapping, InspectionRow};
use std::collections::HashMap;

/// 検査IDでグループ化し、画像重複ルールを適用した行列を返す
///
/// - グループ化は文字列化済みセルの完全一致
/// - グループは初出順、グループ内の行は元の相対順を保つ
/// - 空の検査IDは `""` という通常のグループキーとして扱う
/// - 出力に再適用しても変化しない（不動点）
pub fn group_by_inspection_id(
    rows: Vec<InspectionRow>,
    columns: &ColumnMapping,
) -> Vec<InspectionRow> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<InspectionRow>> = HashMap::new();

    for row in rows {
        let inspection_id = row.field(columns.inspection_id).to_string();
        if !groups.contains_key(&inspection_id) {
            order.push(inspection_id.clone());
        }
        groups.entry(inspection_id).or_default().push(row);
    }

    let mut filtered = Vec::new();

    for inspection_id in order {
        let group = match groups.remove(&inspection_id) {
            Some(group) => group,
            None => continue,
        };

        let has_image_rows = group
            .iter()
            .any(|row| !row.field(columns.image_url).trim().is_empty());

        if has_image_rows {
            // 画像付きの行だけを残し、検査情報だけの行を落とす
            filtered.extend(
                group
                    .into_iter()
                    .filter(|row| !row.field(columns.image_url).trim().is_empty()),
            );
        } else {
            filtered.extend(group);
        }
    }

    filtered
}
