//! レポート生成の実行パイプライン
//!
//! 読み込み → グループ化 → 採番 → 描画 → 保存 → 記録 を1回の
//! 同期実行として束ねる。途中の入力検証エラーは出力を作る前に
//! 返し、ドキュメント作成後のコラボレータエラーはそのまま伝播する
//! （作りかけのドキュメントのロールバックはしない）。

use crate::cli::ReportKind;
use crate::config::ReportConfig;
use crate::document::{ReportDocument, ReportTemplate};
use crate::error::{RailReportError, Result};
use crate::fetcher::ContentFetcher;
use crate::folder;
use crate::grouper::group_by_inspection_id;
use crate::planner::plan_batch;
use crate::render::{append_report_rows, RenderOptions};
use crate::runlog::{RunLog, RunRecord, RunRecorder};
use crate::sheet::XlsxSource;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// 1回の実行の入力
pub struct GenerateParams {
    pub workbook: PathBuf,
    /// ワークシート名。Noneなら種別ごとの既定シート
    pub sheet: Option<String>,
    pub kind: ReportKind,
    pub start_item_no: u32,
    /// 出力先ルートフォルダ
    pub output_root: PathBuf,
    /// テンプレートJSONのパス。Noneなら組み込みテンプレート
    pub template: Option<PathBuf>,
    pub config: ReportConfig,
    /// 進捗バーを表示するか
    pub show_progress: bool,
}

/// レポートを1バッチ分生成し、確定した実行レコードを返す
pub fn generate_report<F: ContentFetcher>(
    params: &GenerateParams,
    fetcher: &mut F,
) -> Result<RunRecord> {
    let recorder = RunRecorder::start();
    let deadline = Instant::now() + Duration::from_secs(params.config.max_execution_secs);
    let config = &params.config;

    // 1. データ読み込み
    let sheet_name = params
        .sheet
        .clone()
        .unwrap_or_else(|| params.kind.worksheet_name().to_string());
    let source = XlsxSource::open(&params.workbook, &sheet_name)?;

    let last_row = source.last_row();
    if last_row < config.data_start_row {
        return Err(RailReportError::NoData);
    }

    let total_data_rows = last_row - config.data_start_row + 1;
    let rows_to_process = std::cmp::min(config.batch_row_size, total_data_rows);
    let rows = source.read_rows(config.data_start_row, rows_to_process);

    if rows.is_empty() || rows.iter().all(|r| r.is_blank()) {
        return Err(RailReportError::NoData);
    }

    // 2. 検査IDでグループ化・重複除去
    let raw_count = rows.len();
    let batch = group_by_inspection_id(rows, &config.columns);
    if params.show_progress {
        println!("- {}行を読み込み、重複除去後 {}行", raw_count, batch.len());
    }

    // 3. 採番とファイル名
    let plan = plan_batch(&batch, &config.columns, params.kind, params.start_item_no)?;

    // 4. テンプレートからドキュメントを作成
    let template = match &params.template {
        Some(path) => ReportTemplate::load(path)?,
        None => ReportTemplate::default(),
    };
    let mut doc = ReportDocument::from_template(&template, &plan.file_name);
    doc.replace_header_text(
        "{{trainNo}}",
        &format!("{} ({})", plan.train_no, params.kind.header_label()),
    );

    // 5. 行の描画（画像取得を含む）
    let render_options = RenderOptions {
        max_image_width: config.max_image_width,
        max_image_height: config.max_image_height,
        deadline: Some(deadline),
        show_progress: params.show_progress,
    };
    append_report_rows(
        &mut doc,
        &batch,
        &config.columns,
        plan.start_item_no,
        fetcher,
        &render_options,
    )?;

    // 6. 保存して種別/列車番号のフォルダへ移動
    std::fs::create_dir_all(&params.output_root)?;
    let saved = doc.save(&params.output_root)?;
    let kind_folder = folder::get_or_create_folder(&params.output_root, params.kind.folder_name())?;
    let train_folder = folder::get_or_create_folder(&kind_folder, &plan.train_no)?;
    let location = folder::move_document(&saved, &train_folder)?;

    // 7. 実行レコードを確定してログへ追記
    let record = recorder.finish(&plan, &location);
    let mut run_log = RunLog::load(&params.output_root);
    run_log.append(record.clone());
    run_log.save(&params.output_root)?;

    Ok(record)
}
