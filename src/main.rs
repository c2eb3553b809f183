use clap::Parser;
use dialoguer::Input;
use rail_report_rust::{cli, config, error, fetcher, folder, report, runlog};
use cli::{Cli, Commands};
use config::ReportConfig;
use error::{RailReportError, Result};
use fetcher::{CachedFetcher, HttpFetcher};
use runlog::{RunLog, RunRecord};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ReportConfig::load()?;

    match cli.command {
        Commands::Generate {
            workbook,
            kind,
            sheet,
            start_item_no,
            output,
            template,
            batch_size,
            use_cache,
        } => {
            println!("🚃 rail-report - 検査レポート生成\n");

            let mut config = config;
            if let Some(size) = batch_size {
                config.batch_row_size = size;
            }

            // 出力先: 指定がなければワークブックの親フォルダ
            let output_root = match output {
                Some(path) => path,
                None => folder::parent_folder(&workbook)
                    .unwrap_or_else(|| PathBuf::from(".")),
            };

            // 開始項目番号: フラグ → 対話入力（前回の終了番号+1を初期値に）
            let start_item_no = match start_item_no {
                Some(n) => n,
                None => prompt_start_item_no(&output_root)?,
            };

            println!("[1/3] データを読み込み中... (シート: {})",
                sheet.as_deref().unwrap_or(kind.worksheet_name()));

            let params = report::GenerateParams {
                workbook,
                sheet,
                kind,
                start_item_no,
                output_root: output_root.clone(),
                template,
                config: config.clone(),
                show_progress: true,
            };

            println!("[2/3] レポートを描画中...");
            let record = if use_cache {
                let http = HttpFetcher::new(config.fetch_timeout_secs)?;
                let mut fetcher = CachedFetcher::new(http, &output_root);
                let record = report::generate_report(&params, &mut fetcher)?;
                fetcher.persist()?;
                record
            } else {
                let mut fetcher = HttpFetcher::new(config.fetch_timeout_secs)?;
                report::generate_report(&params, &mut fetcher)?
            };

            println!("[3/3] 実行ログを更新\n");
            print_summary(&record);
        }

        Commands::Config { show, init } => {
            if init {
                config.save()?;
                println!("✔ 設定ファイルを作成: {}", ReportConfig::config_path()?.display());
            }

            if show || !init {
                print_config(&config);
            }
        }
    }

    Ok(())
}

/// 開始項目番号を対話入力で取得
///
/// 実行ログに前回の終了番号があれば +1 を初期値として提示する。
fn prompt_start_item_no(output_root: &Path) -> Result<u32> {
    let suggested = RunLog::load(output_root)
        .last_end_item_no()
        .map(|n| n + 1);

    let mut input = Input::<u32>::new().with_prompt("開始項目番号");
    if let Some(n) = suggested {
        input = input.default(n);
    }

    let value = input
        .validate_with(|n: &u32| {
            if *n >= 1 {
                Ok(())
            } else {
                Err("1以上を入力してください")
            }
        })
        .interact_text()
        .map_err(|e| RailReportError::Input(e.to_string()))?;

    Ok(value)
}

fn print_summary(record: &RunRecord) {
    println!("✅ レポート生成完了");
    println!("  バッチ: {}-{}", record.start_item_no, record.end_item_no);
    println!("  ファイル名: {}", record.file_name);
    println!("  保存先: {}", record.location);
    println!("  所要時間: {}", record.duration);
    println!("  次回の開始項目番号: {}", record.end_item_no + 1);
}

fn print_config(config: &ReportConfig) {
    println!("設定:");
    println!("  データ開始行: {}", config.data_start_row);
    println!("  バッチ最大行数: {}", config.batch_row_size);
    println!("  実行時間上限: {}秒", config.max_execution_secs);
    println!("  画像取得タイムアウト: {}秒", config.fetch_timeout_secs);
    println!(
        "  画像枠: {}x{}px",
        config.max_image_width, config.max_image_height
    );
    println!("  列マッピング:");
    for (name, position) in config.columns.positions() {
        println!("    {}: 列{}", name, position);
    }
}
