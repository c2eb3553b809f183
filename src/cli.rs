use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rail-report")]
#[command(about = "鉄道車両検査レポート生成ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 検査データのワークブックからレポートを生成
    Generate {
        /// 検査データのワークブック（.xlsx）
        #[arg(required = true)]
        workbook: PathBuf,

        /// レポート種別 (visual/functional)
        #[arg(short, long, default_value = "visual")]
        kind: ReportKind,

        /// ワークシート名（省略時は種別ごとの既定シート）
        #[arg(long)]
        sheet: Option<String>,

        /// 開始項目番号（省略時は対話入力）
        #[arg(short, long)]
        start_item_no: Option<u32>,

        /// 出力先ルートフォルダ（省略時はワークブックの親フォルダ）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// レポートテンプレートJSON（省略時は組み込みテンプレート）
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// 1バッチの最大行数を上書き
        #[arg(short, long)]
        batch_size: Option<u32>,

        /// 画像キャッシュを使用（再取得をスキップ）
        #[arg(long)]
        use_cache: bool,
    },

    /// 設定を表示/初期化
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// 既定の設定ファイルを書き出す
        #[arg(long)]
        init: bool,
    },
}

/// レポート種別
///
/// 目視検査(Visual)と機能検査(Functional)で、ファイル名接頭辞・
/// 既定シート名・保存先フォルダ名が決まる。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportKind {
    #[default]
    Visual,
    Functional,
}

impl ReportKind {
    /// ファイル名の接頭辞
    pub fn prefix(&self) -> &'static str {
        match self {
            ReportKind::Visual => "V",
            ReportKind::Functional => "F",
        }
    }

    /// 既定のワークシート名
    pub fn worksheet_name(&self) -> &'static str {
        match self {
            ReportKind::Visual => "Visual_Cleaned_Report",
            ReportKind::Functional => "Functional_Cleaned_Report",
        }
    }

    /// 保存先フォルダ名
    pub fn folder_name(&self) -> &'static str {
        match self {
            ReportKind::Visual => "Visual_Inspection_Reports",
            ReportKind::Functional => "Functional_Inspection_Reports",
        }
    }

    /// ヘッダに付記する検査種別ラベル
    pub fn header_label(&self) -> &'static str {
        match self {
            ReportKind::Visual => "Visual Inspection",
            ReportKind::Functional => "Functional Inspection",
        }
    }
}

impl std::str::FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "visual" | "v" => Ok(ReportKind::Visual),
            "functional" | "f" => Ok(ReportKind::Functional),
            _ => Err(format!("Unknown kind: {}. Use visual or functional", s)),
        }
    }
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportKind::Visual => write!(f, "visual"),
            ReportKind::Functional => write!(f, "functional"),
        }
    }
}
