use thiserror::Error;

#[derive(Error, Debug)]
pub enum RailReportError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ワークブックが見つかりません: {0}")]
    WorkbookNotFound(String),

    #[error("シートが見つかりません: {0}")]
    WorksheetNotFound(String),

    #[error("シート読み込みエラー: {0}")]
    SheetRead(String),

    #[error("データが見つかりません")]
    NoData,

    #[error("開始項目番号が未設定または不正です")]
    InvalidStartItemNo,

    #[error("先頭行に列車番号がありません")]
    MissingTrainNo,

    #[error("テンプレートが見つかりません: {0}")]
    TemplateNotFound(String),

    #[error("テンプレートが不正: {0}")]
    InvalidTemplate(String),

    #[error("画像取得エラー: {0}")]
    Fetch(String),

    #[error("入力エラー: {0}")]
    Input(String),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RailReportError>;
