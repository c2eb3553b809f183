use crate::error::{RailReportError, Result};
use crate::sheet::ColumnMapping;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// デプロイ時に固定する設定
///
/// データ開始行・バッチ上限・画像枠サイズと、フィールド→列位置の
/// マッピングを持つ。実行時に交渉される値はない。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// データが始まるシート行（1始まり）
    pub data_start_row: u32,
    /// 1バッチで処理する最大行数
    pub batch_row_size: u32,
    /// 実行時間の上限（秒）。超過後は残りの画像取得をスキップ
    pub max_execution_secs: u64,
    /// 画像取得1件あたりのタイムアウト（秒）
    pub fetch_timeout_secs: u64,
    /// 埋め込み画像の最大幅（px）
    pub max_image_width: u32,
    /// 埋め込み画像の最大高さ（px）
    pub max_image_height: u32,
    /// フィールド→列位置マッピング
    pub columns: ColumnMapping,
}

impl ReportConfig {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            serde_json::from_str(&content)?
        } else {
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| RailReportError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("rail-report").join("config.json"))
    }

    fn validate(&self) -> Result<()> {
        if self.data_start_row < 1 {
            return Err(RailReportError::Config(
                "data_start_row は1以上が必要です".into(),
            ));
        }
        if self.batch_row_size < 1 {
            return Err(RailReportError::Config(
                "batch_row_size は1以上が必要です".into(),
            ));
        }
        self.columns.validate()
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            data_start_row: 11,
            batch_row_size: 200,
            max_execution_secs: 600, // 10分
            fetch_timeout_secs: 30,
            max_image_width: 100,
            max_image_height: 100,
            columns: ColumnMapping::default(),
        }
    }
}
