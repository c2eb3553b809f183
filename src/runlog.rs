//! 実行の計時と結果メタデータの記録
//!
//! 実行開始時に壁時計時刻を取り、完了時に終了時刻・所要時間・
//! 採番・ファイル名・保存先をひとつのレコードに確定する。レコードは
//! 出力ルートの実行ログ（JSON）へ追記され、以後変更しない。

use crate::error::Result;
use crate::planner::BatchPlan;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

const RUN_LOG_FILE_NAME: &str = "run_log.json";
const TIMESTAMP_FORMAT: &str = "%d-%m-%y %H:%M:%S";

/// 実行中の計時
pub struct RunRecorder {
    started_at: DateTime<Local>,
}

impl RunRecorder {
    /// 実行開始時刻を記録
    pub fn start() -> Self {
        Self {
            started_at: Local::now(),
        }
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    /// 終了時刻を取り、レコードを確定する
    pub fn finish(self, plan: &BatchPlan, location: &Path) -> RunRecord {
        let ended_at = Local::now();
        RunRecord {
            start_time: self.started_at.format(TIMESTAMP_FORMAT).to_string(),
            end_time: ended_at.format(TIMESTAMP_FORMAT).to_string(),
            duration: format_duration(ended_at - self.started_at),
            start_item_no: plan.start_item_no,
            end_item_no: plan.end_item_no,
            file_name: plan.file_name.clone(),
            location: location.display().to_string(),
        }
    }
}

/// 経過時間を `{h}h {m}m {s}s` に整形
fn format_duration(elapsed: chrono::Duration) -> String {
    let millis = elapsed.num_milliseconds().max(0);
    let hours = millis / (1000 * 60 * 60);
    let minutes = (millis % (1000 * 60 * 60)) / (1000 * 60);
    let seconds = (millis % (1000 * 60)) / 1000;
    format!("{}h {}m {}s", hours, minutes, seconds)
}

/// 1回の実行の確定メタデータ
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
    pub start_time: String,
    pub end_time: String,
    pub duration: String,
    pub start_item_no: u32,
    pub end_item_no: u32,
    pub file_name: String,
    pub location: String,
}

/// 実行ログファイル
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunLog {
    /// バージョン（互換性チェック用）
    version: u32,
    /// 実行レコード（古い順）
    runs: Vec<RunRecord>,
}

impl RunLog {
    const CURRENT_VERSION: u32 = 1;

    /// 実行ログを読み込み
    pub fn load(folder: &Path) -> Self {
        let log_path = folder.join(RUN_LOG_FILE_NAME);
        if !log_path.exists() {
            return Self::default();
        }

        let file = match File::open(&log_path) {
            Ok(f) => f,
            Err(_) => return Self::default(),
        };

        let reader = BufReader::new(file);
        match serde_json::from_reader::<_, RunLog>(reader) {
            Ok(log) => {
                if log.version != Self::CURRENT_VERSION {
                    eprintln!("実行ログのバージョン不一致、再生成します");
                    return Self::default();
                }
                log
            }
            Err(_) => Self::default(),
        }
    }

    /// 実行ログを保存
    pub fn save(&self, folder: &Path) -> Result<()> {
        let log_path = folder.join(RUN_LOG_FILE_NAME);
        let file = File::create(log_path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// レコードを追記
    pub fn append(&mut self, record: RunRecord) {
        self.runs.push(record);
    }

    /// 最後に記録した終了項目番号（次回の開始番号の根拠）
    pub fn last_end_item_no(&self) -> Option<u32> {
        self.runs.last().map(|r| r.end_item_no)
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

impl Default for RunLog {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            runs: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::BatchPlan;

    fn plan() -> BatchPlan {
        BatchPlan {
            train_no: "T123".to_string(),
            start_item_no: 5,
            end_item_no: 7,
            file_name: "V-Inspection_Report_for_T123_5-7".to_string(),
        }
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(chrono::Duration::seconds(5)), "0h 0m 5s");
        assert_eq!(format_duration(chrono::Duration::seconds(65)), "0h 1m 5s");
        assert_eq!(
            format_duration(chrono::Duration::seconds(3600 + 120 + 3)),
            "1h 2m 3s"
        );
        assert_eq!(
            format_duration(chrono::Duration::milliseconds(1999)),
            "0h 0m 1s"
        );
        // 時計が巻き戻っても負にはしない
        assert_eq!(format_duration(chrono::Duration::seconds(-5)), "0h 0m 0s");
    }

    #[test]
    fn test_recorder_populates_record() {
        let recorder = RunRecorder::start();
        let record = recorder.finish(&plan(), Path::new("/out/T123/report.xlsx"));

        assert_eq!(record.start_item_no, 5);
        assert_eq!(record.end_item_no, 7);
        assert_eq!(record.file_name, "V-Inspection_Report_for_T123_5-7");
        assert_eq!(record.location, "/out/T123/report.xlsx");
        assert!(record.duration.ends_with('s'));
        // dd-MM-yy HH:mm:ss 形式
        assert_eq!(record.start_time.len(), 17);
    }

    #[test]
    fn test_run_log_roundtrip() {
        let temp_dir = std::env::temp_dir().join("rail-report-test-runlog");
        std::fs::create_dir_all(&temp_dir).unwrap();
        std::fs::remove_file(temp_dir.join(RUN_LOG_FILE_NAME)).ok();

        let mut log = RunLog::load(&temp_dir);
        assert!(log.is_empty());
        assert_eq!(log.last_end_item_no(), None);

        let recorder = RunRecorder::start();
        log.append(recorder.finish(&plan(), Path::new("/out/report.xlsx")));
        log.save(&temp_dir).unwrap();

        let loaded = RunLog::load(&temp_dir);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.last_end_item_no(), Some(7));

        std::fs::remove_dir_all(&temp_dir).ok();
    }
}
