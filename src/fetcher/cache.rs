//! 画像取得キャッシュモジュール
//!
//! 画像URLのSHA-256ハッシュをキーにして取得済みコンテンツを
//! キャッシュし、同じURLの再取得をスキップする。

use super::FetchedContent;
use crate::error::Result;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

const CACHE_FILE_NAME: &str = ".image-cache.json";

/// キャッシュファイルの構造
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchCache {
    /// バージョン（互換性チェック用）
    version: u32,
    /// URLハッシュ → エントリのマップ
    entries: HashMap<String, CacheEntry>,
}

/// キャッシュエントリ
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    /// 取得元URL
    url: String,
    /// Content-Type
    content_type: String,
    /// コンテンツ本体（base64）
    data: String,
}

impl FetchCache {
    const CURRENT_VERSION: u32 = 1;

    /// キャッシュファイルを読み込み
    pub fn load(folder: &Path) -> Self {
        let cache_path = folder.join(CACHE_FILE_NAME);
        if !cache_path.exists() {
            return Self::default();
        }

        let file = match File::open(&cache_path) {
            Ok(f) => f,
            Err(_) => return Self::default(),
        };

        let reader = BufReader::new(file);
        match serde_json::from_reader::<_, FetchCache>(reader) {
            Ok(cache) => {
                // バージョンチェック
                if cache.version != Self::CURRENT_VERSION {
                    eprintln!("キャッシュバージョン不一致、再生成します");
                    return Self::default();
                }
                cache
            }
            Err(_) => Self::default(),
        }
    }

    /// キャッシュファイルを保存
    pub fn save(&self, folder: &Path) -> Result<()> {
        let cache_path = folder.join(CACHE_FILE_NAME);
        let file = File::create(cache_path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    /// URLをルックアップ
    pub fn get(&self, url: &str) -> Option<FetchedContent> {
        let entry = self.entries.get(&url_digest(url))?;
        let bytes = BASE64.decode(&entry.data).ok()?;
        Some(FetchedContent {
            bytes,
            content_type: entry.content_type.clone(),
        })
    }

    /// キャッシュに追加
    pub fn insert(&mut self, url: &str, content: &FetchedContent) {
        self.entries.insert(
            url_digest(url),
            CacheEntry {
                url: url.to_string(),
                content_type: content.content_type.clone(),
                data: BASE64.encode(&content.bytes),
            },
        );
    }

    /// キャッシュ件数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for FetchCache {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            entries: HashMap::new(),
        }
    }
}

/// URLのSHA-256ハッシュ（16進）
fn url_digest(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content() -> FetchedContent {
        FetchedContent {
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
            content_type: "image/png".to_string(),
        }
    }

    #[test]
    fn test_insert_and_get() {
        let mut cache = FetchCache::default();
        assert!(cache.is_empty());

        cache.insert("https://example.com/a.png", &content());
        assert_eq!(cache.len(), 1);

        let hit = cache.get("https://example.com/a.png").expect("ヒットするはず");
        assert_eq!(hit, content());
        assert!(cache.get("https://example.com/b.png").is_none());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = std::env::temp_dir().join("rail-report-test-cache-roundtrip");
        std::fs::create_dir_all(&temp_dir).unwrap();
        std::fs::remove_file(temp_dir.join(CACHE_FILE_NAME)).ok();

        let mut cache = FetchCache::default();
        cache.insert("https://example.com/a.png", &content());
        cache.save(&temp_dir).unwrap();

        let loaded = FetchCache::load(&temp_dir);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get("https://example.com/a.png"), Some(content()));

        std::fs::remove_dir_all(&temp_dir).ok();
    }

    #[test]
    fn test_load_missing_is_empty() {
        let temp_dir = std::env::temp_dir().join("rail-report-test-cache-missing");
        std::fs::create_dir_all(&temp_dir).unwrap();
        std::fs::remove_file(temp_dir.join(CACHE_FILE_NAME)).ok();

        let cache = FetchCache::load(&temp_dir);
        assert!(cache.is_empty());

        std::fs::remove_dir_all(&temp_dir).ok();
    }

    #[test]
    fn test_version_mismatch_regenerates() {
        let temp_dir = std::env::temp_dir().join("rail-report-test-cache-version");
        std::fs::create_dir_all(&temp_dir).unwrap();

        let mut cache = FetchCache::default();
        cache.insert("https://example.com/a.png", &content());
        cache.version = 99;
        cache.save(&temp_dir).unwrap();

        let loaded = FetchCache::load(&temp_dir);
        assert!(loaded.is_empty());

        std::fs::remove_dir_all(&temp_dir).ok();
    }

    #[test]
    fn test_url_digest_is_stable() {
        assert_eq!(
            url_digest("https://example.com/a.png"),
            url_digest("https://example.com/a.png")
        );
        assert_ne!(
            url_digest("https://example.com/a.png"),
            url_digest("https://example.com/b.png")
        );
    }
}
