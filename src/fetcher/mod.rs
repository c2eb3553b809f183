//! 画像コンテンツの取得
//!
//! 行ごとの画像URLを順番にブロッキング取得する。並列化はしない。
//! 取得失敗は呼び出し側（レンダラ）が行単位で握りつぶす前提。

mod cache;

pub use cache::FetchCache;

use crate::error::{RailReportError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::time::Duration;

lazy_static! {
    static ref URL_RE: Regex = Regex::new(r"^https?://").unwrap();
}

/// 取得したコンテンツ（バイト列 + Content-Type）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedContent {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl FetchedContent {
    /// Content-Typeが画像系か
    pub fn is_image(&self) -> bool {
        self.content_type.contains("image")
    }
}

/// URL参照からコンテンツを取得するコレクタ
pub trait ContentFetcher {
    fn fetch(&mut self, url: &str) -> Result<FetchedContent>;
}

/// HTTP(S)での取得
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| RailReportError::Fetch(e.to_string()))?;
        Ok(Self { client })
    }
}

impl ContentFetcher for HttpFetcher {
    fn fetch(&mut self, url: &str) -> Result<FetchedContent> {
        if !URL_RE.is_match(url) {
            return Err(RailReportError::Fetch(format!("unsupported URL: {}", url)));
        }

        let response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| RailReportError::Fetch(e.to_string()))?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let bytes = response
            .bytes()
            .map_err(|e| RailReportError::Fetch(e.to_string()))?
            .to_vec();

        Ok(FetchedContent {
            bytes,
            content_type,
        })
    }
}

/// キャッシュ付きの取得
///
/// 成功した画像取得だけをキャッシュする。失敗はキャッシュしない
/// （リトライなしの方針はここでも変えない）。
pub struct CachedFetcher<F: ContentFetcher> {
    inner: F,
    cache: FetchCache,
    folder: PathBuf,
    dirty: bool,
}

impl<F: ContentFetcher> CachedFetcher<F> {
    pub fn new(inner: F, cache_folder: &Path) -> Self {
        Self {
            inner,
            cache: FetchCache::load(cache_folder),
            folder: cache_folder.to_path_buf(),
            dirty: false,
        }
    }

    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    /// 変更があればキャッシュファイルを保存
    pub fn persist(&self) -> Result<()> {
        if self.dirty {
            self.cache.save(&self.folder)?;
        }
        Ok(())
    }
}

impl<F: ContentFetcher> ContentFetcher for CachedFetcher<F> {
    fn fetch(&mut self, url: &str) -> Result<FetchedContent> {
        if let Some(hit) = self.cache.get(url) {
            return Ok(hit);
        }

        let content = self.inner.fetch(url)?;
        if content.is_image() {
            self.cache.insert(url, &content);
            self.dirty = true;
        }
        Ok(content)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::StubFetcher;
    use super::*;

    #[test]
    fn test_is_image_content_type() {
        let png = FetchedContent {
            bytes: vec![1],
            content_type: "image/png".into(),
        };
        let html = FetchedContent {
            bytes: vec![1],
            content_type: "text/html; charset=utf-8".into(),
        };
        assert!(png.is_image());
        assert!(!html.is_image());
    }

    #[test]
    fn test_invalid_url_rejected_without_network() {
        let mut fetcher = HttpFetcher::new(1).unwrap();
        let result = fetcher.fetch("ftp://example.com/a.png");
        assert!(matches!(result, Err(RailReportError::Fetch(_))));
        let result = fetcher.fetch("not a url");
        assert!(matches!(result, Err(RailReportError::Fetch(_))));
    }

    #[test]
    fn test_cached_fetcher_hits_cache_for_images() {
        let temp_dir = std::env::temp_dir().join("rail-report-test-cached-fetcher");
        std::fs::create_dir_all(&temp_dir).unwrap();
        std::fs::remove_file(temp_dir.join(".image-cache.json")).ok();

        let stub = StubFetcher::new().with("https://example.com/a.png", "image/png", b"PNGDATA");
        let mut cached = CachedFetcher::new(stub, &temp_dir);

        let first = cached.fetch("https://example.com/a.png").unwrap();
        let second = cached.fetch("https://example.com/a.png").unwrap();
        assert_eq!(first, second);
        assert_eq!(cached.inner.calls, 1); // 2回目はキャッシュから
        assert_eq!(cached.cached_count(), 1);

        std::fs::remove_dir_all(&temp_dir).ok();
    }

    #[test]
    fn test_cached_fetcher_does_not_cache_non_images() {
        let temp_dir = std::env::temp_dir().join("rail-report-test-cached-nonimage");
        std::fs::create_dir_all(&temp_dir).unwrap();
        std::fs::remove_file(temp_dir.join(".image-cache.json")).ok();

        let stub = StubFetcher::new().with("https://example.com/page", "text/html", b"<html>");
        let mut cached = CachedFetcher::new(stub, &temp_dir);

        cached.fetch("https://example.com/page").unwrap();
        cached.fetch("https://example.com/page").unwrap();
        assert_eq!(cached.inner.calls, 2);
        assert_eq!(cached.cached_count(), 0);

        std::fs::remove_dir_all(&temp_dir).ok();
    }

    #[test]
    fn test_cached_fetcher_does_not_cache_failures() {
        let temp_dir = std::env::temp_dir().join("rail-report-test-cached-failure");
        std::fs::create_dir_all(&temp_dir).unwrap();
        std::fs::remove_file(temp_dir.join(".image-cache.json")).ok();

        let stub = StubFetcher::new();
        let mut cached = CachedFetcher::new(stub, &temp_dir);

        assert!(cached.fetch("https://example.com/missing.png").is_err());
        assert!(cached.fetch("https://example.com/missing.png").is_err());
        assert_eq!(cached.inner.calls, 2);

        std::fs::remove_dir_all(&temp_dir).ok();
    }
}
