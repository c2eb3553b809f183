//! 保存先フォルダの管理

use crate::error::{RailReportError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// 親フォルダ直下の名前付きフォルダを取得または作成
pub fn get_or_create_folder(parent: &Path, name: &str) -> Result<PathBuf> {
    let folder = parent.join(name);
    if !folder.is_dir() {
        fs::create_dir_all(&folder)?;
    }
    Ok(folder)
}

/// ドキュメントを指定フォルダへ移動し、移動後のパスを返す
pub fn move_document(document: &Path, folder: &Path) -> Result<PathBuf> {
    let file_name = document
        .file_name()
        .ok_or_else(|| RailReportError::Io(std::io::Error::other("ファイル名がありません")))?;
    let destination = folder.join(file_name);

    // 別ファイルシステム間のrenameは失敗するためコピーで代替
    if fs::rename(document, &destination).is_err() {
        fs::copy(document, &destination)?;
        fs::remove_file(document)?;
    }

    Ok(destination)
}

/// ドキュメントの親フォルダ
pub fn parent_folder(document: &Path) -> Option<PathBuf> {
    document.parent().map(|p| p.to_path_buf())
}
