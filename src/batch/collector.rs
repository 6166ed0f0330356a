//! # 源目录扫描器
//!
//! 列出源目录的直接子项，并筛选出 HEIC 文件。
//!
//! ## 功能
//! - 非递归列目录（保持文件系统返回的顺序，不排序）
//! - 大小写不敏感的 `.heic` 后缀匹配
//! - 区分"目录为空"与"没有 HEIC 文件"
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 调用
//! - 使用 `walkdir` 遍历目录

use crate::error::{HeicConvError, Result};

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// HEIC 文件后缀（小写）
pub const HEIC_SUFFIX: &str = ".heic";

/// 扫描结果
#[derive(Debug, Default)]
pub struct ScanResult {
    /// 目录下的全部直接子项数量
    pub total_entries: usize,
    /// 符合条件的 HEIC 文件，按列目录顺序
    pub heic_files: Vec<PathBuf>,
}

/// 源目录扫描器
pub struct SourceScanner {
    /// 源目录
    source: PathBuf,
}

impl SourceScanner {
    /// 创建新的扫描器
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// 列出源目录并筛选 HEIC 文件
    ///
    /// 目录无法读取时返回 `SourceDirUnreadable`，目录为空时返回 `SourceDirEmpty`。
    pub fn scan(&self) -> Result<ScanResult> {
        if self.source.is_file() {
            return Err(HeicConvError::SourceDirUnreadable {
                path: self.source.display().to_string(),
                source: std::io::Error::other("not a directory"),
            });
        }

        let walker = WalkDir::new(&self.source).min_depth(1).max_depth(1);

        let mut result = ScanResult::default();
        for entry in walker {
            let entry = entry.map_err(|e| self.unreadable(e))?;
            result.total_entries += 1;

            if entry.file_type().is_dir() {
                continue;
            }
            if is_heic_name(entry.file_name()) {
                result.heic_files.push(entry.into_path());
            }
        }

        if result.total_entries == 0 {
            return Err(HeicConvError::SourceDirEmpty {
                path: self.source.display().to_string(),
            });
        }

        Ok(result)
    }

    fn unreadable(&self, err: walkdir::Error) -> HeicConvError {
        let path = err
            .path()
            .unwrap_or(&self.source)
            .display()
            .to_string();
        let source = err
            .into_io_error()
            .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
        HeicConvError::SourceDirUnreadable { path, source }
    }
}

/// 文件名是否以 `.heic` 结尾（大小写不敏感，按原始字节比较）
pub fn is_heic_name(name: impl AsRef<OsStr>) -> bool {
    let bytes = name.as_ref().as_encoded_bytes();
    bytes.len() >= HEIC_SUFFIX.len()
        && bytes[bytes.len() - HEIC_SUFFIX.len()..].eq_ignore_ascii_case(HEIC_SUFFIX.as_bytes())
}

/// 计算输出路径：`<dest>/<去掉最后一个扩展名的文件名>.<ext>`
///
/// 文件名保持原始 `OsStr`，非 UTF-8 名称不会被有损替换而相互冲突。
pub fn output_path_for(input: &Path, dest_dir: &Path, ext: &str) -> PathBuf {
    let mut name = input
        .file_stem()
        .map(OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".");
    name.push(ext);
    dest_dir.join(name)
}
