//! # 统一错误处理模块
//!
//! 定义 heicconv 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// heicconv 统一错误类型
#[derive(Error, Debug)]
pub enum HeicConvError {
    // ─────────────────────────────────────────────────────────────
    // 目录错误（整批中止）
    // ─────────────────────────────────────────────────────────────
    #[error("Source directory '{path}' does not exist.\nPlease create a folder named 'original' next to the executable (or pass --input).")]
    SourceDirNotFound { path: String },

    #[error("Error accessing source directory '{path}': {source}")]
    SourceDirUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No files found in '{path}'.\nPlease add HEIC files to convert.")]
    SourceDirEmpty { path: String },

    #[error("Failed to create directory {path}: {source}")]
    CreateDirError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────
    // 单文件转换错误（不中止批处理）
    // ─────────────────────────────────────────────────────────────
    #[error("Output already exists: {path}")]
    DestinationExists { path: String },

    #[error("Failed to decode {path}: {reason}")]
    DecodeError { path: String, reason: String },

    #[error("Failed to encode {format} image {path}: {reason}")]
    EncodeError {
        format: String,
        path: String,
        reason: String,
    },

    #[error("Failed to write file {path}: {source}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{error}; partial output {path} could not be removed: {cleanup}")]
    PartialOutputLeft {
        path: String,
        error: Box<HeicConvError>,
        cleanup: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, HeicConvError>;
