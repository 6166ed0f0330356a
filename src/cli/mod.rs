//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数。
//!
//! ## 命令结构
//! `heicconv <png|jpg> [--input DIR] [--output DIR]`
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 参数传递给 `commands/convert.rs`

use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

/// 默认输入目录名（与可执行文件同级）
pub const DEFAULT_SOURCE_DIR: &str = "original";
/// 默认输出目录名（与可执行文件同级）
pub const DEFAULT_DEST_DIR: &str = "converted";

/// heicconv - HEIC 批量转换工具
#[derive(Parser, Debug)]
#[command(name = "heicconv")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Batch convert HEIC photos to PNG or JPEG", long_about = None)]
pub struct Cli {
    /// Target output format
    #[arg(value_enum, ignore_case = true)]
    pub format: OutputFormat,

    /// Directory containing HEIC files [default: <exe dir>/original]
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Directory for converted files [default: <exe dir>/converted]
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl Cli {
    /// 解析输入/输出目录，未指定时取可执行文件所在目录下的默认目录
    pub fn resolve_dirs(&self) -> (PathBuf, PathBuf) {
        let base = program_dir();
        let source = self
            .input
            .clone()
            .unwrap_or_else(|| base.join(DEFAULT_SOURCE_DIR));
        let dest = self
            .output
            .clone()
            .unwrap_or_else(|| base.join(DEFAULT_DEST_DIR));
        (source, dest)
    }
}

/// 可执行文件所在目录；无法确定时退回当前目录
fn program_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// 支持的输出格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Lossless PNG (default encoder settings)
    Png,
    /// JPEG, quality 95 with optimized Huffman tables
    Jpg,
}

impl OutputFormat {
    /// 输出文件扩展名
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpg => "jpg",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}
