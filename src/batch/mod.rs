//! # 批量处理模块
//!
//! 提供源目录扫描与逐文件批量处理能力。
//!
//! ## 功能
//! - 非递归扫描源目录并筛选 HEIC 文件
//! - 顺序处理，单文件失败隔离
//! - 进度反馈与统计
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 使用
//! - 使用 `walkdir` 列目录
//! - 使用 `indicatif` 显示进度

pub mod collector;
pub mod runner;

pub use collector::{output_path_for, SourceScanner};
pub use runner::{BatchResult, BatchRunner, ProcessResult};
