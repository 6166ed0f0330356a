//! # 批量执行器
//!
//! 顺序执行批量处理任务，单个文件的失败不会中止整批。
//!
//! ## 功能
//! - 逐个文件调用处理闭包，收集 `ProcessResult`
//! - 进度条显示，逐文件消息通过 `suspend` 打印
//! - 成功/跳过/失败计数与失败详情
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 调用
//! - 使用 `utils/progress.rs` 创建进度条
//! - 使用 `utils/output.rs` 打印逐文件消息

use crate::utils::{output, progress};

use std::path::PathBuf;

/// 单个文件处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessResult {
    /// 处理成功 (输入文件名, 输出文件名)
    Success(String, String),
    /// 跳过（输出文件已存在）(输入文件名, 输出文件名)
    Skipped(String, String),
    /// 处理失败 (输入文件名, 错误信息)
    Failed(String, String),
}

/// 批量处理结果统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchResult {
    /// 成功数量
    pub success: usize,
    /// 跳过数量
    pub skipped: usize,
    /// 失败数量
    pub failed: usize,
    /// 失败详情
    pub failures: Vec<(String, String)>,
}

impl BatchResult {
    /// 合并处理结果
    pub fn merge(&mut self, result: ProcessResult) {
        match result {
            ProcessResult::Success(..) => self.success += 1,
            ProcessResult::Skipped(..) => self.skipped += 1,
            ProcessResult::Failed(path, err) => {
                self.failed += 1;
                self.failures.push((path, err));
            }
        }
    }

    /// 总处理数量（即找到的 HEIC 文件数）
    pub fn total(&self) -> usize {
        self.success + self.skipped + self.failed
    }
}

/// 批量执行器
pub struct BatchRunner {
    /// 是否显示进度条
    show_progress: bool,
}

impl BatchRunner {
    /// 创建新的批量执行器
    pub fn new() -> Self {
        Self {
            show_progress: true,
        }
    }

    /// 设置是否显示进度条
    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// 按顺序处理文件列表
    pub fn run<F>(&self, files: &[PathBuf], mut processor: F) -> BatchResult
    where
        F: FnMut(&PathBuf) -> ProcessResult,
    {
        let pb = if self.show_progress {
            progress::create_progress_bar(files.len() as u64, "Converting")
        } else {
            progress::hidden_bar()
        };

        let mut batch_result = BatchResult::default();
        for file in files {
            let result = processor(file);

            pb.suspend(|| report(&result));
            pb.inc(1);

            batch_result.merge(result);
        }

        pb.finish_and_clear();
        batch_result
    }
}

impl Default for BatchRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// 打印单个文件的处理结果
fn report(result: &ProcessResult) {
    match result {
        ProcessResult::Success(from, to) => output::print_conversion(from, to),
        ProcessResult::Skipped(from, to) => {
            output::print_skip(&format!("Skipping {} - {} already exists.", from, to))
        }
        ProcessResult::Failed(from, err) => {
            output::print_error(&format!("Error converting {}: {}", from, err))
        }
    }
}
