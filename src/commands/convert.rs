//! # convert 命令实现
//!
//! 批量把源目录中的 HEIC 文件转换为 PNG 或 JPEG。
//!
//! ## 功能
//! - 校验源目录，按需创建输出目录
//! - 非递归筛选 `.heic` 文件（大小写不敏感）
//! - 输出已存在则跳过，绝不覆盖
//! - 单文件失败只记录，不中止整批
//! - 汇总报告
//!
//! ## 依赖关系
//! - 使用 `cli/` 定义的参数
//! - 使用 `batch/`, `codec/`
//! - 使用 `utils/output.rs`

use crate::batch::{output_path_for, BatchResult, BatchRunner, ProcessResult, SourceScanner};
use crate::cli::{Cli, OutputFormat};
use crate::codec::{self, encode_image, HeicDecoder};
use crate::error::{HeicConvError, Result};
use crate::utils::output;

use std::fs;
use std::path::{Path, PathBuf};

/// 一次转换运行的配置
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// 源目录
    pub source: PathBuf,
    /// 输出目录
    pub dest: PathBuf,
    /// 目标格式
    pub format: OutputFormat,
    /// 是否显示进度条
    pub show_progress: bool,
}

impl ConvertConfig {
    pub fn new(source: PathBuf, dest: PathBuf, format: OutputFormat) -> Self {
        Self {
            source,
            dest,
            format,
            show_progress: true,
        }
    }
}

/// 执行 convert 命令
pub fn execute(cli: Cli) -> Result<()> {
    let (source, dest) = cli.resolve_dirs();
    let config = ConvertConfig::new(source, dest, cli.format);

    let decoder = codec::default_decoder();
    let result = convert_dir(&config, &decoder)?;

    print_summary(config.format, &result);
    Ok(())
}

/// 转换整个源目录，返回统计结果
///
/// 源目录缺失、无法读取或为空时整批中止；单个文件的失败计入 `BatchResult`。
pub fn convert_dir<D: HeicDecoder>(config: &ConvertConfig, decoder: &D) -> Result<BatchResult> {
    output::print_header(&format!(
        "Converting HEIC files to {}",
        config.format.extension().to_uppercase()
    ));

    // 验证源目录（缺失时不创建输出目录）
    if !config.source.exists() {
        return Err(HeicConvError::SourceDirNotFound {
            path: config.source.display().to_string(),
        });
    }
    if !config.source.is_dir() {
        return Err(HeicConvError::SourceDirUnreadable {
            path: config.source.display().to_string(),
            source: std::io::Error::other("not a directory"),
        });
    }

    // 创建输出目录
    fs::create_dir_all(&config.dest).map_err(|e| HeicConvError::CreateDirError {
        path: config.dest.display().to_string(),
        source: e,
    })?;

    // 收集 HEIC 文件
    let scan = SourceScanner::new(&config.source).scan()?;
    if !scan.heic_files.is_empty() {
        output::print_info(&format!(
            "Found {} HEIC file(s) in '{}'",
            scan.heic_files.len(),
            config.source.display()
        ));
    }

    let runner = BatchRunner::new().show_progress(config.show_progress);
    Ok(runner.run(&scan.heic_files, |input| {
        convert_file(input, &config.dest, config.format, decoder)
    }))
}

/// 转换单个文件
fn convert_file<D: HeicDecoder>(
    input: &Path,
    dest_dir: &Path,
    format: OutputFormat,
    decoder: &D,
) -> ProcessResult {
    let output_path = output_path_for(input, dest_dir, format.extension());
    let from = display_name(input);
    let to = display_name(&output_path);

    // 检查是否需要跳过
    if output_path.exists() {
        return ProcessResult::Skipped(from, to);
    }

    let result = decoder
        .decode(input)
        .and_then(|img| encode_image(&img, format, &output_path));

    match result {
        Ok(()) => ProcessResult::Success(from, to),
        // 检查之后才出现的输出文件同样视为跳过
        Err(HeicConvError::DestinationExists { .. }) => ProcessResult::Skipped(from, to),
        Err(e) => ProcessResult::Failed(from, e.to_string()),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// 汇总表格内容
fn summary_rows(format: OutputFormat, result: &BatchResult) -> Vec<output::SummaryRow> {
    let mut rows = vec![
        output::SummaryRow {
            label: "HEIC files found".to_string(),
            count: result.total(),
        },
        output::SummaryRow {
            label: format!("Files converted to {}", format.extension().to_uppercase()),
            count: result.success,
        },
        output::SummaryRow {
            label: "Files skipped".to_string(),
            count: result.skipped,
        },
    ];
    if result.failed > 0 {
        rows.push(output::SummaryRow {
            label: "Files failed".to_string(),
            count: result.failed,
        });
    }
    rows
}

/// 打印汇总报告
fn print_summary(format: OutputFormat, result: &BatchResult) {
    if result.total() == 0 {
        output::print_warning("No HEIC files found in the source directory.");
        return;
    }

    println!();
    output::print_done("Conversion complete!");
    println!("{}", output::render_summary(&summary_rows(format, result)));

    for (file, err) in &result.failures {
        output::print_error(&format!("{}: {}", file, err));
    }
}
