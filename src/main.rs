//! # heicconv - HEIC 批量转换工具
//!
//! 扫描 `original/` 目录中的 HEIC 照片，转换为 PNG 或 JPEG 写入 `converted/`。
//! 已存在的输出文件会被跳过，因此重复运行只处理新增照片。
//!
//! ## 用法
//! `heicconv <png|jpg> [--input DIR] [--output DIR]`
//!
//! ## 退出码
//! - 0: 批处理完成（单文件失败不影响退出码）
//! - 1: 源目录缺失、无法读取或为空，输出目录无法创建
//! - 2: 参数错误（由 clap 报告）
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── batch/   (目录扫描与批量执行)
//!   │     └── codec/   (HEIC 解码, PNG/JPEG 编码)
//!   ├── utils/      (输出与进度条)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod codec;
mod commands;
mod error;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
