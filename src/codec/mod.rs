//! # 编解码模块
//!
//! HEIC 解码与 PNG/JPEG 编码均交给第三方库，本模块只负责接线。
//!
//! ## 功能
//! - `HeicDecoder` trait：批处理流程对解码器泛型化
//! - `LibHeifDecoder`：基于 libheif（需要 `heif` feature）
//! - `SniffingDecoder`：按文件内容猜测格式，交给 `image` crate
//! - `encode_image`：PNG 默认参数；JPEG 质量 95 + 优化 Huffman 表
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 使用
//! - 使用 `image`, `jpeg-encoder`, `libheif-rs`

pub mod encode;
#[cfg(feature = "heif")]
pub mod heif;

pub use encode::encode_image;
#[cfg(feature = "heif")]
pub use heif::LibHeifDecoder;

use crate::error::{HeicConvError, Result};

use image::{DynamicImage, ImageError};
use std::fs;
use std::path::Path;

/// 把一个源文件解码为内存中的图像
pub trait HeicDecoder {
    fn decode(&self, path: &Path) -> Result<DynamicImage>;
}

/// 交给 `image` crate 按内容猜测格式解码
///
/// 没有 libheif 时作为默认解码器：真正的 HEIC 文件会以
/// "unsupported format" 逐文件失败，不影响批处理继续。
#[derive(Debug, Default, Clone, Copy)]
pub struct SniffingDecoder;

impl HeicDecoder for SniffingDecoder {
    fn decode(&self, path: &Path) -> Result<DynamicImage> {
        let data = fs::read(path).map_err(|e| HeicConvError::DecodeError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        image::load_from_memory(&data).map_err(|e| match e {
            ImageError::Unsupported(inner) => {
                HeicConvError::UnsupportedFormat(format!("{}: {}", path.display(), inner))
            }
            other => HeicConvError::DecodeError {
                path: path.display().to_string(),
                reason: other.to_string(),
            },
        })
    }
}

/// 当前构建可用的最佳解码器
#[cfg(feature = "heif")]
pub fn default_decoder() -> LibHeifDecoder {
    LibHeifDecoder::new()
}

/// 当前构建可用的最佳解码器
#[cfg(not(feature = "heif"))]
pub fn default_decoder() -> SniffingDecoder {
    SniffingDecoder
}
