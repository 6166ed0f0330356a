//! # libheif 解码器
//!
//! 读取 HEIC 容器的主图像，解码为交错 RGB/RGBA。
//!
//! ## 依赖关系
//! - 被 `codec/mod.rs` 导出
//! - 使用 `libheif-rs`（系统需安装 libheif）

use super::HeicDecoder;
use crate::error::{HeicConvError, Result};

use image::{DynamicImage, RgbImage, RgbaImage};
use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};
use std::fs;
use std::path::Path;

/// 基于 libheif 的 HEIC 解码器
pub struct LibHeifDecoder {
    lib: LibHeif,
}

impl LibHeifDecoder {
    pub fn new() -> Self {
        Self {
            lib: LibHeif::new(),
        }
    }
}

impl Default for LibHeifDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl HeicDecoder for LibHeifDecoder {
    fn decode(&self, path: &Path) -> Result<DynamicImage> {
        let fail = |reason: String| HeicConvError::DecodeError {
            path: path.display().to_string(),
            reason,
        };

        // 读入内存再解析，路径不必是合法 UTF-8
        let data = fs::read(path).map_err(|e| fail(e.to_string()))?;
        let ctx = HeifContext::read_from_bytes(&data).map_err(|e| fail(e.to_string()))?;
        let handle = ctx
            .primary_image_handle()
            .map_err(|e| fail(e.to_string()))?;

        let has_alpha = handle.has_alpha_channel();
        let chroma = if has_alpha {
            RgbChroma::Rgba
        } else {
            RgbChroma::Rgb
        };
        let decoded = self
            .lib
            .decode(&handle, ColorSpace::Rgb(chroma), None)
            .map_err(|e| fail(e.to_string()))?;

        let planes = decoded.planes();
        let plane = planes
            .interleaved
            .ok_or_else(|| fail("decoder returned no interleaved plane".to_string()))?;

        let channels = if has_alpha { 4 } else { 3 };
        let pixels = pack_rows(
            plane.data,
            plane.stride,
            plane.width as usize * channels,
            plane.height as usize,
        )
        .ok_or_else(|| fail("decoded plane is shorter than its dimensions".to_string()))?;

        let image = if has_alpha {
            RgbaImage::from_raw(plane.width, plane.height, pixels).map(DynamicImage::ImageRgba8)
        } else {
            RgbImage::from_raw(plane.width, plane.height, pixels).map(DynamicImage::ImageRgb8)
        };

        image.ok_or_else(|| fail("pixel buffer does not match image size".to_string()))
    }
}

/// 去掉每行末尾的 stride 填充
fn pack_rows(data: &[u8], stride: usize, row_len: usize, height: usize) -> Option<Vec<u8>> {
    if stride < row_len {
        return None;
    }
    let mut pixels = Vec::with_capacity(row_len * height);
    for y in 0..height {
        let start = y * stride;
        pixels.extend_from_slice(data.get(start..start + row_len)?);
    }
    Some(pixels)
}
