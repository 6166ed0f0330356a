//! # 图像编码
//!
//! 将解码后的图像写成 PNG 或 JPEG。
//!
//! ## 功能
//! - PNG：`image` crate 默认编码参数
//! - JPEG：`jpeg-encoder`，质量 95，开启优化 Huffman 表
//! - 输出文件以 `create_new` 打开，绝不覆盖已有文件
//! - 编码失败时删除残留的半成品文件
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 使用
//! - 使用 `cli::OutputFormat`

use crate::cli::OutputFormat;
use crate::error::{HeicConvError, Result};

use image::{DynamicImage, ImageFormat};
use jpeg_encoder::{ColorType, Encoder};
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, ErrorKind, Seek, Write};
use std::path::Path;

/// JPEG 输出质量
pub const JPEG_QUALITY: u8 = 95;

/// 把图像编码到 `dest`
pub fn encode_image(img: &DynamicImage, format: OutputFormat, dest: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dest)
        .map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => HeicConvError::DestinationExists {
                path: dest.display().to_string(),
            },
            _ => HeicConvError::FileWriteError {
                path: dest.display().to_string(),
                source: e,
            },
        })?;

    let mut writer = BufWriter::new(file);
    let result = match format {
        OutputFormat::Png => write_png(img, &mut writer, dest),
        OutputFormat::Jpg => write_jpeg(img, &mut writer, dest),
    }
    .and_then(|_| {
        writer.flush().map_err(|e| HeicConvError::FileWriteError {
            path: dest.display().to_string(),
            source: e,
        })
    });

    if let Err(error) = result {
        drop(writer);
        return Err(discard_partial(dest, error));
    }

    Ok(())
}

/// 删除编码失败留下的半成品；删除失败时把原因附加到错误上
fn discard_partial(dest: &Path, error: HeicConvError) -> HeicConvError {
    match fs::remove_file(dest) {
        Ok(()) => error,
        Err(e) if e.kind() == ErrorKind::NotFound => error,
        Err(cleanup) => HeicConvError::PartialOutputLeft {
            path: dest.display().to_string(),
            error: Box::new(error),
            cleanup,
        },
    }
}

fn write_png<W: Write + Seek>(img: &DynamicImage, writer: &mut W, dest: &Path) -> Result<()> {
    img.write_to(writer, ImageFormat::Png)
        .map_err(|e| HeicConvError::EncodeError {
            format: "PNG".to_string(),
            path: dest.display().to_string(),
            reason: e.to_string(),
        })
}

fn write_jpeg<W: Write>(img: &DynamicImage, writer: &mut W, dest: &Path) -> Result<()> {
    let fail = |reason: String| HeicConvError::EncodeError {
        format: "JPEG".to_string(),
        path: dest.display().to_string(),
        reason,
    };

    // JPEG 没有 alpha 通道，统一压成 8-bit RGB
    let rgb = img.to_rgb8();
    let width = u16::try_from(rgb.width())
        .map_err(|_| fail(format!("width {} exceeds JPEG limit", rgb.width())))?;
    let height = u16::try_from(rgb.height())
        .map_err(|_| fail(format!("height {} exceeds JPEG limit", rgb.height())))?;

    let mut encoder = Encoder::new(writer, JPEG_QUALITY);
    encoder.set_optimized_huffman_tables(true);
    encoder
        .encode(rgb.as_raw(), width, height, ColorType::Rgb)
        .map_err(|e| fail(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use tempfile::TempDir;

    fn sample_rgb() -> DynamicImage {
        let mut img = RgbImage::new(16, 8);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = Rgb([(x * 16) as u8, (y * 32) as u8, 128]);
        }
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_encode_png_is_lossless() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("out.png");
        let img = sample_rgb();

        encode_image(&img, OutputFormat::Png, &dest).unwrap();

        let reread = image::open(&dest).unwrap();
        assert_eq!(reread.to_rgb8(), img.to_rgb8());
    }

    #[test]
    fn test_encode_jpeg_from_rgba() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("out.jpg");
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(5, 7, Rgba([200, 10, 10, 90])));

        encode_image(&img, OutputFormat::Jpg, &dest).unwrap();

        let bytes = fs::read(&dest).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        let reread = image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg).unwrap();
        assert_eq!((reread.width(), reread.height()), (5, 7));
    }

    #[test]
    fn test_encode_never_overwrites() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("keep.jpg");
        fs::write(&dest, b"existing").unwrap();

        let err = encode_image(&sample_rgb(), OutputFormat::Jpg, &dest).unwrap_err();
        assert!(matches!(err, HeicConvError::DestinationExists { .. }));
        assert_eq!(fs::read(&dest).unwrap(), b"existing");
    }

    /// 取出亮度量化表（DQT, Tq = 0），按文件中的 zigzag 顺序
    fn luma_dqt(jpeg: &[u8]) -> Vec<u8> {
        let mut i = 2;
        while i + 4 <= jpeg.len() {
            assert_eq!(jpeg[i], 0xFF);
            let marker = jpeg[i + 1];
            let len = u16::from_be_bytes([jpeg[i + 2], jpeg[i + 3]]) as usize;
            if marker == 0xDA {
                break;
            }
            if marker == 0xDB {
                let mut j = i + 4;
                while j < i + 2 + len {
                    let precision = jpeg[j] >> 4;
                    let id = jpeg[j] & 0x0F;
                    let size = if precision == 0 { 64 } else { 128 };
                    if id == 0 && precision == 0 {
                        return jpeg[j + 1..j + 65].to_vec();
                    }
                    j += 1 + size;
                }
            }
            i += 2 + len;
        }
        panic!("no luma DQT segment");
    }

    fn noisy_image() -> DynamicImage {
        let mut img = RgbImage::new(96, 64);
        let mut seed: u32 = 12345;
        for pixel in img.pixels_mut() {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let v = (seed >> 16) as u8;
            *pixel = Rgb([v, v.wrapping_mul(3), 255 - v]);
        }
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_jpeg_quantization_matches_quality_95() {
        // ITU-T T.81 Annex K 亮度表（自然顺序）
        const ANNEX_K_LUMA: [u32; 64] = [
            16, 11, 10, 16, 24, 40, 51, 61, 12, 12, 14, 19, 26, 58, 60, 55, 14, 13, 16, 24, 40, 57,
            69, 56, 14, 17, 22, 29, 51, 87, 80, 62, 18, 22, 37, 56, 68, 109, 103, 77, 24, 35, 55,
            64, 81, 104, 113, 92, 49, 64, 78, 87, 103, 121, 120, 101, 72, 92, 95, 98, 112, 100,
            103, 99,
        ];
        const ZIGZAG: [usize; 64] = [
            0, 1, 8, 16, 9, 2, 3, 10, 17, 24, 32, 25, 18, 11, 4, 5, 12, 19, 26, 33, 40, 48, 41, 34,
            27, 20, 13, 6, 7, 14, 21, 28, 35, 42, 49, 56, 57, 50, 43, 36, 29, 22, 15, 23, 30, 37,
            44, 51, 58, 59, 52, 45, 38, 31, 39, 46, 53, 60, 61, 54, 47, 55, 62, 63,
        ];

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("q.jpg");
        encode_image(&sample_rgb(), OutputFormat::Jpg, &dest).unwrap();

        // libjpeg 缩放：quality >= 50 时 scale = 200 - 2q
        let scale = 200 - 2 * 95;
        let expected: Vec<u8> = ZIGZAG
            .iter()
            .map(|&k| ((ANNEX_K_LUMA[k] * scale + 50) / 100).clamp(1, 255) as u8)
            .collect();
        assert_eq!(luma_dqt(&fs::read(&dest).unwrap()), expected);
    }

    #[test]
    fn test_jpeg_uses_optimized_huffman_tables() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("opt.jpg");
        let img = noisy_image();
        encode_image(&img, OutputFormat::Jpg, &dest).unwrap();

        let rgb = img.to_rgb8();
        let mut plain = Vec::new();
        Encoder::new(&mut plain, JPEG_QUALITY)
            .encode(
                rgb.as_raw(),
                rgb.width() as u16,
                rgb.height() as u16,
                ColorType::Rgb,
            )
            .unwrap();

        let optimized = fs::read(&dest).unwrap();
        assert_eq!(luma_dqt(&optimized), luma_dqt(&plain));
        assert!(
            optimized.len() < plain.len(),
            "optimized {} >= plain {}",
            optimized.len(),
            plain.len()
        );
    }

    #[test]
    fn test_discard_partial_reports_cleanup_failure() {
        let dir = TempDir::new().unwrap();
        // 目录无法用 remove_file 删除
        let stuck = dir.path().join("stuck.jpg");
        fs::create_dir(&stuck).unwrap();
        let original = HeicConvError::EncodeError {
            format: "JPEG".to_string(),
            path: stuck.display().to_string(),
            reason: "boom".to_string(),
        };

        let err = discard_partial(&stuck, original);

        assert!(matches!(err, HeicConvError::PartialOutputLeft { .. }));
        let msg = err.to_string();
        assert!(msg.contains("boom"));
        assert!(msg.contains("could not be removed"));
    }

    #[test]
    fn test_discard_partial_removes_file() {
        let dir = TempDir::new().unwrap();
        let partial = dir.path().join("partial.png");
        fs::write(&partial, b"half").unwrap();

        let err = discard_partial(
            &partial,
            HeicConvError::UnsupportedFormat("x".to_string()),
        );

        assert!(matches!(err, HeicConvError::UnsupportedFormat(_)));
        assert!(!partial.exists());
    }

    #[test]
    fn test_encode_failure_leaves_no_file() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("wide.jpg");
        let img = DynamicImage::ImageRgb8(RgbImage::new(70_000, 1));

        let err = encode_image(&img, OutputFormat::Jpg, &dest).unwrap_err();
        assert!(matches!(err, HeicConvError::EncodeError { .. }));
        assert!(!dest.exists());
    }
}
