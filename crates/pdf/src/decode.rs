//! 图片解码
//!
//! 读取原始图片并重新编码为 JPEG，任何来源格式都以 `/DCTDecode` 嵌入 PDF。

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Rgb, RgbImage};
use img2pdf_core::ImageSource;
use thiserror::Error;

pub const DEFAULT_JPEG_QUALITY: u8 = 92;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("读取失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("图片解码失败: {0}")]
    Image(#[from] image::ImageError),

    #[error("解码任务异常: {0}")]
    Task(String),
}

/// 可嵌入 PDF 的 JPEG 图片
#[derive(Clone)]
pub struct EmbeddedImage {
    pub width: u32,
    pub height: u32,
    pub jpeg: Vec<u8>,
}

impl std::fmt::Debug for EmbeddedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("jpeg_len", &self.jpeg.len())
            .finish()
    }
}

/// 把图片来源解码为可嵌入的图片
#[allow(async_fn_in_trait)]
pub trait ImageDecoder {
    async fn decode(&self, source: &ImageSource) -> Result<EmbeddedImage, DecodeError>;
}

#[derive(Debug, Clone, Copy)]
pub struct JpegDecoder {
    quality: u8,
}

impl JpegDecoder {
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }
}

impl Default for JpegDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

impl ImageDecoder for JpegDecoder {
    async fn decode(&self, source: &ImageSource) -> Result<EmbeddedImage, DecodeError> {
        let bytes = source.read().await?;
        let quality = self.quality;
        tokio::task::spawn_blocking(move || encode_jpeg(&bytes, quality))
            .await
            .map_err(|e| DecodeError::Task(e.to_string()))?
    }
}

/// 解码任意支持的格式并编码为 JPEG
pub fn encode_jpeg(bytes: &[u8], quality: u8) -> Result<EmbeddedImage, DecodeError> {
    let img = image::load_from_memory(bytes)?;
    let rgb = flatten_to_rgb(&img);
    let (width, height) = rgb.dimensions();

    let mut jpeg = Vec::new();
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut jpeg, quality);
        encoder.encode_image(&rgb)?;
    }

    Ok(EmbeddedImage {
        width,
        height,
        jpeg,
    })
}

/// 去掉透明通道，透明区域按白色背景合成
fn flatten_to_rgb(img: &DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }

    let rgba = img.to_rgba8();
    let mut rgb = RgbImage::new(rgba.width(), rgba.height());
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as u32;
        let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        rgb.put_pixel(x, y, Rgb([blend(r), blend(g), blend(b)]));
    }
    rgb
}
