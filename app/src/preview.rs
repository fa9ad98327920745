//! 缩略图预览
//!
//! 为每个加入集合的图片生成正方形缩略图（居中裁切填充），缓存在内存中，
//! 条目移除时释放。

use image::imageops::FilterType;
use image::RgbaImage;
use img2pdf_core::{ImageSource, PreviewError, PreviewProvider};
use std::collections::HashMap;

/// 缩略图句柄
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct PreviewHandle(u64);

pub struct ThumbnailPreviews {
    size: u32,
    next: u64,
    cache: HashMap<u64, RgbaImage>,
}

impl ThumbnailPreviews {
    pub fn new(size: u32) -> Self {
        Self {
            size: size.max(1),
            next: 0,
            cache: HashMap::new(),
        }
    }

    pub fn get(&self, handle: &PreviewHandle) -> Option<&RgbaImage> {
        self.cache.get(&handle.0)
    }

    /// 尚未释放的缩略图数量
    pub fn live_count(&self) -> usize {
        self.cache.len()
    }
}

impl PreviewProvider for ThumbnailPreviews {
    type Handle = PreviewHandle;

    fn create(&mut self, source: &ImageSource) -> Result<PreviewHandle, PreviewError> {
        let bytes = source.read_blocking()?;
        let img = image::load_from_memory(&bytes).map_err(|e| PreviewError::Decode(e.to_string()))?;
        let thumb = img
            .resize_to_fill(self.size, self.size, FilterType::Triangle)
            .to_rgba8();

        self.next += 1;
        self.cache.insert(self.next, thumb);
        log::debug!("[Preview] 生成缩略图 #{} ({})", self.next, source.name());
        Ok(PreviewHandle(self.next))
    }

    fn release(&mut self, handle: PreviewHandle) {
        if self.cache.remove(&handle.0).is_none() {
            log::warn!("[Preview] 重复释放缩略图 #{}", handle.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat};
    use img2pdf_core::ImageCollection;
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> ImageSource {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(RgbaImage::new(width, height))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        ImageSource::memory("p.png", bytes)
    }

    #[test]
    fn test_thumbnail_is_square() {
        let mut previews = ThumbnailPreviews::new(100);
        let handle = previews.create(&png(300, 120)).unwrap();
        assert_eq!(previews.get(&handle).unwrap().dimensions(), (100, 100));
        assert_eq!(previews.live_count(), 1);

        previews.release(handle);
        assert_eq!(previews.live_count(), 0);
    }

    #[test]
    fn test_undecodable_source() {
        let mut previews = ThumbnailPreviews::new(100);
        let err = previews
            .create(&ImageSource::memory("x.png", b"nope".to_vec()))
            .unwrap_err();
        assert!(matches!(err, PreviewError::Decode(_)));
        assert_eq!(previews.live_count(), 0);
    }

    #[test]
    fn test_repeated_add_remove_does_not_grow() {
        let mut collection = ImageCollection::new(ThumbnailPreviews::new(16));
        for _ in 0..5 {
            let ids = collection.add_images(vec![png(20, 20), png(30, 10)]);
            assert_eq!(collection.previews().live_count(), 2);
            for id in ids {
                collection.remove_image(id);
            }
            assert_eq!(collection.previews().live_count(), 0);
        }
    }
}
