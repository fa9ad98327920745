//! PDF 导出
//!
//! 按快照顺序逐个解码图片并组装页面。每个解码完成后才开始下一个，
//! 页面顺序即集合顺序；任一解码失败则中止，不保存任何文件。

use std::path::PathBuf;

use img2pdf_core::{CollectionSnapshot, ImageId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compose::{ComposeError, LopdfComposer};
use crate::decode::{DecodeError, ImageDecoder};
use crate::layout::PageLayout;
use crate::save::DocumentSaver;

pub const DEFAULT_FILE_NAME: &str = "images.pdf";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("没有可导出的图片")]
    NothingToExport,

    #[error("图片 {id} 解码失败: {source}")]
    DecodeFailed {
        id: ImageId,
        #[source]
        source: DecodeError,
    },

    #[error("PDF 生成失败: {0}")]
    Compose(#[from] ComposeError),

    #[error("保存失败: {0}")]
    Save(#[source] std::io::Error),
}

/// 导出选项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportOptions {
    pub file_name: String,
    pub layout: PageLayout,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_FILE_NAME.to_string(),
            layout: PageLayout::default(),
        }
    }
}

/// 导出结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportReport {
    pub file_name: String,
    pub location: PathBuf,
    pub page_count: usize,
    pub bytes: usize,
}

pub struct ExportDriver<D, S> {
    decoder: D,
    saver: S,
    options: ExportOptions,
}

impl<D: ImageDecoder, S: DocumentSaver> ExportDriver<D, S> {
    pub fn new(decoder: D, saver: S, options: ExportOptions) -> Self {
        Self {
            decoder,
            saver,
            options,
        }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    pub fn saver(&self) -> &S {
        &self.saver
    }

    /// 把快照导出为单个 PDF
    pub async fn export(&mut self, snapshot: &CollectionSnapshot) -> Result<ExportReport, ExportError> {
        if snapshot.is_empty() {
            log::warn!("[Export] 没有图片，跳过导出");
            return Err(ExportError::NothingToExport);
        }

        let total = snapshot.len();
        log::info!("[Export] 开始导出 {} 张图片", total);

        let mut composer = LopdfComposer::new(self.options.layout);
        for (index, entry) in snapshot.iter().enumerate() {
            let image = self.decoder.decode(&entry.source).await.map_err(|source| {
                log::error!(
                    "[Export] 第 {}/{} 张解码失败 {} ({}): {}",
                    index + 1,
                    total,
                    entry.source.name(),
                    entry.id,
                    source
                );
                ExportError::DecodeFailed {
                    id: entry.id,
                    source,
                }
            })?;
            composer.add_page(&image)?;
            log::info!("[Export] 第 {}/{} 页: {}", index + 1, total, entry.source.name());
        }

        let page_count = composer.page_count();
        let bytes = composer.finish()?;
        let location = self
            .saver
            .save(&self.options.file_name, &bytes)
            .map_err(ExportError::Save)?;

        log::info!("[Export] 导出完成: {} ({} 页)", location.display(), page_count);
        Ok(ExportReport {
            file_name: self.options.file_name.clone(),
            location,
            page_count,
            bytes: bytes.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{EmbeddedImage, JpegDecoder};
    use image::{DynamicImage, ImageFormat, RgbImage};
    use img2pdf_core::{ImageCollection, ImageSource, NoPreview};
    use lopdf::content::Content;
    use lopdf::Document;
    use std::cell::RefCell;
    use std::io::Cursor;
    use std::path::Path;

    /// 记录解码顺序后交给 JpegDecoder
    #[derive(Default)]
    struct RecordingDecoder {
        calls: RefCell<Vec<String>>,
        inner: JpegDecoder,
    }

    impl ImageDecoder for RecordingDecoder {
        async fn decode(&self, source: &ImageSource) -> Result<EmbeddedImage, DecodeError> {
            self.calls.borrow_mut().push(source.name());
            self.inner.decode(source).await
        }
    }

    #[derive(Default)]
    struct MemorySaver {
        saved: Vec<(String, Vec<u8>)>,
    }

    impl DocumentSaver for MemorySaver {
        fn save(&mut self, file_name: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
            self.saved.push((file_name.to_string(), bytes.to_vec()));
            Ok(Path::new("/memory").join(file_name))
        }
    }

    struct FailingSaver;

    impl DocumentSaver for FailingSaver {
        fn save(&mut self, _file_name: &str, _bytes: &[u8]) -> std::io::Result<PathBuf> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"))
        }
    }

    fn png(name: &str, width: u32) -> ImageSource {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(width, 10))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        ImageSource::memory(name, bytes)
    }

    fn broken(name: &str) -> ImageSource {
        ImageSource::memory(name, b"not an image".to_vec())
    }

    fn snapshot_of(sources: Vec<ImageSource>) -> (ImageCollection<NoPreview>, CollectionSnapshot) {
        let mut collection = ImageCollection::new(NoPreview);
        collection.add_images(sources);
        let snapshot = collection.snapshot();
        (collection, snapshot)
    }

    fn driver() -> ExportDriver<RecordingDecoder, MemorySaver> {
        ExportDriver::new(
            RecordingDecoder::default(),
            MemorySaver::default(),
            ExportOptions::default(),
        )
    }

    /// 读取每页图片宽度与 cm 操作数
    fn inspect_pages(bytes: &[u8]) -> Vec<(i64, Vec<f32>)> {
        let doc = Document::load_mem(bytes).unwrap();
        doc.get_pages()
            .values()
            .map(|&page_id| {
                let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
                let image_id = page
                    .get(b"Resources").unwrap().as_dict().unwrap()
                    .get(b"XObject").unwrap().as_dict().unwrap()
                    .get(b"Im0").unwrap().as_reference().unwrap();
                let width = doc
                    .get_object(image_id).unwrap().as_stream().unwrap()
                    .dict.get(b"Width").unwrap().as_i64().unwrap();

                let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
                let cm = content
                    .operations
                    .iter()
                    .find(|op| op.operator == "cm")
                    .unwrap()
                    .operands
                    .iter()
                    .map(|o| o.as_float().unwrap())
                    .collect();
                (width, cm)
            })
            .collect()
    }

    #[tokio::test]
    async fn test_empty_snapshot() {
        let mut driver = driver();
        let err = driver.export(&CollectionSnapshot::default()).await.unwrap_err();
        assert!(matches!(err, ExportError::NothingToExport));
        assert!(driver.decoder().calls.borrow().is_empty());
        assert!(driver.saver().saved.is_empty());
    }

    #[tokio::test]
    async fn test_three_pages_in_order_with_fixed_placement() {
        let (_collection, snapshot) =
            snapshot_of(vec![png("e1", 10), png("e2", 20), png("e3", 30)]);
        let mut driver = driver();

        let report = driver.export(&snapshot).await.unwrap();
        assert_eq!(report.page_count, 3);
        assert_eq!(report.file_name, "images.pdf");
        assert_eq!(*driver.decoder().calls.borrow(), vec!["e1", "e2", "e3"]);

        let saved = &driver.saver().saved;
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].0, "images.pdf");
        assert_eq!(report.bytes, saved[0].1.len());

        let pages = inspect_pages(&saved[0].1);
        let widths: Vec<i64> = pages.iter().map(|(w, _)| *w).collect();
        assert_eq!(widths, vec![10, 20, 30]);

        let p = PageLayout::default().placement();
        let expected = [p.width, 0.0, 0.0, p.height, p.x, p.y];
        for (_, cm) in &pages {
            assert_eq!(cm.len(), 6);
            for (actual, expected) in cm.iter().zip(expected) {
                assert!((*actual as f64 - expected).abs() < 0.01, "{} != {}", actual, expected);
            }
        }
    }

    #[tokio::test]
    async fn test_follows_reordered_collection() {
        let mut collection = ImageCollection::new(NoPreview);
        let ids = collection.add_images(vec![png("a", 11), png("b", 12), png("c", 13)]);
        collection.reorder(ids[2], Some(ids[0]));

        let mut driver = driver();
        driver.export(&collection.snapshot()).await.unwrap();
        assert_eq!(*driver.decoder().calls.borrow(), vec!["c", "a", "b"]);

        let widths: Vec<i64> = inspect_pages(&driver.saver().saved[0].1)
            .into_iter()
            .map(|(w, _)| w)
            .collect();
        assert_eq!(widths, vec![13, 11, 12]);
    }

    #[tokio::test]
    async fn test_decode_failure_short_circuits() {
        let (collection, snapshot) =
            snapshot_of(vec![png("e1", 10), broken("e2"), png("e3", 30)]);
        let bad_id = snapshot.entries()[1].id;
        let mut driver = driver();

        let err = driver.export(&snapshot).await.unwrap_err();
        match err {
            ExportError::DecodeFailed { id, source } => {
                assert_eq!(id, bad_id);
                assert!(matches!(source, DecodeError::Image(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(*driver.decoder().calls.borrow(), vec!["e1", "e2"]);
        assert!(driver.saver().saved.is_empty());
        assert_eq!(collection.len(), 3);
    }

    #[tokio::test]
    async fn test_save_failure() {
        let (_collection, snapshot) = snapshot_of(vec![png("only", 5)]);
        let mut driver = ExportDriver::new(
            JpegDecoder::default(),
            FailingSaver,
            ExportOptions::default(),
        );
        let err = driver.export(&snapshot).await.unwrap_err();
        assert!(matches!(err, ExportError::Save(_)));
    }

    #[tokio::test]
    async fn test_custom_file_name_and_layout() {
        let (_collection, snapshot) = snapshot_of(vec![png("only", 5)]);
        let layout = PageLayout {
            page_width: 100.0,
            page_height: 100.0,
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
        };
        let options = ExportOptions {
            file_name: "album.pdf".to_string(),
            layout,
        };
        let mut driver = ExportDriver::new(RecordingDecoder::default(), MemorySaver::default(), options);

        let report = driver.export(&snapshot).await.unwrap();
        assert_eq!(report.file_name, "album.pdf");
        assert!(report.location.ends_with("album.pdf"));

        let pages = inspect_pages(&driver.saver().saved[0].1);
        let cm = &pages[0].1;
        assert!(cm[4].abs() < 0.01 && cm[5].abs() < 0.01);
    }
}
