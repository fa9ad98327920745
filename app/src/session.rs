use img2pdf_core::{ImageCollection, PendingImage};
use img2pdf_pdf::{DirectorySaver, ExportDriver, ExportError, ExportReport, JpegDecoder};

use crate::config::AppConfig;
use crate::preview::{PreviewHandle, ThumbnailPreviews};

/// 一次会话的全部状态
///
/// 图片只保存在内存中；会话结束时集合被销毁，所有缩略图随之释放。
pub struct Session {
    collection: ImageCollection<ThumbnailPreviews>,
    config: AppConfig,
}

impl Session {
    pub fn new(config: AppConfig) -> Self {
        Self {
            collection: ImageCollection::new(ThumbnailPreviews::new(config.preview_size)),
            config,
        }
    }

    pub fn collection(&self) -> &ImageCollection<ThumbnailPreviews> {
        &self.collection
    }

    pub fn collection_mut(&mut self) -> &mut ImageCollection<ThumbnailPreviews> {
        &mut self.collection
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// 更新配置；缩略图尺寸只对之后添加的图片生效
    pub fn set_config(&mut self, config: AppConfig) {
        self.config = config;
    }

    pub fn preview_dimensions(&self, image: &PendingImage<PreviewHandle>) -> Option<(u32, u32)> {
        image
            .preview()
            .and_then(|handle| self.collection.previews().get(handle))
            .map(|thumb| thumb.dimensions())
    }

    /// 按当前顺序导出
    pub async fn export(&self) -> Result<ExportReport, ExportError> {
        let snapshot = self.collection.snapshot();
        let mut driver = ExportDriver::new(
            JpegDecoder::new(self.config.jpeg_quality),
            DirectorySaver::new(self.config.output_dir()),
            self.config.export_options(),
        );
        driver.export(&snapshot).await
    }
}
