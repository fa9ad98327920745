//! 多图片合成 PDF
//!
//! 把有序的图片快照导出为单个 PDF，每张图片一页。

mod compose;
mod decode;
mod export;
mod layout;
mod metadata;
mod save;

pub use compose::{ComposeError, LopdfComposer};
pub use decode::{encode_jpeg, DecodeError, EmbeddedImage, ImageDecoder, JpegDecoder, DEFAULT_JPEG_QUALITY};
pub use export::{ExportDriver, ExportError, ExportOptions, ExportReport, DEFAULT_FILE_NAME};
pub use layout::{PageLayout, Placement, MM_TO_PT};
pub use metadata::{set_document_info, BrandInfo, BRAND};
pub use save::{DirectorySaver, DocumentSaver};
