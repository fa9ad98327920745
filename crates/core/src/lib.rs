//! 图片集合管理
//!
//! 维护待导出图片的有序集合，以及每个条目对应的预览资源。

pub mod collection;
pub mod preview;
pub mod source;

pub use collection::{CollectionSnapshot, ImageCollection, ImageId, PendingImage, SnapshotEntry};
pub use preview::{NoPreview, PreviewError, PreviewProvider};
pub use source::ImageSource;
