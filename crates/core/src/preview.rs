//! 预览资源
//!
//! 每个待导出图片在加入集合时生成一个预览句柄，移除或集合销毁时
//! 必须通过 `PreviewProvider::release` 显式释放。

use crate::source::ImageSource;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PreviewError {
    #[error("读取图片失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("预览生成失败: {0}")]
    Decode(String),
}

/// 预览资源提供者
///
/// `create` 与 `release` 成对调用；集合保证每个成功创建的句柄只释放一次。
pub trait PreviewProvider {
    type Handle;

    fn create(&mut self, source: &ImageSource) -> Result<Self::Handle, PreviewError>;

    fn release(&mut self, handle: Self::Handle);
}

/// 不生成预览
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPreview;

impl PreviewProvider for NoPreview {
    type Handle = ();

    fn create(&mut self, _source: &ImageSource) -> Result<(), PreviewError> {
        Ok(())
    }

    fn release(&mut self, _handle: ()) {}
}
