use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use thiserror::Error;

use crate::decode::EmbeddedImage;
use crate::layout::PageLayout;
use crate::metadata::set_document_info;

#[derive(Error, Debug)]
pub enum ComposeError {
  #[error("PDF 对象错误: {0}")]
  Pdf(#[from] lopdf::Error),

  #[error("文档没有页面")]
  Empty,

  #[error("保存 PDF 失败: {0}")]
  Save(String),
}

/// 基于 lopdf 的逐页组装器
///
/// 每页嵌入一张 JPEG 图片，按 `PageLayout` 的固定位置与尺寸绘制。
pub struct LopdfComposer {
  doc: Document,
  pages_id: ObjectId,
  page_ids: Vec<ObjectId>,
  layout: PageLayout,
}

impl LopdfComposer {
  pub fn new(layout: PageLayout) -> Self {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    Self {
      doc,
      pages_id,
      page_ids: Vec::new(),
      layout,
    }
  }

  pub fn page_count(&self) -> usize {
    self.page_ids.len()
  }

  /// 追加一页
  pub fn add_page(&mut self, image: &EmbeddedImage) -> Result<(), ComposeError> {
    let mut image_stream = Stream::new(
      dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => image.width as i64,
        "Height" => image.height as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
        "Filter" => "DCTDecode",
      },
      image.jpeg.clone(),
    );
    // JPEG 数据已经是压缩格式
    image_stream.allows_compression = false;
    let image_id = self.doc.add_object(image_stream);

    let p = self.layout.placement();
    let content = Content {
      operations: vec![
        Operation::new("q", vec![]),
        Operation::new(
          "cm",
          vec![
            Object::Real(p.width as f32),
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(p.height as f32),
            Object::Real(p.x as f32),
            Object::Real(p.y as f32),
          ],
        ),
        Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
        Operation::new("Q", vec![]),
      ],
    };
    let content_id = self.doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    let (page_w, page_h) = self.layout.page_size_pt();
    let page_id = self.doc.add_object(dictionary! {
      "Type" => "Page",
      "Parent" => self.pages_id,
      "MediaBox" => vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Real(page_w as f32),
        Object::Real(page_h as f32),
      ],
      "Resources" => dictionary! {
        "XObject" => dictionary! {
          "Im0" => image_id,
        },
      },
      "Contents" => content_id,
    });
    self.page_ids.push(page_id);

    log::debug!(
      "[PDF] 添加页面 {} ({}x{} px, {} bytes)",
      self.page_ids.len(),
      image.width,
      image.height,
      image.jpeg.len()
    );
    Ok(())
  }

  /// 写入页面树、目录和文档信息，返回 PDF 字节
  pub fn finish(mut self) -> Result<Vec<u8>, ComposeError> {
    if self.page_ids.is_empty() {
      return Err(ComposeError::Empty);
    }

    let kids: Vec<Object> = self.page_ids.iter().map(|id| Object::Reference(*id)).collect();
    let pages = dictionary! {
      "Type" => "Pages",
      "Kids" => kids,
      "Count" => self.page_ids.len() as i64,
    };
    self.doc.objects.insert(self.pages_id, Object::Dictionary(pages));

    let catalog_id = self.doc.add_object(dictionary! {
      "Type" => "Catalog",
      "Pages" => self.pages_id,
    });
    self.doc.trailer.set("Root", catalog_id);

    set_document_info(&mut self.doc);
    self.doc.compress();

    let mut output = Vec::new();
    self.doc
      .save_to(&mut output)
      .map_err(|e| ComposeError::Save(e.to_string()))?;
    Ok(output)
  }
}
