//! 文档信息
//!
//! 在 Info 字典中写入生成工具与创建时间。

use lopdf::{Document, Object, StringFormat};

/// 工具信息
pub struct BrandInfo {
    pub name: &'static str,
    pub version: &'static str,
}

pub const BRAND: BrandInfo = BrandInfo {
    name: "img2pdf",
    version: env!("CARGO_PKG_VERSION"),
};

fn literal(value: &str) -> Object {
    Object::String(value.as_bytes().to_vec(), StringFormat::Literal)
}

/// 获取或创建 Info 字典，写入 Producer / Creator / CreationDate / ModDate
pub fn set_document_info(doc: &mut Document) {
    use chrono::Local;

    let info_id = match doc.trailer.get(b"Info") {
        Ok(Object::Reference(id)) => *id,
        _ => {
            let new_id = doc.add_object(Object::Dictionary(lopdf::Dictionary::new()));
            doc.trailer.set("Info", Object::Reference(new_id));
            new_id
        }
    };

    // PDF 日期格式 D:YYYYMMDDHHmmSS
    let now = Local::now();
    let pdf_date = format!("D:{}", now.format("%Y%m%d%H%M%S"));
    let producer = format!("{} v{}", BRAND.name, BRAND.version);

    if let Ok(Object::Dictionary(ref mut info_dict)) = doc.get_object_mut(info_id) {
        info_dict.set("Producer", literal(&producer));
        info_dict.set("Creator", literal(BRAND.name));
        info_dict.set("CreationDate", literal(&pdf_date));
        info_dict.set("ModDate", literal(&pdf_date));
    } else {
        log::warn!("[PDF] Info 字典不可写，跳过文档信息");
    }
}
