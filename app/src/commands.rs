//! 会话命令
//!
//! 对应界面上的操作：选择图片、拖拽排序、移除、生成 PDF。
//! 错误统一转换为可直接展示的字符串。

use img2pdf_core::{ImageId, ImageSource};
use img2pdf_pdf::{ExportError, ExportReport};
use serde::Serialize;
use std::path::PathBuf;

use crate::config::{self, AppConfig};
use crate::session::Session;

pub const NOTHING_TO_EXPORT: &str = "No images to generate a PDF";

/// 图片信息（返回给界面）
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInfo {
    pub id: ImageId,
    pub position: usize,
    pub name: String,
    pub path: Option<String>,
    pub preview: Option<(u32, u32)>,
}

fn parse_id(raw: &str) -> Result<ImageId, String> {
    raw.parse::<ImageId>()
        .map_err(|e| format!("无效的图片 id {:?}: {}", raw, e))
}

/// 列出当前顺序
pub fn list_images(session: &Session) -> Vec<ImageInfo> {
    session
        .collection()
        .iter()
        .enumerate()
        .map(|(index, image)| ImageInfo {
            id: image.id(),
            position: index + 1,
            name: image.source().name(),
            path: image.source().path().map(|p| p.to_string_lossy().to_string()),
            preview: session.preview_dimensions(image),
        })
        .collect()
}

/// 选择图片：按给定顺序追加到末尾
pub fn add_images(session: &mut Session, paths: Vec<String>) -> Result<Vec<ImageInfo>, String> {
    if paths.is_empty() {
        return Err("没有选择任何文件".to_string());
    }

    let sources = paths.into_iter().map(|p| ImageSource::file(PathBuf::from(p)));
    let added = session.collection_mut().add_images(sources);
    Ok(list_images(session)
        .into_iter()
        .filter(|info| added.contains(&info.id))
        .collect())
}

/// 移除图片；id 不存在时返回 `false`
pub fn remove_image(session: &mut Session, id: String) -> Result<bool, String> {
    let id = parse_id(&id)?;
    Ok(session.collection_mut().remove_image(id))
}

/// 拖拽结束：把 `moved` 放到 `target` 的位置，`target` 为空表示拖到了列表之外
pub fn reorder_images(session: &mut Session, moved: String, target: Option<String>) -> Result<bool, String> {
    let moved = parse_id(&moved)?;
    let target = target.as_deref().map(parse_id).transpose()?;
    Ok(session.collection_mut().reorder(moved, target))
}

/// 生成 PDF
pub async fn generate_pdf(session: &Session) -> Result<ExportReport, String> {
    session.export().await.map_err(|e| match e {
        ExportError::NothingToExport => NOTHING_TO_EXPORT.to_string(),
        ExportError::DecodeFailed { id, source } => {
            let name = session
                .collection()
                .get(id)
                .map(|image| image.source().name())
                .unwrap_or_else(|| id.to_string());
            format!("无法读取图片 {}: {}", name, source)
        }
        other => other.to_string(),
    })
}

pub fn show_config(session: &Session) -> Result<String, String> {
    serde_json::to_string_pretty(session.config()).map_err(|e| e.to_string())
}

pub fn save_config(session: &Session) -> Result<PathBuf, String> {
    config::save_config(session.config())
}

pub fn reload_config(session: &mut Session) -> Result<AppConfig, String> {
    let config = config::load_config()?;
    session.set_config(config.clone());
    Ok(config)
}
