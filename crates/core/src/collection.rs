//! 有序图片集合
//!
//! 集合中的顺序就是导出 PDF 的页面顺序。所有条目以 `ImageId` 唯一标识，
//! 追加、移除、重排都不会产生重复或丢失。

use crate::preview::PreviewProvider;
use crate::source::ImageSource;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 图片条目标识，插入时生成，在条目生命周期内保持不变
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(Uuid);

impl ImageId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for ImageId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// 待导出的图片
#[derive(Debug)]
pub struct PendingImage<H> {
    id: ImageId,
    source: ImageSource,
    preview: Option<H>,
}

impl<H> PendingImage<H> {
    pub fn id(&self) -> ImageId {
        self.id
    }

    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    /// 预览句柄；预览生成失败时为 `None`
    pub fn preview(&self) -> Option<&H> {
        self.preview.as_ref()
    }
}

/// 快照中的单个条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotEntry {
    pub id: ImageId,
    pub source: ImageSource,
}

/// 集合在某一时刻的顺序副本，供导出使用
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionSnapshot {
    entries: Vec<SnapshotEntry>,
}

impl CollectionSnapshot {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[SnapshotEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SnapshotEntry> {
        self.entries.iter()
    }

    pub fn ids(&self) -> Vec<ImageId> {
        self.entries.iter().map(|e| e.id).collect()
    }
}

impl From<Vec<SnapshotEntry>> for CollectionSnapshot {
    fn from(entries: Vec<SnapshotEntry>) -> Self {
        Self { entries }
    }
}

impl<'a> IntoIterator for &'a CollectionSnapshot {
    type Item = &'a SnapshotEntry;
    type IntoIter = std::slice::Iter<'a, SnapshotEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// 有序、按 id 唯一的图片集合
///
/// 集合持有预览提供者，负责在移除、清空和销毁时释放预览资源。
pub struct ImageCollection<P: PreviewProvider> {
    entries: Vec<PendingImage<P::Handle>>,
    previews: P,
}

impl<P: PreviewProvider> ImageCollection<P> {
    pub fn new(previews: P) -> Self {
        Self {
            entries: Vec::new(),
            previews,
        }
    }

    /// 追加图片
    ///
    /// 每个输入生成一个新条目（新的 id），按输入顺序追加到末尾。
    /// 同一个文件添加两次会得到两个不同的条目。返回新条目的 id。
    pub fn add_images<I>(&mut self, sources: I) -> Vec<ImageId>
    where
        I: IntoIterator<Item = ImageSource>,
    {
        let mut added = Vec::new();
        for source in sources {
            let id = ImageId::generate();
            let preview = match self.previews.create(&source) {
                Ok(handle) => Some(handle),
                Err(e) => {
                    log::warn!("[Collection] 预览生成失败 {}: {}", source.name(), e);
                    None
                }
            };
            log::debug!("[Collection] 添加图片 {} ({})", id, source.name());
            self.entries.push(PendingImage {
                id,
                source,
                preview,
            });
            added.push(id);
        }
        log::info!(
            "[Collection] 新增 {} 张图片，共 {} 张",
            added.len(),
            self.entries.len()
        );
        added
    }

    /// 移除图片并释放其预览
    ///
    /// id 不存在时不做任何事，返回 `false`。
    pub fn remove_image(&mut self, id: ImageId) -> bool {
        let Some(index) = self.position(id) else {
            log::debug!("[Collection] 移除时未找到 {}", id);
            return false;
        };
        let entry = self.entries.remove(index);
        if let Some(handle) = entry.preview {
            self.previews.release(handle);
        }
        log::info!("[Collection] 移除图片 {}，剩余 {} 张", id, self.entries.len());
        true
    }

    /// 把 `moved` 移动到 `target` 当前所在的位置
    ///
    /// 单元素移动而非交换：两者之间的条目整体平移一位。
    /// `target` 为 `None`（拖到任何目标之外）、与 `moved` 相同或任一 id 不存在时不做任何事。
    pub fn reorder(&mut self, moved: ImageId, target: Option<ImageId>) -> bool {
        let Some(target) = target else {
            return false;
        };
        if moved == target {
            return false;
        }
        let (Some(from), Some(to)) = (self.position(moved), self.position(target)) else {
            log::debug!("[Collection] 重排时未找到 {} 或 {}", moved, target);
            return false;
        };
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        log::debug!("[Collection] 重排 {}: {} -> {}", moved, from, to);
        true
    }

    pub fn snapshot(&self) -> CollectionSnapshot {
        CollectionSnapshot {
            entries: self
                .entries
                .iter()
                .map(|e| SnapshotEntry {
                    id: e.id,
                    source: e.source.clone(),
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: ImageId) -> Option<&PendingImage<P::Handle>> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn position(&self, id: ImageId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    pub fn id_at(&self, index: usize) -> Option<ImageId> {
        self.entries.get(index).map(|e| e.id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PendingImage<P::Handle>> {
        self.entries.iter()
    }

    pub fn previews(&self) -> &P {
        &self.previews
    }

    /// 清空集合并释放全部预览
    pub fn clear(&mut self) {
        let count = self.entries.len();
        self.release_all();
        if count > 0 {
            log::info!("[Collection] 已清空 {} 张图片", count);
        }
    }

    fn release_all(&mut self) {
        for entry in std::mem::take(&mut self.entries) {
            if let Some(handle) = entry.preview {
                self.previews.release(handle);
            }
        }
    }
}

impl<P: PreviewProvider + Default> Default for ImageCollection<P> {
    fn default() -> Self {
        Self::new(P::default())
    }
}

impl<P: PreviewProvider> Drop for ImageCollection<P> {
    fn drop(&mut self) {
        self.release_all();
    }
}
