//! 文档保存

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// 导出完成后的保存目标
pub trait DocumentSaver {
    /// 保存完整文档，返回最终位置
    fn save(&mut self, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf>;
}

/// 保存到指定目录
///
/// 先写入同目录下的临时文件再重命名，写入失败不会留下残缺的 PDF。
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DocumentSaver for DirectorySaver {
    fn save(&mut self, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        if file_name.is_empty() || file_name.contains(['/', '\\']) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("无效文件名: {:?}", file_name),
            ));
        }

        fs::create_dir_all(&self.dir)?;
        let target = self.dir.join(file_name);
        let partial = self.dir.join(format!(".{}.part", file_name));

        if let Err(e) = fs::write(&partial, bytes).and_then(|_| fs::rename(&partial, &target)) {
            let _ = fs::remove_file(&partial);
            return Err(e);
        }

        log::info!("[Save] 已保存 {} ({} bytes)", target.display(), bytes.len());
        Ok(target)
    }
}
