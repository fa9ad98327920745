use img2pdf_pdf::{ExportOptions, PageLayout, DEFAULT_FILE_NAME, DEFAULT_JPEG_QUALITY};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_PREVIEW_SIZE: u32 = 100;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    /// 导出目录，未设置时使用系统下载目录
    pub output_dir: Option<String>,
    /// 导出文件名
    pub file_name: String,
    /// JPEG 嵌入质量 (1-100)
    pub jpeg_quality: u8,
    /// 预览缩略图边长（像素）
    pub preview_size: u32,
    /// 页面布局（毫米）
    pub layout: PageLayout,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            file_name: DEFAULT_FILE_NAME.to_string(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            preview_size: DEFAULT_PREVIEW_SIZE,
            layout: PageLayout::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config dir unavailable")]
    NoConfigDir,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ConfigResult<T> = Result<T, String>;

impl AppConfig {
    /// 导出目录
    pub fn output_dir(&self) -> PathBuf {
        match &self.output_dir {
            Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            file_name: self.file_name.clone(),
            layout: self.layout,
        }
    }

    /// 用环境变量覆盖配置项
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup("IMG2PDF_OUTPUT_DIR").filter(|v| !v.trim().is_empty()) {
            log::info!("[Config] 使用 IMG2PDF_OUTPUT_DIR: {}", dir);
            self.output_dir = Some(dir);
        }
        if let Some(raw) = lookup("IMG2PDF_JPEG_QUALITY") {
            match raw.trim().parse::<u8>() {
                Ok(q) if (1..=100).contains(&q) => self.jpeg_quality = q,
                _ => log::warn!("[Config] 忽略无效的 IMG2PDF_JPEG_QUALITY: {}", raw),
            }
        }
    }

    /// 把无效值恢复为默认值
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.file_name.trim().is_empty() || self.file_name.contains(['/', '\\']) {
            log::warn!("[Config] 无效文件名 {:?}，使用默认值", self.file_name);
            self.file_name = defaults.file_name;
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            log::warn!("[Config] 无效 JPEG 质量 {}，使用默认值", self.jpeg_quality);
            self.jpeg_quality = defaults.jpeg_quality;
        }
        if self.preview_size == 0 {
            self.preview_size = defaults.preview_size;
        }
        if !self.layout.is_valid() {
            log::warn!("[Config] 无效页面布局 {:?}，使用默认值", self.layout);
            self.layout = defaults.layout;
        }
        self
    }
}

/// 配置文件路径：`IMG2PDF_CONFIG`，否则 `<config_dir>/img2pdf/config.json`
pub fn config_path() -> Result<PathBuf, ConfigError> {
    if let Some(path) = std::env::var_os("IMG2PDF_CONFIG") {
        return Ok(PathBuf::from(path));
    }
    let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(base.join("img2pdf").join("config.json"))
}

pub fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub fn write_config(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let raw = serde_json::to_string_pretty(config)?;
    fs::write(path, raw)?;
    Ok(())
}

/// 加载配置（文件 + 环境变量），文件不存在时使用默认值
pub fn load_config() -> ConfigResult<AppConfig> {
    let path = config_path().map_err(|err| err.to_string())?;
    let mut config = read_config(&path).map_err(|err| err.to_string())?;
    config.apply_env_overrides();
    log::info!("[Config] 配置文件: {}", path.display());
    Ok(config.sanitized())
}

pub fn save_config(config: &AppConfig) -> ConfigResult<PathBuf> {
    let path = config_path().map_err(|err| err.to_string())?;
    write_config(&path, config).map_err(|err| err.to_string())?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = read_config(&dir.path().join("none.json")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.file_name, "images.pdf");
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = AppConfig {
            output_dir: Some("/tmp/out".into()),
            jpeg_quality: 70,
            ..Default::default()
        };
        write_config(&path, &config).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"jpegQuality\": 70"));
        assert_eq!(read_config(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"fileName": "album.pdf"}"#).unwrap();
        let config = read_config(&path).unwrap();
        assert_eq!(config.file_name, "album.pdf");
        assert_eq!(config.preview_size, DEFAULT_PREVIEW_SIZE);
    }

    #[test]
    fn test_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(read_config(&path), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("IMG2PDF_OUTPUT_DIR", "/data/pdfs"),
            ("IMG2PDF_JPEG_QUALITY", "55"),
        ]
        .into_iter()
        .collect();
        let mut config = AppConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.output_dir(), PathBuf::from("/data/pdfs"));
        assert_eq!(config.jpeg_quality, 55);
    }

    #[test]
    fn test_invalid_env_quality_ignored() {
        let mut config = AppConfig::default();
        config.apply_overrides(|key| (key == "IMG2PDF_JPEG_QUALITY").then(|| "250".to_string()));
        assert_eq!(config.jpeg_quality, DEFAULT_JPEG_QUALITY);
    }

    #[test]
    fn test_sanitized() {
        let config = AppConfig {
            file_name: "../x.pdf".into(),
            jpeg_quality: 0,
            preview_size: 0,
            layout: PageLayout {
                width: -1.0,
                ..Default::default()
            },
            ..Default::default()
        }
        .sanitized();
        assert_eq!(config, AppConfig::default());
    }
}
