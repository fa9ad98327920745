use serde::{Deserialize, Serialize};

/// 毫米到 PDF 点（1/72 英寸）
pub const MM_TO_PT: f64 = 72.0 / 25.4;

/// 页面布局（单位：毫米，左上角为原点）
///
/// 默认 A4 纵向，图片固定放在 (10, 10)，尺寸 180 x 160，不保持宽高比。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageLayout {
  pub page_width: f64,
  pub page_height: f64,
  pub x: f64,
  pub y: f64,
  pub width: f64,
  pub height: f64,
}

impl Default for PageLayout {
  fn default() -> Self {
    Self {
      page_width: 210.0,
      page_height: 297.0,
      x: 10.0,
      y: 10.0,
      width: 180.0,
      height: 160.0,
    }
  }
}

/// 图片在 PDF 坐标系中的位置（单位：点，左下角为原点）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
  pub x: f64,
  pub y: f64,
  pub width: f64,
  pub height: f64,
}

impl PageLayout {
  /// 页面尺寸（点）
  pub fn page_size_pt(&self) -> (f64, f64) {
    (self.page_width * MM_TO_PT, self.page_height * MM_TO_PT)
  }

  /// 将左上角原点的毫米坐标转换为 PDF 坐标
  pub fn placement(&self) -> Placement {
    Placement {
      x: self.x * MM_TO_PT,
      y: (self.page_height - self.y - self.height) * MM_TO_PT,
      width: self.width * MM_TO_PT,
      height: self.height * MM_TO_PT,
    }
  }

  /// 所有尺寸为正且图片原点落在页面内
  pub fn is_valid(&self) -> bool {
    let finite = [self.page_width, self.page_height, self.x, self.y, self.width, self.height]
      .iter()
      .all(|v| v.is_finite());
    finite
      && self.page_width > 0.0
      && self.page_height > 0.0
      && self.width > 0.0
      && self.height > 0.0
      && self.x >= 0.0
      && self.y >= 0.0
      && self.x < self.page_width
      && self.y < self.page_height
  }
}
