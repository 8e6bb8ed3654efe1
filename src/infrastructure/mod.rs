//! 基础设施层
//!
//! 持有稀缺资源（渲染页面），只向上暴露"渲染"和"截图"两种能力。
//! 两种能力共享同一块渲染区域，所以由同一个对象实现，并且同一时间只处理一张成绩单。

pub mod chromium_surface;
pub mod pdf_encoder;

pub use chromium_surface::ChromiumSurface;
pub use pdf_encoder::encode_single_page;

use crate::error::{AppResult, CaptureFailure};
use crate::models::{ReportCard, TemplateConfig};
use async_trait::async_trait;

/// 渲染区域的查找键
pub const SURFACE_SELECTOR: &str = "#export-container";

/// 成绩单渲染能力
#[async_trait]
pub trait DocumentRenderer: Send {
    /// 渲染区域当前是否存在
    async fn surface_present(&self) -> bool;

    /// 渲染一张成绩单，返回时画面已经完整提交（图片加载完成）
    async fn render(&mut self, card: &ReportCard, template: &TemplateConfig) -> AppResult<()>;
}

/// 截图并编码为单页 PDF 的能力
#[async_trait]
pub trait PageCapturer: Send {
    async fn capture(&mut self) -> Result<Vec<u8>, CaptureFailure>;
}
