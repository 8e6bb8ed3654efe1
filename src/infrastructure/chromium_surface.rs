//! Chromium 渲染区域 - 基础设施层
//!
//! 唯一的 page owner：写入成绩单 HTML、等待页面提交、截图并封装为 PDF。

use crate::config::Config;
use crate::error::{AppError, AppResult, BrowserError, CaptureFailure, RenderError};
use crate::infrastructure::pdf_encoder::encode_single_page;
use crate::infrastructure::{DocumentRenderer, PageCapturer, SURFACE_SELECTOR};
use crate::models::{ReportCard, TemplateConfig};
use crate::services::render_card_html;
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, Viewport};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use serde::Deserialize;
use tracing::{debug, warn};

/// A4 @ 96 DPI 的 CSS 像素宽度
pub const A4_WIDTH_PX: u32 = 794;
/// A4 @ 96 DPI 的 CSS 像素高度
pub const A4_HEIGHT_PX: u32 = 1123;

/// 等待页面真正"画好"：load 事件、字体、所有图片（成功或失败），再等两帧
const COMMIT_SCRIPT: &str = r#"
(async () => {
    if (document.readyState !== 'complete') {
        await new Promise(resolve => window.addEventListener('load', resolve, { once: true }));
    }
    if (document.fonts && document.fonts.ready) {
        await document.fonts.ready;
    }
    const images = Array.from(document.images);
    await Promise.all(images.map(img => img.complete ? Promise.resolve() : new Promise(resolve => {
        img.addEventListener('load', resolve, { once: true });
        img.addEventListener('error', resolve, { once: true });
    })));
    await new Promise(resolve => requestAnimationFrame(() => requestAnimationFrame(resolve)));
    return {
        images: images.length,
        broken: images.filter(img => img.naturalWidth === 0).length
    };
})()
"#;

/// 页面提交结果
#[derive(Debug, Deserialize)]
struct CommitReport {
    images: usize,
    broken: usize,
}

/// Chromium 渲染区域
pub struct ChromiumSurface {
    page: Page,
    raster_scale: f64,
    jpeg_quality: u8,
}

impl ChromiumSurface {
    /// 接管页面，并把视口固定为 A4 尺寸
    pub async fn new(page: Page, config: &Config) -> AppResult<Self> {
        page.execute(SetDeviceMetricsOverrideParams::new(
            A4_WIDTH_PX as i64,
            A4_HEIGHT_PX as i64,
            1.0,
            false,
        ))
        .await
        .map_err(|e| {
            AppError::Browser(BrowserError::ScriptExecutionFailed {
                source: Box::new(e),
            })
        })?;

        Ok(Self {
            page,
            raster_scale: config.raster_scale,
            jpeg_quality: config.jpeg_quality,
        })
    }

    /// 释放渲染区域
    pub async fn close(self) {
        if let Err(e) = self.page.close().await {
            debug!("关闭页面失败: {}", e);
        }
    }

    async fn wait_for_commit(&self) -> AppResult<CommitReport> {
        let result = self.page.evaluate(COMMIT_SCRIPT).await?;
        let report: CommitReport = result.into_value().map_err(|e| {
            AppError::Render(RenderError::ContentLoadFailed {
                source: Box::new(e),
            })
        })?;
        Ok(report)
    }
}

#[async_trait]
impl DocumentRenderer for ChromiumSurface {
    async fn surface_present(&self) -> bool {
        self.page.find_element(SURFACE_SELECTOR).await.is_ok()
    }

    async fn render(&mut self, card: &ReportCard, template: &TemplateConfig) -> AppResult<()> {
        let html = render_card_html(card, template);

        self.page.set_content(html).await.map_err(|e| {
            AppError::Render(RenderError::ContentLoadFailed {
                source: Box::new(e),
            })
        })?;

        let report = self.wait_for_commit().await?;
        if report.broken > 0 {
            warn!(
                "⚠️ 第 {} 张成绩单有 {}/{} 张图片加载失败",
                card.position, report.broken, report.images
            );
        }
        debug!("第 {} 张成绩单已提交 ({} 张图片)", card.position, report.images);
        Ok(())
    }
}

#[async_trait]
impl PageCapturer for ChromiumSurface {
    async fn capture(&mut self) -> Result<Vec<u8>, CaptureFailure> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Jpeg)
            .quality(self.jpeg_quality as i64)
            .clip(Viewport {
                x: 0.0,
                y: 0.0,
                width: A4_WIDTH_PX as f64,
                height: A4_HEIGHT_PX as f64,
                scale: self.raster_scale,
            })
            .build();

        let jpeg = self
            .page
            .screenshot(params)
            .await
            .map_err(|e| CaptureFailure::Rasterize(e.to_string()))?;
        debug!("截图完成: {} 字节", jpeg.len());

        // 编码是纯 CPU 工作，放到阻塞线程里
        tokio::task::spawn_blocking(move || encode_single_page(&jpeg))
            .await
            .map_err(|e| CaptureFailure::Encode(e.to_string()))?
    }
}
