use crate::error::{AppError, AppResult, BrowserError};
use crate::infrastructure::chromium_surface::{A4_HEIGHT_PX, A4_WIDTH_PX};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::path::Path;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// 启动无头浏览器并打开一个空白页作为渲染区域
///
/// # 参数
/// - `chrome_executable`: 浏览器可执行文件路径，`None` 时由 chromiumoxide 自动查找
pub async fn launch_headless_browser(
    chrome_executable: Option<&str>,
) -> AppResult<(Browser, Page, JoinHandle<()>)> {
    info!("🚀 启动无头浏览器...");

    let mut builder = BrowserConfig::builder()
        .new_headless_mode()
        .window_size(A4_WIDTH_PX, A4_HEIGHT_PX)
        .args(vec![
            "--disable-gpu",
            "--no-sandbox",
            "--disable-dev-shm-usage",
            "--hide-scrollbars",
            "--font-render-hinting=none",
        ]);
    if let Some(path) = chrome_executable {
        debug!("使用浏览器: {}", path);
        builder = builder.chrome_executable(Path::new(path));
    }

    let config = builder.build().map_err(|e| {
        error!("配置无头浏览器失败: {}", e);
        AppError::Browser(BrowserError::ConfigurationFailed { message: e })
    })?;

    let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
        error!("启动无头浏览器失败: {}", e);
        AppError::Browser(BrowserError::LaunchFailed {
            source: Box::new(e),
        })
    })?;
    debug!("无头浏览器启动成功");

    // 在后台处理浏览器事件
    let handler_task = tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    let page = browser.new_page("about:blank").await.map_err(|e| {
        error!("创建页面失败: {}", e);
        AppError::Browser(BrowserError::PageCreationFailed {
            source: Box::new(e),
        })
    })?;

    info!("✅ 无头浏览器已就绪");
    Ok((browser, page, handler_task))
}
