//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：日志文件、加载并校验输入、获取浏览器、创建渲染区域
//! 2. **运行导出**：按配置选择单个或批量导出，转发进度日志
//! 3. **资源管理**：持有 Browser 和 ChromiumSurface，结束时释放
//! 4. **写出产物**：通过 OutputSink 写入输出目录

use crate::browser;
use crate::config::{BrowserMode, Config, ExportMode};
use crate::infrastructure::ChromiumSurface;
use crate::models::{load_dataset, load_mapping, load_template, Dataset, FieldMapping, TemplateConfig};
use crate::orchestrator::export_controller::{CancelFlag, ExportController, ExportOptions, ExportReport};
use crate::orchestrator::export_job::ExportSnapshot;
use crate::services::OutputSink;
use crate::utils::logging;
use anyhow::{Context, Result};
use chromiumoxide::Browser;
use std::path::Path;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    dataset: Dataset,
    mapping: FieldMapping,
    template: TemplateConfig,
    browser: Browser,
    handler: JoinHandle<()>,
    surface: ChromiumSurface,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        config.validate()?;

        // 初始化日志文件
        logging::init_log_file(&config.output_log_file)?;
        logging::log_startup(&config);

        // 加载输入
        let dataset = load_dataset(Path::new(&config.input_csv))
            .await
            .context("读取学生数据失败")?;
        let mapping = load_mapping(Path::new(&config.mapping_file))
            .await
            .context("读取字段映射失败")?;
        let template = load_template(Path::new(&config.template_file))
            .await
            .context("读取模板配置失败")?;
        mapping.validate(&dataset).context("字段映射与数据不匹配")?;

        logging::log_dataset_loaded(dataset.len(), mapping.subject_fields.len());

        // 获取浏览器
        let (browser, page, handler) = match config.browser_mode {
            BrowserMode::Launch => {
                browser::launch_headless_browser(config.chrome_executable.as_deref()).await?
            }
            BrowserMode::Connect => {
                browser::connect_to_browser_and_page(config.browser_debug_port).await?
            }
        };

        let surface = ChromiumSurface::new(page, &config).await?;

        Ok(Self {
            config,
            dataset,
            mapping,
            template,
            browser,
            handler,
            surface,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(mut self) -> Result<()> {
        let cancel = CancelFlag::new();
        let ctrl_c = spawn_ctrl_c_listener(cancel.clone());

        let (tx, rx) = mpsc::unbounded_channel();
        let progress_logger = tokio::spawn(log_progress(rx));

        let outcome = {
            let mut controller = ExportController::new(
                &mut self.surface,
                &self.mapping,
                &self.template,
                ExportOptions::from_config(&self.config),
            )
            .with_cancel_flag(cancel)
            .with_progress(tx);

            match self.config.export_mode {
                ExportMode::Bulk => controller.export_bulk(&self.dataset).await,
                ExportMode::Single => {
                    controller
                        .export_single(&self.dataset, self.config.single_index)
                        .await
                }
            }
        };

        // controller 已释放，发送端关闭后日志任务自然结束
        let _ = progress_logger.await;
        ctrl_c.abort();

        let result = match outcome {
            Ok(report) => self.write_report(&report).await,
            Err(e) => {
                error!("❌ 导出失败: {}", e);
                let _ = logging::append_log_line(
                    &self.config.output_log_file,
                    &format!("导出失败: {}", e),
                );
                Err(e.into())
            }
        };

        self.shutdown().await;
        result
    }

    /// 写出产物并输出统计
    async fn write_report(&self, report: &ExportReport) -> Result<()> {
        let log_file = &self.config.output_log_file;

        match &report.artifact {
            Some(artifact) => {
                let sink = OutputSink::new(&self.config.output_dir);
                let path = sink.write(artifact).await?;
                info!("💾 已保存: {}", path.display());
                logging::append_log_line(log_file, &format!("产物: {}", path.display()))?;
            }
            None => warn!("⚠️ 没有生成任何文件"),
        }

        logging::append_log_line(
            log_file,
            &format!(
                "成功: {}/{}，失败: {}",
                report.succeeded, report.total, report.failed
            ),
        )?;
        logging::print_final_stats(report.succeeded, report.failed, report.total, log_file);
        Ok(())
    }

    /// 释放页面；自行启动的浏览器一并关闭
    async fn shutdown(mut self) {
        self.surface.close().await;

        if self.config.browser_mode == BrowserMode::Launch {
            if let Err(e) = self.browser.close().await {
                warn!("⚠️ 关闭浏览器失败: {}", e);
            }
            let _ = self.browser.wait().await;
        }
        self.handler.abort();
    }
}

/// Ctrl-C 时设置取消标记，当前记录完成后停止
fn spawn_ctrl_c_listener(cancel: CancelFlag) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("⚠️ 收到中断信号，将在当前记录完成后停止");
            cancel.cancel();
        }
    })
}

// ========== 日志辅助函数 ==========

async fn log_progress(mut rx: mpsc::UnboundedReceiver<ExportSnapshot>) {
    let mut last_status = String::new();
    while let Some(snapshot) = rx.recv().await {
        if snapshot.status.is_empty() || snapshot.status == last_status {
            continue;
        }
        match snapshot.progress {
            Some(pct) => info!("📦 [{:>3}%] {}", pct, snapshot.status),
            None => info!("📦 {}", snapshot.status),
        }
        last_status = snapshot.status;
    }
}
