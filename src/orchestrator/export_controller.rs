//! 导出控制器 - 编排层
//!
//! ## 职责
//!
//! 按数据集顺序逐条驱动"渲染 -> 截图 -> 编码"，收集产物并生成最终文件。
//!
//! ## 设计特点
//!
//! - **严格串行**：上一条记录截图结束前，不会开始渲染下一条
//! - **独占渲染区域**：任务期间以 `&mut` 借用渲染器
//! - **单条失败不影响整体**：截图失败或渲染超时只跳过当前记录
//! - **渲染区域缺失即中止**：截图前找不到渲染区域时不产生任何产物
//! - **协作式取消**：在两条记录之间检查取消标记

use crate::config::{Config, ExportMode};
use crate::error::{AppError, AppResult, ExportError, RenderError};
use crate::infrastructure::{DocumentRenderer, PageCapturer, SURFACE_SELECTOR};
use crate::models::{Dataset, FieldMapping, StudentRecord, TemplateConfig};
use crate::orchestrator::export_job::{ExportJob, ExportPhase, ExportSnapshot};
use crate::services::{ArchiveBuilder, ExportArtifact, NamePolicy, BULK_ARCHIVE_NAME};
use crate::workflow::{prepare_card, RecordCtx};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info, warn};

/// 导出选项
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportOptions {
    /// 单条记录渲染的最长等待时间
    pub render_timeout: Option<Duration>,
    pub name_policy: NamePolicy,
}

impl ExportOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            render_timeout: config.render_timeout(),
            name_policy: if config.dedupe_archive_names {
                NamePolicy::AppendPosition
            } else {
                NamePolicy::Overwrite
            },
        }
    }
}

/// 取消标记，可在任务外部（例如 Ctrl-C 处理）设置
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// 导出结果
#[derive(Debug)]
pub struct ExportReport {
    /// 单个导出失败时为 None
    pub artifact: Option<ExportArtifact>,
    pub succeeded: usize,
    pub failed: usize,
    pub total: usize,
    pub phase: ExportPhase,
}

/// 单条记录的失败类型
enum RecordFailure {
    /// 需要中止整个任务
    Fatal(AppError),
    /// 跳过当前记录
    Skipped(String),
}

/// 导出控制器
pub struct ExportController<'a, S> {
    surface: &'a mut S,
    mapping: &'a FieldMapping,
    template: &'a TemplateConfig,
    options: ExportOptions,
    cancel: CancelFlag,
    progress: Option<UnboundedSender<ExportSnapshot>>,
}

impl<'a, S> ExportController<'a, S>
where
    S: DocumentRenderer + PageCapturer,
{
    pub fn new(
        surface: &'a mut S,
        mapping: &'a FieldMapping,
        template: &'a TemplateConfig,
        options: ExportOptions,
    ) -> Self {
        Self {
            surface,
            mapping,
            template,
            options,
            cancel: CancelFlag::new(),
            progress: None,
        }
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// 每次状态变化都会把快照发送到该通道
    pub fn with_progress(mut self, tx: UnboundedSender<ExportSnapshot>) -> Self {
        self.progress = Some(tx);
        self
    }

    /// 导出单个学生的 PDF
    pub async fn export_single(&mut self, dataset: &Dataset, index: usize) -> AppResult<ExportReport> {
        let total = dataset.len();
        let record = dataset
            .records
            .get(index)
            .ok_or(ExportError::IndexOutOfRange { index, total })?;

        let ctx = RecordCtx::new(record, self.mapping, index, total);
        let mut job = ExportJob::new(ExportMode::Single, 1);
        self.publish(&job);

        if self.cancel.is_cancelled() {
            return Err(self.cancelled(&mut job));
        }

        job.start_record(index, &ctx.safe_name)?;
        self.publish(&job);
        info!("{} 🚀 开始生成 PDF", ctx);

        let artifact = match self.process_record(&mut job, &ctx, record).await {
            Ok(bytes) => {
                job.item_succeeded()?;
                info!("{} ✓ PDF 生成成功 ({} 字节)", ctx, bytes.len());
                Some(ExportArtifact {
                    file_name: ctx.file_name(),
                    bytes,
                })
            }
            Err(RecordFailure::Skipped(reason)) => {
                job.item_failed(&ctx.safe_name)?;
                error!("{} ❌ PDF 生成失败: {}", ctx, reason);
                None
            }
            Err(RecordFailure::Fatal(e)) => return Err(self.abort(&mut job, e)),
        };
        self.publish(&job);

        Ok(report(&job, artifact))
    }

    /// 导出全部学生，打包为一个 zip
    pub async fn export_bulk(&mut self, dataset: &Dataset) -> AppResult<ExportReport> {
        let total = dataset.len();
        if total == 0 {
            return Err(ExportError::NothingToExport.into());
        }

        let mut job = ExportJob::new(ExportMode::Bulk, total);
        let mut archive = ArchiveBuilder::new(self.options.name_policy);
        self.publish(&job);
        info!("🚀 开始批量导出，共 {} 名学生", total);

        for (index, record) in dataset.records.iter().enumerate() {
            if self.cancel.is_cancelled() {
                return Err(self.cancelled(&mut job));
            }

            let ctx = RecordCtx::new(record, self.mapping, index, total);
            job.start_record(index, &ctx.safe_name)?;
            self.publish(&job);

            match self.process_record(&mut job, &ctx, record).await {
                Ok(bytes) => {
                    let entry = archive.add(&ctx.safe_name, ctx.position, bytes);
                    job.item_succeeded()?;
                    info!("{} ✓ 已加入压缩包: {}", ctx, entry);
                }
                Err(RecordFailure::Skipped(reason)) => {
                    job.item_failed(&ctx.safe_name)?;
                    warn!("{} ⚠️ 已跳过: {}", ctx, reason);
                }
                Err(RecordFailure::Fatal(e)) => return Err(self.abort(&mut job, e)),
            }
            self.publish(&job);
        }

        job.finalize()?;
        self.publish(&job);
        info!("📦 正在压缩 {} 个文件...", archive.len());

        let finished = tokio::task::spawn_blocking(move || archive.finish())
            .await
            .map_err(|e| AppError::Other(format!("压缩任务异常退出: {}", e)));
        let bytes = match finished.and_then(|r| r) {
            Ok(bytes) => bytes,
            Err(e) => return Err(self.abort(&mut job, e)),
        };

        job.finish()?;
        self.publish(&job);

        Ok(report(
            &job,
            Some(ExportArtifact {
                file_name: BULK_ARCHIVE_NAME.to_string(),
                bytes,
            }),
        ))
    }

    /// 渲染并截图一条记录
    async fn process_record(
        &mut self,
        job: &mut ExportJob,
        ctx: &RecordCtx,
        record: &StudentRecord,
    ) -> Result<Vec<u8>, RecordFailure> {
        // 渲染区域由 render 写入，只在截图前检查
        let card = prepare_card(record, self.mapping, self.template, ctx.position);
        debug!(
            "{} 成绩: {}",
            ctx,
            serde_json::to_string(&card.result).unwrap_or_default()
        );

        match self.render_with_watchdog(&card).await {
            Ok(()) => {}
            Err(e) if e.is_surface_missing() => return Err(RecordFailure::Fatal(e)),
            Err(e) => return Err(RecordFailure::Skipped(e.to_string())),
        }
        job.rendered().map_err(|e| RecordFailure::Fatal(e.into()))?;
        self.publish(job);

        self.ensure_surface().await?;

        self.surface
            .capture()
            .await
            .map_err(|e| RecordFailure::Skipped(e.to_string()))
    }

    async fn ensure_surface(&self) -> Result<(), RecordFailure> {
        if self.surface.surface_present().await {
            Ok(())
        } else {
            Err(RecordFailure::Fatal(AppError::surface_missing(
                SURFACE_SELECTOR,
            )))
        }
    }

    async fn render_with_watchdog(&mut self, card: &crate::models::ReportCard) -> AppResult<()> {
        let render = self.surface.render(card, self.template);
        match self.options.render_timeout {
            Some(limit) => match tokio::time::timeout(limit, render).await {
                Ok(result) => result,
                Err(_) => Err(RenderError::CommitTimeout {
                    timeout_ms: limit.as_millis() as u64,
                }
                .into()),
            },
            None => render.await,
        }
    }

    fn cancelled(&self, job: &mut ExportJob) -> AppError {
        warn!("⚠️ 导出已取消 (已完成 {}/{})", job.completed(), job.total());
        job.abort("Export cancelled");
        self.publish(job);
        ExportError::Cancelled {
            completed: job.completed(),
            total: job.total(),
        }
        .into()
    }

    fn abort(&self, job: &mut ExportJob, err: AppError) -> AppError {
        error!("❌ 导出中止: {}", err);
        job.abort(format!("Export failed: {}", err));
        self.publish(job);
        err
    }

    fn publish(&self, job: &ExportJob) {
        if let Some(tx) = &self.progress {
            // 接收方已关闭时忽略
            let _ = tx.send(job.snapshot());
        }
    }
}

fn report(job: &ExportJob, artifact: Option<ExportArtifact>) -> ExportReport {
    ExportReport {
        artifact,
        succeeded: job.succeeded(),
        failed: job.failed(),
        total: job.total(),
        phase: job.phase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CaptureFailure;
    use crate::models::ReportCard;
    use async_trait::async_trait;
    use std::io::{Cursor, Read};
    use tokio::sync::mpsc;
    use tokio_test::{assert_err, assert_ok};

    /// 假的渲染区域，记录调用情况
    #[derive(Default)]
    struct FakeSurface {
        missing: bool,
        /// 像空白页一样，第一次渲染之前没有渲染区域
        blank_until_render: bool,
        /// 第 n 次截图失败（从1开始）
        fail_captures: Vec<usize>,
        /// 渲染第 n 条时永远不提交画面
        hang_renders: Vec<usize>,
        rendered: Vec<String>,
        captures: usize,
        cancel_after_capture: Option<(usize, CancelFlag)>,
    }

    #[async_trait]
    impl DocumentRenderer for FakeSurface {
        async fn surface_present(&self) -> bool {
            !self.missing && !(self.blank_until_render && self.rendered.is_empty())
        }

        async fn render(&mut self, card: &ReportCard, _template: &TemplateConfig) -> AppResult<()> {
            self.rendered
                .push(card.student_name.clone().unwrap_or_default());
            if self.hang_renders.contains(&self.rendered.len()) {
                std::future::pending::<()>().await;
            }
            Ok(())
        }
    }

    #[async_trait]
    impl PageCapturer for FakeSurface {
        async fn capture(&mut self) -> Result<Vec<u8>, CaptureFailure> {
            self.captures += 1;
            if let Some((n, flag)) = &self.cancel_after_capture {
                if *n == self.captures {
                    flag.cancel();
                }
            }
            if self.fail_captures.contains(&self.captures) {
                return Err(CaptureFailure::Rasterize("boom".into()));
            }
            Ok(format!("pdf-{}", self.captures).into_bytes())
        }
    }

    fn dataset(names: &[&str]) -> Dataset {
        let headers = vec!["Name".to_string(), "Math".to_string()];
        let rows = names
            .iter()
            .map(|n| vec![n.to_string(), "75".to_string()])
            .collect();
        Dataset::from_rows(headers, rows).unwrap()
    }

    fn mapping() -> FieldMapping {
        FieldMapping {
            name_field: "Name".into(),
            subject_fields: vec!["Math".into()],
            ..Default::default()
        }
    }

    fn zip_entries(bytes: &[u8]) -> Vec<(String, String)> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..archive.len())
            .map(|i| {
                let mut file = archive.by_index(i).unwrap();
                let mut content = String::new();
                file.read_to_string(&mut content).unwrap();
                (file.name().to_string(), content)
            })
            .collect()
    }

    #[tokio::test]
    async fn test_bulk_skips_failed_capture() {
        let data = dataset(&["Ann Lee", "Bob", "Cy"]);
        let (mapping, template) = (mapping(), TemplateConfig::default());
        let mut surface = FakeSurface {
            fail_captures: vec![2],
            ..Default::default()
        };
        let (tx, mut rx) = mpsc::unbounded_channel();

        let report = {
            let mut controller =
                ExportController::new(&mut surface, &mapping, &template, ExportOptions::default())
                    .with_progress(tx);
            assert_ok!(controller.export_bulk(&data).await)
        };

        assert_eq!(report.phase, ExportPhase::Done);
        assert_eq!((report.succeeded, report.failed, report.total), (2, 1, 3));

        let artifact = report.artifact.unwrap();
        assert_eq!(artifact.file_name, "Result_Cards_Bulk.zip");
        assert_eq!(
            zip_entries(&artifact.bytes),
            vec![
                ("Ann_Lee.pdf".to_string(), "pdf-1".to_string()),
                ("Cy.pdf".to_string(), "pdf-3".to_string()),
            ]
        );
        assert_eq!(surface.rendered, vec!["Ann Lee", "Bob", "Cy"]);

        let mut progress = Vec::new();
        let mut statuses = Vec::new();
        while let Ok(snapshot) = rx.try_recv() {
            progress.extend(snapshot.progress);
            statuses.push(snapshot.status);
        }
        assert_eq!(progress.first(), Some(&0));
        assert_eq!(progress.last(), Some(&100));
        assert!(progress.windows(2).all(|w| w[0] <= w[1]));
        assert!(statuses.contains(&"Processing 2/3: Bob".to_string()));
        assert!(statuses.contains(&"Compressing files...".to_string()));
    }

    #[tokio::test]
    async fn test_missing_surface_aborts_before_capture() {
        let data = dataset(&["Ann", "Bob"]);
        let (mapping, template) = (mapping(), TemplateConfig::default());
        let mut surface = FakeSurface {
            missing: true,
            ..Default::default()
        };
        let (tx, mut rx) = mpsc::unbounded_channel();

        let err = {
            let mut controller =
                ExportController::new(&mut surface, &mapping, &template, ExportOptions::default())
                    .with_progress(tx);
            assert_err!(controller.export_bulk(&data).await)
        };

        assert!(err.is_surface_missing());
        assert_eq!(surface.rendered, vec!["Ann"]);
        assert_eq!(surface.captures, 0);

        let mut last = None;
        while let Ok(snapshot) = rx.try_recv() {
            last = Some(snapshot);
        }
        assert_eq!(last.map(|s| s.phase), Some(ExportPhase::Aborted));
    }

    #[tokio::test]
    async fn test_surface_created_by_first_render() {
        let data = dataset(&["Ann", "Bob"]);
        let (mapping, template) = (mapping(), TemplateConfig::default());
        let mut surface = FakeSurface {
            blank_until_render: true,
            ..Default::default()
        };

        let report = {
            let mut controller =
                ExportController::new(&mut surface, &mapping, &template, ExportOptions::default());
            assert_ok!(controller.export_bulk(&data).await)
        };

        assert_eq!(report.phase, ExportPhase::Done);
        assert_eq!((report.succeeded, report.failed), (2, 0));
        assert_eq!(surface.rendered, vec!["Ann", "Bob"]);
        assert_eq!(surface.captures, 2);

        let mut surface = FakeSurface {
            blank_until_render: true,
            ..Default::default()
        };
        let mut controller =
            ExportController::new(&mut surface, &mapping, &template, ExportOptions::default());
        let report = assert_ok!(controller.export_single(&data, 0).await);
        assert_eq!(report.artifact.map(|a| a.file_name), Some("Ann.pdf".to_string()));
    }

    #[tokio::test]
    async fn test_single_export_names_pdf() {
        let data = dataset(&["Ann", "Mary Jane"]);
        let (mapping, template) = (mapping(), TemplateConfig::default());
        let mut surface = FakeSurface::default();

        let mut controller =
            ExportController::new(&mut surface, &mapping, &template, ExportOptions::default());
        let report = controller.export_single(&data, 1).await.unwrap();

        assert_eq!(report.phase, ExportPhase::Done);
        let artifact = report.artifact.unwrap();
        assert_eq!(artifact.file_name, "Mary_Jane.pdf");
        assert_eq!(artifact.bytes, b"pdf-1");
    }

    #[tokio::test]
    async fn test_single_capture_failure_has_no_artifact() {
        let data = dataset(&["Ann"]);
        let (mapping, template) = (mapping(), TemplateConfig::default());
        let mut surface = FakeSurface {
            fail_captures: vec![1],
            ..Default::default()
        };

        let mut controller =
            ExportController::new(&mut surface, &mapping, &template, ExportOptions::default());
        let report = controller.export_single(&data, 0).await.unwrap();

        assert_eq!(report.phase, ExportPhase::Done);
        assert!(report.artifact.is_none());
        assert_eq!(report.failed, 1);
    }

    #[tokio::test]
    async fn test_single_index_out_of_range() {
        let data = dataset(&["Ann"]);
        let (mapping, template) = (mapping(), TemplateConfig::default());
        let mut surface = FakeSurface::default();

        let mut controller =
            ExportController::new(&mut surface, &mapping, &template, ExportOptions::default());
        let err = controller.export_single(&data, 5).await.unwrap_err();

        assert!(matches!(
            err,
            AppError::Export(ExportError::IndexOutOfRange { index: 5, total: 1 })
        ));
    }

    #[tokio::test]
    async fn test_render_timeout_skips_record() {
        let data = dataset(&["Ann", "Bob"]);
        let (mapping, template) = (mapping(), TemplateConfig::default());
        let mut surface = FakeSurface {
            hang_renders: vec![1],
            ..Default::default()
        };
        let options = ExportOptions {
            render_timeout: Some(Duration::from_millis(20)),
            ..Default::default()
        };

        let report = {
            let mut controller = ExportController::new(&mut surface, &mapping, &template, options);
            controller.export_bulk(&data).await.unwrap()
        };

        assert_eq!((report.succeeded, report.failed), (1, 1));
        assert_eq!(surface.captures, 1);
        let entries = zip_entries(&report.artifact.unwrap().bytes);
        assert_eq!(entries[0].0, "Bob.pdf");
    }

    #[tokio::test]
    async fn test_cancel_between_records() {
        let data = dataset(&["Ann", "Bob", "Cy"]);
        let (mapping, template) = (mapping(), TemplateConfig::default());
        let cancel = CancelFlag::new();
        let mut surface = FakeSurface {
            cancel_after_capture: Some((1, cancel.clone())),
            ..Default::default()
        };

        let err = {
            let mut controller =
                ExportController::new(&mut surface, &mapping, &template, ExportOptions::default())
                    .with_cancel_flag(cancel);
            controller.export_bulk(&data).await.unwrap_err()
        };

        assert!(matches!(
            err,
            AppError::Export(ExportError::Cancelled { completed: 1, total: 3 })
        ));
        assert_eq!(surface.rendered, vec!["Ann"]);
    }

    #[tokio::test]
    async fn test_duplicate_names_follow_policy() {
        let data = dataset(&["Ann", "Ann"]);
        let (mapping, template) = (mapping(), TemplateConfig::default());

        let mut surface = FakeSurface::default();
        let report = ExportController::new(&mut surface, &mapping, &template, ExportOptions::default())
            .export_bulk(&data)
            .await
            .unwrap();
        assert_eq!(
            zip_entries(&report.artifact.unwrap().bytes),
            vec![("Ann.pdf".to_string(), "pdf-2".to_string())]
        );

        let mut surface = FakeSurface::default();
        let options = ExportOptions {
            name_policy: NamePolicy::AppendPosition,
            ..Default::default()
        };
        let report = ExportController::new(&mut surface, &mapping, &template, options)
            .export_bulk(&data)
            .await
            .unwrap();
        let names: Vec<String> = zip_entries(&report.artifact.unwrap().bytes)
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(names, vec!["Ann.pdf", "Ann_2.pdf"]);
    }
}
