//! 导出任务状态机
//!
//! ```text
//! Idle -> Rendering(i) -> Capturing(i) -> Rendering(i+1) | Finalizing -> Done
//!                \______________/
//!                 任意非终止状态 -> Aborted
//! ```
//!
//! 状态机本身不做任何 I/O，只负责校验事件顺序、统计进度和生成状态文字，
//! 由 `ExportController` 驱动。

use crate::config::ExportMode;
use crate::error::ExportError;
use std::fmt;

/// 导出阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportPhase {
    Idle,
    Rendering { index: usize },
    Capturing { index: usize },
    Finalizing,
    Done,
    Aborted,
}

impl ExportPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, ExportPhase::Done | ExportPhase::Aborted)
    }
}

impl fmt::Display for ExportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportPhase::Idle => write!(f, "Idle"),
            ExportPhase::Rendering { index } => write!(f, "Rendering({})", index),
            ExportPhase::Capturing { index } => write!(f, "Capturing({})", index),
            ExportPhase::Finalizing => write!(f, "Finalizing"),
            ExportPhase::Done => write!(f, "Done"),
            ExportPhase::Aborted => write!(f, "Aborted"),
        }
    }
}

/// 对外可见的任务快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSnapshot {
    pub phase: ExportPhase,
    pub status: String,
    /// 仅批量模式有进度百分比
    pub progress: Option<u8>,
}

/// 一次导出任务
#[derive(Debug)]
pub struct ExportJob {
    mode: ExportMode,
    total: usize,
    phase: ExportPhase,
    /// 当前记录是否已有结果（成功或跳过）
    resolved: bool,
    succeeded: usize,
    failed: usize,
    status: String,
}

impl ExportJob {
    pub fn new(mode: ExportMode, total: usize) -> Self {
        Self {
            mode,
            total,
            phase: ExportPhase::Idle,
            resolved: true,
            succeeded: 0,
            failed: 0,
            status: String::new(),
        }
    }

    pub fn phase(&self) -> ExportPhase {
        self.phase
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    /// 已经有结果的记录数
    pub fn completed(&self) -> usize {
        self.succeeded + self.failed
    }

    /// 进度百分比：round(completed / total * 100)
    pub fn progress(&self) -> Option<u8> {
        match self.mode {
            ExportMode::Single => None,
            ExportMode::Bulk if self.total == 0 => Some(0),
            ExportMode::Bulk => {
                let pct = (self.completed() as f64 / self.total as f64 * 100.0).round();
                Some(pct.min(100.0) as u8)
            }
        }
    }

    pub fn snapshot(&self) -> ExportSnapshot {
        ExportSnapshot {
            phase: self.phase,
            status: self.status.clone(),
            progress: self.progress(),
        }
    }

    /// 开始处理一条记录
    ///
    /// 允许从 Idle 进入，或在上一条记录已有结果之后进入。
    pub fn start_record(&mut self, index: usize, name: &str) -> Result<(), ExportError> {
        let allowed = match self.phase {
            ExportPhase::Idle => true,
            ExportPhase::Rendering { .. } | ExportPhase::Capturing { .. } => {
                self.mode == ExportMode::Bulk && self.resolved
            }
            _ => false,
        };
        if !allowed || self.completed() >= self.total {
            return Err(self.invalid("start_record"));
        }

        self.phase = ExportPhase::Rendering { index };
        self.resolved = false;
        self.status = match self.mode {
            ExportMode::Bulk => format!(
                "Processing {}/{}: {}",
                self.completed() + 1,
                self.total,
                name
            ),
            ExportMode::Single => "Generating PDF...".to_string(),
        };
        Ok(())
    }

    /// 渲染器已提交画面，可以截图
    pub fn rendered(&mut self) -> Result<(), ExportError> {
        match self.phase {
            ExportPhase::Rendering { index } if !self.resolved => {
                self.phase = ExportPhase::Capturing { index };
                Ok(())
            }
            _ => Err(self.invalid("rendered")),
        }
    }

    /// 当前记录导出成功
    pub fn item_succeeded(&mut self) -> Result<(), ExportError> {
        match self.phase {
            ExportPhase::Capturing { .. } if !self.resolved => {
                self.succeeded += 1;
                self.resolve();
                Ok(())
            }
            _ => Err(self.invalid("item_succeeded")),
        }
    }

    /// 当前记录被跳过（截图失败或渲染超时）
    pub fn item_failed(&mut self, name: &str) -> Result<(), ExportError> {
        match self.phase {
            ExportPhase::Rendering { .. } | ExportPhase::Capturing { .. } if !self.resolved => {
                self.failed += 1;
                self.resolve();
                if self.mode == ExportMode::Single {
                    self.status = format!("Failed to generate PDF: {}", name);
                }
                Ok(())
            }
            _ => Err(self.invalid("item_failed")),
        }
    }

    /// 所有记录处理完毕，开始打包
    pub fn finalize(&mut self) -> Result<(), ExportError> {
        let ready = match self.phase {
            ExportPhase::Idle => self.total == 0,
            ExportPhase::Rendering { .. } | ExportPhase::Capturing { .. } => {
                self.resolved && self.completed() == self.total
            }
            _ => false,
        };
        if self.mode != ExportMode::Bulk || !ready {
            return Err(self.invalid("finalize"));
        }

        self.phase = ExportPhase::Finalizing;
        self.status = "Compressing files...".to_string();
        Ok(())
    }

    /// 打包完成
    pub fn finish(&mut self) -> Result<(), ExportError> {
        if self.phase != ExportPhase::Finalizing {
            return Err(self.invalid("finish"));
        }
        self.phase = ExportPhase::Done;
        self.status = format!(
            "Exported {} of {} report cards",
            self.succeeded, self.total
        );
        Ok(())
    }

    /// 中止任务，终止状态下无效果
    pub fn abort(&mut self, reason: impl Into<String>) {
        if self.phase.is_terminal() {
            return;
        }
        self.phase = ExportPhase::Aborted;
        self.status = reason.into();
    }

    fn resolve(&mut self) {
        self.resolved = true;
        if self.mode == ExportMode::Single {
            self.phase = ExportPhase::Done;
            if self.succeeded > 0 {
                self.status = "PDF generated".to_string();
            }
        }
    }

    fn invalid(&self, event: &'static str) -> ExportError {
        ExportError::InvalidTransition {
            phase: self.phase.to_string(),
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_happy_path() {
        let mut job = ExportJob::new(ExportMode::Bulk, 2);
        assert_eq!(job.progress(), Some(0));

        job.start_record(0, "Ann").unwrap();
        assert_eq!(job.status(), "Processing 1/2: Ann");
        job.rendered().unwrap();
        assert_eq!(job.phase(), ExportPhase::Capturing { index: 0 });
        job.item_succeeded().unwrap();
        assert_eq!(job.progress(), Some(50));

        job.start_record(1, "Bob").unwrap();
        assert_eq!(job.phase(), ExportPhase::Rendering { index: 1 });
        job.rendered().unwrap();
        job.item_succeeded().unwrap();
        assert_eq!(job.progress(), Some(100));

        job.finalize().unwrap();
        assert_eq!(job.status(), "Compressing files...");
        job.finish().unwrap();
        assert_eq!(job.phase(), ExportPhase::Done);
        assert_eq!(job.succeeded(), 2);
    }

    #[test]
    fn test_skip_from_rendering_advances() {
        let mut job = ExportJob::new(ExportMode::Bulk, 3);
        job.start_record(0, "A").unwrap();
        job.item_failed("A").unwrap();
        assert_eq!(job.progress(), Some(33));
        job.start_record(1, "B").unwrap();
        assert_eq!(job.status(), "Processing 2/3: B");
    }

    #[test]
    fn test_cannot_start_next_before_resolution() {
        let mut job = ExportJob::new(ExportMode::Bulk, 2);
        job.start_record(0, "A").unwrap();
        job.rendered().unwrap();
        assert!(matches!(
            job.start_record(1, "B"),
            Err(ExportError::InvalidTransition { event: "start_record", .. })
        ));
        assert!(job.finalize().is_err());
    }

    #[test]
    fn test_capture_requires_render_commit() {
        let mut job = ExportJob::new(ExportMode::Bulk, 1);
        job.start_record(0, "A").unwrap();
        assert!(job.item_succeeded().is_err());
    }

    #[test]
    fn test_single_mode_ends_in_done() {
        let mut job = ExportJob::new(ExportMode::Single, 1);
        job.start_record(4, "Zed").unwrap();
        assert_eq!(job.status(), "Generating PDF...");
        assert_eq!(job.progress(), None);
        job.rendered().unwrap();
        job.item_succeeded().unwrap();
        assert_eq!(job.phase(), ExportPhase::Done);
        assert!(job.finalize().is_err());

        let mut job = ExportJob::new(ExportMode::Single, 1);
        job.start_record(0, "Zed").unwrap();
        job.rendered().unwrap();
        job.item_failed("Zed").unwrap();
        assert_eq!(job.phase(), ExportPhase::Done);
        assert_eq!(job.status(), "Failed to generate PDF: Zed");
    }

    #[test]
    fn test_abort_is_terminal() {
        let mut job = ExportJob::new(ExportMode::Bulk, 2);
        job.start_record(0, "A").unwrap();
        job.abort("render surface missing");
        assert_eq!(job.phase(), ExportPhase::Aborted);
        assert!(job.rendered().is_err());

        job.abort("again");
        assert_eq!(job.status(), "render surface missing");
    }
}
