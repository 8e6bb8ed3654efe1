//! # Report Card Export
//!
//! 根据学生成绩表计算成绩并批量导出成绩单 PDF 的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `ChromiumSurface` - 唯一的 page owner，提供渲染和截图能力
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，都是纯函数或小型构建器
//! - `compute_result` / `classify` - 成绩计算与等级划分
//! - `render_card_html` - 成绩单模板
//! - `ArchiveBuilder` / `OutputSink` - 打包与写出
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一名学生"的准备流程
//! - `RecordCtx` - 上下文封装（序号 + 文件名）
//! - `prepare_card` - 原始行 -> 成绩单数据
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/export_controller` - 串行导出，管理状态机和进度
//! - `orchestrator/app` - 应用入口，管理资源
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::{connect_to_browser_and_page, launch_headless_browser};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::ChromiumSurface;
pub use models::{CalculatedResult, Dataset, FieldMapping, ReportCard, StudentRecord, TemplateConfig};
pub use orchestrator::{App, ExportController, ExportOptions, ExportPhase, ExportReport};
pub use workflow::{prepare_card, RecordCtx};
