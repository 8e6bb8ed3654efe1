//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 管理应用生命周期（初始化、运行、清理）
//! - 加载数据集、字段映射和模板
//! - 持有浏览器资源（Browser、ChromiumSurface）
//! - 写出产物并输出统计信息
//!
//! ### `export_controller` - 导出控制器
//! - 逐条驱动渲染和截图，单条失败只跳过
//! - 批量模式打包 zip，单个模式直接输出 PDF
//!
//! ### `export_job` - 导出状态机
//! - 校验事件顺序，计算进度和状态文字
//!
//! ## 层次关系
//!
//! ```text
//! app (持有 Browser)
//!     ↓
//! export_controller (处理 Dataset) + export_job (状态)
//!     ↓
//! workflow::prepare_card (处理单个学生)
//!     ↓
//! services (能力层：计算 / 模板 / 命名 / 打包)
//!     ↓
//! infrastructure (基础设施：ChromiumSurface)
//! ```

pub mod app;
pub mod export_controller;
pub mod export_job;

// 重新导出主要类型
pub use app::App;
pub use export_controller::{CancelFlag, ExportController, ExportOptions, ExportReport};
pub use export_job::{ExportJob, ExportPhase, ExportSnapshot};
