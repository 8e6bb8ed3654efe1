use std::fmt;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 浏览器相关错误
    Browser(BrowserError),
    /// 渲染相关错误
    Render(RenderError),
    /// 导出任务错误
    Export(ExportError),
    /// 压缩包错误
    Archive(ArchiveError),
    /// 文件操作错误
    File(FileError),
    /// 数据/映射错误
    Data(DataError),
    /// 配置错误
    Config(ConfigError),
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Browser(e) => write!(f, "浏览器错误: {}", e),
            AppError::Render(e) => write!(f, "渲染错误: {}", e),
            AppError::Export(e) => write!(f, "导出错误: {}", e),
            AppError::Archive(e) => write!(f, "压缩包错误: {}", e),
            AppError::File(e) => write!(f, "文件错误: {}", e),
            AppError::Data(e) => write!(f, "数据错误: {}", e),
            AppError::Config(e) => write!(f, "配置错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Browser(e) => Some(e),
            AppError::Render(e) => Some(e),
            AppError::Export(e) => Some(e),
            AppError::Archive(e) => Some(e),
            AppError::File(e) => Some(e),
            AppError::Data(e) => Some(e),
            AppError::Config(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// 浏览器相关错误
#[derive(Debug)]
pub enum BrowserError {
    /// 启动无头浏览器失败
    LaunchFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 连接浏览器失败
    ConnectionFailed {
        port: u16,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 创建页面失败
    PageCreationFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 执行脚本失败
    ScriptExecutionFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 浏览器配置失败
    ConfigurationFailed { message: String },
}

impl fmt::Display for BrowserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrowserError::LaunchFailed { source } => {
                write!(f, "启动无头浏览器失败: {}", source)
            }
            BrowserError::ConnectionFailed { port, source } => {
                write!(f, "无法连接到浏览器 (端口: {}): {}", port, source)
            }
            BrowserError::PageCreationFailed { source } => {
                write!(f, "创建页面失败: {}", source)
            }
            BrowserError::ScriptExecutionFailed { source } => {
                write!(f, "执行脚本失败: {}", source)
            }
            BrowserError::ConfigurationFailed { message } => {
                write!(f, "浏览器配置失败: {}", message)
            }
        }
    }
}

impl std::error::Error for BrowserError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BrowserError::LaunchFailed { source }
            | BrowserError::ConnectionFailed { source, .. }
            | BrowserError::PageCreationFailed { source }
            | BrowserError::ScriptExecutionFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            BrowserError::ConfigurationFailed { .. } => None,
        }
    }
}

/// 渲染相关错误
#[derive(Debug)]
pub enum RenderError {
    /// 渲染区域不存在（致命）
    SurfaceMissing { selector: String },
    /// 等待渲染提交超时
    CommitTimeout { timeout_ms: u64 },
    /// 写入页面内容失败
    ContentLoadFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::SurfaceMissing { selector } => {
                write!(f, "找不到渲染区域: {}", selector)
            }
            RenderError::CommitTimeout { timeout_ms } => {
                write!(f, "等待渲染完成超时 ({} ms)", timeout_ms)
            }
            RenderError::ContentLoadFailed { source } => {
                write!(f, "写入页面内容失败: {}", source)
            }
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::ContentLoadFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 导出任务错误
#[derive(Debug)]
pub enum ExportError {
    /// 任务在记录之间被取消
    Cancelled { completed: usize, total: usize },
    /// 数据集为空，无可导出的记录
    NothingToExport,
    /// 单个导出的索引超出范围
    IndexOutOfRange { index: usize, total: usize },
    /// 状态机收到当前状态不接受的事件
    InvalidTransition { phase: String, event: &'static str },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Cancelled { completed, total } => {
                write!(f, "导出已取消 (已完成 {}/{})", completed, total)
            }
            ExportError::NothingToExport => write!(f, "没有可导出的记录"),
            ExportError::IndexOutOfRange { index, total } => {
                write!(f, "记录索引 {} 超出范围 (共 {} 条)", index, total)
            }
            ExportError::InvalidTransition { phase, event } => {
                write!(f, "非法状态转换: {} 状态下收到 {}", phase, event)
            }
        }
    }
}

impl std::error::Error for ExportError {}

/// 压缩包错误
#[derive(Debug)]
pub enum ArchiveError {
    /// 写入条目失败
    EntryWriteFailed {
        entry: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 生成压缩包失败
    FinalizeFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveError::EntryWriteFailed { entry, source } => {
                write!(f, "写入压缩条目失败 ({}): {}", entry, source)
            }
            ArchiveError::FinalizeFailed { source } => {
                write!(f, "生成压缩包失败: {}", source)
            }
        }
    }
}

impl std::error::Error for ArchiveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArchiveError::EntryWriteFailed { source, .. } | ArchiveError::FinalizeFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
        }
    }
}

/// 文件操作错误
#[derive(Debug)]
pub enum FileError {
    /// 文件不存在
    NotFound { path: String },
    /// 读取文件失败
    ReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写入文件失败
    WriteFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// TOML 解析失败
    TomlParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// CSV 解析失败
    CsvParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileError::NotFound { path } => write!(f, "文件不存在: {}", path),
            FileError::ReadFailed { path, source } => {
                write!(f, "读取文件失败 ({}): {}", path, source)
            }
            FileError::WriteFailed { path, source } => {
                write!(f, "写入文件失败 ({}): {}", path, source)
            }
            FileError::TomlParseFailed { path, source } => {
                write!(f, "TOML解析失败 ({}): {}", path, source)
            }
            FileError::CsvParseFailed { path, source } => {
                write!(f, "CSV解析失败 ({}): {}", path, source)
            }
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileError::ReadFailed { source, .. }
            | FileError::WriteFailed { source, .. }
            | FileError::TomlParseFailed { source, .. }
            | FileError::CsvParseFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            FileError::NotFound { .. } => None,
        }
    }
}

/// 数据与字段映射错误
#[derive(Debug)]
pub enum DataError {
    /// CSV 没有表头
    MissingHeaders,
    /// CSV 没有数据行
    EmptyDataset,
    /// 表头重复
    DuplicateHeader { header: String },
    /// 未设置姓名字段
    MissingNameField,
    /// 未选择任何科目字段
    NoSubjectFields,
    /// 映射中引用了不存在的列
    UnknownColumn { role: String, column: String },
    /// 学校名称为空
    EmptySchoolName,
    /// 及格线超出 0-100
    PassMarksOutOfRange { value: f64 },
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::MissingHeaders => write!(f, "CSV 文件没有表头"),
            DataError::EmptyDataset => write!(f, "CSV 文件为空"),
            DataError::DuplicateHeader { header } => write!(f, "表头重复: {}", header),
            DataError::MissingNameField => write!(f, "未设置学生姓名字段"),
            DataError::NoSubjectFields => write!(f, "至少需要选择一个科目字段"),
            DataError::UnknownColumn { role, column } => {
                write!(f, "字段 {} 引用了不存在的列: {}", role, column)
            }
            DataError::EmptySchoolName => write!(f, "学校名称不能为空"),
            DataError::PassMarksOutOfRange { value } => {
                write!(f, "及格线 {} 超出范围 [0, 100]", value)
            }
        }
    }
}

impl std::error::Error for DataError {}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 环境变量取值非法
    InvalidValue {
        var_name: String,
        value: String,
        expected: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue {
                var_name,
                value,
                expected,
            } => {
                write!(
                    f,
                    "环境变量 {} 取值非法: '{}'，期望 {}",
                    var_name, value, expected
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ========== 从常见错误类型转换 ==========

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError::ScriptExecutionFailed {
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

impl From<DataError> for AppError {
    fn from(err: DataError) -> Self {
        AppError::Data(err)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        AppError::Render(err)
    }
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        AppError::Export(err)
    }
}

impl From<ArchiveError> for AppError {
    fn from(err: ArchiveError) -> Self {
        AppError::Archive(err)
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建浏览器连接错误
    pub fn browser_connection_failed(
        port: u16,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::ConnectionFailed {
            port,
            source: Box::new(source),
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建渲染区域缺失错误
    pub fn surface_missing(selector: impl Into<String>) -> Self {
        AppError::Render(RenderError::SurfaceMissing {
            selector: selector.into(),
        })
    }

    /// 是否为渲染区域缺失（导出任务需要据此中止）
    pub fn is_surface_missing(&self) -> bool {
        matches!(self, AppError::Render(RenderError::SurfaceMissing { .. }))
    }
}

// ========== 单条记录截图失败 ==========

/// 截图/编码单条记录失败，只影响当前记录，不会中止整个导出
#[derive(Debug, thiserror::Error)]
pub enum CaptureFailure {
    #[error("截图失败: {0}")]
    Rasterize(String),
    #[error("截图解码失败: {0}")]
    Decode(String),
    #[error("生成 PDF 失败: {0}")]
    Encode(String),
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
