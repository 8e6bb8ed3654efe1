use crate::error::ConfigError;

/// 导出模式
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportMode {
    /// 导出全部学生，打包为 zip
    Bulk,
    /// 只导出一个学生的 PDF
    Single,
}

impl ExportMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "bulk" | "all" => Some(ExportMode::Bulk),
            "single" | "one" => Some(ExportMode::Single),
            _ => None,
        }
    }
}

/// 浏览器获取方式
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrowserMode {
    /// 自行启动无头浏览器
    Launch,
    /// 连接已开启调试端口的浏览器
    Connect,
}

impl BrowserMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "launch" | "headless" => Some(BrowserMode::Launch),
            "connect" => Some(BrowserMode::Connect),
            _ => None,
        }
    }
}

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 学生成绩 CSV 文件
    pub input_csv: String,
    /// 字段映射 TOML 文件
    pub mapping_file: String,
    /// 成绩单模板 TOML 文件（不存在时使用默认模板）
    pub template_file: String,
    /// 输出目录
    pub output_dir: String,
    /// 导出模式
    pub export_mode: ExportMode,
    /// 单个导出时的学生索引（从0开始）
    pub single_index: usize,
    /// 浏览器获取方式
    pub browser_mode: BrowserMode,
    /// 浏览器调试端口
    pub browser_debug_port: u16,
    /// 浏览器可执行文件路径（为空时自动查找）
    pub chrome_executable: Option<String>,
    /// 单条记录等待渲染完成的最长时间，0 表示不限制
    pub render_timeout_ms: u64,
    /// 截图缩放倍数
    pub raster_scale: f64,
    /// JPEG 质量 (1-100)
    pub jpeg_quality: u8,
    /// 压缩包内重名时追加序号
    pub dedupe_archive_names: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_csv: "students.csv".to_string(),
            mapping_file: "mapping.toml".to_string(),
            template_file: "template.toml".to_string(),
            output_dir: "output".to_string(),
            export_mode: ExportMode::Bulk,
            single_index: 0,
            browser_mode: BrowserMode::Launch,
            browser_debug_port: 9222,
            chrome_executable: None,
            render_timeout_ms: 15_000,
            raster_scale: 2.0,
            jpeg_quality: 95,
            dedupe_archive_names: false,
            verbose_logging: false,
            output_log_file: "export_log.txt".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            input_csv: std::env::var("INPUT_CSV").unwrap_or(default.input_csv),
            mapping_file: std::env::var("MAPPING_FILE").unwrap_or(default.mapping_file),
            template_file: std::env::var("TEMPLATE_FILE").unwrap_or(default.template_file),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or(default.output_dir),
            export_mode: std::env::var("EXPORT_MODE").ok().and_then(|v| ExportMode::from_str(&v)).unwrap_or(default.export_mode),
            single_index: std::env::var("SINGLE_INDEX").ok().and_then(|v| v.parse().ok()).unwrap_or(default.single_index),
            browser_mode: std::env::var("BROWSER_MODE").ok().and_then(|v| BrowserMode::from_str(&v)).unwrap_or(default.browser_mode),
            browser_debug_port: std::env::var("BROWSER_DEBUG_PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.browser_debug_port),
            chrome_executable: std::env::var("CHROME_EXECUTABLE").ok().filter(|v| !v.trim().is_empty()).or(default.chrome_executable),
            render_timeout_ms: std::env::var("RENDER_TIMEOUT_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.render_timeout_ms),
            raster_scale: std::env::var("RASTER_SCALE").ok().and_then(|v| v.parse().ok()).filter(|s: &f64| *s > 0.0).unwrap_or(default.raster_scale),
            jpeg_quality: std::env::var("JPEG_QUALITY").ok().and_then(|v| v.parse().ok()).filter(|q: &u8| (1..=100).contains(q)).unwrap_or(default.jpeg_quality),
            dedupe_archive_names: std::env::var("DEDUPE_ARCHIVE_NAMES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.dedupe_archive_names),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
        }
    }

    /// 校验手动构造的配置（`from_env` 已经过滤掉非法值）
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.raster_scale.is_finite() && self.raster_scale > 0.0) {
            return Err(ConfigError::InvalidValue {
                var_name: "RASTER_SCALE".to_string(),
                value: self.raster_scale.to_string(),
                expected: "大于 0 的数".to_string(),
            });
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::InvalidValue {
                var_name: "JPEG_QUALITY".to_string(),
                value: self.jpeg_quality.to_string(),
                expected: "1-100".to_string(),
            });
        }
        Ok(())
    }

    /// 渲染超时（0 表示不限制）
    pub fn render_timeout(&self) -> Option<std::time::Duration> {
        (self.render_timeout_ms > 0).then(|| std::time::Duration::from_millis(self.render_timeout_ms))
    }
}
