//! 导出结果写入服务
//!
//! 只负责把最终产物写到输出目录，不关心导出流程

use crate::error::{AppError, AppResult};
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

/// 导出产物（单个 PDF 或批量 zip）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// 输出目录写入服务
pub struct OutputSink {
    output_dir: PathBuf,
}

impl OutputSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// 写入产物，返回写入路径；同名文件会被覆盖
    pub async fn write(&self, artifact: &ExportArtifact) -> AppResult<PathBuf> {
        fs::create_dir_all(&self.output_dir).await.map_err(|e| {
            AppError::file_write_failed(self.output_dir.to_string_lossy(), e)
        })?;

        let path = self.output_dir.join(&artifact.file_name);
        debug!(
            "写入产物: {} ({} 字节)",
            path.display(),
            artifact.bytes.len()
        );

        fs::write(&path, &artifact.bytes)
            .await
            .map_err(|e| AppError::file_write_failed(path.to_string_lossy(), e))?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let sink = OutputSink::new(dir.path().join("nested/out"));
        let artifact = ExportArtifact {
            file_name: "Asha.pdf".into(),
            bytes: b"%PDF-1.5".to_vec(),
        };

        let path = sink.write(&artifact).await.unwrap();
        assert_eq!(path, dir.path().join("nested/out/Asha.pdf"));
        assert_eq!(std::fs::read(path).unwrap(), b"%PDF-1.5");
    }
}
