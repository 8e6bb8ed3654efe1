//! 批量导出的 zip 打包
//!
//! 条目先按数据集顺序暂存在内存中，`finish` 时一次性写出压缩包。

use crate::error::{AppError, AppResult, ArchiveError};
use std::io::{Cursor, Write};
use tracing::{debug, warn};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// 条目重名时的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamePolicy {
    /// 后写入的覆盖先写入的（条目位置保持不变）
    #[default]
    Overwrite,
    /// 在文件名后追加记录序号，保证不重名
    AppendPosition,
}

/// 压缩包构建器
#[derive(Debug, Default)]
pub struct ArchiveBuilder {
    entries: Vec<(String, Vec<u8>)>,
    policy: NamePolicy,
}

impl ArchiveBuilder {
    pub fn new(policy: NamePolicy) -> Self {
        Self {
            entries: Vec::new(),
            policy,
        }
    }

    /// 添加一个 PDF 条目，返回最终使用的条目名
    ///
    /// # 参数
    /// - `stem`: 文件名主体（不含扩展名）
    /// - `position`: 记录序号（从1开始），用于去重
    /// - `bytes`: 文件内容
    pub fn add(&mut self, stem: &str, position: usize, bytes: Vec<u8>) -> String {
        let mut name = format!("{}.pdf", stem);

        if let Some(existing) = self.entries.iter().position(|(n, _)| *n == name) {
            match self.policy {
                NamePolicy::Overwrite => {
                    warn!("⚠️ 压缩包内已存在 {}，将被覆盖", name);
                    self.entries[existing].1 = bytes;
                    return name;
                }
                NamePolicy::AppendPosition => {
                    let mut suffix = position;
                    while self.contains(&name) {
                        name = format!("{}_{}.pdf", stem, suffix);
                        suffix += 1;
                    }
                    debug!("重名条目改名为 {}", name);
                }
            }
        }

        self.entries.push((name.clone(), bytes));
        name
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 写出 zip 字节（同步且可能较慢，调用方应放到阻塞线程中）
    pub fn finish(self) -> AppResult<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, bytes) in &self.entries {
            zip.start_file(name.as_str(), opts).map_err(|e| {
                AppError::Archive(ArchiveError::EntryWriteFailed {
                    entry: name.clone(),
                    source: Box::new(e),
                })
            })?;
            zip.write_all(bytes).map_err(|e| {
                AppError::Archive(ArchiveError::EntryWriteFailed {
                    entry: name.clone(),
                    source: Box::new(e),
                })
            })?;
        }

        let cursor = zip.finish().map_err(|e| {
            AppError::Archive(ArchiveError::FinalizeFailed {
                source: Box::new(e),
            })
        })?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn read_entries(bytes: Vec<u8>) -> Vec<(String, Vec<u8>)> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..archive.len())
            .map(|i| {
                let mut file = archive.by_index(i).unwrap();
                let mut content = Vec::new();
                file.read_to_end(&mut content).unwrap();
                (file.name().to_string(), content)
            })
            .collect()
    }

    #[test]
    fn test_finish_preserves_insertion_order() {
        let mut builder = ArchiveBuilder::new(NamePolicy::Overwrite);
        builder.add("Asha", 1, b"one".to_vec());
        builder.add("Ravi", 2, b"two".to_vec());

        let entries = read_entries(builder.finish().unwrap());
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], ("Asha.pdf".to_string(), b"one".to_vec()));
        assert_eq!(entries[1].0, "Ravi.pdf");
    }

    #[test]
    fn test_duplicate_names_overwrite_by_default() {
        let mut builder = ArchiveBuilder::default();
        builder.add("John_Doe", 1, b"first".to_vec());
        let name = builder.add("John_Doe", 4, b"second".to_vec());

        assert_eq!(name, "John_Doe.pdf");
        assert_eq!(builder.len(), 1);
        let entries = read_entries(builder.finish().unwrap());
        assert_eq!(entries[0].1, b"second".to_vec());
    }

    #[test]
    fn test_append_position_keeps_both() {
        let mut builder = ArchiveBuilder::new(NamePolicy::AppendPosition);
        builder.add("John_Doe", 1, b"first".to_vec());
        let second = builder.add("John_Doe", 4, b"second".to_vec());

        assert_eq!(second, "John_Doe_4.pdf");
        let names: Vec<String> = read_entries(builder.finish().unwrap())
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(names, vec!["John_Doe.pdf", "John_Doe_4.pdf"]);
    }

    #[test]
    fn test_empty_archive_is_still_valid() {
        let bytes = ArchiveBuilder::default().finish().unwrap();
        assert!(read_entries(bytes).is_empty());
    }
}
