//! 记录处理上下文
//!
//! 封装"我正在导出第几名学生、文件叫什么"这一信息

use crate::models::{FieldMapping, StudentRecord};
use crate::services::file_naming::{pdf_file_name, safe_name};
use crate::utils::logging::truncate_text;
use std::fmt::Display;

/// 记录处理上下文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordCtx {
    /// 记录在数据集中的位置（从1开始）
    pub position: usize,
    /// 本次导出的记录总数
    pub total: usize,
    /// 安全的文件名主体
    pub safe_name: String,
}

impl RecordCtx {
    pub fn new(record: &StudentRecord, mapping: &FieldMapping, index: usize, total: usize) -> Self {
        let position = index + 1;
        Self {
            position,
            total,
            safe_name: safe_name(record.get(&mapping.name_field), position),
        }
    }

    pub fn file_name(&self) -> String {
        pdf_file_name(&self.safe_name)
    }
}

impl Display for RecordCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[学生 {}/{} {}]",
            self.position,
            self.total,
            truncate_text(&self.safe_name, 24)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> FieldMapping {
        FieldMapping {
            name_field: "Name".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_ctx_from_named_record() {
        let record: StudentRecord = [("Name", "Mary Jane")].into_iter().collect();
        let ctx = RecordCtx::new(&record, &mapping(), 2, 10);

        assert_eq!(ctx.position, 3);
        assert_eq!(ctx.file_name(), "Mary_Jane.pdf");
        assert_eq!(ctx.to_string(), "[学生 3/10 Mary_Jane]");
    }

    #[test]
    fn test_ctx_keeps_raw_name_spacing() {
        let record: StudentRecord = [("Name", " Ann Lee ")].into_iter().collect();
        let ctx = RecordCtx::new(&record, &mapping(), 0, 2);
        assert_eq!(ctx.file_name(), "_Ann_Lee_.pdf");
    }

    #[test]
    fn test_ctx_without_name_uses_position() {
        let record = StudentRecord::new();
        let ctx = RecordCtx::new(&record, &mapping(), 0, 1);
        assert_eq!(ctx.file_name(), "Student_1.pdf");
    }
}
