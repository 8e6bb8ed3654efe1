use crate::error::DataError;
use crate::models::record::StudentRecord;
use std::collections::HashSet;

/// 上游读入的数据集：表头 + 按原始顺序排列的学生记录
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub records: Vec<StudentRecord>,
}

impl Dataset {
    /// 由表头和原始行构造数据集
    ///
    /// 行比表头短时，缺失的列不写入记录；多出的单元格被忽略。
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, DataError> {
        if headers.is_empty() {
            return Err(DataError::MissingHeaders);
        }

        let mut seen = HashSet::new();
        for header in &headers {
            if !seen.insert(header.as_str()) {
                return Err(DataError::DuplicateHeader {
                    header: header.clone(),
                });
            }
        }

        let records: Vec<StudentRecord> = rows
            .into_iter()
            // 只跳过真正的空行；只有逗号的行保留为空白记录
            .filter(|row| !row.is_empty())
            .map(|row| {
                headers
                    .iter()
                    .zip(row)
                    .map(|(h, v)| (h.clone(), v))
                    .collect()
            })
            .collect();

        if records.is_empty() {
            return Err(DataError::EmptyDataset);
        }

        Ok(Self { headers, records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_header(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }
}
