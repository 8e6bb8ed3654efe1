use crate::error::DataError;
use crate::models::dataset::Dataset;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// 字段映射：把数据集的列名绑定到成绩单的固定角色上
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMapping {
    pub name_field: String,
    pub roll_no_field: String,
    pub class_field: String,
    pub section_field: String,
    /// 科目列，按成绩单上的显示顺序排列，不允许重复
    pub subject_fields: Vec<String>,
}

impl FieldMapping {
    /// 去掉重复的科目列（保留第一次出现的位置）
    pub fn dedup_subjects(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.subject_fields.retain(|s| seen.insert(s.clone()));
    }

    /// 切换某一列是否作为科目列
    pub fn toggle_subject(&mut self, column: &str) {
        if let Some(pos) = self.subject_fields.iter().position(|s| s == column) {
            self.subject_fields.remove(pos);
        } else {
            self.subject_fields.push(column.to_string());
        }
    }

    /// 按角色列出已绑定的列
    pub fn role_bindings(&self) -> [(&'static str, &str); 4] {
        [
            ("name_field", self.name_field.as_str()),
            ("roll_no_field", self.roll_no_field.as_str()),
            ("class_field", self.class_field.as_str()),
            ("section_field", self.section_field.as_str()),
        ]
    }

    /// 导出前校验映射与数据集是否匹配
    pub fn validate(&self, dataset: &Dataset) -> Result<(), DataError> {
        if self.name_field.trim().is_empty() {
            return Err(DataError::MissingNameField);
        }
        if self.subject_fields.is_empty() {
            return Err(DataError::NoSubjectFields);
        }

        for (role, column) in self.role_bindings() {
            if !column.is_empty() && !dataset.has_header(column) {
                return Err(DataError::UnknownColumn {
                    role: role.to_string(),
                    column: column.to_string(),
                });
            }
        }

        for subject in &self.subject_fields {
            if !dataset.has_header(subject) {
                return Err(DataError::UnknownColumn {
                    role: "subject_fields".to_string(),
                    column: subject.clone(),
                });
            }
            // 角色列同时作为科目列只是提示，不阻止导出
            if self.role_bindings().iter().any(|(_, c)| c == subject) {
                warn!("⚠️ 列 {} 同时被用作身份字段和科目字段", subject);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        let headers = ["Name", "Roll", "Math", "Science"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rows = vec![vec!["A".into(), "1".into(), "50".into(), "60".into()]];
        Dataset::from_rows(headers, rows).unwrap()
    }

    fn mapping() -> FieldMapping {
        FieldMapping {
            name_field: "Name".into(),
            roll_no_field: "Roll".into(),
            subject_fields: vec!["Math".into(), "Science".into()],
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_accepts_known_columns() {
        assert!(mapping().validate(&dataset()).is_ok());
    }

    #[test]
    fn test_validate_requires_name_and_subjects() {
        let mut m = mapping();
        m.name_field.clear();
        assert!(matches!(
            m.validate(&dataset()),
            Err(DataError::MissingNameField)
        ));

        let mut m = mapping();
        m.subject_fields.clear();
        assert!(matches!(
            m.validate(&dataset()),
            Err(DataError::NoSubjectFields)
        ));
    }

    #[test]
    fn test_validate_rejects_unknown_column() {
        let mut m = mapping();
        m.class_field = "Grade".into();
        match m.validate(&dataset()) {
            Err(DataError::UnknownColumn { role, column }) => {
                assert_eq!(role, "class_field");
                assert_eq!(column, "Grade");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_toggle_and_dedup_keep_order() {
        let mut m = mapping();
        m.toggle_subject("Math");
        assert_eq!(m.subject_fields, vec!["Science".to_string()]);
        m.toggle_subject("Math");
        assert_eq!(
            m.subject_fields,
            vec!["Science".to_string(), "Math".to_string()]
        );

        m.subject_fields.push("Science".into());
        m.dedup_subjects();
        assert_eq!(
            m.subject_fields,
            vec!["Science".to_string(), "Math".to_string()]
        );
    }
}
