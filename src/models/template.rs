use crate::error::DataError;
use serde::{Deserialize, Serialize};

/// 成绩单模板配置（展示参数 + 及格线）
///
/// 图片字段（校徽、签名、印章）只是不透明的资源地址，原样交给渲染器。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    pub school_name: String,
    pub address: String,
    pub logo_url: Option<String>,
    /// 校长签名
    pub signature_url: Option<String>,
    /// 班主任签名
    pub class_teacher_signature_url: Option<String>,
    pub seal_url: Option<String>,
    /// 签名图片高度（px）
    pub signature_height: u32,
    /// 印章图片高度（px）
    pub seal_height: u32,
    pub footer_text: String,
    pub primary_color: String,
    pub show_grade: bool,
    pub show_percentage: bool,
    /// 及格线（百分比，0-100）
    pub pass_marks: f64,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            school_name: "Springfield Academy".to_string(),
            address: "123 Education St, Knowledge City".to_string(),
            logo_url: None,
            signature_url: None,
            class_teacher_signature_url: None,
            seal_url: None,
            signature_height: 60,
            seal_height: 80,
            footer_text: "This result is computer generated and does not require a signature."
                .to_string(),
            primary_color: "#3b82f6".to_string(),
            show_grade: true,
            show_percentage: true,
            pass_marks: 40.0,
        }
    }
}

impl TemplateConfig {
    pub fn validate(&self) -> Result<(), DataError> {
        if self.school_name.trim().is_empty() {
            return Err(DataError::EmptySchoolName);
        }
        if !(0.0..=100.0).contains(&self.pass_marks) {
            return Err(DataError::PassMarksOutOfRange {
                value: self.pass_marks,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: TemplateConfig = toml::from_str(
            r#"
            school_name = "Riverdale High"
            pass_marks = 33
            show_grade = false
            "#,
        )
        .unwrap();

        assert_eq!(config.school_name, "Riverdale High");
        assert_eq!(config.pass_marks, 33.0);
        assert!(!config.show_grade);
        assert!(config.show_percentage);
        assert_eq!(config.primary_color, "#3b82f6");
        assert_eq!(config.seal_url, None);
    }

    #[test]
    fn test_validate() {
        assert!(TemplateConfig::default().validate().is_ok());

        let config = TemplateConfig {
            school_name: "  ".into(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(DataError::EmptySchoolName)));

        let config = TemplateConfig {
            pass_marks: 120.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(DataError::PassMarksOutOfRange { .. })
        ));
    }
}
