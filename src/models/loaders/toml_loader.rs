use crate::error::{AppError, AppResult, FileError};
use crate::models::mapping::FieldMapping;
use crate::models::template::TemplateConfig;
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::fs;

/// 读取并解析 TOML 文件
async fn load_toml<T: DeserializeOwned>(toml_file_path: &Path) -> AppResult<T> {
    let path_str = toml_file_path.to_string_lossy().to_string();

    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|e| AppError::file_read_failed(&path_str, e))?;

    toml::from_str(&content).map_err(|e| {
        AppError::File(FileError::TomlParseFailed {
            path: path_str,
            source: Box::new(e),
        })
    })
}

/// 加载字段映射，科目列自动去重
pub async fn load_mapping(toml_file_path: &Path) -> AppResult<FieldMapping> {
    if !toml_file_path.exists() {
        return Err(AppError::File(FileError::NotFound {
            path: toml_file_path.to_string_lossy().to_string(),
        }));
    }

    let mut mapping: FieldMapping = load_toml(toml_file_path).await?;
    let before = mapping.subject_fields.len();
    mapping.dedup_subjects();
    if mapping.subject_fields.len() != before {
        tracing::warn!(
            "⚠️ 科目列存在重复，已去重: {} -> {}",
            before,
            mapping.subject_fields.len()
        );
    }

    tracing::info!(
        "✓ 字段映射已加载: 姓名列 '{}', {} 个科目",
        mapping.name_field,
        mapping.subject_fields.len()
    );
    Ok(mapping)
}

/// 加载成绩单模板；文件不存在时使用默认模板
pub async fn load_template(toml_file_path: &Path) -> AppResult<TemplateConfig> {
    if !toml_file_path.exists() {
        tracing::warn!(
            "⚠️ 模板文件不存在: {}，使用默认模板",
            toml_file_path.display()
        );
        return Ok(TemplateConfig::default());
    }

    let template: TemplateConfig = load_toml(toml_file_path).await?;
    template.validate()?;

    tracing::info!("✓ 模板已加载: {}", template.school_name);
    Ok(template)
}
