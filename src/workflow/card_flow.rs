//! 成绩单准备流程 - 流程层
//!
//! 原始行 -> `ReportCard`：解析身份字段并重新计算成绩。
//! 每次渲染都重新计算，不缓存任何结果。

use crate::models::{FieldMapping, ReportCard, StudentRecord, TemplateConfig};
use crate::services::compute_result;

/// 为一名学生准备成绩单数据
///
/// # 参数
/// - `record`: 原始数据行
/// - `mapping`: 字段映射
/// - `template`: 模板配置（提供及格线）
/// - `position`: 记录序号（从1开始）
pub fn prepare_card(
    record: &StudentRecord,
    mapping: &FieldMapping,
    template: &TemplateConfig,
    position: usize,
) -> ReportCard {
    let field = |column: &str| -> Option<String> {
        if column.is_empty() {
            return None;
        }
        record.display_value(column).map(str::to_string)
    };

    ReportCard {
        position,
        student_name: field(&mapping.name_field),
        roll_number: field(&mapping.roll_no_field),
        class_name: field(&mapping.class_field),
        section: field(&mapping.section_field),
        result: compute_result(record, mapping, template),
    }
}
