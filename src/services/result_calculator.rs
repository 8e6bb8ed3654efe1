//! 成绩计算
//!
//! (原始行, 字段映射, 模板配置) -> `CalculatedResult`，纯函数。
//! 任何无法解析的分数都按 0 分处理，不会返回错误。

use crate::models::{CalculatedResult, FieldMapping, ResultStatus, StudentRecord, SubjectResult, TemplateConfig};
use crate::services::grade_classifier::classify;
use regex::Regex;
use std::sync::LazyLock;

/// 每科满分
pub const MAX_MARKS_PER_SUBJECT: f64 = 100.0;

static NON_NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9.]").expect("valid pattern"));

/// 计算一名学生的成绩
pub fn compute_result(
    record: &StudentRecord,
    mapping: &FieldMapping,
    config: &TemplateConfig,
) -> CalculatedResult {
    let mut total_obtained = 0.0;
    let mut total_max = 0.0;
    let mut subjects = Vec::with_capacity(mapping.subject_fields.len());

    for subject in &mapping.subject_fields {
        let marks = parse_marks(record.get(subject));
        let max_marks = MAX_MARKS_PER_SUBJECT;

        total_obtained += marks;
        total_max += max_marks;

        subjects.push(SubjectResult {
            name: subject.clone(),
            marks,
            max_marks,
            grade: classify(marks / max_marks * 100.0),
        });
    }

    // 无科目时按 0% 处理，必然不及格
    let raw_percentage = if total_max > 0.0 {
        total_obtained / total_max * 100.0
    } else {
        0.0
    };
    let status = if total_max > 0.0 && raw_percentage >= config.pass_marks {
        ResultStatus::Pass
    } else {
        ResultStatus::Fail
    };

    CalculatedResult {
        total_marks: total_obtained,
        max_total_marks: total_max,
        percentage: round2(raw_percentage),
        grade: classify(raw_percentage),
        status,
        subjects,
    }
}

/// 把单元格内容转换为分数
///
/// 先去掉数字和小数点以外的所有字符，再读取开头的合法数字部分；
/// 缺失、为空或读不出数字时为 0。
pub fn parse_marks(raw: Option<&str>) -> f64 {
    let raw = match raw {
        Some(v) if !v.is_empty() => v,
        _ => return 0.0,
    };
    let cleaned = NON_NUMERIC.replace_all(raw, "");

    let (int_part, rest) = split_digits(&cleaned);
    let frac_part = rest
        .strip_prefix('.')
        .map(|r| split_digits(r).0)
        .unwrap_or("");

    if int_part.is_empty() && frac_part.is_empty() {
        return 0.0;
    }

    let normalized = format!(
        "{}.{}",
        if int_part.is_empty() { "0" } else { int_part },
        if frac_part.is_empty() { "0" } else { frac_part }
    );
    normalized.parse::<f64>().unwrap_or(0.0)
}

fn split_digits(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

/// 保留两位小数
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
