use crate::models::result::CalculatedResult;

/// 渲染一张成绩单所需的全部学生数据
#[derive(Debug, Clone, PartialEq)]
pub struct ReportCard {
    /// 记录序号（从1开始）
    pub position: usize,
    pub student_name: Option<String>,
    pub roll_number: Option<String>,
    pub class_name: Option<String>,
    pub section: Option<String>,
    pub result: CalculatedResult,
}
