//! 导出文件命名

use regex::Regex;
use std::sync::LazyLock;

/// 批量导出的压缩包文件名
pub const BULK_ARCHIVE_NAME: &str = "Result_Cards_Bulk.zip";

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]").expect("valid pattern"));

/// 由学生姓名得到安全的文件名主体
///
/// 非 ASCII 字母数字的字符（包括首尾空格）一律替换为 `_`；
/// 姓名为空或只有空白时使用 `Student_<序号>`（序号从1开始）。
pub fn safe_name(name: Option<&str>, position: usize) -> String {
    match name {
        Some(raw) if !raw.trim().is_empty() => UNSAFE_CHARS.replace_all(raw, "_").into_owned(),
        _ => format!("Student_{}", position),
    }
}

/// `<name>.pdf`
pub fn pdf_file_name(stem: &str) -> String {
    format!("{}.pdf", stem)
}
