//! 成绩单 HTML 模板
//!
//! 生成一张固定 A4 尺寸的成绩单页面，根节点为 `#export-container`。
//! 只负责排版，不做任何分数计算。

use crate::models::{ReportCard, ResultStatus, TemplateConfig};
use crate::services::result_calculator::round2;
use std::fmt::Write;

/// 渲染区域根节点的 id
pub const SURFACE_ID: &str = "export-container";

/// 生成完整的 HTML 文档
pub fn render_card_html(card: &ReportCard, template: &TemplateConfig) -> String {
    let color = escape_html(&template.primary_color);
    let result = &card.result;

    let logo = template
        .logo_url
        .as_deref()
        .map(|url| {
            format!(
                r#"<img class="logo" src="{}" alt="School Logo">"#,
                escape_html(url)
            )
        })
        .unwrap_or_default();

    let grade_header = if template.show_grade {
        r#"<th class="narrow">Grade</th>"#
    } else {
        ""
    };

    let mut rows = String::new();
    for subject in &result.subjects {
        let grade_cell = if template.show_grade {
            format!(r#"<td class="center">{}</td>"#, subject.grade)
        } else {
            String::new()
        };
        let _ = write!(
            rows,
            r#"<tr><td class="subject">{}</td><td class="center">{}</td><td class="center bold">{}</td>{}</tr>"#,
            escape_html(&subject.name),
            subject.max_marks,
            subject.marks,
            grade_cell
        );
    }

    let percentage_row = if template.show_percentage {
        format!(
            r#"<div class="summary-row"><span>Percentage:</span><span class="bold">{}%</span></div>"#,
            result.percentage
        )
    } else {
        String::new()
    };

    let status_class = match result.status {
        ResultStatus::Pass => "pass",
        ResultStatus::Fail => "fail",
    };

    let class_teacher_signature = signature_img(
        template.class_teacher_signature_url.as_deref(),
        "Class Teacher Signature",
        template.signature_height,
    );
    let principal_signature = signature_img(
        template.signature_url.as_deref(),
        "Principal Signature",
        template.signature_height,
    );
    let seal = match template.seal_url.as_deref() {
        Some(url) => format!(
            r#"<img src="{}" alt="Seal" style="height:{}px">"#,
            escape_html(url),
            template.seal_height
        ),
        None => r#"<div class="seal-placeholder">Seal</div>"#.to_string(),
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<style>
  html, body {{ margin: 0; padding: 0; background: #ffffff; }}
  #{surface_id} {{ width: 210mm; height: 297mm; overflow: hidden; }}
  .card {{ position: relative; box-sizing: border-box; width: 210mm; min-height: 297mm; padding: 20mm;
           color: #1e293b; font-family: serif; background: #ffffff; display: flex; flex-direction: column; }}
  .frame {{ position: absolute; inset: 0; margin: 10mm; border: 8px solid {color}; pointer-events: none; }}
  header {{ display: flex; flex-direction: column; align-items: center; border-bottom: 2px solid {color};
            padding-bottom: 24px; margin-bottom: 32px; }}
  .logo {{ height: 96px; margin-bottom: 16px; object-fit: contain; }}
  h1 {{ color: {color}; font-size: 36px; margin: 0 0 8px; text-transform: uppercase; letter-spacing: 1px; text-align: center; }}
  .address {{ font-size: 14px; color: #6b7280; margin: 0; }}
  .badge {{ margin-top: 16px; padding: 4px 24px; background: #1f2937; color: #ffffff; border-radius: 9999px;
            font-size: 14px; font-weight: 600; text-transform: uppercase; letter-spacing: 2px; }}
  .details {{ display: grid; grid-template-columns: 1fr 1fr; row-gap: 16px; column-gap: 24px; font-size: 18px; margin-bottom: 32px; }}
  .details .label {{ font-weight: bold; width: 130px; color: #4b5563; display: inline-block; }}
  .details .value {{ font-weight: 600; border-bottom: 1px solid #d1d5db; }}
  table {{ width: 100%; border-collapse: collapse; margin-bottom: 32px; }}
  th, td {{ border: 1px solid #d1d5db; padding: 12px; }}
  th {{ background: {color}; color: #ffffff; text-align: left; -webkit-print-color-adjust: exact; }}
  th.narrow {{ width: 96px; text-align: center; }}
  th.wide {{ width: 128px; text-align: center; }}
  tbody tr:nth-child(even) {{ background: #f9fafb; }}
  .center {{ text-align: center; }}
  .bold {{ font-weight: bold; }}
  .total {{ font-weight: bold; background: #f3f4f6; border-top: 2px solid #9ca3af; }}
  .total .label {{ text-align: right; }}
  .summary {{ display: flex; gap: 32px; margin-bottom: 48px; }}
  .summary > div {{ flex: 1; border: 1px solid #e5e7eb; border-radius: 8px; padding: 16px; background: #f9fafb; }}
  .summary h3 {{ font-size: 14px; text-transform: uppercase; color: #4b5563; border-bottom: 1px solid #e5e7eb; padding-bottom: 8px; margin: 0 0 8px; }}
  .summary-row {{ display: flex; justify-content: space-between; margin-top: 8px; }}
  .final {{ display: flex; flex-direction: column; align-items: center; justify-content: center; }}
  .final .caption {{ font-size: 14px; font-weight: bold; color: #6b7280; text-transform: uppercase; }}
  .final .status {{ font-size: 36px; font-weight: bold; margin-top: 8px; }}
  .pass {{ color: #16a34a; }}
  .fail {{ color: #dc2626; }}
  footer {{ margin-top: auto; display: grid; grid-template-columns: 1fr 1fr 1fr; gap: 32px; padding-top: 48px; align-items: end; }}
  .sign {{ text-align: center; }}
  .sign .line {{ height: 80px; margin-bottom: 8px; border-bottom: 1px solid #9ca3af; display: flex; align-items: flex-end; justify-content: center; }}
  .sign .seal {{ height: 80px; margin-bottom: 8px; display: flex; align-items: flex-end; justify-content: center; }}
  .sign p {{ font-weight: bold; color: #4b5563; margin: 0; }}
  .seal-placeholder {{ height: 64px; width: 64px; border-radius: 9999px; border: 3px double #d1d5db; display: flex;
                       align-items: center; justify-content: center; font-size: 12px; color: #d1d5db; text-transform: uppercase; }}
  .footer-text {{ margin-top: 32px; text-align: center; font-size: 12px; color: #9ca3af; }}
</style>
</head>
<body>
<div id="{surface_id}">
<div class="card">
  <div class="frame"></div>
  <header>
    {logo}
    <h1>{school_name}</h1>
    <p class="address">{address}</p>
    <div class="badge">Annual Report Card</div>
  </header>
  <section class="details">
    <div><span class="label">Student Name:</span><span class="value">{name}</span></div>
    <div><span class="label">Roll Number:</span><span class="value">{roll}</span></div>
    <div><span class="label">Class:</span><span class="value">{class_name}</span></div>
    <div><span class="label">Section:</span><span class="value">{section}</span></div>
  </section>
  <table>
    <thead>
      <tr><th>Subject</th><th class="wide">Max Marks</th><th class="wide">Marks Obtained</th>{grade_header}</tr>
    </thead>
    <tbody>
      {rows}
      <tr class="total"><td class="label">Grand Total</td><td class="center">{max_total}</td><td class="center">{total}</td>{total_grade_cell}</tr>
    </tbody>
  </table>
  <section class="summary">
    <div>
      <h3>Performance Summary</h3>
      {percentage_row}
      <div class="summary-row"><span>Overall Grade:</span><span class="bold" style="color:{color}">{grade}</span></div>
    </div>
    <div class="final">
      <span class="caption">Final Result</span>
      <span class="status {status_class}">{status}</span>
    </div>
  </section>
  <footer>
    <div class="sign"><div class="line">{class_teacher_signature}</div><p>Class Teacher</p></div>
    <div class="sign"><div class="seal">{seal}</div></div>
    <div class="sign"><div class="line">{principal_signature}</div><p>Principal</p></div>
  </footer>
  <div class="footer-text">{footer_text}</div>
</div>
</div>
</body>
</html>"#,
        surface_id = SURFACE_ID,
        color = color,
        logo = logo,
        school_name = escape_html(non_empty_or(&template.school_name, "School Name Here")),
        address = escape_html(non_empty_or(&template.address, "Address Line 1, City, State, Zip")),
        name = display_field(card.student_name.as_deref()),
        roll = display_field(card.roll_number.as_deref()),
        class_name = display_field(card.class_name.as_deref()),
        section = display_field(card.section.as_deref()),
        grade_header = grade_header,
        rows = rows,
        max_total = result.max_total_marks,
        total = round2(result.total_marks),
        total_grade_cell = if template.show_grade { "<td></td>" } else { "" },
        percentage_row = percentage_row,
        grade = result.grade,
        status_class = status_class,
        status = result.status,
        class_teacher_signature = class_teacher_signature,
        principal_signature = principal_signature,
        seal = seal,
        footer_text = escape_html(&template.footer_text),
    )
}

fn signature_img(url: Option<&str>, alt: &str, height: u32) -> String {
    url.map(|url| {
        format!(
            r#"<img src="{}" alt="{}" style="height:{}px">"#,
            escape_html(url),
            alt,
            height
        )
    })
    .unwrap_or_default()
}

fn display_field(value: Option<&str>) -> String {
    escape_html(value.unwrap_or("-"))
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

/// HTML 转义
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
