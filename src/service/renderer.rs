//! 比对结果 -> 展示状态 (结果表、汇总行、单元格着色) 以及 HTML / CSV 输出。
//!
//! 所有来自用户或比对服务的文本都视为不可信内容, 只在 `to_html` 中统一转义。

use crate::models::{
    CellClass, CellMismatch, DisplayState, ReconciliationResult, RenderedCell, RenderedRow,
    RowClass, RowResult, SummaryLine,
};
use std::fmt::Write;

pub const MISMATCH_HEADER: &str = "Mismatches";
pub const NO_MISMATCH_PLACEHOLDER: &str = "-";
pub const EMPTY_VALUE: &str = "(empty)";
pub const MISMATCH_SEPARATOR: &str = " | ";
pub const NOT_FOUND_NOTE: &str = "Not found in tax workbook";

/// 将比对结果投影为展示状态
pub fn render(result: &ReconciliationResult) -> DisplayState {
    let issues = result.consistency_issues();
    if !issues.is_empty() {
        tracing::warn!("比对结果不一致 ({} 处): {:?}", issues.len(), issues);
    }

    let mut header = result.column_labels.clone();
    header.push(MISMATCH_HEADER.to_string());

    let width = result.column_labels.len();
    let rows = result
        .results
        .iter()
        .map(|r| render_row(r, width))
        .collect();

    let detected = result.detected.as_ref();
    DisplayState {
        summary: SummaryLine {
            total_rows: result.summary.total_rows,
            all_match: result.summary.all_match,
            has_mismatch: result.summary.has_mismatch,
            match_key_label: result.match_key_label.clone(),
            elapsed_ms: result.elapsed_ms,
            esg_sheet: detected.and_then(|d| d.esg_sheet.clone()),
            tax_sheet: detected.and_then(|d| d.tax_sheet.clone()),
        },
        header,
        rows,
    }
}

pub fn classify_row(all_match: bool) -> RowClass {
    if all_match {
        RowClass::Ok
    } else {
        RowClass::Warn
    }
}

pub fn classify_cell(matched: bool) -> CellClass {
    if matched {
        CellClass::Ok
    } else {
        CellClass::Warn
    }
}

/// 单行渲染; width 为比对列数, 缺失的值按空串处理
pub fn render_row(row: &RowResult, width: usize) -> RenderedRow {
    let cells = (0..width)
        .map(|i| {
            let esg = row.values_esg.get(i).map(String::as_str).unwrap_or("");
            let tax = row.values_tax.get(i).map(String::as_str).unwrap_or("");
            // 缺少 cells_match 时视为一致
            let matched = row.cells_match.get(i).copied().unwrap_or(true);
            RenderedCell {
                value: esg.to_string(),
                class: classify_cell(matched),
                tooltip: (!matched).then(|| format!("ESG: {} | TAX: {}", esg, tax)),
            }
        })
        .collect();

    RenderedRow {
        row: row.row,
        class: classify_row(row.all_match),
        cells,
        mismatch_text: format_mismatches(&row.mismatches),
        not_found: row.found == Some(false),
    }
}

/// `A: ESG=x TAX=y | B: ESG=(empty) TAX=z`, 保持服务端顺序
pub fn format_mismatches(mismatches: &[CellMismatch]) -> String {
    if mismatches.is_empty() {
        return NO_MISMATCH_PLACEHOLDER.to_string();
    }
    mismatches
        .iter()
        .map(|m| {
            format!(
                "{}: ESG={} TAX={}",
                m.column_label,
                or_empty(&m.esg_value),
                or_empty(&m.tax_value)
            )
        })
        .collect::<Vec<_>>()
        .join(MISMATCH_SEPARATOR)
}

fn or_empty(value: &str) -> &str {
    if value.is_empty() {
        EMPTY_VALUE
    } else {
        value
    }
}

/// HTML 转义 (文本与属性值通用)
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

impl SummaryLine {
    pub fn text(&self) -> String {
        let mut text = format!(
            "Total rows: {} | All match: {} | Has mismatch: {} | Match key: {}",
            self.total_rows, self.all_match, self.has_mismatch, self.match_key_label
        );
        if let Some(ms) = self.elapsed_ms {
            text.push_str(&format!(" | {:.2} ms", ms));
        }
        if let Some(sheet) = &self.esg_sheet {
            text.push_str(&format!(" | ESG sheet: {}", sheet));
        }
        if let Some(sheet) = &self.tax_sheet {
            text.push_str(&format!(" | Tax sheet: {}", sheet));
        }
        text
    }
}

impl DisplayState {
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        // String 的 fmt::Write 不会失败
        let _ = writeln!(html, "<p class=\"summary\">{}</p>", escape_html(&self.summary.text()));
        html.push_str("<table class=\"result-table\">\n<thead><tr>");
        for label in &self.header {
            let _ = write!(html, "<th>{}</th>", escape_html(label));
        }
        html.push_str("</tr></thead>\n<tbody>\n");

        for row in &self.rows {
            let _ = write!(html, "<tr class=\"{}\" data-row=\"{}\"", row.class.as_str(), row.row);
            if row.not_found {
                html.push_str(" data-found=\"false\"");
            }
            html.push('>');
            for cell in &row.cells {
                match &cell.tooltip {
                    Some(tip) => {
                        let _ = write!(
                            html,
                            "<td class=\"{}\" title=\"{}\">{}</td>",
                            cell.class.as_str(),
                            escape_html(tip),
                            escape_html(&cell.value)
                        );
                    }
                    None => {
                        let _ = write!(
                            html,
                            "<td class=\"{}\">{}</td>",
                            cell.class.as_str(),
                            escape_html(&cell.value)
                        );
                    }
                }
            }
            html.push_str("<td class=\"mismatches\">");
            if row.not_found {
                let _ = write!(html, "<span class=\"not-found\">{}</span> ", NOT_FOUND_NOTE);
            }
            let _ = writeln!(html, "{}</td></tr>", escape_html(&row.mismatch_text));
        }
        html.push_str("</tbody>\n</table>\n");
        html
    }

    /// 导出为 CSV: 行号 + 比对列 (ESG 值) + 差异描述
    pub fn to_csv(&self) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        let mut header = vec!["Row".to_string()];
        header.extend(self.header.iter().cloned());
        writer.write_record(&header)?;

        for row in &self.rows {
            let mut record = Vec::with_capacity(row.cells.len() + 2);
            record.push(row.row.to_string());
            record.extend(row.cells.iter().map(|c| c.value.clone()));
            record.push(row.mismatch_text.clone());
            writer.write_record(&record)?;
        }

        writer.flush()?;
        let bytes = writer.into_inner().map_err(|e| e.to_string())?;
        Ok(String::from_utf8(bytes)?)
    }
}
