use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RowClass {
    Ok,
    Warn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CellClass {
    Ok,
    Warn,
}

impl RowClass {
    pub fn as_str(self) -> &'static str {
        match self {
            RowClass::Ok => "row-ok",
            RowClass::Warn => "row-warn",
        }
    }
}

impl CellClass {
    pub fn as_str(self) -> &'static str {
        match self {
            CellClass::Ok => "cell-ok",
            CellClass::Warn => "cell-warn",
        }
    }
}

/// 渲染后的结果表 (未转义, 转义在输出 HTML 时统一做)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DisplayState {
    pub summary: SummaryLine,
    /// 比对列标题 + 末尾的 Mismatches 列
    pub header: Vec<String>,
    pub rows: Vec<RenderedRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryLine {
    pub total_rows: u64,
    pub all_match: u64,
    pub has_mismatch: u64,
    pub match_key_label: String,
    pub elapsed_ms: Option<f64>,
    pub esg_sheet: Option<String>,
    pub tax_sheet: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedRow {
    pub row: u64,
    pub class: RowClass,
    pub cells: Vec<RenderedCell>,
    pub mismatch_text: String,
    pub not_found: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedCell {
    pub value: String,
    pub class: CellClass,
    pub tooltip: Option<String>,
}
