use serde::{Deserialize, Serialize};

/// 比对服务的成功响应; 缺失字段一律取默认值 (空列表 / 0 / 空串)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconciliationResult {
    pub column_labels: Vec<String>,
    pub match_key_label: String,
    pub summary: MatchSummary,
    pub results: Vec<RowResult>,
    pub elapsed_ms: Option<f64>,
    pub detected: Option<DetectedLayout>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchSummary {
    pub total_rows: u64,
    pub all_match: u64,
    pub has_mismatch: u64,
}

/// 服务端自动识别出的工作表与列
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectedLayout {
    pub esg_sheet: Option<String>,
    pub tax_sheet: Option<String>,
    pub esg_cols: Vec<u32>,
    pub tax_cols: Vec<u32>,
}

/// 单行比对结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RowResult {
    pub row: u64,
    pub all_match: bool,
    pub values_esg: Vec<String>,
    pub values_tax: Vec<String>,
    pub cells_match: Vec<bool>,
    pub mismatches: Vec<CellMismatch>,
    /// false: 税务表中找不到对应行
    pub found: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellMismatch {
    pub column_label: String,
    pub esg_value: String,
    pub tax_value: String,
}

impl MatchSummary {
    pub fn is_consistent(&self) -> bool {
        self.all_match
            .checked_add(self.has_mismatch)
            .is_some_and(|sum| sum == self.total_rows)
    }
}

impl RowResult {
    /// all_match / cells_match / mismatches 三者是否一致
    pub fn is_consistent(&self) -> bool {
        let cells_ok = self.cells_match.iter().all(|m| *m);
        self.all_match == cells_ok && self.all_match == self.mismatches.is_empty()
    }
}

impl ReconciliationResult {
    /// 列出违反不变式的地方, 只用于告警
    pub fn consistency_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !self.summary.is_consistent() {
            issues.push(format!(
                "summary: all_match {} + has_mismatch {} != total_rows {}",
                self.summary.all_match, self.summary.has_mismatch, self.summary.total_rows
            ));
        }
        for r in &self.results {
            if !r.is_consistent() {
                issues.push(format!(
                    "row {}: all_match={} but {} mismatches, cells_match={:?}",
                    r.row,
                    r.all_match,
                    r.mismatches.len(),
                    r.cells_match
                ));
            }
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default_to_empty() {
        let result: ReconciliationResult = serde_json::from_str("{}").unwrap();
        assert!(result.column_labels.is_empty());
        assert!(result.results.is_empty());
        assert_eq!(result.summary, MatchSummary::default());
        assert_eq!(result.match_key_label, "");
        assert!(result.consistency_issues().is_empty());
    }

    #[test]
    fn parses_full_service_response() {
        let json = r#"{
            "column_labels": ["A", "B"],
            "match_key_label": "ID",
            "elapsed_ms": 12.5,
            "detected": {"esg_sheet": "ESG", "tax_sheet": null, "esg_cols": [1, 2], "tax_cols": [3, 4]},
            "summary": {"total_rows": 1, "all_match": 0, "has_mismatch": 1},
            "results": [{
                "row": 1, "all_match": false, "found": true,
                "values_esg": ["x", "y"], "values_tax": ["x", "z"],
                "cells_match": [true, false], "cells_compared": [true, true],
                "mismatches": [{"column_label": "B", "esg_value": "y", "tax_value": "z"}]
            }]
        }"#;
        let result: ReconciliationResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.column_labels, vec!["A", "B"]);
        assert_eq!(result.elapsed_ms, Some(12.5));
        assert_eq!(result.detected.as_ref().unwrap().tax_sheet, None);
        assert_eq!(result.results[0].mismatches[0].tax_value, "z");
        assert_eq!(result.results[0].found, Some(true));
        assert!(result.consistency_issues().is_empty());
    }

    #[test]
    fn row_without_optional_lists_defaults() {
        let row: RowResult = serde_json::from_str(r#"{"row": 3, "all_match": true}"#).unwrap();
        assert!(row.values_tax.is_empty());
        assert!(row.cells_match.is_empty());
        assert!(row.is_consistent());
    }

    #[test]
    fn overflowing_summary_is_inconsistent() {
        let summary = MatchSummary {
            total_rows: u64::MAX,
            all_match: u64::MAX,
            has_mismatch: 1,
        };
        assert!(!summary.is_consistent());
        let result = ReconciliationResult {
            summary,
            ..Default::default()
        };
        assert_eq!(result.consistency_issues().len(), 1);
    }

    #[test]
    fn reports_broken_invariants() {
        let result = ReconciliationResult {
            summary: MatchSummary {
                total_rows: 2,
                all_match: 2,
                has_mismatch: 1,
            },
            results: vec![RowResult {
                row: 1,
                all_match: true,
                cells_match: vec![false],
                ..Default::default()
            }],
            ..Default::default()
        };
        let issues = result.consistency_issues();
        assert_eq!(issues.len(), 2);
        assert!(issues[0].starts_with("summary"));
        assert!(issues[1].starts_with("row 1"));
    }
}
