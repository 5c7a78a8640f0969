use crate::error::RequestError;
use crate::models::request::{
    CASE_SENSITIVE, DEFAULT_TAX_SHEET_NAME, ESG_COLUMNS, ESG_SHEET_NAME, MATCH_KEY_COLUMN,
    TAX_COLUMNS,
};
use crate::models::{FilePayload, ReconciliationRequest};

/// 组装比对请求: 两个文件必须都存在且非空, 工作表名为空时使用默认值
pub fn build_request(
    esg_file: Option<FilePayload>,
    tax_file: Option<FilePayload>,
    sheet_name_override: &str,
) -> Result<ReconciliationRequest, RequestError> {
    let esg_file = esg_file.ok_or(RequestError::MissingFile("esg_file"))?;
    let tax_file = tax_file.ok_or(RequestError::MissingFile("tax_file"))?;
    if esg_file.is_empty() {
        return Err(RequestError::EmptyFile("esg_file"));
    }
    if tax_file.is_empty() {
        return Err(RequestError::EmptyFile("tax_file"));
    }

    Ok(ReconciliationRequest {
        esg_file,
        tax_file,
        sheet_name: resolve_sheet_name(sheet_name_override),
        esg_sheet_name: ESG_SHEET_NAME.to_string(),
        match_key_col: MATCH_KEY_COLUMN,
        esg_cols: ESG_COLUMNS.to_vec(),
        tax_cols: TAX_COLUMNS.to_vec(),
        case_sensitive: CASE_SENSITIVE,
    })
}

pub fn resolve_sheet_name(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        DEFAULT_TAX_SHEET_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> Option<FilePayload> {
        Some(FilePayload::new(name, b"PK\x03\x04".to_vec()))
    }

    #[test]
    fn missing_files_are_rejected() {
        assert_eq!(
            build_request(None, file("tax.xlsx"), "").unwrap_err(),
            RequestError::MissingFile("esg_file")
        );
        assert_eq!(
            build_request(file("esg.xlsx"), None, "").unwrap_err(),
            RequestError::MissingFile("tax_file")
        );
    }

    #[test]
    fn empty_payload_is_rejected() {
        let empty = Some(FilePayload::new("tax.xlsx", Vec::new()));
        assert_eq!(
            build_request(file("esg.xlsx"), empty, "").unwrap_err(),
            RequestError::EmptyFile("tax_file")
        );
    }

    #[test]
    fn blank_sheet_name_uses_default() {
        let req = build_request(file("esg.xlsx"), file("tax.xlsx"), "   ").unwrap();
        assert_eq!(req.sheet_name, DEFAULT_TAX_SHEET_NAME);
        let req = build_request(file("esg.xlsx"), file("tax.xlsx"), "").unwrap();
        assert_eq!(req.sheet_name, DEFAULT_TAX_SHEET_NAME);
    }

    #[test]
    fn sheet_name_is_trimmed() {
        let req = build_request(file("esg.xlsx"), file("tax.xlsx"), "  Sheet 2 ").unwrap();
        assert_eq!(req.sheet_name, "Sheet 2");
    }

    #[test]
    fn fixed_configuration_is_applied() {
        let req = build_request(file("esg.xlsx"), file("tax.xlsx"), "").unwrap();
        assert_eq!(req.esg_cols.len(), req.tax_cols.len());
        assert_eq!(req.esg_sheet_name, ESG_SHEET_NAME);
        assert_eq!(req.match_key_col, MATCH_KEY_COLUMN);
        assert!(req.case_sensitive);
        assert_eq!(req.esg_file.file_name, "esg.xlsx");
    }
}
