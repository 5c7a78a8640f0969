use crate::error::ClientError;

/// 税务表默认工作表名
pub const DEFAULT_TAX_SHEET_NAME: &str = "ตารางไมวัน";
/// ESG 工作表名, 服务端按去空白后的包含关系查找
pub const ESG_SHEET_NAME: &str = "ESG";
/// 行匹配键列 (车架号列)
pub const MATCH_KEY_COLUMN: u32 = 3;
/// ESG / 税务比对列, 按位置一一对应
pub const ESG_COLUMNS: &[u32] = &[2, 3, 5, 6, 8, 14, 15];
pub const TAX_COLUMNS: &[u32] = &[1, 2, 4, 5, 7, 13, 14];
pub const CASE_SENSITIVE: bool = true;

const _: () = assert!(ESG_COLUMNS.len() == TAX_COLUMNS.len());

pub const MATCH_COLUMNS_PATH: &str = "/match-columns";

/// 上传文件 (原始文件名 + 内容)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePayload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl FilePayload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// 发往比对服务的一次请求
#[derive(Debug, Clone)]
pub struct ReconciliationRequest {
    pub esg_file: FilePayload,
    pub tax_file: FilePayload,
    pub sheet_name: String,
    pub esg_sheet_name: String,
    pub match_key_col: u32,
    pub esg_cols: Vec<u32>,
    pub tax_cols: Vec<u32>,
    pub case_sensitive: bool,
}

impl ReconciliationRequest {
    /// 查询参数 (未编码)
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("sheet_name", self.sheet_name.clone()),
            ("esg_sheet_name", self.esg_sheet_name.clone()),
            ("esg_cols", join_cols(&self.esg_cols)),
            ("tax_cols", join_cols(&self.tax_cols)),
            ("match_key_col", self.match_key_col.to_string()),
            ("case_sensitive", self.case_sensitive.to_string()),
        ]
    }

    /// 完整请求地址, 查询参数做百分号编码
    pub fn endpoint_url(&self, base: &str) -> Result<reqwest::Url, ClientError> {
        let raw = format!("{}{}", base.trim_end_matches('/'), MATCH_COLUMNS_PATH);
        reqwest::Url::parse_with_params(&raw, self.query_pairs())
            .map_err(|e| ClientError::Transport(format!("invalid matcher url {}: {}", raw, e)))
    }
}

fn join_cols(cols: &[u32]) -> String {
    cols.iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(sheet_name: &str) -> ReconciliationRequest {
        ReconciliationRequest {
            esg_file: FilePayload::new("esg.xlsx", b"esg".to_vec()),
            tax_file: FilePayload::new("tax.xls", b"tax".to_vec()),
            sheet_name: sheet_name.to_string(),
            esg_sheet_name: ESG_SHEET_NAME.to_string(),
            match_key_col: MATCH_KEY_COLUMN,
            esg_cols: ESG_COLUMNS.to_vec(),
            tax_cols: TAX_COLUMNS.to_vec(),
            case_sensitive: CASE_SENSITIVE,
        }
    }

    #[test]
    fn query_pairs_cover_all_parameters() {
        let pairs = request("Sheet1").query_pairs();
        let keys: Vec<_> = pairs.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            vec!["sheet_name", "esg_sheet_name", "esg_cols", "tax_cols", "match_key_col", "case_sensitive"]
        );
        assert_eq!(pairs[2].1, "2,3,5,6,8,14,15");
        assert_eq!(pairs[3].1, "1,2,4,5,7,13,14");
        assert_eq!(pairs[4].1, "3");
        assert_eq!(pairs[5].1, "true");
    }

    #[test]
    fn endpoint_url_percent_encodes_values() {
        let url = request("Tax & Co/2024").endpoint_url("http://127.0.0.1:8000/").unwrap();
        assert_eq!(url.path(), "/match-columns");
        let query = url.query().unwrap();
        assert!(query.contains("sheet_name=Tax+%26+Co%2F2024"), "{}", query);
        assert!(query.contains("esg_cols=2%2C3%2C5%2C6%2C8%2C14%2C15"), "{}", query);

        let decoded: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(decoded.contains(&("sheet_name".to_string(), "Tax & Co/2024".to_string())));
    }

    #[test]
    fn non_ascii_sheet_name_survives_encoding() {
        let url = request(DEFAULT_TAX_SHEET_NAME).endpoint_url("http://localhost:8000").unwrap();
        let sheet = url
            .query_pairs()
            .find(|(k, _)| k == "sheet_name")
            .map(|(_, v)| v.into_owned());
        assert_eq!(sheet.as_deref(), Some(DEFAULT_TAX_SHEET_NAME));
        assert!(url.query().unwrap().is_ascii());
    }

    #[test]
    fn invalid_base_is_a_transport_error() {
        assert!(matches!(
            request("x").endpoint_url("not a url"),
            Err(ClientError::Transport(_))
        ));
    }
}
