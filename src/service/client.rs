use crate::error::ClientError;
use crate::models::{FilePayload, ReconciliationRequest, ReconciliationResult};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

pub const SHEETS_PATH: &str = "/sheets";

/// 错误响应 {"detail": ...}; FastAPI 校验错误时 detail 可能是数组
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SheetNamesBody {
    sheet_names: Vec<String>,
}

/// 比对服务客户端 (不设超时, 不重试)
#[derive(Debug, Clone, Default)]
pub struct MatcherClient {
    http: reqwest::Client,
}

impl MatcherClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// POST /match-columns
    pub async fn compare(
        &self,
        base: &str,
        request: &ReconciliationRequest,
    ) -> Result<ReconciliationResult, ClientError> {
        let url = request.endpoint_url(base)?;
        let form = Form::new()
            .part("esg_file", file_part(&request.esg_file))
            .part("tax_file", file_part(&request.tax_file));

        tracing::info!(
            "发送比对请求 {} (esg={}, {} bytes; tax={}, {} bytes; sheet={})",
            url.path(),
            request.esg_file.file_name,
            request.esg_file.bytes.len(),
            request.tax_file.file_name,
            request.tax_file.bytes.len(),
            request.sheet_name
        );

        let response = self.http.post(url).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            let detail = read_detail(response).await;
            tracing::warn!("比对服务返回 HTTP {}: {:?}", status.as_u16(), detail);
            return Err(ClientError::Server {
                status: status.as_u16(),
                detail,
            });
        }

        let body = response.bytes().await?;
        let result: ReconciliationResult = serde_json::from_slice(&body)
            .map_err(|e| ClientError::Transport(format!("unparseable response body: {}", e)))?;
        tracing::info!(
            "比对完成: 共 {} 行, 全部一致 {}, 存在差异 {}",
            result.summary.total_rows,
            result.summary.all_match,
            result.summary.has_mismatch
        );
        Ok(result)
    }

    /// GET /sheets, 列出工作簿中的工作表名
    ///
    /// 比对服务该接口就是 GET + multipart 请求体 (file 字段), 不要改成 POST。
    pub async fn list_sheets(&self, base: &str, file: &FilePayload) -> Result<Vec<String>, ClientError> {
        let url = format!("{}{}", base.trim_end_matches('/'), SHEETS_PATH);
        let form = Form::new().part("file", file_part(file));

        let response = self.http.get(&url).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Server {
                status: status.as_u16(),
                detail: read_detail(response).await,
            });
        }

        let body = response.bytes().await?;
        let sheets: SheetNamesBody = serde_json::from_slice(&body)
            .map_err(|e| ClientError::Transport(format!("unparseable response body: {}", e)))?;
        Ok(sheets.sheet_names)
    }
}

fn file_part(file: &FilePayload) -> Part {
    Part::bytes(file.bytes.clone()).file_name(file.file_name.clone())
}

async fn read_detail(response: reqwest::Response) -> Option<String> {
    let body: ErrorBody = response.json().await.ok()?;
    match body.detail? {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}
