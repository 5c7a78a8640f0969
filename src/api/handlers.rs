use crate::error::RequestError;
use crate::models::FilePayload;
use crate::service::{CompareSession, MatcherClient};
use axum::{
    extract::{Json, Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

/// 共享状态: 单个比对会话 + 比对服务客户端
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<CompareSession>>,
    pub client: MatcherClient,
    /// 启动时由配置确定的比对服务地址
    pub matcher_base: String,
}

impl AppState {
    pub fn new(matcher_base: impl Into<String>) -> Self {
        Self {
            session: Arc::new(Mutex::new(CompareSession::new())),
            client: MatcherClient::new(),
            matcher_base: matcher_base.into(),
        }
    }
}

/// 表单中的上传内容
#[derive(Debug, Default)]
struct UploadForm {
    esg_file: Option<FilePayload>,
    tax_file: Option<FilePayload>,
    sheet_name: Option<String>,
    file: Option<FilePayload>,
}

#[derive(Debug, Serialize)]
pub struct SheetNamesResponse {
    pub sheet_names: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 上传两个文件并执行比对, 返回会话视图 HTML 片段
pub async fn compare(State(state): State<AppState>, multipart: Multipart) -> Response {
    let form = match read_form(multipart).await {
        Ok(form) => form,
        Err(msg) => return (StatusCode::BAD_REQUEST, msg).into_response(),
    };

    // 请求只用本次表单里的文件; 锁只在状态迁移时持有, 不跨越外部请求
    let request = {
        let mut session = state.session.lock().await;
        let sheet_name = form.sheet_name.as_deref().unwrap_or("");
        match session.begin_with(form.esg_file, form.tax_file, sheet_name) {
            Ok(request) => request,
            Err(e) => {
                let status = match e {
                    RequestError::Busy => StatusCode::CONFLICT,
                    RequestError::MissingFile(_) | RequestError::EmptyFile(_) => {
                        StatusCode::BAD_REQUEST
                    }
                };
                tracing::warn!("拒绝比对请求: {}", e);
                return (status, e.to_string()).into_response();
            }
        }
    };

    // 入站连接断开会丢弃 handler future, 外部请求和 complete 放在独立任务里保证回到 Idle
    let task_state = state.clone();
    let task = tokio::spawn(async move {
        let outcome = task_state
            .client
            .compare(&task_state.matcher_base, &request)
            .await;
        let failed = outcome.is_err();
        let mut session = task_state.session.lock().await;
        session.complete(outcome);
        (failed, session.view_html())
    });

    match task.await {
        Ok((false, html)) => (StatusCode::OK, Html(html)).into_response(),
        Ok((true, html)) => (StatusCode::BAD_GATEWAY, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("比对任务异常退出: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e)).into_response()
        }
    }
}

/// 当前会话视图
pub async fn result_view(State(state): State<AppState>) -> Html<String> {
    Html(state.session.lock().await.view_html())
}

/// 导出最近一次成功比对的结果表
pub async fn export_csv(State(state): State<AppState>) -> Response {
    let session = state.session.lock().await;
    let Some(display) = session.display() else {
        return (StatusCode::NOT_FOUND, "No comparison result yet").into_response();
    };
    match display.to_csv() {
        Ok(csv) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"reconciliation.csv\"",
                ),
            ],
            csv,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("CSV 导出失败: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e)).into_response()
        }
    }
}

/// 代理比对服务的 /sheets, 列出工作表名
pub async fn list_sheets(State(state): State<AppState>, multipart: Multipart) -> Response {
    let file = match read_form(multipart).await {
        Ok(UploadForm { file: Some(file), .. }) if !file.is_empty() => file,
        Ok(_) => {
            let response = ErrorResponse {
                detail: "missing file: file".to_string(),
            };
            return (StatusCode::BAD_REQUEST, Json(response)).into_response();
        }
        Err(msg) => {
            return (StatusCode::BAD_REQUEST, Json(ErrorResponse { detail: msg })).into_response()
        }
    };

    match state.client.list_sheets(&state.matcher_base, &file).await {
        Ok(sheet_names) => (StatusCode::OK, Json(SheetNamesResponse { sheet_names })).into_response(),
        Err(e) => {
            let response = ErrorResponse {
                detail: e.user_message(),
            };
            (StatusCode::BAD_GATEWAY, Json(response)).into_response()
        }
    }
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, String> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await.map_err(|e| e.to_string())? {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().unwrap_or(name.as_str()).to_string();
        match name.as_str() {
            "esg_file" | "tax_file" | "file" => {
                let bytes = field.bytes().await.map_err(|e| e.to_string())?;
                let payload = FilePayload::new(file_name, bytes.to_vec());
                match name.as_str() {
                    "esg_file" => form.esg_file = Some(payload),
                    "tax_file" => form.tax_file = Some(payload),
                    _ => form.file = Some(payload),
                }
            }
            "sheet_name" => {
                form.sheet_name = Some(field.text().await.map_err(|e| e.to_string())?);
            }
            other => tracing::debug!("忽略表单字段 {}", other),
        }
    }
    Ok(form)
}
