use thiserror::Error;

/// 构建比对请求时的本地错误 (不会发到网络层)
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("missing file: {0}")]
    MissingFile(&'static str),
    #[error("file is empty: {0}")]
    EmptyFile(&'static str),
    #[error("a comparison is already in progress")]
    Busy,
}

/// 调用比对服务的错误
#[derive(Debug, Error)]
pub enum ClientError {
    /// 服务返回非 2xx, detail 取自 {"detail": "..."}
    #[error("matching service returned HTTP {status}")]
    Server { status: u16, detail: Option<String> },
    /// 网络失败或响应体无法解析
    #[error("transport error: {0}")]
    Transport(String),
}

pub const TRANSPORT_ERROR_MESSAGE: &str = "Cannot reach the matching service";

impl ClientError {
    /// 展示给用户的文本: 优先使用服务端 detail
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Server {
                detail: Some(detail),
                ..
            } if !detail.trim().is_empty() => detail.clone(),
            ClientError::Server { status, .. } => format!("Comparison failed (HTTP {})", status),
            ClientError::Transport(_) => TRANSPORT_ERROR_MESSAGE.to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Transport(e.to_string())
    }
}
