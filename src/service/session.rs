//! 比对操作的状态机。
//!
//! Idle --begin--> Loading --complete--> Idle
//!
//! 同一时间最多一个进行中的请求: Loading 期间按钮禁用, `begin` 返回 `Busy`。
//! 失败只更新状态行, 不会清掉上一次成功的结果表。

use crate::error::{ClientError, RequestError};
use crate::models::{DisplayState, FilePayload, ReconciliationRequest, ReconciliationResult};
use crate::service::renderer::{escape_html, render};
use crate::service::request_builder::build_request;
use std::fmt::Write;

pub const COMPARING_MESSAGE: &str = "Comparing...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Ready,
    Comparing,
    Done { total_rows: u64 },
    ServerError(String),
    TransportError(String),
}

impl Status {
    pub fn message(&self) -> String {
        match self {
            Status::Ready => String::new(),
            Status::Comparing => COMPARING_MESSAGE.to_string(),
            Status::Done { total_rows } => format!("Done: {} rows compared", total_rows),
            Status::ServerError(msg) | Status::TransportError(msg) => msg.clone(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Status::ServerError(_) | Status::TransportError(_))
    }
}

#[derive(Debug, Clone)]
pub struct CompareSession {
    esg_file: Option<FilePayload>,
    tax_file: Option<FilePayload>,
    sheet_name: String,
    phase: Phase,
    status: Status,
    display: Option<DisplayState>,
}

impl Default for CompareSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CompareSession {
    pub fn new() -> Self {
        Self {
            esg_file: None,
            tax_file: None,
            sheet_name: String::new(),
            phase: Phase::Idle,
            status: Status::Ready,
            display: None,
        }
    }

    pub fn select_esg_file(&mut self, file: FilePayload) {
        self.esg_file = Some(file);
    }

    pub fn select_tax_file(&mut self, file: FilePayload) {
        self.tax_file = Some(file);
    }

    pub fn set_sheet_name(&mut self, raw: &str) {
        self.sheet_name = raw.to_string();
    }

    /// 按钮是否可用: 两个文件都已选择且没有进行中的请求
    pub fn can_compare(&self) -> bool {
        self.phase == Phase::Idle && self.esg_file.is_some() && self.tax_file.is_some()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn display(&self) -> Option<&DisplayState> {
        self.display.as_ref()
    }

    pub fn result_visible(&self) -> bool {
        self.display.is_some()
    }

    /// 用本次提交的文件与工作表名替换当前选择后开始比对。
    /// 进行中时直接返回 Busy, 不改动已有选择。
    pub fn begin_with(
        &mut self,
        esg_file: Option<FilePayload>,
        tax_file: Option<FilePayload>,
        sheet_name: &str,
    ) -> Result<ReconciliationRequest, RequestError> {
        if self.phase == Phase::Loading {
            return Err(RequestError::Busy);
        }
        self.esg_file = esg_file;
        self.tax_file = tax_file;
        self.sheet_name = sheet_name.to_string();
        self.begin()
    }

    /// Idle -> Loading, 返回要发送的请求
    pub fn begin(&mut self) -> Result<ReconciliationRequest, RequestError> {
        if self.phase == Phase::Loading {
            return Err(RequestError::Busy);
        }
        let request = build_request(self.esg_file.clone(), self.tax_file.clone(), &self.sheet_name)?;
        self.phase = Phase::Loading;
        self.status = Status::Comparing;
        Ok(request)
    }

    /// 任意结果都回到 Idle; 只有成功才替换结果表
    pub fn complete(&mut self, outcome: Result<ReconciliationResult, ClientError>) {
        self.phase = Phase::Idle;
        match outcome {
            Ok(result) => {
                self.status = Status::Done {
                    total_rows: result.summary.total_rows,
                };
                self.display = Some(render(&result));
            }
            Err(e @ ClientError::Server { .. }) => {
                self.status = Status::ServerError(e.user_message());
            }
            Err(e @ ClientError::Transport(_)) => {
                tracing::error!("比对请求失败: {}", e);
                self.status = Status::TransportError(e.user_message());
            }
        }
    }

    /// 状态行 + 按钮 + 结果区 (从未成功时隐藏)
    pub fn view_html(&self) -> String {
        let mut html = String::new();
        let phase = match self.phase {
            Phase::Idle => "idle",
            Phase::Loading => "loading",
        };
        let _ = writeln!(html, "<div id=\"compare-view\" data-phase=\"{}\">", phase);

        let status_class = if self.status.is_error() {
            "status status-error"
        } else {
            "status"
        };
        let _ = writeln!(
            html,
            "<p class=\"{}\">{}</p>",
            status_class,
            escape_html(&self.status.message())
        );

        let disabled = if self.can_compare() { "" } else { " disabled" };
        let _ = writeln!(html, "<button id=\"compare\" type=\"submit\"{}>Compare</button>", disabled);

        match &self.display {
            Some(display) => {
                let _ = write!(html, "<section id=\"result\">\n{}</section>\n", display.to_html());
            }
            None => html.push_str("<section id=\"result\" hidden></section>\n"),
        }
        html.push_str("</div>\n");
        html
    }
}
