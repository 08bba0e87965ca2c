use crate::http::Response;
use crate::runner::types::AbortReason;
use serde_json::Value;

/// 执行过程中产生的事件，按发生顺序交给 [`Reporter`](crate::runner::Reporter)
#[derive(Debug, Clone)]
pub enum RunEvent {
    ActionStarted {
        index: usize,
        name: String,
    },
    RequestIssued {
        method: String,
        url: String,
        body: Option<String>,
    },
    ResponseReceived {
        response: Response,
    },
    VariableCaptured {
        key: String,
        value: Value,
    },
    CaptureFailed {
        key: String,
        expr: String,
        error: String,
    },
    AssertionPassed {
        expr: String,
    },
    AssertionFailed {
        expr: String,
    },
    RunCompleted {
        actions: usize,
    },
    RunAborted {
        reason: AbortReason,
    },
}

impl RunEvent {
    /// 事件名，用于日志和测试断言
    pub fn kind(&self) -> &'static str {
        match self {
            RunEvent::ActionStarted { .. } => "ActionStarted",
            RunEvent::RequestIssued { .. } => "RequestIssued",
            RunEvent::ResponseReceived { .. } => "ResponseReceived",
            RunEvent::VariableCaptured { .. } => "VariableCaptured",
            RunEvent::CaptureFailed { .. } => "CaptureFailed",
            RunEvent::AssertionPassed { .. } => "AssertionPassed",
            RunEvent::AssertionFailed { .. } => "AssertionFailed",
            RunEvent::RunCompleted { .. } => "RunCompleted",
            RunEvent::RunAborted { .. } => "RunAborted",
        }
    }
}
