use crate::expression::EvaluationError;
use crate::http::TransportError;
use crate::variable::TemplateError;
use std::time::Duration;

/// 运行状态
///
/// `Idle -> Running(i) -> Completed | Aborted(reason)`
#[derive(Debug, Clone)]
pub enum RunState {
    Idle,
    Running(usize),
    Completed,
    Aborted(AbortReason),
}

/// 运行中止的原因
///
/// 每种原因都带有动作序号（从 0 开始）和动作名称，消息中以从 1 开始的编号显示。
#[derive(Debug, Clone, thiserror::Error)]
pub enum AbortReason {
    #[error("action #{} '{}': failed to resolve template in {}: {}", .index + 1, .action, .field, .source)]
    Template {
        index: usize,
        action: String,
        field: String,
        #[source]
        source: TemplateError,
    },

    #[error("action #{} '{}': {}", .index + 1, .action, .source)]
    Transport {
        index: usize,
        action: String,
        #[source]
        source: TransportError,
    },

    #[error("action #{} '{}': capture '{}' failed: {}", .index + 1, .action, .key, .source)]
    Capture {
        index: usize,
        action: String,
        key: String,
        expr: String,
        #[source]
        source: EvaluationError,
    },

    #[error("action #{} '{}': {}", .index + 1, .action, .source)]
    Evaluation {
        index: usize,
        action: String,
        expr: String,
        #[source]
        source: EvaluationError,
    },

    #[error("action #{} '{}': Assertion failed: {}", .index + 1, .action, .expr)]
    AssertionFailed {
        index: usize,
        action: String,
        expr: String,
    },

    #[error("run cancelled at action #{} '{}'", .index + 1, .action)]
    Cancelled { index: usize, action: String },
}

impl AbortReason {
    /// 中止时所在动作的序号
    pub fn index(&self) -> usize {
        match self {
            AbortReason::Template { index, .. }
            | AbortReason::Transport { index, .. }
            | AbortReason::Capture { index, .. }
            | AbortReason::Evaluation { index, .. }
            | AbortReason::AssertionFailed { index, .. }
            | AbortReason::Cancelled { index, .. } => *index,
        }
    }

    pub fn action(&self) -> &str {
        match self {
            AbortReason::Template { action, .. }
            | AbortReason::Transport { action, .. }
            | AbortReason::Capture { action, .. }
            | AbortReason::Evaluation { action, .. }
            | AbortReason::AssertionFailed { action, .. }
            | AbortReason::Cancelled { action, .. } => action,
        }
    }
}

/// 一次运行的结果
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// 终止状态：`Completed` 或 `Aborted`
    pub state: RunState,

    /// 最后一个开始执行的动作序号
    pub last_index: Option<usize>,

    /// 实际发出的请求数
    pub requests_sent: usize,

    pub duration: Duration,
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self.state, RunState::Completed)
    }

    pub fn abort_reason(&self) -> Option<&AbortReason> {
        match &self.state {
            RunState::Aborted(reason) => Some(reason),
            _ => None,
        }
    }

    /// 进程退出码：完成为 0，否则为 1
    pub fn exit_code(&self) -> i32 {
        if self.is_completed() { 0 } else { 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abort_reason_messages() {
        let reason = AbortReason::AssertionFailed {
            index: 0,
            action: "get".to_string(),
            expr: "response.status === 200".to_string(),
        };
        assert_eq!(
            reason.to_string(),
            "action #1 'get': Assertion failed: response.status === 200"
        );
        assert_eq!(reason.index(), 0);
        assert_eq!(reason.action(), "get");

        let reason = AbortReason::Template {
            index: 2,
            action: "create".to_string(),
            field: "url".to_string(),
            source: TemplateError::Unclosed { offset: 3 },
        };
        assert_eq!(
            reason.to_string(),
            "action #3 'create': failed to resolve template in url: unclosed placeholder starting at offset 3"
        );
    }

    #[test]
    fn test_outcome_exit_code() {
        let outcome = RunOutcome {
            state: RunState::Completed,
            last_index: None,
            requests_sent: 0,
            duration: Duration::ZERO,
        };
        assert!(outcome.is_completed());
        assert_eq!(outcome.exit_code(), 0);
        assert!(outcome.abort_reason().is_none());

        let outcome = RunOutcome {
            state: RunState::Aborted(AbortReason::Cancelled {
                index: 1,
                action: "slow".to_string(),
            }),
            last_index: Some(0),
            requests_sent: 1,
            duration: Duration::ZERO,
        };
        assert!(!outcome.is_completed());
        assert_eq!(outcome.exit_code(), 1);
        assert_eq!(outcome.abort_reason().map(AbortReason::index), Some(1));
    }
}
