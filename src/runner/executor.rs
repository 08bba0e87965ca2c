use crate::document::{Action, RunDocument};
use crate::expression::{evaluate_assertion, evaluate_capture};
use crate::http::{Client, Dispatcher, Request, TransportError};
use crate::runner::events::RunEvent;
use crate::runner::reporter::Reporter;
use crate::runner::types::{AbortReason, RunOutcome, RunState};
use crate::variable::{TemplateError, TemplateResolver, VariableEnvironment};
use indexmap::IndexMap;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// 每个请求默认携带的请求头，动作中同名（不区分大小写）的请求头会覆盖它
pub const DEFAULT_HEADERS: &[(&str, &str)] = &[("Content-Type", "application/json")];

/// 顺序执行文档中的动作
///
/// 第一个失败（模板、传输、捕获、断言）会中止整个运行，之后的动作不再执行。
pub struct ActionExecutor<D = Client> {
    dispatcher: D,
    resolver: TemplateResolver,
    cancel: Option<CancellationToken>,
}

impl ActionExecutor<Client> {
    pub fn new() -> Self {
        Self::with_dispatcher(Client::new())
    }
}

impl Default for ActionExecutor<Client> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Dispatcher> ActionExecutor<D> {
    pub fn with_dispatcher(dispatcher: D) -> Self {
        Self {
            dispatcher,
            resolver: TemplateResolver::new(),
            cancel: None,
        }
    }

    pub fn with_resolver(mut self, resolver: TemplateResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// 设置取消令牌：每个动作开始前以及等待响应期间都会检查
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    /// 执行整个文档
    ///
    /// `env` 在运行结束后保留所有捕获的变量和最后一次响应。
    pub async fn run(
        &self,
        document: &RunDocument,
        env: &mut VariableEnvironment,
        reporter: &mut dyn Reporter,
    ) -> RunOutcome {
        let start = Instant::now();
        let mut state = RunState::Idle;
        let mut last_index = None;
        let mut requests_sent = 0;

        tracing::info!(actions = document.actions.len(), "starting run");

        for (index, action) in document.actions.iter().enumerate() {
            if self.is_cancelled() {
                state = RunState::Aborted(AbortReason::Cancelled {
                    index,
                    action: action.name.clone(),
                });
                break;
            }

            state = RunState::Running(index);
            last_index = Some(index);
            tracing::debug!(index, name = %action.name, "action started");
            reporter.report(&RunEvent::ActionStarted {
                index,
                name: action.name.clone(),
            });

            if let Err(reason) = self
                .execute_action(index, action, env, reporter, &mut requests_sent)
                .await
            {
                state = RunState::Aborted(reason);
                break;
            }
        }

        match &state {
            RunState::Aborted(reason) => {
                tracing::warn!(index = reason.index(), "run aborted: {}", reason);
                reporter.report(&RunEvent::RunAborted {
                    reason: reason.clone(),
                });
            }
            _ => {
                state = RunState::Completed;
                tracing::info!(actions = document.actions.len(), "run completed");
                reporter.report(&RunEvent::RunCompleted {
                    actions: document.actions.len(),
                });
            }
        }

        RunOutcome {
            state,
            last_index,
            requests_sent,
            duration: start.elapsed(),
        }
    }

    /// 执行单个动作：解析模板、发送请求、捕获变量、检查断言
    async fn execute_action(
        &self,
        index: usize,
        action: &Action,
        env: &mut VariableEnvironment,
        reporter: &mut dyn Reporter,
        requests_sent: &mut usize,
    ) -> Result<(), AbortReason> {
        let name = move || action.name.clone();
        let template_error = move |field: String| {
            move |source: TemplateError| AbortReason::Template {
                index,
                action: action.name.clone(),
                field,
                source,
            }
        };
        let transport_error = move |source: TransportError| AbortReason::Transport {
            index,
            action: action.name.clone(),
            source,
        };

        // 1. 解析模板
        let url = self
            .resolver
            .resolve(&action.url, env)
            .map_err(template_error("url".to_string()))?;
        let body = self
            .resolver
            .resolve_optional(action.body.as_deref(), env)
            .map_err(template_error("body".to_string()))?;
        let mut headers = IndexMap::new();
        for (header, template) in &action.headers {
            let value = self
                .resolver
                .resolve(template, env)
                .map_err(template_error(format!("headers.{}", header)))?;
            headers.insert(header.clone(), value);
        }

        // 2. 构造请求
        let mut request = Request::new(&action.method, &url).map_err(transport_error)?;
        for (header, value) in merge_headers(DEFAULT_HEADERS, &headers) {
            request = request
                .with_header(&header, &value)
                .map_err(transport_error)?;
        }
        if let Some(body) = &body {
            request = request.with_body(body.clone());
        }

        reporter.report(&RunEvent::RequestIssued {
            method: request.method.as_str().to_string(),
            url: request.url.to_string(),
            body,
        });

        // 3. 发送
        *requests_sent += 1;
        tracing::debug!(method = %request.method, url = %request.url, "dispatching request");
        let dispatched = match &self.cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => {
                    return Err(AbortReason::Cancelled { index, action: name() });
                }
                result = self.dispatcher.dispatch(request) => result,
            },
            None => self.dispatcher.dispatch(request).await,
        };
        let response = dispatched.map_err(transport_error)?;

        tracing::debug!(
            status = response.status.code(),
            elapsed_ms = response.elapsed_ms(),
            "response received"
        );
        env.set_response(&response);
        reporter.report(&RunEvent::ResponseReceived { response });

        // 4. 捕获：按声明顺序，每个结果立即可被后续捕获引用
        let response_value = env.response().cloned();
        for (key, expr) in &action.capture {
            match evaluate_capture(expr, env, response_value.as_ref()) {
                Ok(value) => {
                    tracing::debug!(key = %key, "variable captured");
                    reporter.report(&RunEvent::VariableCaptured {
                        key: key.clone(),
                        value: value.clone(),
                    });
                    env.insert(key.clone(), value);
                }
                Err(source) => {
                    reporter.report(&RunEvent::CaptureFailed {
                        key: key.clone(),
                        expr: expr.clone(),
                        error: source.to_string(),
                    });
                    return Err(AbortReason::Capture {
                        index,
                        action: name(),
                        key: key.clone(),
                        expr: expr.clone(),
                        source,
                    });
                }
            }
        }

        // 5. 断言：第一个失败即中止
        for expr in &action.assertions {
            match evaluate_assertion(expr, env) {
                Ok(true) => reporter.report(&RunEvent::AssertionPassed { expr: expr.clone() }),
                Ok(false) => {
                    reporter.report(&RunEvent::AssertionFailed { expr: expr.clone() });
                    return Err(AbortReason::AssertionFailed {
                        index,
                        action: name(),
                        expr: expr.clone(),
                    });
                }
                Err(source) => {
                    return Err(AbortReason::Evaluation {
                        index,
                        action: name(),
                        expr: expr.clone(),
                        source,
                    });
                }
            }
        }

        Ok(())
    }
}

/// 合并默认请求头与动作请求头
///
/// 名称比较不区分大小写；动作请求头覆盖同名默认值并保留自己的写法。
pub fn merge_headers(
    defaults: &[(&str, &str)],
    overrides: &IndexMap<String, String>,
) -> Vec<(String, String)> {
    let mut merged: Vec<(String, String)> = defaults
        .iter()
        .filter(|(name, _)| !overrides.keys().any(|key| key.eq_ignore_ascii_case(name)))
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();
    merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}
