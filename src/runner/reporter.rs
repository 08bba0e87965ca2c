use crate::runner::events::RunEvent;
use crate::utils::{ResponseFormat, ResponseFormatter};
use colored::Colorize;

/// 事件接收者
///
/// 执行器每产生一个事件就调用一次 `report`，不保证任何缓冲。
pub trait Reporter {
    fn report(&mut self, event: &RunEvent);
}

/// 控制台输出级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// 只输出错误
    Quiet,
    #[default]
    Normal,
    /// 额外输出响应头、捕获值和通过的断言
    Verbose,
}

/// 彩色控制台报告器
///
/// 正常输出写到 stdout，失败信息写到 stderr。
pub struct ConsoleReporter {
    verbosity: Verbosity,
    formatter: ResponseFormatter,
}

impl ConsoleReporter {
    pub fn new(verbosity: Verbosity) -> Self {
        let format = if verbosity == Verbosity::Verbose {
            ResponseFormat::Verbose
        } else {
            ResponseFormat::Compact
        };

        Self {
            verbosity,
            formatter: ResponseFormatter::new(format),
        }
    }

    fn is_quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    fn is_verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new(Verbosity::Normal)
    }
}

impl Reporter for ConsoleReporter {
    fn report(&mut self, event: &RunEvent) {
        match event {
            RunEvent::ActionStarted { index, name } => {
                if self.is_quiet() {
                    return;
                }
                let label = if name.is_empty() {
                    "(unnamed)".dimmed().to_string()
                } else {
                    name.green().bold().to_string()
                };
                println!("\n[{}] {}", index + 1, label);
            }
            RunEvent::RequestIssued { method, url, body } => {
                if self.is_quiet() {
                    return;
                }
                println!(" {} {} {}", "Request:".yellow(), method.cyan(), url);
                if let Some(body) = body.as_deref().filter(|b| !b.is_empty()) {
                    for line in self.formatter.format_body(body).lines() {
                        println!("   {}", line);
                    }
                }
            }
            RunEvent::ResponseReceived { response } => {
                if self.is_quiet() {
                    return;
                }
                println!(" {}", "Response:".yellow());
                // 缩进显示
                for line in self.formatter.format(response).lines() {
                    println!("   {}", line);
                }
            }
            RunEvent::VariableCaptured { key, value } => {
                if self.is_verbose() {
                    println!(
                        "   {} {} = {}",
                        "↳".blue(),
                        key.bold(),
                        ResponseFormatter::format_value(value)
                    );
                }
            }
            RunEvent::CaptureFailed { key, expr, error } => {
                eprintln!(
                    "   {} capture '{}' ({}): {}",
                    "✗".red(),
                    key,
                    expr,
                    error.red()
                );
            }
            RunEvent::AssertionPassed { expr } => {
                if self.is_verbose() {
                    println!("   {} {}", "✓".green(), expr);
                }
            }
            RunEvent::AssertionFailed { expr } => {
                eprintln!("   {} {}", "✗".red(), expr);
            }
            RunEvent::RunCompleted { actions } => {
                if self.is_quiet() {
                    return;
                }
                println!(
                    "\n{} ({} action{})",
                    "Done".green().bold(),
                    actions,
                    if *actions == 1 { "" } else { "s" }
                );
            }
            RunEvent::RunAborted { reason } => {
                eprintln!("\n{}: {}", "Error".red().bold(), reason);
            }
        }
    }
}

/// 内存事件记录，按顺序保存所有事件
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<RunEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[RunEvent] {
        &self.events
    }

    /// 事件名序列
    pub fn kinds(&self) -> Vec<&'static str> {
        self.events.iter().map(RunEvent::kind).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn into_events(self) -> Vec<RunEvent> {
        self.events
    }
}

impl Reporter for EventLog {
    fn report(&mut self, event: &RunEvent) {
        self.events.push(event.clone());
    }
}
