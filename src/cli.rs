use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use ruflow::document::DocumentLoader;
use ruflow::http::Client;
use ruflow::runner::{ActionExecutor, ConsoleReporter, Verbosity};
use ruflow::variable::{ConfigLoader, RuflowConfig};
use tokio_util::sync::CancellationToken;

pub type Result<T> = std::result::Result<T, anyhow::Error>;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// 要执行的 YAML 文档
    pub file: PathBuf,

    /// 使用配置文件中的环境
    #[arg(short, long = "env", value_name = "NAME")]
    pub env: Option<String>,

    /// 覆盖变量，可重复：--var key=value
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_var)]
    pub vars: Vec<(String, String)>,

    /// 配置文件路径（默认自动查找 ruflow.toml）
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// 显示响应头、捕获的变量和通过的断言
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// 只输出错误
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }
}

fn parse_var(s: &str) -> std::result::Result<(String, String), String> {
    ConfigLoader::parse_cli_var(s).ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))
}

/// 加载配置：显式路径失败时报错，自动查找失败时忽略
fn load_config(cli: &Cli) -> Result<Option<RuflowConfig>> {
    if let Some(path) = &cli.config {
        let config = ConfigLoader::load_from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?;
        return Ok(Some(config));
    }

    Ok(ConfigLoader::find_and_load().map(|(path, config)| {
        tracing::debug!(path = %path.display(), "using config file");
        config
    }))
}

/// 执行一次运行，返回进程退出码
pub async fn run(cli: Cli) -> Result<i32> {
    let document = match DocumentLoader::load_file(&cli.file) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("{}", e.to_string().red());
            return Ok(1);
        }
    };

    let config = load_config(&cli)?;
    let mut env = ConfigLoader::build_environment(
        &document,
        config.as_ref(),
        cli.env.as_deref(),
        &cli.vars,
    )?;

    let timeout = config.as_ref().and_then(|c| c.http.timeout());
    let client = Client::with_timeout(timeout)?;

    // Ctrl-C 只取消运行，已发出的请求不会撤回
    let token = CancellationToken::new();
    let ctrl_c = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("received Ctrl-C, cancelling run");
            ctrl_c.cancel();
        }
    });

    let executor = ActionExecutor::with_dispatcher(client).with_cancellation(token);
    let mut reporter = ConsoleReporter::new(cli.verbosity());
    let outcome = executor.run(&document, &mut env, &mut reporter).await;

    tracing::info!(
        requests = outcome.requests_sent,
        duration_ms = outcome.duration.as_millis() as u64,
        "run finished"
    );

    Ok(outcome.exit_code())
}
