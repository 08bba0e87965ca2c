mod cli;

use clap::Parser;
use cli::Cli;

#[tokio::main]
async fn main() {
    // 初始化日志系统
    ruflow::logger::init_logger();

    let cli = Cli::parse();
    let code = match cli::run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };

    std::process::exit(code);
}
