mod config;
mod registry;
mod score;
mod timefmt;
mod tui;

use anyhow::Result;
use std::fs::{self, OpenOptions};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = config::Config::load_or_default()?;

    init_logging(&config);
    log::info!("npm-scanner v{} 启动，API: {}", env!("CARGO_PKG_VERSION"), config.api_url);

    tui::run(config).await?;

    Ok(())
}

/// 终端处于备用屏幕，日志写入文件而不是 stderr
fn init_logging(config: &config::Config) {
    if let Some(dir) = config.log_file.parent() {
        let _ = fs::create_dir_all(dir);
    }

    match OpenOptions::new().create(true).append(true).open(&config.log_file) {
        Ok(file) => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                .target(env_logger::Target::Pipe(Box::new(file)))
                .init();
        }
        Err(e) => {
            eprintln!("无法打开日志文件 {}: {}", config.log_file.display(), e);
        }
    }
}
