//! Gymini - 对话式健身助手
//!
//! 入口：初始化日志、加载配置、装配编排器，并在 stdin/stdout 上运行交互循环。

use anyhow::Context;
use gymini::{cli::run_repl, config, observability, AgentBuilder};
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let config_path = std::env::var_os("GYMINI_CONFIG").map(Into::into);
    let cfg = config::load_config(config_path).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        config::AppConfig::default()
    });
    let speaker = cfg.app.speaker_label.clone();

    // 凭据缺失在此直接报错退出，不进入交互循环
    let mut agent = AgentBuilder::new(cfg)
        .build()
        .context("Failed to create agent")?;

    run_repl(
        &mut agent,
        &speaker,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await
    .context("CLI loop failed")?;

    Ok(())
}
