//! Hive CLI
//!
//! 入口：初始化日志、加载配置、构建 Agent 组件，对一条消息跑完整编排并把事件流按 NDJSON 写到 stdout。

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use hive::config::load_config;
use hive::core::{AgentBuilder, Orchestrator};
use hive::llm::{ApiKeyStore, MockLlmClient};
use hive::memory::ConversationHistory;

#[derive(Parser, Debug)]
#[command(name = "hive", version, about = "Multi-agent orchestrator with ethical review")]
struct Cli {
    /// 用户消息
    message: String,

    /// JSON 格式的对话历史文件（[{"role": "user", "content": "..."}]）
    #[arg(long)]
    history: Option<PathBuf>,

    /// 覆盖配置中的 API Key
    #[arg(long)]
    api_key: Option<String>,

    /// 额外的配置文件
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    hive::observability::init();
    let cli = Cli::parse();

    let cfg = load_config(cli.config.clone()).context("Failed to load config")?;
    let api_key = ApiKeyStore::new(cli.api_key.clone().or_else(|| cfg.llm.resolved_api_key()));

    let history = match &cli.history {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read history file {}", path.display()))?;
            serde_json::from_str::<ConversationHistory>(&text).context("Invalid history file")?
        }
        None => ConversationHistory::new(),
    };

    let mut builder = AgentBuilder::new(cfg.clone(), api_key.clone());
    if !cfg.llm.is_mock() && !api_key.is_configured().await {
        tracing::warn!("No API key configured, running with the offline mock model");
        builder = builder.with_llm(Arc::new(MockLlmClient));
    }
    let components = Arc::new(builder.build());

    let (mut events, handle) = Orchestrator::new(components, history).stream(cli.message);
    let mut stdout = std::io::stdout().lock();
    while let Some(event) = events.recv().await {
        stdout
            .write_all(event.to_ndjson().as_bytes())
            .context("Failed to write event")?;
        stdout.flush().context("Failed to flush stdout")?;
    }

    let history = handle.await.context("Orchestrator task failed")?;
    tracing::info!(turns = history.len(), "conversation history after this turn");
    Ok(())
}
