//! `perfex-mcp`: serves the Perfex CRM tools over MCP stdio.
//!
//! ```bash
//! PERFEX_API_URL=https://crm.example.com/api PERFEX_API_KEY=... perfex-mcp
//! ```
//!
//! Settings may also come from `perfex.toml`; see `perfex_core::config`.

use std::sync::Arc;

use anyhow::{Context, Result};
use perfex_core::config::{AppConfig, LoadOptions};
use perfex_core::{logging, Dispatcher, HttpTransport};
use perfex_mcp::PerfexMcpServer;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load(LoadOptions::default())
        .context("PERFEX_API_URL and PERFEX_API_KEY must be configured")?;
    logging::init(&config.logging);

    let transport = HttpTransport::new(&config.perfex)?;
    info!(
        event_name = "system.mcp.configured",
        api_url = %transport.base_url(),
        "perfex transport ready"
    );

    PerfexMcpServer::new(Dispatcher::new(Arc::new(transport))).run_stdio().await
}
