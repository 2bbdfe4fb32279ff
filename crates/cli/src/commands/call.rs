use std::sync::Arc;

use perfex_core::config::{AppConfig, LoadOptions};
use perfex_core::{logging, Dispatcher, HttpTransport, ToolOutput};
use serde_json::Value;

use crate::commands::{exit, CommandResult};

pub fn run(options: LoadOptions, tool: &str, raw_args: Option<&str>) -> CommandResult {
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "call",
                "config_validation",
                format!("configuration issue: {error}"),
                exit::CONFIG,
            );
        }
    };
    logging::init(&config.logging);

    let transport = match HttpTransport::new(&config.perfex) {
        Ok(transport) => transport,
        Err(error) => {
            return CommandResult::failure(
                "call",
                "transport_init",
                error.to_string(),
                exit::CONFIG,
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "call",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                exit::PIPELINE,
            );
        }
    };

    let dispatcher = Dispatcher::new(Arc::new(transport));
    runtime.block_on(invoke(&dispatcher, tool, raw_args))
}

/// Runs one tool call and maps the outcome onto an exit code.
pub async fn invoke(dispatcher: &Dispatcher, tool: &str, raw_args: Option<&str>) -> CommandResult {
    let args = match raw_args.map(serde_json::from_str::<Value>).transpose() {
        Ok(args) => args.unwrap_or(Value::Null),
        Err(error) => {
            return CommandResult::failure(
                "call",
                "invalid_params",
                format!("--args is not valid JSON: {error}"),
                exit::PIPELINE,
            );
        }
    };

    match dispatcher.invoke(tool, &args).await {
        Ok(ToolOutput { text, is_error: false }) => CommandResult::text(exit::OK, text),
        Ok(ToolOutput { text, is_error: true }) => CommandResult::text(exit::SOFT_FAILURE, text),
        Err(error) => CommandResult::failure("call", error.kind(), error.message(), exit::PIPELINE),
    }
}
