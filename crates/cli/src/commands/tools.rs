use perfex_core::Catalog;
use serde::Serialize;
use serde_json::Value;

use crate::commands::{exit, CommandResult};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolSummary {
    name: &'static str,
    description: &'static str,
    method: perfex_core::HttpMethod,
    path: &'static str,
    shape: perfex_core::ResponseShape,
    input_schema: Value,
}

pub fn run() -> CommandResult {
    let summaries: Vec<ToolSummary> = Catalog::standard()
        .iter()
        .map(|tool| ToolSummary {
            name: tool.name,
            description: tool.description,
            method: tool.route.method,
            path: tool.route.path,
            shape: tool.route.shape,
            input_schema: Value::Object(tool.input_schema()),
        })
        .collect();

    match serde_json::to_string_pretty(&summaries) {
        Ok(output) => CommandResult::text(exit::OK, output),
        Err(error) => {
            CommandResult::failure("tools", "serialization", error.to_string(), exit::PIPELINE)
        }
    }
}
