//! Model Context Protocol server for Perfex CRM.
//!
//! `PerfexMcpServer` publishes the tool catalog and the customer search
//! resource template over stdio and hands every call to
//! [`perfex_core::Dispatcher`].

mod server;

pub use server::PerfexMcpServer;

use perfex_core::ToolError;
use rmcp::model::ErrorCode;
use rmcp::ErrorData;

pub const SERVER_NAME: &str = "perfex-crm";

/// Protocol errors keep their JSON-RPC code and message.
pub fn to_error_data(error: ToolError) -> ErrorData {
    ErrorData::new(ErrorCode(error.error_code()), error.message().to_string(), None)
}
