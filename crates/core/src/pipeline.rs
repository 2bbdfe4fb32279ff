//! Dispatch, validation and error normalization shared by every tool.
//!
//! `invoke` runs one tool call end to end:
//!
//! 1. look the tool up in the [`Catalog`] (`MethodNotFound` otherwise)
//! 2. validate the argument bag against its fields (`InvalidParams`)
//! 3. translate the validated arguments into exactly one [`ApiRequest`]
//! 4. check the response shape (`InternalError` on mismatch)
//! 5. for mutations, read the CRM's own success flag; a business failure is
//!    returned as `Ok` with `is_error` set, never as `Err`
//! 6. normalize transport failures into `InternalError`
//!
//! Steps 1, 2 and 4 produce protocol errors that pass through unchanged.

use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::catalog::{Catalog, ResponseShape, Route, ToolDescriptor};
use crate::errors::{ToolError, TransportError};
use crate::resource::{self, ResourceOutput};
use crate::schema::{encode_path_segment, is_truthy, path_text, truthy_text, validate, JsonObject};
use crate::transport::{ApiRequest, CrmTransport};

/// Name the CRM goes by in error text.
pub const REMOTE_NAME: &str = "Perfex";

/// Text payload of a completed invocation.
///
/// `is_error` marks a soft failure: the call went through but the CRM
/// reported that the operation did not.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolOutput {
    pub text: String,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn success(text: impl Into<String>) -> Self {
        Self { text: text.into(), is_error: false }
    }

    pub fn soft_failure(text: impl Into<String>) -> Self {
        Self { text: text.into(), is_error: true }
    }
}

pub type ApiCallResult = Result<ToolOutput, ToolError>;

pub struct Dispatcher {
    catalog: Catalog,
    transport: Arc<dyn CrmTransport>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher").field("tools", &self.catalog.len()).finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn CrmTransport>) -> Self {
        Self::with_catalog(Catalog::standard(), transport)
    }

    pub fn with_catalog(catalog: Catalog, transport: Arc<dyn CrmTransport>) -> Self {
        Self { catalog, transport }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub async fn invoke(&self, tool_name: &str, raw_args: &Value) -> ApiCallResult {
        let correlation_id = Uuid::new_v4();
        let span = info_span!("tool_call", tool = tool_name, correlation_id = %correlation_id);
        self.invoke_tool(tool_name, raw_args).instrument(span).await
    }

    async fn invoke_tool(&self, tool_name: &str, raw_args: &Value) -> ApiCallResult {
        let tool = self.lookup(tool_name)?;
        let args = validate(tool.fields, raw_args).map_err(|error| {
            warn!(
                event_name = "perfex.tool.invalid_params",
                tool = tool.name,
                error = %error,
                "tool arguments failed validation"
            );
            error
        })?;

        let operation = operation_label(tool.route.action, &args);
        let data = self.call_route(&tool.route, &args, &operation).await?;
        let output = match tool.route.shape {
            ResponseShape::List | ResponseShape::Record => ToolOutput::success(render_json(&data)?),
            ResponseShape::Mutation => interpret_mutation(&data, tool.route.action),
        };

        info!(
            event_name = "perfex.tool.completed",
            tool = tool.name,
            is_error = output.is_error,
            "tool invocation completed"
        );
        Ok(output)
    }

    /// Serves `perfex://customers/search/{keysearch}` through the
    /// `search_customers` route.
    pub async fn read_resource(&self, uri: &str) -> Result<ResourceOutput, ToolError> {
        let correlation_id = Uuid::new_v4();
        let span = info_span!("resource_read", uri = uri, correlation_id = %correlation_id);
        self.search_customers_resource(uri).instrument(span).await
    }

    async fn search_customers_resource(&self, uri: &str) -> Result<ResourceOutput, ToolError> {
        let keysearch = resource::parse_customer_search_uri(uri).map_err(|error| {
            warn!(event_name = "perfex.resource.invalid_uri", error = %error, "bad resource uri");
            error
        })?;
        let tool = self.lookup(resource::CUSTOMER_SEARCH_TOOL)?;

        let mut args = JsonObject::new();
        args.insert("keysearch".to_string(), Value::String(keysearch));
        let operation = format!("resource {}", operation_label(tool.route.action, &args));

        let data = self.call_route(&tool.route, &args, &operation).await?;
        Ok(ResourceOutput::json(uri, render_json(&data)?))
    }

    fn lookup(&self, tool_name: &str) -> Result<&'static ToolDescriptor, ToolError> {
        self.catalog.get(tool_name).ok_or_else(|| {
            warn!(event_name = "perfex.tool.unknown", tool = tool_name, "unknown tool requested");
            ToolError::MethodNotFound(format!("Unknown tool: {tool_name}"))
        })
    }

    /// Steps 3, 4 and 6: one outbound call plus the shape check.
    async fn call_route(
        &self,
        route: &Route,
        args: &JsonObject,
        operation: &str,
    ) -> Result<Value, ToolError> {
        let request = build_request(route, args)?;
        let data = self
            .transport
            .send(request)
            .await
            .map_err(|error| normalize_transport_error(error, operation))?;
        check_shape(route.shape, data, operation)
    }
}

/// Maps validated arguments onto the route's method, path and body.
///
/// Path placeholders are percent-encoded and left out of the body.
pub fn build_request(route: &Route, args: &JsonObject) -> Result<ApiRequest, ToolError> {
    let mut path = route.path.to_string();
    let mut body = args.clone();

    for param in route.path_params() {
        let value = body.remove(param).ok_or_else(|| {
            ToolError::Internal(format!(
                "route `{}` is missing path parameter `{param}`",
                route.path
            ))
        })?;
        path = path.replace(&format!("{{{param}}}"), &encode_path_segment(&path_text(&value)));
    }

    let body = route.method.sends_body().then_some(Value::Object(body));
    Ok(ApiRequest { method: route.method, path, body })
}

/// Label used in error text: `get customer 42`, `search leads for "acme"`.
pub fn operation_label(action: &str, args: &JsonObject) -> String {
    if let Some(keysearch) = args.get("keysearch").and_then(Value::as_str) {
        return format!("{action} for \"{keysearch}\"");
    }
    if let Some(id) = args.get("id") {
        return format!("{action} {}", path_text(id));
    }
    action.to_string()
}

fn check_shape(shape: ResponseShape, data: Value, operation: &str) -> Result<Value, ToolError> {
    let expected = match shape {
        ResponseShape::List if !data.is_array() => "array",
        ResponseShape::Record if !(data.is_object() || data.is_array()) => "object",
        _ => return Ok(data),
    };

    error!(
        event_name = "perfex.api.unexpected_shape",
        operation = operation,
        expected = expected,
        body = %data,
        "perfex api returned an unexpected response shape"
    );
    Err(ToolError::Internal(format!(
        "{REMOTE_NAME} API returned unexpected data format for {operation}. Expected {expected}."
    )))
}

fn render_json(data: &Value) -> Result<String, ToolError> {
    serde_json::to_string_pretty(data)
        .map_err(|error| ToolError::Internal(format!("could not render response: {error}")))
}

/// Reads the CRM's own verdict on a create/update/delete.
pub fn interpret_mutation(data: &Value, action: &str) -> ToolOutput {
    let succeeded =
        is_truthy(data.get("success")) || data.get("status").and_then(Value::as_bool) == Some(true);

    if succeeded {
        let message = truthy_text(data.get("message"))
            .unwrap_or_else(|| format!("{action} completed successfully"));
        let id = ["id", "leadid", "customerid"]
            .iter()
            .find_map(|key| truthy_text(data.get(*key)));
        match id {
            Some(id) => ToolOutput::success(format!("{message}. ID: {id}")),
            None => ToolOutput::success(message),
        }
    } else {
        let message =
            truthy_text(data.get("message")).unwrap_or_else(|| format!("{action} failed"));
        ToolOutput::soft_failure(format!("Error: {message}"))
    }
}

/// Step 6. Every branch is logged before it is surfaced.
fn normalize_transport_error(error: TransportError, operation: &str) -> ToolError {
    match &error {
        TransportError::Status { status, reason, body } => {
            error!(
                event_name = "perfex.api.error",
                operation = operation,
                status = *status,
                status_text = reason.as_deref().unwrap_or(""),
                body = %body,
                "perfex api request failed"
            );
            ToolError::Internal(format!(
                "{REMOTE_NAME} API error during {operation}: {}",
                error.remote_message()
            ))
        }
        TransportError::Request(message) => {
            error!(
                event_name = "perfex.tool.execution_failed",
                operation = operation,
                error = %message,
                "tool execution failed"
            );
            ToolError::Internal(format!("Tool execution failed during {operation}: {message}"))
        }
    }
}
