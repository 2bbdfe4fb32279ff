use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use perfex_core::schema::{FieldType, JsonObject};
use perfex_core::{
    ApiRequest, CrmTransport, Dispatcher, HttpMethod, ToolError, ToolOutput, TransportError, TOOLS,
};
use serde_json::{json, Value};

/// Records every request and replays queued responses in order.
#[derive(Default)]
struct RecordingTransport {
    requests: Mutex<Vec<ApiRequest>>,
    responses: Mutex<VecDeque<Result<Value, TransportError>>>,
}

impl RecordingTransport {
    fn replying(responses: Vec<Result<Value, TransportError>>) -> Arc<Self> {
        Arc::new(Self { requests: Mutex::default(), responses: Mutex::new(responses.into()) })
    }

    fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl CrmTransport for RecordingTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, TransportError> {
        self.requests.lock().expect("requests lock").push(request);
        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Request("no response queued".to_string())))
    }
}

fn dispatcher(transport: &Arc<RecordingTransport>) -> Dispatcher {
    Dispatcher::new(transport.clone())
}

#[tokio::test]
async fn unknown_tool_is_method_not_found_without_a_call() {
    let transport = RecordingTransport::replying(vec![]);
    let result = dispatcher(&transport).invoke("drop_database", &json!({})).await;

    assert_eq!(result, Err(ToolError::MethodNotFound("Unknown tool: drop_database".to_string())));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn missing_required_field_is_invalid_params_without_a_call() {
    let transport = RecordingTransport::replying(vec![]);
    let result = dispatcher(&transport).invoke("create_customer", &json!({ "vat": "FR1" })).await;

    match result {
        Err(ToolError::InvalidParams(message)) => assert!(message.contains("company")),
        other => panic!("expected invalid params, got {other:?}"),
    }
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn get_by_id_returns_pretty_json_in_remote_key_order() {
    let transport = RecordingTransport::replying(vec![Ok(json!({ "id": 42, "company": "Acme" }))]);
    let output = dispatcher(&transport)
        .invoke("get_customer_by_id", &json!({ "id": 42 }))
        .await
        .expect("lookup succeeds");

    assert_eq!(output, ToolOutput::success("{\n  \"id\": 42,\n  \"company\": \"Acme\"\n}"));
    assert_eq!(
        transport.requests(),
        vec![ApiRequest { method: HttpMethod::Get, path: "/customers/42".to_string(), body: None }]
    );
}

#[tokio::test]
async fn repeated_reads_render_identical_text() {
    let record = json!({ "userid": "3", "company": "Acme", "vat": null, "tags": ["a", "b"] });
    let transport = RecordingTransport::replying(vec![Ok(record.clone()), Ok(record)]);
    let dispatcher = dispatcher(&transport);

    let first = dispatcher.invoke("get_customer_by_id", &json!({ "id": "3" })).await;
    let second = dispatcher.invoke("get_customer_by_id", &json!({ "id": "3" })).await;

    assert!(first.is_ok());
    assert_eq!(first, second);
}

#[tokio::test]
async fn search_keywords_are_percent_encoded_and_lists_must_be_arrays() {
    let transport = RecordingTransport::replying(vec![Ok(json!({ "rows": [] }))]);
    let result =
        dispatcher(&transport).invoke("search_leads", &json!({ "keysearch": "foo bar" })).await;

    assert_eq!(transport.requests()[0].path, "/leads/search/foo%20bar");
    assert_eq!(
        result,
        Err(ToolError::Internal(
            "Perfex API returned unexpected data format for search leads for \"foo bar\". Expected array."
                .to_string()
        ))
    );
}

#[tokio::test]
async fn null_records_are_rejected() {
    let transport = RecordingTransport::replying(vec![Ok(Value::Null)]);
    let result = dispatcher(&transport).invoke("get_project_by_id", &json!({ "id": 5 })).await;

    match result {
        Err(ToolError::Internal(message)) => assert!(message.ends_with("Expected object.")),
        other => panic!("expected internal error, got {other:?}"),
    }
}

#[tokio::test]
async fn records_may_come_back_as_arrays() {
    let transport = RecordingTransport::replying(vec![Ok(json!([{ "id": 42 }]))]);
    let output = dispatcher(&transport)
        .invoke("get_customer_by_id", &json!({ "id": 42 }))
        .await
        .expect("array bodies are accepted for single records");

    assert_eq!(output, ToolOutput::success("[\n  {\n    \"id\": 42\n  }\n]"));
}

#[tokio::test]
async fn scalar_records_are_rejected() {
    let transport = RecordingTransport::replying(vec![Ok(json!("not found"))]);
    let result = dispatcher(&transport).invoke("get_lead_by_id", &json!({ "id": 1 })).await;

    assert_eq!(
        result,
        Err(ToolError::Internal(
            "Perfex API returned unexpected data format for get lead 1. Expected object."
                .to_string()
        ))
    );
}

#[tokio::test]
async fn integral_float_ids_render_as_integers() {
    let transport = RecordingTransport::replying(vec![
        Ok(json!({ "id": 42 })),
        Ok(json!({ "success": true, "id": 7.0 })),
    ]);
    let dispatcher = dispatcher(&transport);

    dispatcher
        .invoke("get_customer_by_id", &json!({ "id": 42.0 }))
        .await
        .expect("lookup succeeds");
    let deleted = dispatcher
        .invoke("delete_proposal", &json!({ "id": 7.0 }))
        .await
        .expect("delete goes through");

    let paths: Vec<String> =
        transport.requests().into_iter().map(|request| request.path).collect();
    assert_eq!(paths, vec!["/customers/42".to_string(), "/proposals/7".to_string()]);
    assert_eq!(deleted, ToolOutput::success("delete proposal completed successfully. ID: 7"));
}

fn sample_value(kind: FieldType) -> Value {
    match kind {
        FieldType::String => json!("sample"),
        FieldType::Integer | FieldType::Id | FieldType::IntegerOrString => json!(1),
        FieldType::Number => json!(1.5),
    }
}

#[tokio::test]
async fn every_required_field_is_enforced_before_any_call() {
    let transport = RecordingTransport::replying(vec![]);
    let dispatcher = dispatcher(&transport);
    let mut checked = 0;

    for tool in TOOLS {
        let complete: JsonObject = tool
            .fields
            .iter()
            .map(|field| (field.name.to_string(), sample_value(field.kind)))
            .collect();

        for field in tool.fields.iter().filter(|field| field.required) {
            let mut args = complete.clone();
            args.remove(field.name);

            let result = dispatcher.invoke(tool.name, &Value::Object(args)).await;
            match result {
                Err(ToolError::InvalidParams(message)) => {
                    assert!(message.contains(field.name), "{}: {message}", tool.name)
                }
                other => panic!("{} without `{}` gave {other:?}", tool.name, field.name),
            }
            checked += 1;
        }
    }

    assert!(checked > 0);
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn delete_lead_reports_message_and_id() {
    let transport = RecordingTransport::replying(vec![Ok(json!({
        "status": true,
        "message": "Deleted",
        "leadid": 7
    }))]);
    let output = dispatcher(&transport)
        .invoke("delete_lead", &json!({ "id": 7 }))
        .await
        .expect("delete goes through");

    assert_eq!(output, ToolOutput::success("Deleted. ID: 7"));
    let request = &transport.requests()[0];
    assert_eq!(request.method, HttpMethod::Delete);
    assert_eq!(request.path, "/delete/leads/7");
    assert_eq!(request.body, None);
}

#[tokio::test]
async fn rejected_create_is_a_soft_failure() {
    let transport = RecordingTransport::replying(vec![Ok(json!({
        "success": false,
        "message": "VAT invalid"
    }))]);
    let output = dispatcher(&transport)
        .invoke("create_customer", &json!({ "company": "Acme", "vat": "nope", "ignored": 1 }))
        .await
        .expect("soft failures are not protocol errors");

    assert_eq!(output, ToolOutput::soft_failure("Error: VAT invalid"));
    let request = &transport.requests()[0];
    assert_eq!(request.method, HttpMethod::Post);
    assert_eq!(request.body, Some(json!({ "company": "Acme", "vat": "nope" })));
}

#[tokio::test]
async fn update_sends_remaining_fields_to_the_id_path() {
    let transport = RecordingTransport::replying(vec![Ok(json!({ "success": true }))]);
    let output = dispatcher(&transport)
        .invoke("update_lead", &json!({ "id": "11", "name": "Grace" }))
        .await
        .expect("update goes through");

    assert_eq!(output, ToolOutput::success("update lead completed successfully"));
    assert_eq!(
        transport.requests(),
        vec![ApiRequest {
            method: HttpMethod::Put,
            path: "/leads/11".to_string(),
            body: Some(json!({ "name": "Grace" })),
        }]
    );
}

#[tokio::test]
async fn http_errors_surface_the_remote_message() {
    let transport = RecordingTransport::replying(vec![Err(TransportError::Status {
        status: 500,
        reason: Some("Internal Server Error".to_string()),
        body: json!({ "message": "db down" }),
    })]);
    let result = dispatcher(&transport).invoke("get_customer_by_id", &json!({ "id": 42 })).await;

    assert_eq!(
        result,
        Err(ToolError::Internal("Perfex API error during get customer 42: db down".to_string()))
    );
}

#[tokio::test]
async fn http_errors_without_a_message_fall_back_to_the_status_text() {
    let transport = RecordingTransport::replying(vec![Err(TransportError::Status {
        status: 404,
        reason: Some("Not Found".to_string()),
        body: json!({ "status": false }),
    })]);
    let result = dispatcher(&transport).invoke("list_invoices", &json!({})).await;

    assert_eq!(
        result,
        Err(ToolError::Internal(
            "Perfex API error during list invoices: Request failed with status code 404".to_string()
        ))
    );
}

#[tokio::test]
async fn network_failures_are_execution_failures() {
    let transport = RecordingTransport::replying(vec![Err(TransportError::Request(
        "connection refused".to_string(),
    ))]);
    let result = dispatcher(&transport).invoke("create_lead", &json!({
        "name": "Ada",
        "source": 1,
        "status": 2,
        "assigned": "3"
    }))
    .await;

    assert_eq!(
        result,
        Err(ToolError::Internal(
            "Tool execution failed during create lead: connection refused".to_string()
        ))
    );
}

#[tokio::test]
async fn resource_reads_run_the_customer_search() {
    let transport = RecordingTransport::replying(vec![Ok(json!([{ "userid": "1" }]))]);
    let output = dispatcher(&transport)
        .read_resource("perfex://customers/search/acme%20inc")
        .await
        .expect("resource read succeeds");

    assert_eq!(output.uri, "perfex://customers/search/acme%20inc");
    assert_eq!(output.mime_type, "application/json");
    assert_eq!(output.text, "[\n  {\n    \"userid\": \"1\"\n  }\n]");
    assert_eq!(transport.requests()[0].path, "/customers/search/acme%20inc");
}

#[tokio::test]
async fn malformed_resource_uris_never_reach_the_crm() {
    let transport = RecordingTransport::replying(vec![]);
    let result = dispatcher(&transport).read_resource("perfex://customers/search/a/b").await;

    assert_eq!(
        result,
        Err(ToolError::InvalidRequest("Invalid URI format: perfex://customers/search/a/b".into()))
    );
    assert!(transport.requests().is_empty());
}
