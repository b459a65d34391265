use crate::tools::{ToolRegistry, error_result};
use serde_json::{Value, json};

pub mod contracts;
pub mod errors;

/// Answers one JSON-RPC request. Notifications and unknown methods get no reply.
pub fn handle_request(registry: &ToolRegistry, request: &Value) -> Option<Value> {
    let method = request.get("method").and_then(|value| value.as_str());
    let id = request.get("id").cloned();

    let result = match (method, id.as_ref()) {
        (Some("initialize"), Some(_)) => json!({
            "protocolVersion": contracts::PROTOCOL_VERSION,
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION")
            }
        }),
        (Some("tools/list"), Some(_)) => json!({
            "tools": registry.definitions()
        }),
        (Some("tools/call"), Some(_)) => handle_tool_call(registry, request),
        _ => return None,
    };

    Some(json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result
    }))
}

fn handle_tool_call(registry: &ToolRegistry, request: &Value) -> Value {
    let params = request.get("params");
    let Some(params) = params.and_then(|value| value.as_object()) else {
        return error_result(errors::INVALID_INPUT, "params must be an object", None);
    };

    let name = params.get("name").and_then(|value| value.as_str());
    let Some(name) = name else {
        return error_result(errors::INVALID_INPUT, "params.name must be a string", None);
    };

    let args = params
        .get("arguments")
        .cloned()
        .unwrap_or_else(|| json!({}));

    registry.call(name, &args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::fake::{RecordingRunner, captured};
    use crate::tools::testing::env_with;

    fn registry(runner: RecordingRunner) -> ToolRegistry {
        let (env, _) = env_with(runner);
        ToolRegistry::with_builtin_tools(env)
    }

    #[test]
    fn initialize_reports_server_info() {
        let response = handle_request(
            &registry(RecordingRunner::new()),
            &json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
        )
        .expect("response");
        assert_eq!(response.get("id"), Some(&json!(1)));
        assert_eq!(
            response.pointer("/result/serverInfo/name"),
            Some(&json!("mcp-slides"))
        );
    }

    #[test]
    fn notifications_get_no_reply() {
        let response = handle_request(
            &registry(RecordingRunner::new()),
            &json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        );
        assert!(response.is_none());
    }

    #[test]
    fn tool_call_routes_arguments() {
        let runner = RecordingRunner::replying(vec![Ok(captured("{\"slide_count\": 0}"))]);
        let response = handle_request(
            &registry(runner),
            &json!({
                "jsonrpc": "2.0",
                "id": 7,
                "method": "tools/call",
                "params": {
                    "name": "list_slides",
                    "arguments": {"presentation_path": "deck.pptx"}
                }
            }),
        )
        .expect("response");
        assert_eq!(response.pointer("/result/isError"), Some(&json!(false)));
        assert_eq!(
            response.pointer("/result/structuredContent/slide_count"),
            Some(&json!(0))
        );
    }

    #[test]
    fn unknown_tool_is_a_tool_error() {
        let response = handle_request(
            &registry(RecordingRunner::new()),
            &json!({
                "jsonrpc": "2.0",
                "id": 8,
                "method": "tools/call",
                "params": {"name": "merge_slides"}
            }),
        )
        .expect("response");
        assert_eq!(response.pointer("/result/isError"), Some(&json!(true)));
        assert_eq!(
            response.pointer("/result/structuredContent/error/kind"),
            Some(&json!(errors::UNKNOWN_TOOL))
        );
    }

    #[test]
    fn malformed_params_are_rejected() {
        let response = handle_request(
            &registry(RecordingRunner::new()),
            &json!({"jsonrpc": "2.0", "id": 9, "method": "tools/call", "params": []}),
        )
        .expect("response");
        assert_eq!(
            response.pointer("/result/structuredContent/error/message"),
            Some(&json!("params must be an object"))
        );
    }
}
