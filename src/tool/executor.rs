use std::sync::Arc;

use futures::future::join_all;
use serde_json::Value;
use tracing::debug;

use crate::session::{Message, ToolRequest};
use crate::tool::{ToolDefinition, ToolRegistry};

/// Dispatches model-issued tool requests against the registry.
///
/// Every outcome — success, unknown tool, schema violation, executor
/// failure — becomes a `tool`-role message. A tool request never fails
/// the turn.
#[derive(Debug, Clone)]
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
}

impl ToolExecutor {
    /// Creates a new tool executor over the given registry.
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    /// Returns all tool definitions for passing to the model.
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.registry.to_tool_definitions()
    }

    /// Executes a single tool request, producing its result message.
    pub async fn dispatch(&self, request: &ToolRequest) -> Message {
        let tool = match self.registry.get(&request.name) {
            Some(tool) => tool.clone(),
            None => {
                return Message::tool_result(
                    &request.id,
                    format!("Tool not available: {}", request.name),
                );
            }
        };

        if let Err(violation) =
            validate_arguments(&tool.parameters_schema(), &request.arguments)
        {
            return Message::tool_result(
                &request.id,
                format!("Invalid arguments for {}: {}", request.name, violation),
            );
        }

        debug!(tool = %request.name, call_id = %request.id, "Executing tool");

        match tool.execute(request.arguments.clone()).await {
            Ok(output) => Message::tool_result(&request.id, output),
            Err(error) => Message::tool_result(&request.id, error.to_string()),
        }
    }

    /// Executes a batch of requests from one assistant message.
    ///
    /// Requests run independently; results come back aligned with the
    /// order the model emitted the requests.
    pub async fn dispatch_batch(&self, requests: &[ToolRequest]) -> Vec<Message> {
        join_all(requests.iter().map(|request| self.dispatch(request))).await
    }
}

/// Checks arguments against a tool's JSON schema before invocation.
///
/// Covers the subset of JSON Schema the tools declare: an object with
/// `properties` typed as primitives and a `required` list.
fn validate_arguments(schema: &Value, args: &Value) -> Result<(), String> {
    if schema.get("type").and_then(Value::as_str) == Some("object") && !args.is_object() {
        return Err("expected a JSON object".to_string());
    }

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for key in required.iter().filter_map(Value::as_str) {
            if args.get(key).is_none() {
                return Err(format!("missing required field `{key}`"));
            }
        }
    }

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for (key, prop) in properties {
            let Some(value) = args.get(key) else { continue };
            let Some(expected) = prop.get("type").and_then(Value::as_str) else {
                continue;
            };
            let matches = match expected {
                "string" => value.is_string(),
                "number" => value.is_number(),
                "integer" => value.is_i64() || value.is_u64(),
                "boolean" => value.is_boolean(),
                "array" => value.is_array(),
                "object" => value.is_object(),
                _ => true,
            };
            if !matches {
                return Err(format!("field `{key}` must be of type {expected}"));
            }
        }
    }

    Ok(())
}
