use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::{CompletionRequest, ModelClient, ModelError, ModelResponse};
use crate::session::{Role, ToolRequest};

/// OpenAI API response for chat completions.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageResponse,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Option<String>,
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    #[serde(default)]
    id: String,
    function: FunctionCall,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    #[serde(default)]
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Value>>,
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// A model gateway client for OpenAI-compatible chat-completions APIs.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
}

impl OpenAiClient {
    /// Creates a new client.
    pub fn new(
        api_key: String,
        base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, ModelError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::AUTHORIZATION,
            reqwest::header::HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|e| ModelError::Auth(format!("Invalid API key: {e}")))?,
        );
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let mut client_builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let client = client_builder.build()?;

        Ok(Self {
            client,
            base_url: base_url.unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
        })
    }

    /// Builds the wire message list: persona first, then the history
    /// with tool calls and tool results in the function-calling shape.
    fn build_messages(request: &CompletionRequest) -> Vec<Value> {
        let mut messages = Vec::new();

        if !request.system_prompt.is_empty() {
            messages.push(serde_json::json!({
                "role": "system",
                "content": request.system_prompt
            }));
        }

        for msg in &request.messages {
            match msg.role {
                Role::System | Role::User => {
                    messages.push(serde_json::json!({
                        "role": msg.role.as_str(),
                        "content": msg.content
                    }));
                }
                Role::Assistant => {
                    if msg.has_tool_calls() {
                        let tool_calls: Vec<Value> = msg
                            .tool_calls
                            .iter()
                            .map(|call| {
                                serde_json::json!({
                                    "id": call.id,
                                    "type": "function",
                                    "function": {
                                        "name": call.name,
                                        "arguments": call.arguments.to_string()
                                    }
                                })
                            })
                            .collect();

                        messages.push(serde_json::json!({
                            "role": "assistant",
                            "content": if msg.content.is_empty() {
                                Value::Null
                            } else {
                                Value::String(msg.content.clone())
                            },
                            "tool_calls": tool_calls
                        }));
                    } else {
                        messages.push(serde_json::json!({
                            "role": "assistant",
                            "content": msg.content
                        }));
                    }
                }
                Role::Tool => {
                    messages.push(serde_json::json!({
                        "role": "tool",
                        "tool_call_id": msg.tool_call_id.clone().unwrap_or_default(),
                        "content": msg.content
                    }));
                }
            }
        }

        messages
    }

    /// Serializes tool definitions into the function-calling format.
    fn build_tools(request: &CompletionRequest) -> Option<Vec<Value>> {
        if request.tools.is_empty() {
            return None;
        }
        Some(
            request
                .tools
                .iter()
                .map(|def| {
                    serde_json::json!({
                        "type": "function",
                        "function": {
                            "name": def.name,
                            "description": def.description,
                            "parameters": def.input_schema
                        }
                    })
                })
                .collect(),
        )
    }

    fn parse_response(response: ChatCompletionResponse) -> Result<ModelResponse, ModelError> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::InvalidResponse("No choices in response".to_string()))?;

        let text = choice.message.content.filter(|t| !t.is_empty());

        let requests: Vec<ToolRequest> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| {
                let arguments: Value = if call.function.arguments.is_empty() {
                    serde_json::json!({})
                } else {
                    serde_json::from_str(&call.function.arguments)
                        .unwrap_or_else(|_| serde_json::json!({}))
                };
                ToolRequest {
                    id: call.id,
                    name: call.function.name,
                    arguments,
                }
            })
            .collect();

        if requests.is_empty() {
            Ok(ModelResponse::PlainReply {
                text: text.unwrap_or_default(),
            })
        } else {
            Ok(ModelResponse::ToolCallRequest { text, requests })
        }
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<ModelResponse, ModelError> {
        let body = ChatRequest {
            model: request.model.clone(),
            messages: Self::build_messages(&request),
            tools: Self::build_tools(&request),
            max_tokens: Some(request.max_tokens),
            temperature: request.temperature,
        };

        debug!(model = %request.model, tools = request.tools.len(), "Sending completion request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(if status == reqwest::StatusCode::UNAUTHORIZED {
                ModelError::Auth(error_text)
            } else {
                ModelError::Api(format!("{status}: {error_text}"))
            });
        }

        let response_text = response.text().await?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&response_text)
            .map_err(|e| ModelError::InvalidResponse(format!("{e}: {response_text}")))?;

        Self::parse_response(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Message;
    use crate::tool::ToolDefinition;

    fn request_with(messages: Vec<Message>) -> CompletionRequest {
        CompletionRequest {
            model: "gpt-4o".into(),
            system_prompt: "Be witty.".into(),
            messages,
            tools: vec![ToolDefinition {
                name: "get_weather".into(),
                description: "weather".into(),
                input_schema: serde_json::json!({"type": "object"}),
            }],
            max_tokens: 1024,
            temperature: Some(0.7),
        }
    }

    #[test]
    fn system_prompt_leads_the_wire_messages() {
        let wire = OpenAiClient::build_messages(&request_with(vec![Message::user("hi")]));
        assert_eq!(wire[0]["role"], "system");
        assert_eq!(wire[0]["content"], "Be witty.");
        assert_eq!(wire[1]["role"], "user");
    }

    #[test]
    fn assistant_tool_calls_serialize_with_null_content() {
        let msg = Message::assistant_with_tool_calls(
            None,
            vec![ToolRequest {
                id: "call_1".into(),
                name: "get_weather".into(),
                arguments: serde_json::json!({"location": "Paris"}),
            }],
        );
        let wire = OpenAiClient::build_messages(&request_with(vec![msg]));
        let assistant = &wire[1];
        assert!(assistant["content"].is_null());
        assert_eq!(assistant["tool_calls"][0]["function"]["name"], "get_weather");
        assert_eq!(
            assistant["tool_calls"][0]["function"]["arguments"],
            "{\"location\":\"Paris\"}"
        );
    }

    #[test]
    fn tool_results_carry_their_call_id() {
        let wire = OpenAiClient::build_messages(&request_with(vec![Message::tool_result(
            "call_1", "sunny",
        )]));
        assert_eq!(wire[1]["role"], "tool");
        assert_eq!(wire[1]["tool_call_id"], "call_1");
        assert_eq!(wire[1]["content"], "sunny");
    }

    #[test]
    fn tools_use_function_calling_format() {
        let tools = OpenAiClient::build_tools(&request_with(vec![])).unwrap();
        assert_eq!(tools[0]["type"], "function");
        assert_eq!(tools[0]["function"]["name"], "get_weather");
    }

    #[test]
    fn plain_content_parses_to_plain_reply() {
        let response: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":"Hello there."}}]}"#,
        )
        .unwrap();
        match OpenAiClient::parse_response(response).unwrap() {
            ModelResponse::PlainReply { text } => assert_eq!(text, "Hello there."),
            other => panic!("expected plain reply, got {other:?}"),
        }
    }

    #[test]
    fn tool_calls_parse_to_requests_in_order() {
        let response: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{
                "content":"Checking both.",
                "tool_calls":[
                    {"id":"a","function":{"name":"get_weather","arguments":"{\"location\":\"Paris\"}"}},
                    {"id":"b","function":{"name":"get_news","arguments":"{\"query\":\"rust\"}"}}
                ]}}]}"#,
        )
        .unwrap();
        match OpenAiClient::parse_response(response).unwrap() {
            ModelResponse::ToolCallRequest { text, requests } => {
                assert_eq!(text.as_deref(), Some("Checking both."));
                assert_eq!(requests.len(), 2);
                assert_eq!(requests[0].id, "a");
                assert_eq!(requests[1].name, "get_news");
                assert_eq!(requests[0].arguments["location"], "Paris");
            }
            other => panic!("expected tool call request, got {other:?}"),
        }
    }

    #[test]
    fn malformed_arguments_default_to_empty_object() {
        let response: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{
                "tool_calls":[{"id":"a","function":{"name":"get_weather","arguments":"not json"}}]
            }}]}"#,
        )
        .unwrap();
        match OpenAiClient::parse_response(response).unwrap() {
            ModelResponse::ToolCallRequest { requests, .. } => {
                assert_eq!(requests[0].arguments, serde_json::json!({}));
            }
            other => panic!("expected tool call request, got {other:?}"),
        }
    }

    #[test]
    fn empty_choices_is_invalid_response() {
        let response: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            OpenAiClient::parse_response(response),
            Err(ModelError::InvalidResponse(_))
        ));
    }
}
