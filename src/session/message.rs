use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role of the message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Deployment persona instruction
    System,
    /// User message
    User,
    /// Assistant message (from the model)
    Assistant,
    /// Tool result message
    Tool,
}

impl Role {
    /// Returns the lowercase wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }

    /// Parses a lowercase role name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "system" => Some(Role::System),
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            "tool" => Some(Role::Tool),
            _ => None,
        }
    }
}

/// A model-issued request to invoke a named tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolRequest {
    /// Unique identifier for the call, scoped to the turn
    pub id: String,
    /// The name of the tool to call
    pub name: String,
    /// The arguments to pass to the tool
    pub arguments: serde_json::Value,
}

/// One turn-unit in a conversation.
///
/// The conversation is an append-only sequence of these records; a
/// message is never mutated once appended. Assistant messages may carry
/// tool calls; a tool message answers exactly one of them via
/// `tool_call_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier for the message
    pub id: String,
    /// The role of the message sender
    pub role: Role,
    /// The text content (possibly empty for tool-call-only messages)
    pub content: String,
    /// Tool calls requested by an assistant message
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolRequest>,
    /// For tool messages, the id of the call this result answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Timestamp when the message was created
    pub created_at: DateTime<Utc>,
}

impl Message {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
            created_at: Utc::now(),
        }
    }

    /// Creates a new user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    /// Creates a plain assistant reply.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    /// Creates an assistant message carrying tool calls, with optional
    /// explanatory text alongside them.
    pub fn assistant_with_tool_calls(
        text: Option<String>,
        tool_calls: Vec<ToolRequest>,
    ) -> Self {
        let mut msg = Self::new(Role::Assistant, text.unwrap_or_default());
        msg.tool_calls = tool_calls;
        msg
    }

    /// Creates a tool result message answering the given call.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        let mut msg = Self::new(Role::Tool, content);
        msg.tool_call_id = Some(tool_call_id.into());
        msg
    }

    /// Whether this assistant message requested any tools.
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// The flat `{role, content}` form the boundary layer exchanges with
/// the store and the UI. Tool bookkeeping stays internal to a turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The role of the message sender
    pub role: Role,
    /// The text content
    pub content: String,
}

impl HistoryEntry {
    /// Creates a new history entry.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Converts the entry into a full message record.
    pub fn into_message(self) -> Message {
        Message::new(self.role, self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_wire_names() {
        for role in [Role::System, Role::User, Role::Assistant, Role::Tool] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("robot"), None);
    }

    #[test]
    fn tool_result_carries_call_id() {
        let msg = Message::tool_result("call_1", "ok");
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(msg.content, "ok");
    }

    #[test]
    fn assistant_with_calls_may_omit_text() {
        let msg = Message::assistant_with_tool_calls(
            None,
            vec![ToolRequest {
                id: "call_1".into(),
                name: "get_weather".into(),
                arguments: serde_json::json!({"location": "Paris"}),
            }],
        );
        assert!(msg.has_tool_calls());
        assert!(msg.content.is_empty());
    }
}
