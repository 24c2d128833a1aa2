use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::AgentError;
use crate::llm::{CompletionRequest, ModelClient, ModelResponse};
use crate::session::{Message, ToolRequest};
use crate::tool::ToolExecutor;

/// Reply used when the loop hits its round-trip bound and the model
/// never produced any usable text.
pub const FALLBACK_REPLY: &str =
    "I wasn't able to finish working through that request. Could you try rephrasing it?";

/// Configuration for the agent.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// The model to use
    pub model: String,
    /// The deployment persona
    pub system_prompt: String,
    /// Maximum number of think→act round-trips per turn
    pub max_round_trips: usize,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Optional temperature
    pub temperature: Option<f32>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            system_prompt: String::new(),
            max_round_trips: 10,
            max_tokens: 4096,
            temperature: None,
        }
    }
}

/// The completed result of one turn.
#[derive(Debug, Clone)]
pub struct Turn {
    /// The final assistant reply
    pub reply: String,
    /// The full message sequence for the turn, ending with the final
    /// assistant message
    pub messages: Vec<Message>,
}

/// Working state for a single turn. Mutated only by appending messages
/// and bumping the round-trip counter; discarded once the reply is
/// extracted.
struct TurnState {
    messages: Vec<Message>,
    round_trips: usize,
    /// Latest text the model emitted alongside tool calls, kept as the
    /// best-effort reply if the loop is cut short.
    last_text: Option<String>,
}

enum Phase {
    Thinking,
    Acting(Vec<ToolRequest>),
    Done(String),
}

/// The orchestration core: alternates between asking the model and
/// executing the tools it requested, until the model answers in plain
/// text or the round-trip bound forces termination.
#[derive(Clone)]
pub struct Agent {
    model_client: Arc<dyn ModelClient>,
    executor: ToolExecutor,
    config: AgentConfig,
}

impl Agent {
    /// Creates a new agent. Both collaborators are injected so the
    /// loop runs against fakes in tests.
    pub fn new(
        model_client: Arc<dyn ModelClient>,
        executor: ToolExecutor,
        config: AgentConfig,
    ) -> Self {
        Self {
            model_client,
            executor,
            config,
        }
    }

    /// Runs one turn over the seeded message sequence (prior history
    /// plus the new user message) until the model stops requesting
    /// tools.
    ///
    /// Tool failures come back to the model as result text and never
    /// end the turn; a model failure does, atomically. Dropping the
    /// returned future cancels any in-flight model or tool call.
    pub async fn run(&self, messages: Vec<Message>) -> Result<Turn, AgentError> {
        let mut state = TurnState {
            messages,
            round_trips: 0,
            last_text: None,
        };
        let mut phase = Phase::Thinking;

        let reply = loop {
            phase = match phase {
                Phase::Thinking => {
                    debug!(round_trips = state.round_trips, "Asking the model");
                    let response = self
                        .model_client
                        .complete(self.completion_request(&state))
                        .await?;

                    match response {
                        ModelResponse::PlainReply { text } => Phase::Done(text),
                        ModelResponse::ToolCallRequest { text, requests } => {
                            if let Some(text) = &text {
                                state.last_text = Some(text.clone());
                            }
                            if state.round_trips >= self.config.max_round_trips {
                                warn!(
                                    bound = self.config.max_round_trips,
                                    "Round-trip bound reached, forcing termination"
                                );
                                break self.forced_reply(&state);
                            }
                            state
                                .messages
                                .push(Message::assistant_with_tool_calls(text, requests.clone()));
                            state.round_trips += 1;
                            Phase::Acting(requests)
                        }
                    }
                }
                Phase::Acting(requests) => {
                    debug!(count = requests.len(), "Executing tool batch");
                    let results = self.executor.dispatch_batch(&requests).await;
                    state.messages.extend(results);
                    Phase::Thinking
                }
                Phase::Done(text) => break text,
            };
        };

        state.messages.push(Message::assistant(reply.clone()));

        Ok(Turn {
            reply,
            messages: state.messages,
        })
    }

    fn completion_request(&self, state: &TurnState) -> CompletionRequest {
        CompletionRequest {
            model: self.config.model.clone(),
            system_prompt: self.config.system_prompt.clone(),
            messages: state.messages.clone(),
            tools: self.executor.tool_definitions(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        }
    }

    /// Best available reply when the bound cuts the loop short.
    fn forced_reply(&self, state: &TurnState) -> String {
        state
            .last_text
            .clone()
            .unwrap_or_else(|| FALLBACK_REPLY.to_string())
    }
}
