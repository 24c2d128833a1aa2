use crate::error::AgentError;
use crate::session::{HistoryEntry, Message};

use super::agent_loop::{Agent, Turn};

/// The per-message entry point the boundary layer calls.
///
/// Seeds a turn with prior history and the new user message, drives the
/// agent to completion, and hands back the final reply. Knows nothing
/// about persistence, auth, or transport.
#[derive(Clone)]
pub struct TurnRunner {
    agent: Agent,
}

impl TurnRunner {
    /// Creates a new turn runner over the given agent.
    pub fn new(agent: Agent) -> Self {
        Self { agent }
    }

    /// Runs one turn and returns the final assistant reply text.
    ///
    /// If the loop hits its round-trip bound this still returns the
    /// best-effort reply rather than an error; only a model failure
    /// fails the turn.
    pub async fn run_turn(
        &self,
        user_text: &str,
        prior_history: &[HistoryEntry],
    ) -> Result<String, AgentError> {
        let turn = self.run_turn_full(user_text, prior_history).await?;
        Ok(turn.reply)
    }

    /// Same as [`run_turn`](Self::run_turn) but exposes the full turn
    /// transcript.
    pub async fn run_turn_full(
        &self,
        user_text: &str,
        prior_history: &[HistoryEntry],
    ) -> Result<Turn, AgentError> {
        let mut messages: Vec<Message> = prior_history
            .iter()
            .cloned()
            .map(HistoryEntry::into_message)
            .collect();
        messages.push(Message::user(user_text));

        self.agent.run(messages).await
    }
}
