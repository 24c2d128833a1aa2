//! # banter
//!
//! A web chat service where an AI assistant answers with the help of
//! two external tools: weather lookup and news lookup.
//!
//! The core is the agent loop: per user message it alternates between
//! asking the model and executing the tools the model requested, until
//! the model replies in plain text (or a round-trip bound cuts it
//! short). Persistence, auth, and HTTP are thin boundary layers; the
//! loop itself only sees messages in and text out.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use banter::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let model_client = ModelClientBuilder::new()
//!         .with_api_key(std::env::var("OPENAI_API_KEY")?)
//!         .build_openai()?;
//!
//!     let registry = Arc::new(banter::tools::default_registry(
//!         std::env::var("WEATHER_API_KEY").ok(),
//!         std::env::var("NEWS_API_KEY").ok(),
//!     ));
//!
//!     let agent = Agent::new(
//!         model_client,
//!         ToolExecutor::new(registry),
//!         AgentConfig::default(),
//!     );
//!     let runner = TurnRunner::new(agent);
//!
//!     let reply = runner
//!         .run_turn("What's the weather in Paris?", &[])
//!         .await?;
//!     println!("{reply}");
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod server;
pub mod session;
pub mod store;
pub mod tool;
pub mod tools;

// Re-exports for convenient usage
pub use agent::{Agent, AgentConfig, Turn, TurnRunner};
pub use config::Settings;
pub use error::AgentError;
pub use llm::{CompletionRequest, ModelClient, ModelClientBuilder, ModelError, ModelResponse};
pub use session::{HistoryEntry, Message, Role, ToolRequest};
pub use store::{ChatStore, MemoryStore, SqliteStore};
pub use tool::{Tool, ToolDefinition, ToolError, ToolExecutor, ToolRegistry};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::agent::{Agent, AgentConfig, TurnRunner};
    pub use crate::llm::{ModelClient, ModelClientBuilder, ModelResponse};
    pub use crate::session::{HistoryEntry, Message, Role};
    pub use crate::tool::{Tool, ToolExecutor, ToolRegistry};
}
