pub mod agent_loop;
pub mod runner;

pub use agent_loop::{Agent, AgentConfig, Turn, FALLBACK_REPLY};
pub use runner::TurnRunner;
