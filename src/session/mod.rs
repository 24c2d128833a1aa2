pub mod message;

pub use message::{HistoryEntry, Message, Role, ToolRequest};
