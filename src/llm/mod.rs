pub mod client;
pub mod openai;

pub use client::{
    CompletionRequest, ModelClient, ModelClientBuilder, ModelError, ModelResponse,
};
pub use openai::OpenAiClient;
