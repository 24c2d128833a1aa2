//! The concrete tools this deployment registers: weather and news
//! lookups, both credential-optional.

pub mod news;
pub mod weather;

pub use news::NewsTool;
pub use weather::WeatherTool;

use std::sync::Arc;

use crate::tool::ToolRegistry;

/// Builds the standard registry for this deployment.
pub fn default_registry(
    weather_api_key: Option<String>,
    news_api_key: Option<String>,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(WeatherTool::new(weather_api_key)));
    registry.register(Arc::new(NewsTool::new(news_api_key)));
    registry
}
