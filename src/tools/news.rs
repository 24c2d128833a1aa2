use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::tool::{Tool, ToolError};

const NEWS_API_URL: &str = "https://newsapi.org/v2/everything";

/// Hard cap on articles per lookup, whatever the model asks for.
const MAX_ARTICLES: u64 = 10;
const DEFAULT_ARTICLES: u64 = 5;

/// Recent-articles lookup backed by newsapi.org.
pub struct NewsTool {
    client: Client,
    api_key: Option<String>,
}

impl NewsTool {
    /// Creates a new news tool.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
        }
    }
}

#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    title: String,
    source: ArticleSource,
    #[serde(rename = "publishedAt")]
    published_at: DateTime<Utc>,
    url: String,
}

#[derive(Debug, Deserialize)]
struct ArticleSource {
    name: String,
}

fn clamp_limit(requested: Option<u64>) -> u64 {
    requested.unwrap_or(DEFAULT_ARTICLES).min(MAX_ARTICLES)
}

fn render_articles(query: &str, articles: &[Article]) -> String {
    if articles.is_empty() {
        return format!("No news articles found for \"{query}\"");
    }

    let entries: Vec<String> = articles
        .iter()
        .enumerate()
        .map(|(index, article)| {
            format!(
                "{}. {}\n   Source: {}\n   Published: {}\n   {}",
                index + 1,
                article.title,
                article.source.name,
                article.published_at.format("%Y-%m-%d"),
                article.url,
            )
        })
        .collect();

    format!("Latest news about \"{query}\":\n\n{}", entries.join("\n\n"))
}

#[async_trait]
impl Tool for NewsTool {
    fn name(&self) -> &str {
        "get_news"
    }

    fn description(&self) -> &str {
        "Get latest news articles for a topic, keyword, or location"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "News topic, keyword, or search term"
                },
                "limit": {
                    "type": "integer",
                    "description": "Number of articles to return (max 10)"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String, ToolError> {
        let Some(api_key) = &self.api_key else {
            return Ok("News API key not configured".to_string());
        };

        let query = args["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("query is required".to_string()))?;
        let limit = clamp_limit(args["limit"].as_u64());

        debug!(%query, limit, "Fetching news articles");

        let response = match self
            .client
            .get(NEWS_API_URL)
            .query(&[
                ("q", query),
                ("apiKey", api_key.as_str()),
                ("pageSize", &limit.to_string()),
                ("sortBy", "publishedAt"),
            ])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return Ok(format!("Error fetching news: {e}")),
        };

        if !response.status().is_success() {
            return Ok(format!("News API error: {}", response.status()));
        }

        match response.json::<NewsResponse>().await {
            Ok(news) => {
                let shown = news.articles.len().min(limit as usize);
                Ok(render_articles(query, &news.articles[..shown]))
            }
            Err(e) => Ok(format!("Error fetching news: {e}")),
        }
    }
}
