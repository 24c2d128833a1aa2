use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::tool::{Tool, ToolError};

const WEATHER_API_URL: &str = "https://api.weatherapi.com/v1/current.json";

/// Current-conditions lookup backed by weatherapi.com.
///
/// Constructed with an optional credential: when absent the tool stays
/// registered and reports itself as unconfigured instead of failing.
pub struct WeatherTool {
    client: Client,
    api_key: Option<String>,
}

impl WeatherTool {
    /// Creates a new weather tool.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WeatherReport {
    location: ReportLocation,
    current: CurrentConditions,
}

#[derive(Debug, Deserialize)]
struct ReportLocation {
    name: String,
    country: String,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    temp_c: f64,
    temp_f: f64,
    condition: ConditionInfo,
    humidity: i64,
    wind_kph: f64,
    wind_mph: f64,
    feelslike_c: f64,
}

#[derive(Debug, Deserialize)]
struct ConditionInfo {
    text: String,
}

fn render_report(report: &WeatherReport) -> String {
    format!(
        "Weather in {}, {}:\n\
         - Temperature: {}°C ({}°F)\n\
         - Condition: {}\n\
         - Humidity: {}%\n\
         - Wind: {} km/h ({} mph)\n\
         - Feels like: {}°C",
        report.location.name,
        report.location.country,
        report.current.temp_c,
        report.current.temp_f,
        report.current.condition.text,
        report.current.humidity,
        report.current.wind_kph,
        report.current.wind_mph,
        report.current.feelslike_c,
    )
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Get current weather information for a location"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "City name or location (e.g., \"New York\", \"London\")"
                }
            },
            "required": ["location"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String, ToolError> {
        let Some(api_key) = &self.api_key else {
            return Ok("Weather API key not configured".to_string());
        };

        let location = args["location"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("location is required".to_string()))?;

        debug!(%location, "Fetching current weather");

        let response = match self
            .client
            .get(WEATHER_API_URL)
            .query(&[("key", api_key.as_str()), ("q", location)])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return Ok(format!("Error fetching weather: {e}")),
        };

        if !response.status().is_success() {
            return Ok(format!("Weather API error: {}", response.status()));
        }

        match response.json::<WeatherReport>().await {
            Ok(report) => Ok(render_report(&report)),
            Err(e) => Ok(format!("Error fetching weather: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_credential_degrades_to_text() {
        let tool = WeatherTool::new(None);
        let result = tool
            .execute(json!({"location": "Paris"}))
            .await
            .expect("credential absence is not an error");
        assert_eq!(result, "Weather API key not configured");
    }

    #[tokio::test]
    async fn missing_location_is_invalid_arguments() {
        let tool = WeatherTool::new(Some("k".into()));
        let err = tool.execute(json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn renders_report_fields() {
        let report = WeatherReport {
            location: ReportLocation {
                name: "Paris".into(),
                country: "France".into(),
            },
            current: CurrentConditions {
                temp_c: 18.0,
                temp_f: 64.4,
                condition: ConditionInfo {
                    text: "Partly cloudy".into(),
                },
                humidity: 60,
                wind_kph: 11.2,
                wind_mph: 7.0,
                feelslike_c: 17.5,
            },
        };
        let text = render_report(&report);
        assert!(text.starts_with("Weather in Paris, France:"));
        assert!(text.contains("- Temperature: 18°C (64.4°F)"));
        assert!(text.contains("- Condition: Partly cloudy"));
        assert!(text.contains("- Humidity: 60%"));
    }
}
