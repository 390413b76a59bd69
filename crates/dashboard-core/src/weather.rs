//! Current conditions from the Open-Meteo forecast API.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RemoteError;

/// WMO weather code bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Clear,
    PartlyCloudy,
    Foggy,
    Rainy,
    Snowy,
    Stormy,
    Unknown,
}

impl WeatherCondition {
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => WeatherCondition::Clear,
            1..=3 => WeatherCondition::PartlyCloudy,
            4..=49 => WeatherCondition::Foggy,
            50..=69 => WeatherCondition::Rainy,
            70..=79 => WeatherCondition::Snowy,
            80..=99 => WeatherCondition::Stormy,
            _ => WeatherCondition::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WeatherCondition::Clear => "Clear",
            WeatherCondition::PartlyCloudy => "Partly Cloudy",
            WeatherCondition::Foggy => "Foggy",
            WeatherCondition::Rainy => "Rainy",
            WeatherCondition::Snowy => "Snowy",
            WeatherCondition::Stormy => "Stormy",
            WeatherCondition::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            name: "London, UK".into(),
            latitude: 51.5074,
            longitude: -0.1278,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub location: String,
    /// Degrees Celsius, rounded.
    pub temperature: i64,
    /// Percent.
    pub humidity: f64,
    pub weather_code: u32,
    pub conditions: WeatherCondition,
}

#[derive(Deserialize)]
struct ForecastResponse {
    current: CurrentBlock,
}

#[derive(Deserialize)]
struct CurrentBlock {
    temperature_2m: f64,
    relative_humidity_2m: f64,
    weather_code: u32,
}

pub struct WeatherClient {
    client: Client,
    base_url: String,
}

impl WeatherClient {
    /// `base_url` is the forecast endpoint, e.g.
    /// `https://api.open-meteo.com/v1/forecast`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RemoteError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.into(),
        })
    }

    pub async fn current(&self, location: &Location) -> Result<WeatherReport, RemoteError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", location.latitude.to_string()),
                ("longitude", location.longitude.to_string()),
                (
                    "current",
                    "temperature_2m,relative_humidity_2m,weather_code".to_string(),
                ),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        debug!(status = %status, location = %location.name, "weather response");
        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body: ForecastResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Malformed(e.to_string()))?;
        Ok(report(location, &body.current))
    }
}

fn report(location: &Location, current: &CurrentBlock) -> WeatherReport {
    WeatherReport {
        location: location.name.clone(),
        temperature: current.temperature_2m.round() as i64,
        humidity: current.relative_humidity_2m,
        weather_code: current.weather_code,
        conditions: WeatherCondition::from_code(current.weather_code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_buckets() {
        let cases = [
            (0, WeatherCondition::Clear),
            (1, WeatherCondition::PartlyCloudy),
            (3, WeatherCondition::PartlyCloudy),
            (45, WeatherCondition::Foggy),
            (49, WeatherCondition::Foggy),
            (61, WeatherCondition::Rainy),
            (71, WeatherCondition::Snowy),
            (95, WeatherCondition::Stormy),
            (99, WeatherCondition::Stormy),
            (100, WeatherCondition::Unknown),
        ];
        for (code, expected) in cases {
            assert_eq!(WeatherCondition::from_code(code), expected, "code {code}");
        }
        assert_eq!(WeatherCondition::PartlyCloudy.label(), "Partly Cloudy");
    }

    #[test]
    fn temperature_is_rounded() {
        let current = CurrentBlock {
            temperature_2m: 12.6,
            relative_humidity_2m: 81.0,
            weather_code: 2,
        };
        let report = report(&Location::default(), &current);
        assert_eq!(report.temperature, 13);
        assert_eq!(report.location, "London, UK");
        assert_eq!(report.conditions, WeatherCondition::PartlyCloudy);
    }

    #[tokio::test]
    async fn fetches_current_conditions() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/forecast")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("latitude".into(), "51.5074".into()),
                mockito::Matcher::UrlEncoded(
                    "current".into(),
                    "temperature_2m,relative_humidity_2m,weather_code".into(),
                ),
            ]))
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"current":{"time":"2026-10-18T12:00","temperature_2m":-0.4,"relative_humidity_2m":92,"weather_code":73}}"#,
            )
            .create_async()
            .await;

        let client = WeatherClient::new(
            format!("{}/v1/forecast", server.url()),
            Duration::from_secs(5),
        )
        .unwrap();
        let report = client.current(&Location::default()).await.unwrap();
        mock.assert_async().await;
        assert_eq!(report.temperature, 0);
        assert_eq!(report.humidity, 92.0);
        assert_eq!(report.conditions, WeatherCondition::Snowy);
    }

    #[tokio::test]
    async fn upstream_failure_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", mockito::Matcher::Any)
            .with_status(503)
            .create_async()
            .await;
        let client = WeatherClient::new(server.url(), Duration::from_secs(5)).unwrap();
        let err = client.current(&Location::default()).await.unwrap_err();
        assert!(matches!(err, RemoteError::Status { status: 503, .. }));
    }
}
