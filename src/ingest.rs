//! Open-Meteo client for weather and air quality data.
//!
//! Two upstream APIs feed the pipeline: the weather forecast API
//! (`temperature_2m`, `relative_humidity_2m`, `wind_speed_10m`) and the air
//! quality API (`pm2_5`, `pm10`, `nitrogen_dioxide`). Hourly series are
//! joined on their ISO timestamps; an hour missing any required field is
//! skipped with a debug log, never fatal. Request failures abort the run —
//! there are no partial-hour writes.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::models::{Reading, WeatherPoint};

// ---

pub struct OpenMeteoClient {
    // ---
    client: reqwest::Client,
    weather_url: String,
    air_quality_url: String,
    latitude: f64,
    longitude: f64,
}

impl OpenMeteoClient {
    /// Build a client from explicit configuration. Nothing global: the base
    /// URLs and coordinates travel with the instance.
    pub fn new(config: &Config) -> Self {
        // ---
        OpenMeteoClient {
            client: reqwest::Client::new(),
            weather_url: config.weather_api_url.clone(),
            air_quality_url: config.air_quality_api_url.clone(),
            latitude: config.site_lat,
            longitude: config.site_lon,
        }
    }

    /// Fetch the current weather and air quality as one reading for the
    /// current hour (timestamp truncated, hour derived).
    pub async fn fetch_current(&self, now: DateTime<Utc>) -> Result<Reading> {
        // ---
        tracing::info!("Fetching current conditions from Open-Meteo");

        let weather: CurrentWeatherEnvelope = self
            .get_json(
                &self.weather_url,
                &[("current", "temperature_2m,relative_humidity_2m,wind_speed_10m")],
            )
            .await?;

        let air: CurrentAirEnvelope = self
            .get_json(
                &self.air_quality_url,
                &[("current", "pm2_5,pm10,nitrogen_dioxide")],
            )
            .await?;

        Ok(Reading::from_observation(
            now,
            air.current.pm2_5,
            air.current.pm10,
            air.current.nitrogen_dioxide,
            weather.current.temperature_2m,
            weather.current.relative_humidity_2m,
            weather.current.wind_speed_10m,
        ))
    }

    /// Fetch the past day of hourly readings, joined across both APIs.
    ///
    /// Hours in the future relative to `now` are dropped (the hourly
    /// endpoints pad the series to the end of the day).
    pub async fn fetch_past_day(&self, now: DateTime<Utc>) -> Result<Vec<Reading>> {
        // ---
        tracing::info!("Fetching past-day hourly series from Open-Meteo");

        let air: HourlyAirEnvelope = self
            .get_json(
                &self.air_quality_url,
                &[("hourly", "pm2_5,pm10,nitrogen_dioxide"), ("past_days", "1")],
            )
            .await?;

        let weather: HourlyWeatherEnvelope = self
            .get_json(
                &self.weather_url,
                &[
                    ("hourly", "temperature_2m,relative_humidity_2m,wind_speed_10m"),
                    ("past_days", "1"),
                ],
            )
            .await?;

        let readings = join_hourly(&air.hourly, &weather.hourly, now);
        if readings.is_empty() {
            return Err(PipelineError::DataUnavailable {
                reason: "hourly series contained no complete past hours".into(),
            });
        }

        Ok(readings)
    }

    /// Fetch the upcoming hourly weather, strictly after `now`, capped at
    /// `hours` points. Input for the recursive forecaster.
    pub async fn fetch_weather_forecast(
        &self,
        now: DateTime<Utc>,
        hours: usize,
    ) -> Result<Vec<WeatherPoint>> {
        // ---
        let weather: HourlyWeatherEnvelope = self
            .get_json(
                &self.weather_url,
                &[
                    ("hourly", "temperature_2m,relative_humidity_2m,wind_speed_10m"),
                    ("forecast_days", "2"),
                ],
            )
            .await?;

        let points = future_weather(&weather.hourly, now, hours);
        if points.is_empty() {
            return Err(PipelineError::DataUnavailable {
                reason: "weather forecast contained no future hours".into(),
            });
        }

        Ok(points)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        base_url: &str,
        extra: &[(&str, &str)],
    ) -> Result<T> {
        // ---
        let mut params: Vec<(&str, String)> = vec![
            ("latitude", self.latitude.to_string()),
            ("longitude", self.longitude.to_string()),
            ("timezone", "UTC".to_string()),
        ];
        params.extend(extra.iter().map(|(k, v)| (*k, v.to_string())));

        tracing::debug!("GET {} {:?}", base_url, params);

        let response = self
            .client
            .get(base_url)
            .query(&params)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<T>().await?)
    }
}

// ---

/// Join the two hourly series on timestamp, keeping complete past hours.
fn join_hourly(air: &HourlyAir, weather: &HourlyWeather, now: DateTime<Utc>) -> Vec<Reading> {
    // ---
    let mut air_by_hour: HashMap<&str, (f64, f64, Option<f64>)> = HashMap::new();
    for (i, time) in air.time.iter().enumerate() {
        let pm2_5 = air.pm2_5.get(i).copied().flatten();
        let pm10 = air.pm10.get(i).copied().flatten();
        let no2 = air
            .nitrogen_dioxide
            .as_ref()
            .and_then(|v| v.get(i))
            .copied()
            .flatten();

        match (pm2_5, pm10) {
            (Some(pm2_5), Some(pm10)) => {
                air_by_hour.insert(time.as_str(), (pm2_5, pm10, no2));
            }
            _ => tracing::debug!("Skipping hour {} with missing pollution fields", time),
        }
    }

    let mut readings = Vec::new();
    for (i, time) in weather.time.iter().enumerate() {
        let Some(timestamp) = parse_hour(time) else {
            tracing::debug!("Skipping unparsable hourly timestamp {:?}", time);
            continue;
        };
        if timestamp > now {
            continue;
        }

        let temp = weather.temperature_2m.get(i).copied().flatten();
        let humidity = weather.relative_humidity_2m.get(i).copied().flatten();
        let wind_speed = weather.wind_speed_10m.get(i).copied().flatten();

        let (Some(temp), Some(humidity), Some(wind_speed)) = (temp, humidity, wind_speed) else {
            tracing::debug!("Skipping hour {} with missing weather fields", time);
            continue;
        };
        let Some(&(pm2_5, pm10, no2)) = air_by_hour.get(time.as_str()) else {
            tracing::debug!("Skipping hour {} with no pollution row", time);
            continue;
        };

        readings.push(Reading::from_observation(
            timestamp, pm2_5, pm10, no2, temp, humidity, wind_speed,
        ));
    }

    readings
}

/// Complete weather hours strictly after `now`, at most `hours` of them.
fn future_weather(weather: &HourlyWeather, now: DateTime<Utc>, hours: usize) -> Vec<WeatherPoint> {
    // ---
    let mut points = Vec::new();

    for (i, time) in weather.time.iter().enumerate() {
        if points.len() >= hours {
            break;
        }
        let Some(timestamp) = parse_hour(time) else {
            continue;
        };
        if timestamp <= now {
            continue;
        }

        let temp = weather.temperature_2m.get(i).copied().flatten();
        let humidity = weather.relative_humidity_2m.get(i).copied().flatten();
        let wind_speed = weather.wind_speed_10m.get(i).copied().flatten();

        if let (Some(temp), Some(humidity), Some(wind_speed)) = (temp, humidity, wind_speed) {
            points.push(WeatherPoint::new(timestamp, temp, humidity, wind_speed));
        } else {
            tracing::debug!("Skipping forecast hour {} with missing fields", time);
        }
    }

    points
}

/// Open-Meteo hourly timestamps are `YYYY-MM-DDTHH:MM` in the requested
/// timezone (UTC here).
fn parse_hour(time: &str) -> Option<DateTime<Utc>> {
    // ---
    NaiveDateTime::parse_from_str(time, "%Y-%m-%dT%H:%M")
        .ok()
        .map(|naive| naive.and_utc())
}

// ---

#[derive(Debug, Deserialize)]
struct CurrentWeatherEnvelope {
    current: CurrentWeather,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature_2m: f64,
    relative_humidity_2m: f64,
    wind_speed_10m: f64,
}

#[derive(Debug, Deserialize)]
struct CurrentAirEnvelope {
    current: CurrentAir,
}

#[derive(Debug, Deserialize)]
struct CurrentAir {
    pm2_5: f64,
    pm10: f64,
    nitrogen_dioxide: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct HourlyAirEnvelope {
    hourly: HourlyAir,
}

#[derive(Debug, Deserialize)]
struct HourlyAir {
    time: Vec<String>,
    pm2_5: Vec<Option<f64>>,
    pm10: Vec<Option<f64>>,
    nitrogen_dioxide: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
struct HourlyWeatherEnvelope {
    hourly: HourlyWeather,
}

#[derive(Debug, Deserialize)]
struct HourlyWeather {
    time: Vec<String>,
    temperature_2m: Vec<Option<f64>>,
    relative_humidity_2m: Vec<Option<f64>>,
    wind_speed_10m: Vec<Option<f64>>,
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::TimeZone;

    fn sample_air() -> HourlyAir {
        // ---
        serde_json::from_str(
            r#"{
                "time": ["2025-04-01T00:00", "2025-04-01T01:00", "2025-04-01T02:00"],
                "pm2_5": [41.2, null, 44.0],
                "pm10": [70.1, 71.0, 72.4],
                "nitrogen_dioxide": [12.0, 12.5, null]
            }"#,
        )
        .unwrap()
    }

    fn sample_weather() -> HourlyWeather {
        // ---
        serde_json::from_str(
            r#"{
                "time": ["2025-04-01T00:00", "2025-04-01T01:00", "2025-04-01T02:00"],
                "temperature_2m": [28.1, 27.9, 27.5],
                "relative_humidity_2m": [60, 62, 64],
                "wind_speed_10m": [10.0, 9.5, 9.1]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_join_skips_hours_with_missing_pollution() {
        // ---
        let now = Utc.with_ymd_and_hms(2025, 4, 1, 12, 0, 0).unwrap();
        let readings = join_hourly(&sample_air(), &sample_weather(), now);

        // Hour 01:00 has a null pm2_5 and is skipped, not fatal.
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].hour, 0);
        assert_eq!(readings[1].hour, 2);
        assert_eq!(readings[1].no2, None);
    }

    #[test]
    fn test_join_drops_future_hours() {
        // ---
        let now = Utc.with_ymd_and_hms(2025, 4, 1, 0, 30, 0).unwrap();
        let readings = join_hourly(&sample_air(), &sample_weather(), now);

        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].hour, 0);
    }

    #[test]
    fn test_future_weather_is_strictly_after_now() {
        // ---
        let now = Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap();
        let points = future_weather(&sample_weather(), now, 10);

        assert_eq!(points.len(), 2);
        assert!(points.iter().all(|p| p.timestamp > now));
    }

    #[test]
    fn test_future_weather_respects_the_cap() {
        // ---
        let now = Utc.with_ymd_and_hms(2025, 3, 31, 23, 0, 0).unwrap();
        let points = future_weather(&sample_weather(), now, 1);
        assert_eq!(points.len(), 1);
    }

    #[test]
    fn test_parse_hour_formats() {
        // ---
        let ts = parse_hour("2025-04-01T07:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2025, 4, 1, 7, 0, 0).unwrap());

        assert!(parse_hour("not-a-time").is_none());
    }
}
