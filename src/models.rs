//! Domain data models for the air quality pipeline.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

// ---

/// One hourly observation, keyed by its hour-truncated timestamp.
///
/// Written by the ingest/backfill stages (last write per hour wins) and
/// read-only afterward. `no2` is nullable because the air quality API omits
/// nitrogen dioxide for some hours; it is not a model feature.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reading {
    // ---
    pub timestamp: DateTime<Utc>,
    pub pm2_5: f64,
    pub pm10: f64,
    pub no2: Option<f64>,
    pub temp: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub hour: i32,
}

/// One future hour of weather used as forecast input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherPoint {
    // ---
    pub timestamp: DateTime<Utc>,
    pub temp: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub hour: i32,
}

/// One predicted hour. Ephemeral: recomputed on every forecast request and
/// never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastPoint {
    // ---
    pub timestamp: DateTime<Utc>,
    pub temp: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub hour: i32,
    pub predicted_pm2_5: f64,
    pub predicted_aqi: u16,
    pub category: &'static str,
}

// ---

/// Truncate a timestamp to the start of its hour.
///
/// Every `readings` row is keyed by this value, which is what makes the
/// ingest upsert idempotent per hour.
pub fn truncate_to_hour(ts: DateTime<Utc>) -> DateTime<Utc> {
    // ---
    ts.with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(ts)
}

impl Reading {
    /// Build a reading from fetched fields, deriving `timestamp` and `hour`.
    pub fn from_observation(
        observed_at: DateTime<Utc>,
        pm2_5: f64,
        pm10: f64,
        no2: Option<f64>,
        temp: f64,
        humidity: f64,
        wind_speed: f64,
    ) -> Self {
        // ---
        let timestamp = truncate_to_hour(observed_at);
        Reading {
            timestamp,
            pm2_5,
            pm10,
            no2,
            temp,
            humidity,
            wind_speed,
            hour: timestamp.hour() as i32,
        }
    }

    /// Whether every field required for training is present and finite.
    ///
    /// `pm10` and `no2` are stored but not model inputs, so they do not
    /// affect usability here.
    pub fn is_trainable(&self) -> bool {
        // ---
        self.pm2_5.is_finite()
            && self.temp.is_finite()
            && self.humidity.is_finite()
            && self.wind_speed.is_finite()
    }
}

impl WeatherPoint {
    /// Build a forecast input point, deriving `hour` from the timestamp.
    pub fn new(timestamp: DateTime<Utc>, temp: f64, humidity: f64, wind_speed: f64) -> Self {
        // ---
        WeatherPoint {
            timestamp,
            temp,
            humidity,
            wind_speed,
            hour: timestamp.hour() as i32,
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_truncate_to_hour() {
        // ---
        let ts = Utc.with_ymd_and_hms(2025, 3, 26, 18, 45, 12).unwrap();
        let truncated = truncate_to_hour(ts);

        assert_eq!(truncated.hour(), 18);
        assert_eq!(truncated.minute(), 0);
        assert_eq!(truncated.second(), 0);
    }

    #[test]
    fn test_reading_derives_hour_from_timestamp() {
        // ---
        let observed = Utc.with_ymd_and_hms(2025, 3, 26, 7, 59, 59).unwrap();
        let reading =
            Reading::from_observation(observed, 42.0, 80.0, Some(12.0), 28.5, 61.0, 11.2);

        assert_eq!(reading.hour, 7);
        assert_eq!(reading.timestamp, truncate_to_hour(observed));
    }

    #[test]
    fn test_same_hour_readings_share_a_key() {
        // ---
        let a = Utc.with_ymd_and_hms(2025, 3, 26, 18, 5, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2025, 3, 26, 18, 55, 0).unwrap();

        let first = Reading::from_observation(a, 40.0, 75.0, None, 28.0, 60.0, 10.0);
        let second = Reading::from_observation(b, 44.0, 78.0, None, 27.5, 62.0, 9.0);

        // Upsert key is the truncated timestamp, so the second write for the
        // hour replaces the first.
        assert_eq!(first.timestamp, second.timestamp);
    }

    #[test]
    fn test_trainable_rejects_non_finite_fields() {
        // ---
        let observed = Utc.with_ymd_and_hms(2025, 3, 26, 12, 0, 0).unwrap();
        let good = Reading::from_observation(observed, 42.0, 80.0, None, 28.5, 61.0, 11.2);
        assert!(good.is_trainable());

        let bad = Reading::from_observation(observed, f64::NAN, 80.0, None, 28.5, 61.0, 11.2);
        assert!(!bad.is_trainable());

        // pm10 is stored but not a feature, so a NaN there does not make the
        // row unusable for training.
        let bad_pm10 = Reading::from_observation(observed, 42.0, f64::NAN, None, 28.5, 61.0, 11.2);
        assert!(bad_pm10.is_trainable());
    }
}
