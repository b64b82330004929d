//! Recursive multi-step forecasting.
//!
//! Each step feeds its prediction back in as the next step's lag feature, so
//! the loop is a strict left-to-right recurrence. Do not parallelize it:
//! step `i` cannot be computed before step `i - 1` has produced its output.

use crate::aqi;
use crate::error::{PipelineError, Result};
use crate::ml::Regressor;
use crate::models::{ForecastPoint, WeatherPoint};

// ---

/// Lag value used when no observed reading is available to seed the chain.
///
/// 50 µg/m³ sits mid-scale ("Moderate") for the monitored site; a named
/// constant so the fallback is a documented choice rather than a silent
/// guess.
pub const DEFAULT_SEED_LAG: f64 = 50.0;

/// Result of one forecast request.
///
/// When the model rejects a feature vector mid-sequence, `points` holds the
/// completed prefix and `failure` the error; callers decide whether partial
/// output is still worth presenting (it is, for the dashboard).
#[derive(Debug)]
pub struct ForecastRun {
    pub points: Vec<ForecastPoint>,
    pub failure: Option<PipelineError>,
}

impl ForecastRun {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

// ---

/// Predict the target pollutant for each future weather point in order.
///
/// `weather` must be strictly increasing by timestamp; violations fail with
/// `UnorderedInput` before any prediction runs. `seed_lag` is the most
/// recent observed pm2_5 (or [`DEFAULT_SEED_LAG`]).
pub fn forecast(model: &Regressor, weather: &[WeatherPoint], seed_lag: f64) -> Result<ForecastRun> {
    // ---
    for (index, pair) in weather.windows(2).enumerate() {
        if pair[1].timestamp <= pair[0].timestamp {
            return Err(PipelineError::UnorderedInput { index: index + 1 });
        }
    }

    let mut points = Vec::with_capacity(weather.len());
    let mut lag = seed_lag;

    for point in weather {
        // Feature order must match training: see ml::FEATURE_NAMES.
        let features = [
            point.temp,
            point.humidity,
            point.wind_speed,
            point.hour as f64,
            lag,
        ];

        let predicted = match model.predict_one(&features) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(
                    "Forecast stopped at {} after {} points: {}",
                    point.timestamp,
                    points.len(),
                    e
                );
                return Ok(ForecastRun {
                    points,
                    failure: Some(e),
                });
            }
        };

        let predicted_aqi = aqi::from_pm2_5(predicted);
        points.push(ForecastPoint {
            timestamp: point.timestamp,
            temp: point.temp,
            humidity: point.humidity,
            wind_speed: point.wind_speed,
            hour: point.hour,
            predicted_pm2_5: predicted,
            predicted_aqi,
            category: aqi::category(predicted_aqi),
        });

        lag = predicted;
    }

    Ok(ForecastRun {
        points,
        failure: None,
    })
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::ml::LinearRegressor;
    use chrono::{TimeZone, Utc};

    /// Model that always predicts `lag + 1`, whatever the weather.
    fn lag_plus_one() -> Regressor {
        // ---
        Regressor::Linear(LinearRegressor::from_weights(
            1.0,
            vec![0.0, 0.0, 0.0, 0.0, 1.0],
        ))
    }

    fn weather_points(n: usize) -> Vec<WeatherPoint> {
        // ---
        let base = Utc.with_ymd_and_hms(2025, 4, 2, 8, 0, 0).unwrap();
        (0..n)
            .map(|i| {
                WeatherPoint::new(
                    base + chrono::Duration::hours(i as i64),
                    27.0 + i as f64,
                    60.0,
                    9.5,
                )
            })
            .collect()
    }

    #[test]
    fn test_each_step_feeds_the_previous_prediction() {
        // ---
        let run = forecast(&lag_plus_one(), &weather_points(3), 10.0).unwrap();

        let predicted: Vec<f64> = run.points.iter().map(|p| p.predicted_pm2_5).collect();
        assert_eq!(predicted, vec![11.0, 12.0, 13.0]);
        assert!(run.is_complete());
    }

    #[test]
    fn test_unordered_input_is_rejected_up_front() {
        // ---
        let mut weather = weather_points(4);
        weather.swap(1, 2);

        let err = forecast(&lag_plus_one(), &weather, 10.0).unwrap_err();
        assert!(matches!(err, PipelineError::UnorderedInput { .. }));
    }

    #[test]
    fn test_duplicate_timestamp_is_unordered() {
        // ---
        let mut weather = weather_points(3);
        weather[2].timestamp = weather[1].timestamp;

        let err = forecast(&lag_plus_one(), &weather, 10.0).unwrap_err();
        assert!(matches!(err, PipelineError::UnorderedInput { index: 2 }));
    }

    #[test]
    fn test_mid_sequence_failure_returns_the_prefix() {
        // ---
        let mut weather = weather_points(5);
        weather[2].temp = f64::NAN; // model rejects this vector

        let run = forecast(&lag_plus_one(), &weather, 10.0).unwrap();

        assert_eq!(run.points.len(), 2);
        assert!(matches!(
            run.failure,
            Some(PipelineError::Prediction { .. })
        ));
    }

    #[test]
    fn test_empty_weather_is_an_empty_forecast() {
        // ---
        let run = forecast(&lag_plus_one(), &[], 10.0).unwrap();
        assert!(run.points.is_empty());
        assert!(run.is_complete());
    }

    #[test]
    fn test_points_carry_aqi_and_category() {
        // ---
        // Seeded at 10, predictions walk 11, 12, 13 — all "Good" except
        // nothing; check against the aqi module directly.
        let run = forecast(&lag_plus_one(), &weather_points(3), 10.0).unwrap();

        for point in &run.points {
            assert_eq!(point.predicted_aqi, aqi::from_pm2_5(point.predicted_pm2_5));
            assert_eq!(point.category, aqi::category(point.predicted_aqi));
        }
    }

    #[test]
    fn test_default_seed_lag_is_documented_fallback() {
        // ---
        assert_eq!(DEFAULT_SEED_LAG, 50.0);

        let run = forecast(&lag_plus_one(), &weather_points(1), DEFAULT_SEED_LAG).unwrap();
        assert_eq!(run.points[0].predicted_pm2_5, 51.0);
    }
}
