//! End-to-end pipeline test over synthetic readings: tournament training,
//! artifact round-trip through its registry serialization, and the
//! recursive forecast driven by the winning model. Runs hermetically — no
//! network, no database.

use anyhow::Result;
use chrono::{DateTime, Duration, TimeZone, Utc};

use aqiflow::train::{train, ModelArtifact};
use aqiflow::{forecast, Reading, WeatherPoint};

// ---

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap()
}

/// Five days of hourly readings with a daily temperature/pollution cycle
/// and a strong autoregressive component, like the real site shows.
fn synthetic_readings() -> Vec<Reading> {
    // ---
    let mut readings = Vec::new();
    let mut pm = 45.0;

    for i in 0..120u32 {
        let ts = base_time() + Duration::hours(i as i64);
        let hour = (i % 24) as f64;

        // Deterministic pseudo-noise so runs are reproducible.
        let wobble = ((i * 37 % 11) as f64 - 5.0) * 0.6;

        let temp = 24.0 + 6.0 * (hour * std::f64::consts::PI / 12.0).sin();
        let humidity = 55.0 + 15.0 * (hour * std::f64::consts::PI / 12.0).cos();
        let wind = 6.0 + (i % 9) as f64;

        pm = 8.0 + 0.65 * pm + 0.9 * temp - 0.4 * wind + 0.05 * humidity + wobble;
        readings.push(Reading::from_observation(
            ts,
            pm,
            pm * 1.6,
            Some(14.0),
            temp,
            humidity,
            wind,
        ));
    }

    readings
}

fn trained_artifact() -> Result<ModelArtifact> {
    // ---
    let trained_at = base_time() + Duration::hours(120);
    Ok(train(&synthetic_readings(), trained_at)?)
}

// ---

#[test]
fn tournament_produces_a_full_leaderboard() -> Result<()> {
    // ---
    let artifact = trained_artifact()?;

    assert_eq!(
        artifact.leaderboard.len(),
        3,
        "every candidate should be scored"
    );
    assert!(artifact.metrics.rmse >= 0.0);

    let min_rmse = artifact
        .leaderboard
        .iter()
        .map(|e| e.rmse)
        .fold(f64::INFINITY, f64::min);
    assert_eq!(
        artifact.metrics.rmse, min_rmse,
        "champion must carry the minimum held-out RMSE"
    );

    Ok(())
}

#[test]
fn tournament_is_reproducible() -> Result<()> {
    // ---
    let a = trained_artifact()?;
    let b = trained_artifact()?;

    assert_eq!(a.model_name, b.model_name);
    assert_eq!(a.metrics.rmse, b.metrics.rmse);
    assert_eq!(a.metrics.mae, b.metrics.mae);

    Ok(())
}

#[test]
fn artifact_survives_registry_serialization() -> Result<()> {
    // ---
    let artifact = trained_artifact()?;

    // The registry stores the artifact as JSON; a restored model must
    // predict identically to the fresh one.
    let json = serde_json::to_string(&artifact)?;
    let restored: ModelArtifact = serde_json::from_str(&json)?;

    assert_eq!(restored.model_name, artifact.model_name);

    let probe = [26.0, 58.0, 7.0, 14.0, 48.0];
    assert_eq!(
        artifact.model.predict_one(&probe)?,
        restored.model.predict_one(&probe)?,
    );

    Ok(())
}

#[test]
fn forecast_chains_on_the_trained_champion() -> Result<()> {
    // ---
    let artifact = trained_artifact()?;
    let last_observed = synthetic_readings().last().map(|r| r.pm2_5).unwrap();

    let start = base_time() + Duration::hours(121);
    let weather: Vec<WeatherPoint> = (0..6)
        .map(|i| {
            WeatherPoint::new(
                start + Duration::hours(i),
                25.0 + i as f64,
                60.0,
                8.0,
            )
        })
        .collect();

    let run = forecast::forecast(&artifact.model, &weather, last_observed)?;

    assert!(run.is_complete());
    assert_eq!(run.points.len(), 6);

    for point in &run.points {
        assert!(
            point.predicted_pm2_5.is_finite(),
            "prediction at {} is not finite",
            point.timestamp
        );
        assert_eq!(point.predicted_aqi, aqiflow::aqi::from_pm2_5(point.predicted_pm2_5));
    }

    // Re-running the same request yields the same chain.
    let again = forecast::forecast(&artifact.model, &weather, last_observed)?;
    let first: Vec<f64> = run.points.iter().map(|p| p.predicted_pm2_5).collect();
    let second: Vec<f64> = again.points.iter().map(|p| p.predicted_pm2_5).collect();
    assert_eq!(first, second);

    Ok(())
}

#[test]
fn forecast_degrades_to_a_prefix_on_bad_weather_input() -> Result<()> {
    // ---
    let artifact = trained_artifact()?;

    let start = base_time() + Duration::hours(121);
    let mut weather: Vec<WeatherPoint> = (0..5)
        .map(|i| WeatherPoint::new(start + Duration::hours(i), 25.0, 60.0, 8.0))
        .collect();
    weather[3].humidity = f64::NAN;

    let run = forecast::forecast(&artifact.model, &weather, 40.0)?;

    assert_eq!(run.points.len(), 3, "usable prefix should be returned");
    assert!(!run.is_complete());

    Ok(())
}
