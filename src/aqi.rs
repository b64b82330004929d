//! PM2.5 to Air Quality Index conversion.
//!
//! Pure piecewise-linear mapping over the US EPA PM2.5 breakpoints. The
//! scale is clamped at 300 above 150.4 µg/m³ instead of continuing into the
//! full EPA hazardous segments; everything the dashboard needs tops out
//! there. Concentrations are truncated to 0.1 µg/m³ before segment lookup,
//! matching the EPA rounding convention, so segment edges land on exact
//! index values (12.0 → 50, 12.1 → 51, ...).

// ---

/// `(lo_in, hi_in, lo_out, hi_out)` per EPA PM2.5 breakpoint segment.
const SEGMENTS: [(f64, f64, f64, f64); 4] = [
    (0.0, 12.0, 0.0, 50.0),
    (12.1, 35.4, 51.0, 100.0),
    (35.5, 55.4, 101.0, 150.0),
    (55.5, 150.4, 151.0, 200.0),
];

/// Index value reported for any concentration above the last segment.
const CLAMPED_CEILING: u16 = 300;

// ---

/// Map a PM2.5 concentration in µg/m³ to an AQI value.
///
/// Negative inputs are treated as zero; regression models occasionally
/// predict slightly below zero near clean air.
pub fn from_pm2_5(concentration: f64) -> u16 {
    // ---
    let truncated = (concentration.max(0.0) * 10.0).floor() / 10.0;

    for (lo_in, hi_in, lo_out, hi_out) in SEGMENTS {
        if truncated <= hi_in {
            let span = (hi_out - lo_out) / (hi_in - lo_in);
            let aqi = lo_out + span * (truncated - lo_in);
            return aqi.round().max(0.0) as u16;
        }
    }

    CLAMPED_CEILING
}

/// Human-readable category for an AQI value.
pub fn category(aqi: u16) -> &'static str {
    // ---
    match aqi {
        0..=50 => "Good",
        51..=100 => "Moderate",
        101..=150 => "Unhealthy for Sensitive Groups",
        151..=200 => "Unhealthy",
        _ => "Hazardous",
    }
}
