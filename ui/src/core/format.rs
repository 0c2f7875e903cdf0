//! Formatting helpers for presenting metrics.

use super::progress::Metric;

pub fn format_km(value: f64) -> String {
    format!("{value:.1} km")
}

pub fn format_meters(value: f64) -> String {
    format!("{value:.0} m")
}

/// Seconds as `Hh MMm`, or `MMm` under an hour.
pub fn format_duration(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "—".into();
    }
    let total_minutes = (seconds / 60.0).round() as i64;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    if hours == 0 {
        format!("{minutes}m")
    } else {
        format!("{hours}h {minutes:02}m")
    }
}

pub fn format_number(value: f64, decimals: usize) -> String {
    if value.is_finite() {
        format!("{value:.decimals$}")
    } else {
        "—".into()
    }
}

/// Human value for a metric, including its unit.
pub fn format_metric(metric: Metric, value: f64) -> String {
    match metric {
        Metric::Distance => format_km(value),
        Metric::TotalElevationGain => format_meters(value),
        Metric::MovingTime => format_duration(value),
        Metric::Count | Metric::KudosCount => format_number(value, 0),
    }
}

/// Compact axis tick label; moving time ticks read in hours.
pub fn format_tick(metric: Metric, value: f64) -> String {
    let value = match metric {
        Metric::MovingTime => value / 3600.0,
        _ => value,
    };
    let abs = value.abs();
    if abs >= 10_000.0 {
        format!("{:.0}k", value / 1000.0)
    } else if abs >= 100.0 || value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}
