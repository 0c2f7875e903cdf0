//! Activity records as supplied by the data source and in display units.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

const METERS_PER_KILOMETER: f64 = 1000.0;

/// One recorded activity, exactly as stored (distance in meters).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub start_date: OffsetDateTime,
    #[serde(rename = "type")]
    pub activity_type: String,
    /// Meters.
    pub distance: f64,
    #[serde(default)]
    pub kudos_count: f64,
    /// Meters.
    #[serde(default)]
    pub total_elevation_gain: f64,
    /// Seconds.
    #[serde(default)]
    pub moving_time: f64,
}

impl ActivityRecord {
    pub fn new(start_date: OffsetDateTime, activity_type: impl Into<String>, distance_m: f64) -> Self {
        Self {
            id: None,
            name: None,
            start_date,
            activity_type: activity_type.into(),
            distance: distance_m,
            kudos_count: 0.0,
            total_elevation_gain: 0.0,
            moving_time: 0.0,
        }
    }

    /// Convert into display units. Consumes the record so a dataset can only be converted once.
    pub fn into_progress(self) -> ProgressRecord {
        ProgressRecord {
            start_date: self.start_date,
            activity_type: self.activity_type,
            distance_km: self.distance / METERS_PER_KILOMETER,
            kudos_count: self.kudos_count,
            total_elevation_gain: self.total_elevation_gain,
            moving_time: self.moving_time,
        }
    }
}

/// An activity in display units: distance in kilometers, everything else as stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRecord {
    pub start_date: OffsetDateTime,
    pub activity_type: String,
    pub distance_km: f64,
    pub kudos_count: f64,
    pub total_elevation_gain: f64,
    pub moving_time: f64,
}

/// Convert a freshly fetched dataset into display units.
pub fn into_display_units(records: Vec<ActivityRecord>) -> Vec<ProgressRecord> {
    records.into_iter().map(ActivityRecord::into_progress).collect()
}

/// Unique activity types in order of first appearance.
pub fn activity_types(records: &[ProgressRecord]) -> Vec<String> {
    let mut seen = Vec::new();
    for record in records {
        if !seen.iter().any(|known: &String| known == &record.activity_type) {
            seen.push(record.activity_type.clone());
        }
    }
    seen
}
