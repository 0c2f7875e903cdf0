//! Group-by-period aggregation behind the progress page.
//!
//! Records are bucketed by (period start, activity type). Every bucket
//! accumulates the occurrence count and the sums of all numeric fields; the
//! selected [`Metric`] is projected afterwards, so switching metrics never
//! changes which buckets exist. Type and date-range filters apply to the
//! aggregated rows, mirroring how the chart is read: a period belongs to the
//! range when its *start* lies inside it.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::{macros::format_description, util, Date, Duration, Month, OffsetDateTime};
use tracing::debug;

use super::activity::ProgressRecord;
use super::error::{ProgressError, Result};

/// Year the date slider starts at unless configured otherwise.
pub const DEFAULT_HISTORY_START_YEAR: i32 = 2016;

/// Activity type selected when the page first loads.
pub const DEFAULT_ACTIVITY_TYPE: &str = "Run";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Granularity {
    Yearly,
    Monthly,
}

impl Granularity {
    pub const ALL: [Granularity; 2] = [Granularity::Yearly, Granularity::Monthly];

    pub fn label(self) -> &'static str {
        match self {
            Self::Yearly => "Yearly",
            Self::Monthly => "Monthly",
        }
    }

    /// Round a date down to the first day of its year or month.
    pub fn truncate(self, date: Date) -> Date {
        let offset = match self {
            Self::Yearly => date.ordinal() - 1,
            Self::Monthly => u16::from(date.day()) - 1,
        };
        date - Duration::days(i64::from(offset))
    }

    /// First day of the period following the one containing `date`.
    pub fn next_period(self, date: Date) -> Date {
        let start = self.truncate(date);
        let length = match self {
            Self::Yearly => util::days_in_year(start.year()),
            Self::Monthly => u16::from(util::days_in_year_month(start.year(), start.month())),
        };
        start + Duration::days(i64::from(length))
    }

    /// Last day of the period containing `date`.
    pub fn period_end(self, date: Date) -> Date {
        self.next_period(date) - Duration::days(1)
    }

    /// Display format hint used by the date slider.
    pub fn slider_format(self) -> &'static str {
        match self {
            Self::Yearly => "YYYY",
            Self::Monthly => "MM/YYYY",
        }
    }

    /// Render a period start the way the slider and chart axis label it.
    pub fn format_period(self, date: Date) -> String {
        match self {
            Self::Yearly => format!("{}", date.year()),
            Self::Monthly => format!("{:02}/{}", u8::from(date.month()), date.year()),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Granularity {
    type Err = ProgressError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|g| g.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ProgressError::UnknownGranularity(trimmed.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Metric {
    Distance,
    Count,
    KudosCount,
    TotalElevationGain,
    MovingTime,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Distance,
        Metric::Count,
        Metric::KudosCount,
        Metric::TotalElevationGain,
        Metric::MovingTime,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Distance => "Distance",
            Self::Count => "Count",
            Self::KudosCount => "Kudos Count",
            Self::TotalElevationGain => "Total Elevation Gain",
            Self::MovingTime => "Moving Time",
        }
    }

    /// Column name the metric is projected under: the label lowercased with spaces as `_`.
    pub fn field_name(self) -> &'static str {
        match self {
            Self::Distance => "distance",
            Self::Count => "count",
            Self::KudosCount => "kudos_count",
            Self::TotalElevationGain => "total_elevation_gain",
            Self::MovingTime => "moving_time",
        }
    }

    pub fn unit(self) -> Option<&'static str> {
        match self {
            Self::Distance => Some("km"),
            Self::TotalElevationGain => Some("m"),
            Self::MovingTime => Some("s"),
            Self::Count | Self::KudosCount => None,
        }
    }

    pub fn project(self, totals: &GroupTotals) -> f64 {
        match self {
            Self::Count => totals.count as f64,
            Self::Distance => totals.distance_km,
            Self::KudosCount => totals.kudos_count,
            Self::TotalElevationGain => totals.total_elevation_gain,
            Self::MovingTime => totals.moving_time,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Metric {
    type Err = ProgressError;

    /// Accepts either the display label (`Kudos Count`) or the field name (`kudos_count`).
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| {
                m.label().eq_ignore_ascii_case(trimmed) || m.field_name().eq_ignore_ascii_case(trimmed)
            })
            .ok_or_else(|| ProgressError::UnknownMetric(trimmed.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartType {
    Bar,
    Line,
}

impl ChartType {
    pub const ALL: [ChartType; 2] = [ChartType::Bar, ChartType::Line];

    pub fn label(self) -> &'static str {
        match self {
            Self::Bar => "Bar",
            Self::Line => "Line",
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ChartType {
    type Err = ProgressError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ProgressError::UnknownChartType(trimmed.to_string()))
    }
}

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

impl DateRange {
    /// Build a range, swapping the ends if they arrive reversed.
    pub fn new(start: Date, end: Date) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self { start: end, end: start }
        }
    }

    /// January 1st of `start_year` through December 31st of `today`'s year.
    ///
    /// A start year after `today`'s year is rejected rather than swapped.
    pub fn default_for(today: Date, start_year: i32) -> Result<Self> {
        if start_year > today.year() {
            return Err(ProgressError::InvalidDate {
                value: format!("{start_year}-01-01"),
                reason: format!("first year is after {}", today.year()),
            });
        }
        let start = Date::from_calendar_date(start_year, Month::January, 1).map_err(|err| {
            ProgressError::InvalidDate {
                value: format!("{start_year}-01-01"),
                reason: err.to_string(),
            }
        })?;
        let end = Granularity::Yearly.period_end(today);
        Ok(Self::new(start, end))
    }

    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }

    /// Period starts overlapping the range, oldest first.
    pub fn periods(&self, granularity: Granularity) -> Vec<Date> {
        let mut periods = Vec::new();
        let mut cursor = granularity.truncate(self.start);
        while cursor <= self.end {
            periods.push(cursor);
            cursor = granularity.next_period(cursor);
        }
        periods
    }

    /// Restrict this range to `bounds`. A range entirely outside collapses onto the nearest edge.
    pub fn clamp_to(&self, bounds: &DateRange) -> Self {
        let start = self.start.clamp(bounds.start, bounds.end);
        let end = self.end.clamp(bounds.start, bounds.end);
        Self::new(start, end)
    }
}

/// Every parameter the page exposes, threaded explicitly into the transform.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressQuery {
    pub granularity: Granularity,
    pub date_range: DateRange,
    pub activity_types: BTreeSet<String>,
    pub metric: Metric,
    pub chart_type: ChartType,
}

impl ProgressQuery {
    pub fn new(date_range: DateRange) -> Self {
        Self {
            granularity: Granularity::Yearly,
            date_range,
            activity_types: BTreeSet::from([DEFAULT_ACTIVITY_TYPE.to_string()]),
            metric: Metric::Distance,
            chart_type: ChartType::Bar,
        }
    }

    /// Parse loosely-typed parameters (query strings, JSON) into a query.
    ///
    /// Missing dates fall back to `bounds`; supplied dates are clamped into them.
    /// Missing activity types select the default type, while an explicit empty
    /// list selects nothing.
    pub fn from_params(params: &QueryParams, bounds: DateRange) -> Result<Self> {
        let granularity = params.granularity.parse()?;
        let metric = params.metric.parse()?;
        let chart_type = params.chart_type.parse()?;

        let start = params
            .start
            .as_deref()
            .map(parse_date)
            .transpose()?
            .unwrap_or(bounds.start);
        let end = params
            .end
            .as_deref()
            .map(parse_date)
            .transpose()?
            .unwrap_or(bounds.end);

        Ok(Self {
            granularity,
            date_range: DateRange::new(start, end).clamp_to(&bounds),
            activity_types: match &params.activity_types {
                Some(types) => types.iter().cloned().collect(),
                None => BTreeSet::from([DEFAULT_ACTIVITY_TYPE.to_string()]),
            },
            metric,
            chart_type,
        })
    }

    /// Title of the rendered chart, e.g. `Monthly Distance by Type`.
    pub fn title(&self) -> String {
        format!("{} {} by Type", self.granularity, self.metric)
    }
}

/// Untyped page parameters as a host UI or request would supply them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryParams {
    pub granularity: String,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub activity_types: Option<Vec<String>>,
    pub metric: String,
    pub chart_type: String,
}

fn parse_date(raw: &str) -> Result<Date> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]")).map_err(|err| {
        ProgressError::InvalidDate {
            value: raw.to_string(),
            reason: err.to_string(),
        }
    })
}

/// Per-bucket accumulator: occurrence count plus sums of every numeric field.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GroupTotals {
    pub count: u64,
    pub distance_km: f64,
    pub kudos_count: f64,
    pub total_elevation_gain: f64,
    pub moving_time: f64,
}

impl GroupTotals {
    pub fn add(&mut self, record: &ProgressRecord) {
        self.count += 1;
        self.distance_km += record.distance_km;
        self.kudos_count += record.kudos_count;
        self.total_elevation_gain += record.total_elevation_gain;
        self.moving_time += record.moving_time;
    }
}

/// Bucket records by (period start, activity type). Keys iterate in period, then type order.
pub fn aggregate(
    records: &[ProgressRecord],
    granularity: Granularity,
) -> BTreeMap<(Date, String), GroupTotals> {
    let mut groups: BTreeMap<(Date, String), GroupTotals> = BTreeMap::new();
    for record in records {
        let period = granularity.truncate(record.start_date.date());
        groups
            .entry((period, record.activity_type.clone()))
            .or_default()
            .add(record);
    }
    groups
}

/// One chart row: period start as a timestamp, activity type and metric value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRow {
    #[serde(with = "time::serde::rfc3339")]
    pub start_date: OffsetDateTime,
    #[serde(rename = "type")]
    pub activity_type: String,
    pub value: f64,
}

impl SeriesRow {
    pub fn new(period: Date, activity_type: impl Into<String>, value: f64) -> Self {
        Self {
            start_date: period.midnight().assume_utc(),
            activity_type: activity_type.into(),
            value,
        }
    }

    pub fn period(&self) -> Date {
        self.start_date.date()
    }
}

/// Filtered, aggregated time series for one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSeries {
    pub granularity: Granularity,
    pub metric: Metric,
    pub rows: Vec<SeriesRow>,
}

impl ProgressSeries {
    /// Column names in row order: `start_date`, `type`, then the metric's field name.
    pub fn columns(&self) -> [&'static str; 3] {
        ["start_date", "type", self.metric.field_name()]
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct period starts, oldest first.
    pub fn periods(&self) -> Vec<Date> {
        self.rows
            .iter()
            .map(SeriesRow::period)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct activity types in first-appearance order.
    pub fn activity_types(&self) -> Vec<String> {
        let mut types: Vec<String> = Vec::new();
        for row in &self.rows {
            if !types.contains(&row.activity_type) {
                types.push(row.activity_type.clone());
            }
        }
        types
    }

    /// Sum of all row values in each period, oldest first.
    pub fn period_totals(&self) -> Vec<(Date, f64)> {
        let mut totals: BTreeMap<Date, f64> = BTreeMap::new();
        for row in &self.rows {
            *totals.entry(row.period()).or_default() += row.value;
        }
        totals.into_iter().collect()
    }
}

/// Aggregate, filter by type and date range, and project the selected metric.
pub fn build_series(records: &[ProgressRecord], query: &ProgressQuery) -> ProgressSeries {
    let groups = aggregate(records, query.granularity);
    let group_count = groups.len();

    let rows: Vec<SeriesRow> = groups
        .into_iter()
        .filter(|((period, activity_type), _)| {
            query.activity_types.contains(activity_type) && query.date_range.contains(*period)
        })
        .map(|((period, activity_type), totals)| {
            SeriesRow::new(period, activity_type, query.metric.project(&totals))
        })
        .collect();

    debug!(
        records = records.len(),
        groups = group_count,
        rows = rows.len(),
        granularity = %query.granularity,
        metric = %query.metric,
        "built progress series"
    );

    ProgressSeries {
        granularity: query.granularity,
        metric: query.metric,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::activity::{into_display_units, ActivityRecord};
    use time::macros::{date, datetime};

    fn run(at: OffsetDateTime, meters: f64) -> ActivityRecord {
        ActivityRecord::new(at, "Run", meters)
    }

    fn query(granularity: Granularity, metric: Metric, types: &[&str]) -> ProgressQuery {
        ProgressQuery {
            granularity,
            date_range: DateRange::new(date!(2016 - 01 - 01), date!(2026 - 12 - 31)),
            activity_types: types.iter().map(|t| t.to_string()).collect(),
            metric,
            chart_type: ChartType::Bar,
        }
    }

    #[test]
    fn truncation_rounds_to_period_start() {
        assert_eq!(Granularity::Yearly.truncate(date!(2024 - 07 - 19)), date!(2024 - 01 - 01));
        assert_eq!(Granularity::Monthly.truncate(date!(2024 - 07 - 19)), date!(2024 - 07 - 01));
        assert_eq!(Granularity::Monthly.truncate(date!(2024 - 07 - 01)), date!(2024 - 07 - 01));
    }

    #[test]
    fn period_end_handles_leap_years() {
        assert_eq!(Granularity::Monthly.period_end(date!(2024 - 02 - 10)), date!(2024 - 02 - 29));
        assert_eq!(Granularity::Monthly.period_end(date!(2023 - 02 - 10)), date!(2023 - 02 - 28));
        assert_eq!(Granularity::Yearly.period_end(date!(2024 - 06 - 01)), date!(2024 - 12 - 31));
        assert_eq!(Granularity::Monthly.next_period(date!(2024 - 12 - 05)), date!(2025 - 01 - 01));
    }

    #[test]
    fn slider_formats_follow_granularity() {
        assert_eq!(Granularity::Yearly.slider_format(), "YYYY");
        assert_eq!(Granularity::Monthly.slider_format(), "MM/YYYY");
        assert_eq!(Granularity::Monthly.format_period(date!(2024 - 03 - 01)), "03/2024");
        assert_eq!(Granularity::Yearly.format_period(date!(2024 - 03 - 01)), "2024");
    }

    #[test]
    fn field_names_derive_from_labels() {
        for metric in Metric::ALL {
            let derived = metric.label().to_lowercase().replace(' ', "_");
            assert_eq!(metric.field_name(), derived);
        }
    }

    #[test]
    fn unknown_values_are_configuration_errors() {
        let err = "Heart Rate".parse::<Metric>().unwrap_err();
        assert!(matches!(err, ProgressError::UnknownMetric(ref m) if m == "Heart Rate"));
        assert!(err.is_configuration());

        let err = "Weekly".parse::<Granularity>().unwrap_err();
        assert!(matches!(err, ProgressError::UnknownGranularity(_)));

        let err = "Pie".parse::<ChartType>().unwrap_err();
        assert!(matches!(err, ProgressError::UnknownChartType(_)));
    }

    #[test]
    fn parsing_accepts_labels_and_field_names() {
        assert_eq!("Total Elevation Gain".parse::<Metric>().unwrap(), Metric::TotalElevationGain);
        assert_eq!("moving_time".parse::<Metric>().unwrap(), Metric::MovingTime);
        assert_eq!("monthly".parse::<Granularity>().unwrap(), Granularity::Monthly);
        assert_eq!(" line ".parse::<ChartType>().unwrap(), ChartType::Line);
    }

    #[test]
    fn monthly_distance_scenario() {
        let records = into_display_units(vec![
            run(datetime!(2024-03-01 08:00 UTC), 5000.0),
            run(datetime!(2024-03-15 18:30 UTC), 3000.0),
        ]);
        let series = build_series(&records, &query(Granularity::Monthly, Metric::Distance, &["Run"]));
        assert_eq!(series.rows, vec![SeriesRow::new(date!(2024 - 03 - 01), "Run", 8.0)]);
        assert_eq!(series.columns(), ["start_date", "type", "distance"]);
    }

    #[test]
    fn monthly_count_scenario() {
        let records = into_display_units(vec![
            run(datetime!(2024-03-01 08:00 UTC), 5000.0),
            run(datetime!(2024-03-15 18:30 UTC), 3000.0),
        ]);
        let series = build_series(&records, &query(Granularity::Monthly, Metric::Count, &["Run"]));
        assert_eq!(series.rows, vec![SeriesRow::new(date!(2024 - 03 - 01), "Run", 2.0)]);
    }

    #[test]
    fn unselected_types_yield_empty_series() {
        let records = into_display_units(vec![run(datetime!(2024-03-01 08:00 UTC), 5000.0)]);
        let series = build_series(&records, &query(Granularity::Monthly, Metric::Distance, &["Ride"]));
        assert!(series.is_empty());

        let series = build_series(&records, &query(Granularity::Monthly, Metric::Distance, &[]));
        assert!(series.is_empty());
    }

    #[test]
    fn empty_input_yields_empty_series() {
        let series = build_series(&[], &query(Granularity::Yearly, Metric::Count, &["Run"]));
        assert!(series.is_empty());
        assert!(series.periods().is_empty());
    }

    #[test]
    fn date_range_filters_on_period_start_inclusively() {
        let records = into_display_units(vec![
            run(datetime!(2019-06-01 08:00 UTC), 1000.0),
            run(datetime!(2020-06-01 08:00 UTC), 2000.0),
            run(datetime!(2021-06-01 08:00 UTC), 4000.0),
        ]);
        let mut q = query(Granularity::Yearly, Metric::Distance, &["Run"]);
        q.date_range = DateRange::new(date!(2020 - 01 - 01), date!(2021 - 01 - 01));
        let series = build_series(&records, &q);
        let periods: Vec<Date> = series.rows.iter().map(SeriesRow::period).collect();
        assert_eq!(periods, vec![date!(2020 - 01 - 01), date!(2021 - 01 - 01)]);

        // A mid-year start excludes that year's bucket, whose start precedes it.
        q.date_range = DateRange::new(date!(2020 - 06 - 15), date!(2021 - 12 - 31));
        let series = build_series(&records, &q);
        assert_eq!(series.rows.len(), 1);
        assert_eq!(series.rows[0].period(), date!(2021 - 01 - 01));
    }

    #[test]
    fn numeric_metrics_sum_within_groups() {
        let mut first = run(datetime!(2023-05-02 07:00 UTC), 10_000.0);
        first.kudos_count = 4.0;
        first.total_elevation_gain = 120.0;
        first.moving_time = 3000.0;
        let mut second = run(datetime!(2023-05-20 07:00 UTC), 5_000.0);
        second.kudos_count = 1.0;
        second.total_elevation_gain = 30.5;
        second.moving_time = 1500.0;
        let mut ride = ActivityRecord::new(datetime!(2023-05-21 07:00 UTC), "Ride", 40_000.0);
        ride.kudos_count = 9.0;

        let records = into_display_units(vec![first, second, ride]);
        let groups = aggregate(&records, Granularity::Monthly);
        let runs = groups[&(date!(2023 - 05 - 01), "Run".to_string())];
        assert_eq!(runs.count, 2);
        assert_eq!(runs.kudos_count, 5.0);
        assert_eq!(runs.total_elevation_gain, 150.5);
        assert_eq!(runs.moving_time, 4500.0);
        assert!((runs.distance_km - 15.0).abs() < 1e-9);

        let series = build_series(&records, &query(Granularity::Monthly, Metric::KudosCount, &["Run", "Ride"]));
        let values: Vec<(String, f64)> = series
            .rows
            .iter()
            .map(|r| (r.activity_type.clone(), r.value))
            .collect();
        assert_eq!(values, vec![("Ride".to_string(), 9.0), ("Run".to_string(), 5.0)]);
    }

    #[test]
    fn default_range_spans_start_year_to_end_of_current_year() {
        let range = DateRange::default_for(date!(2026 - 10 - 16), DEFAULT_HISTORY_START_YEAR).unwrap();
        assert_eq!(range.start, date!(2016 - 01 - 01));
        assert_eq!(range.end, date!(2026 - 12 - 31));
        assert!(DateRange::default_for(date!(2026 - 10 - 16), 1_000_000).is_err());
    }

    #[test]
    fn default_range_rejects_a_future_start_year() {
        let today = date!(2025 - 06 - 15);
        assert!(matches!(
            DateRange::default_for(today, 2030),
            Err(ProgressError::InvalidDate { .. })
        ));
        let range = DateRange::default_for(today, 2025).unwrap();
        assert_eq!(range.start, date!(2025 - 01 - 01));
        assert_eq!(range.end, date!(2025 - 12 - 31));
    }

    #[test]
    fn missing_activity_types_select_the_default() {
        let bounds = DateRange::new(date!(2016 - 01 - 01), date!(2026 - 12 - 31));
        let params: QueryParams = serde_json::from_str(
            r#"{"granularity":"Monthly","metric":"Distance","chart_type":"Bar"}"#,
        )
        .unwrap();
        assert_eq!(params.activity_types, None);
        let q = ProgressQuery::from_params(&params, bounds).unwrap();
        assert_eq!(q.activity_types, BTreeSet::from(["Run".to_string()]));

        let records = into_display_units(vec![
            run(datetime!(2024-03-01 08:00 UTC), 5000.0),
            run(datetime!(2024-03-15 18:30 UTC), 3000.0),
        ]);
        let series = build_series(&records, &q);
        assert_eq!(series.rows, vec![SeriesRow::new(date!(2024 - 03 - 01), "Run", 8.0)]);

        let params: QueryParams = serde_json::from_str(
            r#"{"granularity":"Monthly","metric":"Distance","chart_type":"Bar","activity_types":[]}"#,
        )
        .unwrap();
        let q = ProgressQuery::from_params(&params, bounds).unwrap();
        assert!(q.activity_types.is_empty());
        assert!(build_series(&records, &q).is_empty());
    }

    #[test]
    fn covering_range_matches_unfiltered_aggregation() {
        let records = into_display_units(vec![
            run(datetime!(2019-02-03 08:00 UTC), 4000.0),
            run(datetime!(2019-02-20 08:00 UTC), 6000.0),
            run(datetime!(2022-11-30 23:59 UTC), 12_500.0),
            ActivityRecord::new(datetime!(2022-11-01 00:00 UTC), "Ride", 30_000.0),
            ActivityRecord::new(datetime!(2024-07-04 12:00 UTC), "Hike", 9_000.0),
        ]);
        let mut q = query(Granularity::Monthly, Metric::Distance, &["Run", "Ride", "Hike"]);
        q.date_range = DateRange::new(date!(2000 - 01 - 01), date!(2030 - 12 - 31));

        let expected: Vec<SeriesRow> = aggregate(&records, Granularity::Monthly)
            .iter()
            .map(|((period, activity_type), totals)| {
                SeriesRow::new(*period, activity_type.clone(), Metric::Distance.project(totals))
            })
            .collect();
        assert_eq!(expected.len(), 3);
        assert_eq!(build_series(&records, &q).rows, expected);

        q.date_range = DateRange::new(date!(2025 - 01 - 01), date!(2030 - 12 - 31));
        assert!(build_series(&records, &q).is_empty());
    }

    #[test]
    fn range_periods_enumerate_buckets() {
        let range = DateRange::new(date!(2023 - 11 - 15), date!(2024 - 02 - 01));
        assert_eq!(
            range.periods(Granularity::Monthly),
            vec![
                date!(2023 - 11 - 01),
                date!(2023 - 12 - 01),
                date!(2024 - 01 - 01),
                date!(2024 - 02 - 01),
            ]
        );
        assert_eq!(range.periods(Granularity::Yearly).len(), 2);
    }

    #[test]
    fn params_parse_into_query() {
        let bounds = DateRange::new(date!(2016 - 01 - 01), date!(2026 - 12 - 31));
        let params = QueryParams {
            granularity: "Monthly".into(),
            start: Some("2010-01-01".into()),
            end: Some("2024-06-30".into()),
            activity_types: Some(vec!["Run".into(), "Ride".into()]),
            metric: "Kudos Count".into(),
            chart_type: "Line".into(),
        };
        let q = ProgressQuery::from_params(&params, bounds).unwrap();
        assert_eq!(q.granularity, Granularity::Monthly);
        assert_eq!(q.date_range.start, date!(2016 - 01 - 01));
        assert_eq!(q.date_range.end, date!(2024 - 06 - 30));
        assert_eq!(q.metric, Metric::KudosCount);
        assert_eq!(q.chart_type, ChartType::Line);
        assert_eq!(q.title(), "Monthly Kudos Count by Type");

        let bad = QueryParams {
            granularity: "Daily".into(),
            ..params.clone()
        };
        assert!(matches!(
            ProgressQuery::from_params(&bad, bounds),
            Err(ProgressError::UnknownGranularity(_))
        ));

        let bad_date = QueryParams {
            start: Some("03/2024".into()),
            ..params
        };
        assert!(matches!(
            ProgressQuery::from_params(&bad_date, bounds),
            Err(ProgressError::InvalidDate { .. })
        ));
    }
}
