//! One render pass of the progress page, independent of any UI toolkit.

use tracing::debug;

use super::activity::{activity_types, into_display_units};
use super::error::Result;
use super::progress::{build_series, ChartType, ProgressQuery, ProgressSeries};
use super::session::{Access, Session};
use super::settings::Settings;
use super::source::ActivitySource;

/// Rendering request handed to the chart surface.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub x_field: &'static str,
    pub y_field: &'static str,
    pub color_field: &'static str,
    /// Axis and legend labels keyed by field name.
    pub labels: Vec<(&'static str, String)>,
    pub chart_type: ChartType,
    pub series: ProgressSeries,
}

impl ChartSpec {
    pub fn new(series: ProgressSeries, query: &ProgressQuery) -> Self {
        let [x_field, color_field, y_field] = series.columns();
        let labels = vec![
            (x_field, "Date".to_string()),
            (color_field, "Activity Type".to_string()),
            (y_field, query.metric.label().to_string()),
        ];
        Self {
            title: query.title(),
            x_field,
            y_field,
            color_field,
            labels,
            chart_type: query.chart_type,
            series,
        }
    }

    pub fn label<'a>(&'a self, field: &'a str) -> &'a str {
        self.labels
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, label)| label.as_str())
            .unwrap_or(field)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressView {
    pub chart: ChartSpec,
    /// Options for the activity type picker, in first-appearance order.
    pub available_types: Vec<String>,
    pub record_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    LoginRequired,
    Chart(ProgressView),
}

/// Gate, fetch, convert, aggregate. Fetch errors propagate unchanged.
pub fn render_progress_page(
    source: &dyn ActivitySource,
    settings: &Settings,
    session: &Session,
    query: &ProgressQuery,
) -> Result<PageOutcome> {
    if session.access(settings) == Access::LoginRequired {
        debug!("progress page gated behind login");
        return Ok(PageOutcome::LoginRequired);
    }

    let records = into_display_units(source.read_activity_data()?);
    let available_types = activity_types(&records);
    let series = build_series(&records, query);

    Ok(PageOutcome::Chart(ProgressView {
        chart: ChartSpec::new(series, query),
        available_types,
        record_count: records.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::activity::ActivityRecord;
    use crate::core::error::ProgressError;
    use crate::core::progress::{DateRange, Granularity, Metric};
    use crate::core::source::MemorySource;
    use std::cell::Cell;
    use time::macros::{date, datetime};

    struct CountingSource {
        reads: Cell<u32>,
    }

    impl ActivitySource for CountingSource {
        fn read_activity_data(&self) -> Result<Vec<ActivityRecord>> {
            self.reads.set(self.reads.get() + 1);
            Ok(Vec::new())
        }
    }

    struct FailingSource;

    impl ActivitySource for FailingSource {
        fn read_activity_data(&self) -> Result<Vec<ActivityRecord>> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "locked").into())
        }
    }

    fn query() -> ProgressQuery {
        let mut q = ProgressQuery::new(DateRange::new(date!(2016 - 01 - 01), date!(2026 - 12 - 31)));
        q.granularity = Granularity::Monthly;
        q
    }

    #[test]
    fn login_gate_skips_the_fetch() {
        let source = CountingSource { reads: Cell::new(0) };
        let settings = Settings {
            login_required: true,
            ..Settings::default()
        };
        let outcome = render_progress_page(&source, &settings, &Session::default(), &query()).unwrap();
        assert_eq!(outcome, PageOutcome::LoginRequired);
        assert_eq!(source.reads.get(), 0);

        let session = Session { logged_in: true };
        let outcome = render_progress_page(&source, &settings, &session, &query()).unwrap();
        assert!(matches!(outcome, PageOutcome::Chart(_)));
        assert_eq!(source.reads.get(), 1);
    }

    #[test]
    fn fetch_errors_propagate() {
        let err = render_progress_page(&FailingSource, &Settings::default(), &Session::default(), &query())
            .unwrap_err();
        assert!(matches!(err, ProgressError::Io(_)));
    }

    #[test]
    fn chart_spec_carries_encoding() {
        let source = MemorySource::new(vec![
            ActivityRecord::new(datetime!(2024-03-01 08:00 UTC), "Run", 5000.0),
            ActivityRecord::new(datetime!(2024-03-15 08:00 UTC), "Ride", 30000.0),
        ]);
        let mut q = query();
        q.metric = Metric::TotalElevationGain;

        let PageOutcome::Chart(view) =
            render_progress_page(&source, &Settings::default(), &Session::default(), &q).unwrap()
        else {
            panic!("expected a chart");
        };

        assert_eq!(view.available_types, vec!["Run", "Ride"]);
        assert_eq!(view.record_count, 2);
        assert_eq!(view.chart.title, "Monthly Total Elevation Gain by Type");
        assert_eq!(view.chart.x_field, "start_date");
        assert_eq!(view.chart.y_field, "total_elevation_gain");
        assert_eq!(view.chart.color_field, "type");
        assert_eq!(view.chart.label("start_date"), "Date");
        assert_eq!(view.chart.label("type"), "Activity Type");
        assert_eq!(view.chart.label("total_elevation_gain"), "Total Elevation Gain");
        assert_eq!(view.chart.series.rows.len(), 1);
    }

    #[test]
    fn repeated_renders_are_identical() {
        let source = MemorySource::new(vec![
            ActivityRecord::new(datetime!(2023-01-04 08:00 UTC), "Run", 4000.0),
            ActivityRecord::new(datetime!(2023-02-04 08:00 UTC), "Run", 6000.0),
        ]);
        let first = render_progress_page(&source, &Settings::default(), &Session::default(), &query()).unwrap();
        let second = render_progress_page(&source, &Settings::default(), &Session::default(), &query()).unwrap();
        assert_eq!(first, second);
    }
}
