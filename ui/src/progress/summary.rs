use dioxus::prelude::*;
use time::Date;

use crate::core::format::format_metric;
use crate::core::progress::{Granularity, Metric, ProgressSeries};
use crate::t;

/// Headline numbers for the charted series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSummary {
    pub metric: Metric,
    pub granularity: Granularity,
    pub total: f64,
    pub periods: usize,
    pub activity_types: usize,
    /// Period with the largest combined value across types.
    pub best: Option<(Date, f64)>,
    pub latest: Option<(Date, f64)>,
}

impl SeriesSummary {
    pub fn from_series(series: &ProgressSeries) -> Self {
        let totals = series.period_totals();
        let best = totals
            .iter()
            .copied()
            .fold(None, |best: Option<(Date, f64)>, (period, value)| match best {
                Some((_, top)) if top >= value => best,
                _ => Some((period, value)),
            });

        Self {
            metric: series.metric,
            granularity: series.granularity,
            total: totals.iter().map(|(_, value)| value).sum(),
            periods: totals.len(),
            activity_types: series.activity_types().len(),
            best,
            latest: totals.last().copied(),
        }
    }

    pub fn average(&self) -> f64 {
        if self.periods == 0 {
            f64::NAN
        } else {
            self.total / self.periods as f64
        }
    }

    fn describe(&self, entry: Option<(Date, f64)>) -> (String, String) {
        match entry {
            Some((period, value)) => (
                format_metric(self.metric, value),
                self.granularity.format_period(period),
            ),
            None => ("—".to_string(), String::new()),
        }
    }
}

#[component]
pub fn ProgressHighlights(series: ProgressSeries) -> Element {
    let summary = SeriesSummary::from_series(&series);
    let total = format_metric(summary.metric, summary.total);
    let average = if summary.periods > 0 {
        format_metric(summary.metric, summary.average())
    } else {
        "—".to_string()
    };
    let (best_value, best_period) = summary.describe(summary.best);
    let (latest_value, latest_period) = summary.describe(summary.latest);
    let periods = summary.periods;
    let types = summary.activity_types;

    rsx! {
        section { class: "progress-card progress-highlights",
            div { class: "progress-card__header",
                h2 { {t!("highlights-title")} }
                span { class: "progress-card__meta", "{summary.metric}" }
            }

            if series.is_empty() {
                p { class: "progress-card__placeholder", {t!("highlights-empty")} }
            } else {
                div { class: "progress-highlights__grid",
                    div { class: "progress-highlight",
                        span { class: "progress-highlight__label", {t!("highlights-total")} }
                        strong { class: "progress-highlight__value", "{total}" }
                        span { class: "progress-highlight__meta", {t!("highlights-spread", periods = periods, types = types)} }
                    }
                    div { class: "progress-highlight",
                        span { class: "progress-highlight__label", {t!("highlights-average")} }
                        strong { class: "progress-highlight__value", "{average}" }
                        span { class: "progress-highlight__meta", "{summary.granularity}" }
                    }
                    div { class: "progress-highlight",
                        span { class: "progress-highlight__label", {t!("highlights-best")} }
                        strong { class: "progress-highlight__value", "{best_value}" }
                        span { class: "progress-highlight__meta", "{best_period}" }
                    }
                    div { class: "progress-highlight",
                        span { class: "progress-highlight__label", {t!("highlights-latest")} }
                        strong { class: "progress-highlight__value", "{latest_value}" }
                        span { class: "progress-highlight__meta", "{latest_period}" }
                    }
                }
            }
        }
    }
}
