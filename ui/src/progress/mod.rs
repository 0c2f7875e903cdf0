mod chart;
pub use chart::{render_svg, ProgressChart, CHART_HEIGHT, CHART_WIDTH, PALETTE};

mod controls;
pub use controls::{
    slider_index, type_options, with_activity_type, with_granularity, with_slider_stop,
    ProgressControls, RangeEdge,
};

mod export;
pub use export::{build_csv, build_json, ProgressExportPanel};

mod fonts;

mod summary;
pub use summary::{ProgressHighlights, SeriesSummary};

use dioxus::prelude::*;
use time::{Date, OffsetDateTime};
use tracing::warn;

use crate::components::login::LoginPrompt;
use crate::core::page::{render_progress_page, PageOutcome};
use crate::core::progress::{DateRange, ProgressQuery, DEFAULT_HISTORY_START_YEAR};
use crate::core::session::Session;
use crate::core::settings::Settings;
use crate::core::source::default_source;
use crate::t;

/// Slider bounds and the query the page opens with.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSetup {
    pub bounds: DateRange,
    pub query: ProgressQuery,
}

impl ProgressSetup {
    /// History from the configured start year through the end of `today`'s year,
    /// with the configured default activity types selected.
    pub fn new(settings: &Settings, today: Date) -> Self {
        let bounds = DateRange::default_for(today, settings.history_start_year)
            .or_else(|err| {
                warn!("{err}; using {DEFAULT_HISTORY_START_YEAR} as the first year");
                DateRange::default_for(today, DEFAULT_HISTORY_START_YEAR)
            })
            .unwrap_or_else(|_| DateRange::new(today, today));

        let mut query = ProgressQuery::new(bounds);
        query.activity_types = settings.default_activity_types.iter().cloned().collect();
        Self { bounds, query }
    }
}

pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

/// The interactive progress page: gate, controls, highlights, chart and exports.
#[component]
pub fn ProgressPanel() -> Element {
    let fallback_session = use_signal(Session::default);
    let mut session = try_use_context::<Signal<Session>>().unwrap_or(fallback_session);
    let settings = use_signal(Settings::load);
    let setup = use_hook(|| ProgressSetup::new(&settings.peek(), today()));
    let query = use_signal(|| setup.query.clone());
    let mut reload = use_signal(|| 0u32);

    // Every parameter change (or reload) fetches and aggregates from scratch.
    let outcome = use_memo(move || {
        let _ = reload();
        let settings = settings();
        let source = default_source(&settings);
        render_progress_page(source.as_ref(), &settings, &session(), &query())
            .map_err(|err| err.to_string())
    });

    let login_required = settings().login_required;
    let bounds = setup.bounds;

    match outcome() {
        Err(err) => rsx! {
            section { class: "progress-card progress-card--error",
                h2 { {t!("progress-load-failed")} }
                p { class: "progress-card__meta progress-card__meta--error", "{err}" }
                button {
                    r#type: "button",
                    class: "button",
                    onclick: move |_| reload += 1,
                    {t!("progress-reload")}
                }
            }
        },
        Ok(PageOutcome::LoginRequired) => rsx! {
            LoginPrompt { session, settings: settings() }
        },
        Ok(PageOutcome::Chart(view)) => {
            let record_count = view.record_count;
            rsx! {
                div { class: "progress__layout",
                    ProgressControls {
                        query,
                        bounds,
                        available_types: view.available_types.clone(),
                    }

                    div { class: "progress__main",
                        div { class: "progress__toolbar",
                            span { class: "progress-card__meta",
                                {t!("progress-record-count", count = record_count)}
                            }
                            button {
                                r#type: "button",
                                class: "button button--ghost",
                                onclick: move |_| reload += 1,
                                {t!("progress-reload")}
                            }
                            if login_required {
                                button {
                                    r#type: "button",
                                    class: "button button--ghost",
                                    onclick: move |_| session.write().logout(),
                                    {t!("login-logout")}
                                }
                            }
                        }

                        ProgressHighlights { series: view.chart.series.clone() }
                        ProgressChart { spec: view.chart.clone() }
                        ProgressExportPanel { spec: view.chart }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn setup_spans_configured_history() {
        let settings = Settings {
            history_start_year: 2019,
            default_activity_types: vec!["Ride".into(), "Run".into()],
            ..Settings::default()
        };
        let setup = ProgressSetup::new(&settings, date!(2025 - 06 - 15));
        assert_eq!(setup.bounds, DateRange::new(date!(2019 - 01 - 01), date!(2025 - 12 - 31)));
        assert_eq!(setup.query.date_range, setup.bounds);
        assert_eq!(setup.query.activity_types.len(), 2);
    }

    #[test]
    fn out_of_range_start_year_falls_back() {
        let settings = Settings {
            history_start_year: 1_000_000,
            ..Settings::default()
        };
        let setup = ProgressSetup::new(&settings, date!(2025 - 06 - 15));
        assert_eq!(setup.bounds.start, date!(2016 - 01 - 01));
    }

    #[test]
    fn future_start_year_falls_back() {
        let settings = Settings {
            history_start_year: 2030,
            ..Settings::default()
        };
        let setup = ProgressSetup::new(&settings, date!(2025 - 06 - 15));
        assert_eq!(setup.bounds.start, date!(2016 - 01 - 01));
        assert_eq!(setup.bounds.end, date!(2025 - 12 - 31));
        assert!(setup.bounds.contains(date!(2025 - 01 - 01)));
    }
}
