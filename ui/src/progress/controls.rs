//! Sidebar controls. Each control rewrites the shared `ProgressQuery` signal;
//! the page recomputes the series from it.

use dioxus::prelude::*;
use time::Date;

use crate::core::progress::{ChartType, DateRange, Granularity, Metric, ProgressQuery};
use crate::t;

/// Index of the slider stop holding `date`, clamped to the available stops.
pub fn slider_index(periods: &[Date], granularity: Granularity, date: Date) -> usize {
    let period = granularity.truncate(date);
    match periods.binary_search(&period) {
        Ok(index) => index,
        Err(index) => index.min(periods.len().saturating_sub(1)),
    }
}

/// Switch granularity, snapping the range outwards to whole periods.
pub fn with_granularity(query: &ProgressQuery, granularity: Granularity) -> ProgressQuery {
    let mut next = query.clone();
    next.granularity = granularity;
    next.date_range = DateRange::new(
        granularity.truncate(query.date_range.start),
        granularity.period_end(query.date_range.end),
    );
    next
}

/// Move one end of the range to the slider stop at `index`.
pub fn with_slider_stop(
    query: &ProgressQuery,
    bounds: &DateRange,
    edge: RangeEdge,
    index: usize,
) -> ProgressQuery {
    let periods = bounds.periods(query.granularity);
    let Some(&stop) = periods.get(index).or(periods.last()) else {
        return query.clone();
    };
    let mut next = query.clone();
    let DateRange { start, end } = query.date_range;
    next.date_range = match edge {
        RangeEdge::Start if stop > end => {
            DateRange::new(query.granularity.truncate(end), query.granularity.period_end(stop))
        }
        RangeEdge::Start => DateRange::new(stop, end),
        RangeEdge::End if stop < start => {
            DateRange::new(stop, query.granularity.period_end(start))
        }
        RangeEdge::End => DateRange::new(start, query.granularity.period_end(stop)),
    };
    next
}

pub fn with_activity_type(query: &ProgressQuery, activity_type: &str, selected: bool) -> ProgressQuery {
    let mut next = query.clone();
    if selected {
        next.activity_types.insert(activity_type.to_string());
    } else {
        next.activity_types.remove(activity_type);
    }
    next
}

/// Picker options: types seen in the data, then selected types absent from it.
pub fn type_options(available: &[String], query: &ProgressQuery) -> Vec<String> {
    let mut options = available.to_vec();
    for selected in &query.activity_types {
        if !options.contains(selected) {
            options.push(selected.clone());
        }
    }
    options
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeEdge {
    Start,
    End,
}

#[component]
pub fn ProgressControls(
    mut query: Signal<ProgressQuery>,
    bounds: DateRange,
    available_types: Vec<String>,
) -> Element {
    let current = query();
    let granularity = current.granularity;
    let periods = bounds.periods(granularity);
    let last_index = periods.len().saturating_sub(1);
    let start_index = slider_index(&periods, granularity, current.date_range.start);
    let end_index = slider_index(&periods, granularity, current.date_range.end);
    let start_label = granularity.format_period(granularity.truncate(current.date_range.start));
    let end_label = granularity.format_period(granularity.truncate(current.date_range.end));
    let options = type_options(&available_types, &current);

    let slider = move |edge: RangeEdge| {
        let mut query = query;
        move |evt: FormEvent| {
            if let Ok(index) = evt.value().parse::<usize>() {
                let next = with_slider_stop(&query.peek(), &bounds, edge, index);
                query.set(next);
            }
        }
    };

    rsx! {
        aside { class: "progress-controls",
            fieldset { class: "progress-controls__group",
                legend { {t!("controls-granularity")} }
                for option in Granularity::ALL {
                    label { key: "{option}", class: "progress-controls__choice",
                        input {
                            r#type: "radio",
                            name: "granularity",
                            value: "{option}",
                            checked: option == granularity,
                            onchange: move |_| {
                                let next = with_granularity(&query.peek(), option);
                                query.set(next);
                            },
                        }
                        span { "{option}" }
                    }
                }
            }

            fieldset { class: "progress-controls__group",
                legend { {t!("controls-date-range")} }
                p { class: "progress-controls__range-label",
                    "{start_label} – {end_label}"
                    span { class: "progress-controls__hint", " ({granularity.slider_format()})" }
                }
                input {
                    r#type: "range",
                    class: "progress-controls__slider",
                    aria_label: t!("controls-range-start"),
                    min: "0",
                    max: "{last_index}",
                    step: "1",
                    value: "{start_index}",
                    oninput: slider(RangeEdge::Start),
                }
                input {
                    r#type: "range",
                    class: "progress-controls__slider",
                    aria_label: t!("controls-range-end"),
                    min: "0",
                    max: "{last_index}",
                    step: "1",
                    value: "{end_index}",
                    oninput: slider(RangeEdge::End),
                }
            }

            fieldset { class: "progress-controls__group",
                legend { {t!("controls-activity-types")} }
                if options.is_empty() {
                    p { class: "progress-controls__hint", {t!("controls-no-types")} }
                }
                for activity_type in options {
                    label { key: "{activity_type}", class: "progress-controls__choice",
                        input {
                            r#type: "checkbox",
                            value: "{activity_type}",
                            checked: current.activity_types.contains(&activity_type),
                            onchange: {
                                let activity_type = activity_type.clone();
                                move |evt: FormEvent| {
                                    let next = with_activity_type(&query.peek(), &activity_type, evt.checked());
                                    query.set(next);
                                }
                            },
                        }
                        span { "{activity_type}" }
                    }
                }
            }

            fieldset { class: "progress-controls__group",
                legend { {t!("controls-metric")} }
                select {
                    class: "progress-controls__select",
                    value: "{current.metric.field_name()}",
                    onchange: move |evt: FormEvent| {
                        match evt.value().parse::<Metric>() {
                            Ok(metric) => {
                                let mut next = query.peek().clone();
                                next.metric = metric;
                                query.set(next);
                            }
                            Err(err) => tracing::warn!("{err}"),
                        }
                    },
                    for metric in Metric::ALL {
                        option {
                            key: "{metric.field_name()}",
                            value: "{metric.field_name()}",
                            selected: metric == current.metric,
                            "{metric}"
                        }
                    }
                }
            }

            fieldset { class: "progress-controls__group",
                legend { {t!("controls-chart-type")} }
                for chart_type in ChartType::ALL {
                    label { key: "{chart_type}", class: "progress-controls__choice",
                        input {
                            r#type: "radio",
                            name: "chart-type",
                            value: "{chart_type}",
                            checked: chart_type == current.chart_type,
                            onchange: move |_| {
                                let mut next = query.peek().clone();
                                next.chart_type = chart_type;
                                query.set(next);
                            },
                        }
                        span { "{chart_type}" }
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

    fn bounds() -> DateRange {
        DateRange::new(date!(2016 - 01 - 01), date!(2026 - 12 - 31))
    }

    fn query() -> ProgressQuery {
        ProgressQuery::new(bounds())
    }

    #[test]
    fn slider_indices_follow_periods() {
        let periods = bounds().periods(Granularity::Yearly);
        assert_eq!(periods.len(), 11);
        assert_eq!(slider_index(&periods, Granularity::Yearly, date!(2016 - 06 - 01)), 0);
        assert_eq!(slider_index(&periods, Granularity::Yearly, date!(2026 - 12 - 31)), 10);
        assert_eq!(slider_index(&periods, Granularity::Yearly, date!(2040 - 01 - 01)), 10);
    }

    #[test]
    fn end_stop_covers_the_whole_period() {
        let mut q = with_granularity(&query(), Granularity::Monthly);
        q = with_slider_stop(&q, &bounds(), RangeEdge::Start, 12 * 8 + 2);
        q = with_slider_stop(&q, &bounds(), RangeEdge::End, 12 * 8 + 2);
        assert_eq!(q.date_range, DateRange::new(date!(2024 - 03 - 01), date!(2024 - 03 - 31)));
    }

    #[test]
    fn crossing_stops_keep_an_ordered_range() {
        let mut q = query();
        q = with_slider_stop(&q, &bounds(), RangeEdge::End, 2);
        q = with_slider_stop(&q, &bounds(), RangeEdge::Start, 5);
        assert_eq!(q.date_range, DateRange::new(date!(2018 - 01 - 01), date!(2021 - 12 - 31)));
    }

    #[test]
    fn granularity_switch_snaps_outwards() {
        let mut q = query();
        q.date_range = DateRange::new(date!(2020 - 03 - 14), date!(2021 - 07 - 02));
        let yearly = with_granularity(&q, Granularity::Yearly);
        assert_eq!(yearly.date_range, DateRange::new(date!(2020 - 01 - 01), date!(2021 - 12 - 31)));
        let monthly = with_granularity(&q, Granularity::Monthly);
        assert_eq!(monthly.date_range, DateRange::new(date!(2020 - 03 - 01), date!(2021 - 07 - 31)));
    }

    #[test]
    fn selected_types_stay_listed() {
        let q = with_activity_type(&query(), "Swim", true);
        let options = type_options(&["Ride".to_string()], &q);
        assert_eq!(options, vec!["Ride", "Run", "Swim"]);

        let cleared = with_activity_type(&with_activity_type(&q, "Run", false), "Swim", false);
        assert!(cleared.activity_types.is_empty());
    }
}
