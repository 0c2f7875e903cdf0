//! SVG rendering of a [`ChartSpec`].
//!
//! The same markup is shown inline on the page and rasterized for PNG export,
//! so everything here is plain string building with no DOM access.

use dioxus::prelude::*;
use time::Date;

use crate::core::format::format_tick;
use crate::core::page::ChartSpec;
use crate::core::progress::{ChartType, Metric, SeriesRow};

use super::fonts::{fonts, measure, FontWeight};

pub const CHART_WIDTH: u32 = 960;
pub const CHART_HEIGHT: u32 = 520;

const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 190.0;
const MARGIN_TOP: f64 = 64.0;
const MARGIN_BOTTOM: f64 = 72.0;
const TARGET_TICKS: usize = 5;
const MAX_X_LABELS: usize = 12;
const FONT_FAMILY: &str = "Inter, 'Segoe UI', Helvetica, Arial, sans-serif";

const BACKGROUND: &str = "#ffffff";
const INK: &str = "#1f2430";
const MUTED: &str = "#5d6577";
const GRID: &str = "#e6e9f0";

/// Qualitative palette; types take colors in legend order and wrap around.
pub const PALETTE: [&str; 10] = [
    "#636efa", "#ef553b", "#00cc96", "#ab63fa", "#ffa15a", "#19d3f3", "#ff6692", "#b6e880",
    "#ff97ff", "#fecb52",
];

pub(crate) type RenderFn = fn(&ChartSpec, &Frame, &mut String);

impl ChartType {
    /// Renderer drawing this encoding into a prepared frame.
    pub(crate) fn renderer(self) -> RenderFn {
        match self {
            ChartType::Bar => draw_bars,
            ChartType::Line => draw_lines,
        }
    }
}

/// Plot area geometry and scales shared by the renderers.
pub(crate) struct Frame {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
    y_max: f64,
    y_step: f64,
    periods: Vec<Date>,
    types: Vec<String>,
}

impl Frame {
    fn new(spec: &ChartSpec) -> Self {
        let periods = spec.series.periods();
        let types = spec.series.activity_types();

        let extent = match spec.chart_type {
            ChartType::Bar => spec
                .series
                .period_totals()
                .into_iter()
                .map(|(_, total)| total)
                .fold(0.0, f64::max),
            ChartType::Line => spec.series.rows.iter().map(|r| r.value).fold(0.0, f64::max),
        };
        // Moving time is stored in seconds but ticked in whole hours.
        let unit = match spec.series.metric {
            Metric::MovingTime => 3600.0,
            _ => 1.0,
        };
        let (y_max, y_step) = nice_scale(extent / unit, TARGET_TICKS);
        let (y_max, y_step) = (y_max * unit, y_step * unit);

        Self {
            left: MARGIN_LEFT,
            top: MARGIN_TOP,
            width: f64::from(CHART_WIDTH) - MARGIN_LEFT - MARGIN_RIGHT,
            height: f64::from(CHART_HEIGHT) - MARGIN_TOP - MARGIN_BOTTOM,
            y_max,
            y_step,
            periods,
            types,
        }
    }

    fn band(&self) -> f64 {
        self.width / self.periods.len().max(1) as f64
    }

    fn x_center(&self, period: Date) -> Option<f64> {
        let index = self.periods.iter().position(|p| *p == period)?;
        Some(self.left + self.band() * (index as f64 + 0.5))
    }

    fn y(&self, value: f64) -> f64 {
        self.top + self.height - (value / self.y_max).clamp(0.0, 1.0) * self.height
    }

    fn bottom(&self) -> f64 {
        self.top + self.height
    }

    fn color(&self, activity_type: &str) -> &'static str {
        let index = self
            .types
            .iter()
            .position(|t| t == activity_type)
            .unwrap_or(0);
        PALETTE[index % PALETTE.len()]
    }
}

/// Round `max` up to a 1/2/5 step scale. Returns (axis maximum, tick step).
fn nice_scale(max: f64, ticks: usize) -> (f64, f64) {
    if !max.is_finite() || max <= 0.0 {
        return (1.0, 1.0 / ticks as f64);
    }
    let raw = max / ticks as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let step = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    } * magnitude;
    ((max / step).ceil() * step, step)
}

pub(crate) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

#[allow(clippy::too_many_arguments)]
fn text(
    out: &mut String,
    x: f64,
    y: f64,
    size: f64,
    weight: FontWeight,
    fill: &str,
    anchor: &str,
    body: &str,
) {
    out.push_str(&format!(
        "<text x='{x:.1}' y='{y:.1}' font-family=\"{FONT_FAMILY}\" font-size='{size}' font-weight='{}' fill='{fill}' text-anchor='{anchor}'>{}</text>",
        weight.css_weight(),
        escape_xml(body)
    ));
}

/// Render the chart as a standalone SVG document.
pub fn render_svg(spec: &ChartSpec) -> String {
    let frame = Frame::new(spec);
    let mut out = String::new();

    out.push_str(&format!(
        "<svg xmlns='http://www.w3.org/2000/svg' width='{CHART_WIDTH}' height='{CHART_HEIGHT}' viewBox='0 0 {CHART_WIDTH} {CHART_HEIGHT}' role='img'>"
    ));
    out.push_str(&format!(
        "<rect width='{CHART_WIDTH}' height='{CHART_HEIGHT}' fill='{BACKGROUND}'/>"
    ));

    let title = measure(FontWeight::Bold, 20.0);
    text(&mut out, frame.left, 16.0 + title.asc, 20.0, FontWeight::Bold, INK, "start", &spec.title);

    draw_axes(spec, &frame, &mut out);

    if spec.series.is_empty() {
        text(
            &mut out,
            frame.left + frame.width / 2.0,
            frame.top + frame.height / 2.0,
            15.0,
            FontWeight::Regular,
            MUTED,
            "middle",
            "No activities match the current filters",
        );
    } else {
        (spec.chart_type.renderer())(spec, &frame, &mut out);
        draw_legend(spec, &frame, &mut out);
    }

    out.push_str("</svg>");
    out
}

fn draw_axes(spec: &ChartSpec, frame: &Frame, out: &mut String) {
    let metric = spec.series.metric;
    let steps = (frame.y_max / frame.y_step).round() as usize;
    for i in 0..=steps {
        let value = frame.y_step * i as f64;
        let y = frame.y(value);
        out.push_str(&format!(
            "<line x1='{:.1}' y1='{y:.1}' x2='{:.1}' y2='{y:.1}' stroke='{GRID}' stroke-width='1'/>",
            frame.left,
            frame.left + frame.width
        ));
        text(out, frame.left - 10.0, y + 4.0, 12.0, FontWeight::Regular, MUTED, "end", &format_tick(metric, value));
    }

    out.push_str(&format!(
        "<line x1='{:.1}' y1='{:.1}' x2='{:.1}' y2='{:.1}' stroke='{MUTED}' stroke-width='1'/>",
        frame.left,
        frame.bottom(),
        frame.left + frame.width,
        frame.bottom()
    ));

    let every = frame.periods.len().div_ceil(MAX_X_LABELS).max(1);
    for (index, period) in frame.periods.iter().enumerate() {
        if index % every != 0 {
            continue;
        }
        if let Some(x) = frame.x_center(*period) {
            let label = spec.series.granularity.format_period(*period);
            text(out, x, frame.bottom() + 20.0, 12.0, FontWeight::Regular, MUTED, "middle", &label);
        }
    }

    text(
        out,
        frame.left + frame.width / 2.0,
        f64::from(CHART_HEIGHT) - 20.0,
        13.0,
        FontWeight::SemiBold,
        INK,
        "middle",
        spec.label(spec.x_field),
    );

    let unit = match metric {
        Metric::MovingTime => Some("h"),
        _ => metric.unit(),
    };
    let y_label = match unit {
        Some(unit) => format!("{} ({unit})", spec.label(spec.y_field)),
        None => spec.label(spec.y_field).to_string(),
    };
    let cx = 22.0;
    let cy = frame.top + frame.height / 2.0;
    out.push_str(&format!(
        "<text x='{cx}' y='{cy:.1}' transform='rotate(-90 {cx} {cy:.1})' font-family=\"{FONT_FAMILY}\" font-size='13' font-weight='600' fill='{INK}' text-anchor='middle'>{}</text>",
        escape_xml(&y_label)
    ));
}

fn draw_bars(spec: &ChartSpec, frame: &Frame, out: &mut String) {
    let bar_width = (frame.band() * 0.7).max(1.0);
    for period in &frame.periods {
        let Some(center) = frame.x_center(*period) else {
            continue;
        };
        let mut stacked = 0.0;
        for row in spec.series.rows.iter().filter(|r| r.period() == *period) {
            let value = row.value.max(0.0);
            let top = frame.y(stacked + value);
            let base = frame.y(stacked);
            stacked += value;
            out.push_str(&format!(
                "<rect x='{:.1}' y='{top:.1}' width='{bar_width:.1}' height='{:.1}' fill='{}'><title>{}</title></rect>",
                center - bar_width / 2.0,
                (base - top).max(0.0),
                frame.color(&row.activity_type),
                escape_xml(&tooltip(spec, row))
            ));
        }
    }
}

fn draw_lines(spec: &ChartSpec, frame: &Frame, out: &mut String) {
    for activity_type in &frame.types {
        let color = frame.color(activity_type);
        let points: Vec<(f64, f64, &SeriesRow)> = spec
            .series
            .rows
            .iter()
            .filter(|r| &r.activity_type == activity_type)
            .filter_map(|r| frame.x_center(r.period()).map(|x| (x, frame.y(r.value), r)))
            .collect();

        if points.len() > 1 {
            let path = points
                .iter()
                .map(|(x, y, _)| format!("{x:.1},{y:.1}"))
                .collect::<Vec<_>>()
                .join(" ");
            out.push_str(&format!(
                "<polyline points='{path}' fill='none' stroke='{color}' stroke-width='2.5' stroke-linejoin='round'/>"
            ));
        }
        for (x, y, row) in points {
            out.push_str(&format!(
                "<circle cx='{x:.1}' cy='{y:.1}' r='4' fill='{color}'><title>{}</title></circle>",
                escape_xml(&tooltip(spec, row))
            ));
        }
    }
}

fn draw_legend(spec: &ChartSpec, frame: &Frame, out: &mut String) {
    let x = frame.left + frame.width + 24.0;
    let heading = measure(FontWeight::SemiBold, 13.0);
    let item = measure(FontWeight::Regular, 13.0);
    let max_width = f64::from(CHART_WIDTH) - x - 12.0 - 20.0;

    text(out, x, frame.top + heading.asc, 13.0, FontWeight::SemiBold, INK, "start", spec.label(spec.color_field));

    let mut y = frame.top + heading.line_h + 8.0;
    for activity_type in &frame.types {
        out.push_str(&format!(
            "<rect x='{x:.1}' y='{y:.1}' width='12' height='12' rx='2' fill='{}'/>",
            frame.color(activity_type)
        ));
        let label = fonts().fit(FontWeight::Regular, activity_type, 13.0, max_width);
        text(out, x + 20.0, y + item.asc - 2.0, 13.0, FontWeight::Regular, INK, "start", &label);
        y += item.line_h + 6.0;
    }
}

fn tooltip(spec: &ChartSpec, row: &SeriesRow) -> String {
    format!(
        "{} · {} · {}",
        spec.series.granularity.format_period(row.period()),
        row.activity_type,
        crate::core::format::format_metric(spec.series.metric, row.value)
    )
}

/// Inline chart for the progress page.
#[component]
pub fn ProgressChart(spec: ChartSpec) -> Element {
    let svg = render_svg(&spec);
    rsx! {
        section { class: "progress-card progress-chart",
            div {
                class: "progress-chart__canvas",
                role: "figure",
                aria_label: "{spec.title}",
                dangerous_inner_html: "{svg}",
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::progress::{DateRange, Granularity, ProgressQuery, ProgressSeries};
    use time::macros::date;

    fn spec(chart_type: ChartType, rows: Vec<SeriesRow>) -> ChartSpec {
        let mut query = ProgressQuery::new(DateRange::new(date!(2016 - 01 - 01), date!(2026 - 12 - 31)));
        query.granularity = Granularity::Monthly;
        query.chart_type = chart_type;
        let series = ProgressSeries {
            granularity: Granularity::Monthly,
            metric: Metric::Distance,
            rows,
        };
        ChartSpec::new(series, &query)
    }

    fn rows() -> Vec<SeriesRow> {
        vec![
            SeriesRow::new(date!(2024 - 03 - 01), "Ride", 42.0),
            SeriesRow::new(date!(2024 - 03 - 01), "Run", 8.0),
            SeriesRow::new(date!(2024 - 04 - 01), "Run", 12.5),
        ]
    }

    #[test]
    fn nice_scale_rounds_up() {
        assert_eq!(nice_scale(8.0, 5), (8.0, 2.0));
        assert_eq!(nice_scale(43.0, 5), (50.0, 10.0));
        assert_eq!(nice_scale(0.0, 5), (1.0, 0.2));
        let (max, step) = nice_scale(1234.0, 5);
        assert!(max >= 1234.0);
        assert_eq!(step, 500.0);
    }

    #[test]
    fn bar_chart_draws_one_rect_per_row() {
        let svg = render_svg(&spec(ChartType::Bar, rows()));
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("Monthly Distance by Type"));
        assert_eq!(svg.matches("<title>").count(), 3);
        assert!(svg.contains("03/2024"));
        assert!(svg.contains("Activity Type"));
        assert!(svg.contains("Distance (km)"));
        assert!(!svg.contains("<polyline"));
    }

    #[test]
    fn line_chart_draws_polyline_per_multi_point_type() {
        let svg = render_svg(&spec(ChartType::Line, rows()));
        assert_eq!(svg.matches("<polyline").count(), 1);
        assert_eq!(svg.matches("<circle").count(), 3);
    }

    #[test]
    fn empty_series_renders_placeholder() {
        let svg = render_svg(&spec(ChartType::Bar, Vec::new()));
        assert!(svg.contains("No activities match the current filters"));
        assert!(!svg.contains("<title>"));
    }

    #[test]
    fn type_labels_are_escaped() {
        let svg = render_svg(&spec(
            ChartType::Bar,
            vec![SeriesRow::new(date!(2024 - 03 - 01), "Hike & <Climb>", 3.0)],
        ));
        assert!(svg.contains("Hike &amp; &lt;Climb&gt;"));
        assert!(!svg.contains("<Climb>"));
    }
}
