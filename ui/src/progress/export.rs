use dioxus::prelude::*;
use serde_json::{Map, Value};
use time::format_description::well_known::Rfc3339;

#[cfg(target_arch = "wasm32")]
use crate::core::platform;
use crate::core::page::ChartSpec;
use crate::core::progress::ProgressSeries;
use crate::t;

use super::chart::{render_svg, CHART_HEIGHT, CHART_WIDTH};

#[derive(Clone, Debug, PartialEq)]
enum ExportStatus {
    Idle,
    Working(String),
    Done(String),
    Error(String),
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum ExportKind {
    Json,
    Csv,
    Png,
}

impl ExportKind {
    async fn perform(self, spec: ChartSpec) -> Result<String, String> {
        match self {
            ExportKind::Json => perform_json_export(spec).await,
            ExportKind::Csv => perform_csv_export(spec).await,
            ExportKind::Png => perform_png_export(spec).await,
        }
    }
}

#[component]
pub fn ProgressExportPanel(spec: ChartSpec) -> Element {
    let row_count = spec.series.rows.len();
    let status = use_signal(|| ExportStatus::Idle);
    let busy = use_signal(|| false);

    let feedback = match &status() {
        ExportStatus::Idle => None,
        ExportStatus::Working(label) => {
            Some(("progress-card__meta".to_string(), format!("{label}…")))
        }
        ExportStatus::Done(message) => Some((
            "progress-card__meta progress-card__meta--success".to_string(),
            format!("✅ {message}"),
        )),
        ExportStatus::Error(err) => Some((
            "progress-card__meta progress-card__meta--error".to_string(),
            format!("⚠️ {err}"),
        )),
    };

    let handler = |kind: ExportKind| {
        let spec = spec.clone();
        let mut status_signal = status;
        let mut busy_signal = busy;
        move |_: MouseEvent| {
            if busy_signal() {
                return;
            }
            busy_signal.set(true);
            let label = match kind {
                ExportKind::Json => t!("export-working-json"),
                ExportKind::Csv => t!("export-working-csv"),
                ExportKind::Png => t!("export-working-png"),
            };
            status_signal.set(ExportStatus::Working(label));
            let spec = spec.clone();

            #[cfg(target_arch = "wasm32")]
            {
                platform::spawn_future(async move {
                    match kind.perform(spec).await {
                        Ok(message) => status_signal.set(ExportStatus::Done(message)),
                        Err(err) => status_signal.set(ExportStatus::Error(err)),
                    }
                    busy_signal.set(false);
                });
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                match futures::executor::block_on(kind.perform(spec)) {
                    Ok(message) => status_signal.set(ExportStatus::Done(message)),
                    Err(err) => {
                        tracing::warn!(?kind, "export failed: {err}");
                        status_signal.set(ExportStatus::Error(err));
                    }
                }
                busy_signal.set(false);
            }
        }
    };

    rsx! {
        section { class: "progress-card progress-export",
            div { class: "progress-card__header",
                h2 { {t!("export-title")} }
            }

            if row_count == 0 {
                p { class: "progress-card__placeholder", {t!("export-empty")} }
            } else {
                p { {t!("export-description", rows = row_count)} }

                div { class: "progress-export__actions",
                    button {
                        r#type: "button",
                        class: "button button--primary",
                        disabled: busy(),
                        onclick: handler(ExportKind::Png),
                        {t!("export-png")}
                    }
                    button {
                        r#type: "button",
                        class: "button",
                        disabled: busy(),
                        onclick: handler(ExportKind::Csv),
                        {t!("export-csv")}
                    }
                    button {
                        r#type: "button",
                        class: "button button--ghost",
                        disabled: busy(),
                        onclick: handler(ExportKind::Json),
                        {t!("export-json")}
                    }
                }

                if let Some((class_name, message)) = feedback {
                    p { class: "{class_name}", "{message}" }
                }
            }
        }
    }
}

async fn perform_json_export(spec: ChartSpec) -> Result<String, String> {
    let json = build_json(&spec.series).map_err(|err| err.to_string())?;
    let copied = copy_to_clipboard(json.clone()).await;
    let filename = format!("trailmark-progress-{}.json", timestamp_slug());
    let delivery = download_bytes(&filename, "application/json", json.into_bytes()).await?;
    let saved = match delivery {
        Some(path) => format!("JSON saved to {path}"),
        None => "JSON download started".to_string(),
    };
    Ok(match copied {
        Ok(()) => format!("{saved}; copied to clipboard"),
        Err(err) => {
            tracing::debug!("clipboard copy skipped: {err}");
            saved
        }
    })
}

async fn perform_csv_export(spec: ChartSpec) -> Result<String, String> {
    let csv = build_csv(&spec.series);
    let filename = format!("trailmark-progress-{}.csv", timestamp_slug());
    let delivery = download_bytes(&filename, "text/csv", csv.into_bytes()).await?;
    Ok(match delivery {
        Some(path) => format!("CSV saved to {path}"),
        None => "CSV download started".to_string(),
    })
}

async fn perform_png_export(spec: ChartSpec) -> Result<String, String> {
    let svg = render_svg(&spec);
    let png_bytes = build_png_snapshot(&svg).await?;
    let filename = format!("trailmark-progress-{}.png", timestamp_slug());
    let delivery = download_bytes(&filename, "image/png", png_bytes).await?;
    Ok(match delivery {
        Some(path) => format!("PNG saved to {path}"),
        None => "PNG download started".to_string(),
    })
}

fn format_start(row: &crate::core::progress::SeriesRow) -> String {
    row.start_date
        .format(&Rfc3339)
        .unwrap_or_else(|_| row.period().to_string())
}

/// Series rows as CSV under the chart's column names.
pub fn build_csv(series: &ProgressSeries) -> String {
    let mut csv = String::new();
    csv.push_str(&series.columns().join(","));
    csv.push('\n');

    for row in &series.rows {
        let line = [format_start(row), row.activity_type.clone(), row.value.to_string()]
            .iter()
            .map(|field| escape_csv(field))
            .collect::<Vec<_>>()
            .join(",");
        csv.push_str(&line);
        csv.push('\n');
    }

    csv
}

/// Series rows as a JSON array of objects keyed by the chart's column names.
pub fn build_json(series: &ProgressSeries) -> serde_json::Result<String> {
    let [date_field, type_field, value_field] = series.columns();
    let rows: Vec<Value> = series
        .rows
        .iter()
        .map(|row| {
            let mut object = Map::new();
            object.insert(date_field.to_string(), Value::from(format_start(row)));
            object.insert(type_field.to_string(), Value::from(row.activity_type.clone()));
            object.insert(value_field.to_string(), json_number(row.value));
            Value::Object(object)
        })
        .collect();
    serde_json::to_string_pretty(&rows)
}

/// Whole values as JSON integers, matching how the CSV prints them.
fn json_number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}

fn escape_csv(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }

    let needs_quotes = value.contains([',', '"', '\n', '\r']);
    if needs_quotes {
        let escaped = value.replace('"', "\"\"");
        format!("\"{escaped}\"")
    } else {
        value.to_string()
    }
}

fn timestamp_slug() -> String {
    use time::{macros::format_description, OffsetDateTime};

    OffsetDateTime::now_utc()
        .format(&format_description!(
            "[year][month][day]_[hour][minute][second]"
        ))
        .unwrap_or_else(|_| "export".into())
}

async fn copy_to_clipboard(payload: String) -> Result<(), String> {
    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::JsCast;

        let window = web_sys::window().ok_or("window unavailable")?;
        let document = window.document().ok_or("document unavailable")?;
        let body = document.body().ok_or("missing body")?;

        let textarea = document
            .create_element("textarea")
            .map_err(|_| "Unable to create textarea")?
            .dyn_into::<web_sys::HtmlTextAreaElement>()
            .map_err(|_| "Textarea cast failed")?;
        textarea.set_value(&payload);
        let style = textarea.style();
        style.set_property("position", "fixed").ok();
        style.set_property("opacity", "0").ok();

        body.append_child(&textarea).ok();
        textarea.select();
        let copied = document
            .dyn_ref::<web_sys::HtmlDocument>()
            .and_then(|html| html.exec_command("copy").ok())
            .unwrap_or(false);
        textarea.remove();
        if copied {
            Ok(())
        } else {
            Err("Clipboard copy blocked".into())
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        use arboard::Clipboard;

        let mut clipboard = Clipboard::new().map_err(|err| err.to_string())?;
        clipboard.set_text(payload).map_err(|err| err.to_string())
    }
}

async fn download_bytes(
    filename: &str,
    mime: &str,
    bytes: Vec<u8>,
) -> Result<Option<String>, String> {
    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::JsCast;
        use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

        let array = js_sys::Uint8Array::from(bytes.as_slice());
        let parts = js_sys::Array::new();
        parts.push(&array.buffer());

        let opts = BlobPropertyBag::new();
        opts.set_type(mime);
        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &opts)
            .map_err(|_| "Failed to create blob".to_string())?;
        let url = Url::create_object_url_with_blob(&blob)
            .map_err(|_| "Unable to create download".to_string())?;

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or("Document unavailable")?;
        let anchor: HtmlAnchorElement = document
            .create_element("a")
            .map_err(|_| "Unable to create anchor")?
            .dyn_into()
            .map_err(|_| "Anchor cast failed")?;
        anchor.set_href(&url);
        anchor.set_download(filename);
        anchor.style().set_property("display", "none").ok();

        document
            .body()
            .ok_or("Missing body")?
            .append_child(&anchor)
            .ok();
        anchor.click();
        anchor.remove();
        Url::revoke_object_url(&url).ok();

        Ok(None)
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        use std::fs;

        let _ = mime;
        let dir = desktop_export_dir()?;
        fs::create_dir_all(&dir).map_err(|err| err.to_string())?;
        let path = dir.join(filename);
        fs::write(&path, &bytes).map_err(|err| err.to_string())?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "export written");
        Ok(Some(path.to_string_lossy().to_string()))
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn desktop_export_dir() -> Result<std::path::PathBuf, String> {
    let dirs = directories::ProjectDirs::from("com", "Trailmark", "Trailmark")
        .ok_or("Unable to determine export directory")?;
    Ok(dirs.data_dir().join("exports"))
}

async fn build_png_snapshot(svg: &str) -> Result<Vec<u8>, String> {
    #[cfg(target_arch = "wasm32")]
    {
        build_png_web(svg).await
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        build_png_desktop(svg)
    }
}

#[cfg(target_arch = "wasm32")]
async fn build_png_web(svg: &str) -> Result<Vec<u8>, String> {
    use base64::Engine;
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{
        Blob, BlobPropertyBag, CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, Url,
    };

    let opts = BlobPropertyBag::new();
    opts.set_type("image/svg+xml");
    let parts = js_sys::Array::new();
    parts.push(&JsValue::from_str(svg));
    let blob = Blob::new_with_str_sequence_and_options(&parts, &opts)
        .map_err(|_| "Unable to build SVG blob".to_string())?;
    let url = Url::create_object_url_with_blob(&blob)
        .map_err(|_| "Unable to create SVG URL".to_string())?;

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or("Document unavailable")?;

    let canvas: HtmlCanvasElement = document
        .create_element("canvas")
        .map_err(|_| "Unable to create canvas")?
        .dyn_into()
        .map_err(|_| "Canvas cast failed")?;
    canvas.set_width(CHART_WIDTH);
    canvas.set_height(CHART_HEIGHT);

    let context: CanvasRenderingContext2d = canvas
        .get_context("2d")
        .map_err(|_| "Canvas context unavailable")?
        .ok_or("Canvas context missing")?
        .dyn_into()
        .map_err(|_| "Context cast failed")?;

    let image = HtmlImageElement::new().map_err(|_| "Unable to create image")?;
    image.set_src(&url);
    JsFuture::from(image.decode())
        .await
        .map_err(|_| "Image decode failed")?;

    context
        .draw_image_with_html_image_element(&image, 0.0, 0.0)
        .map_err(|_| "Unable to draw image")?;

    let data_url = canvas
        .to_data_url_with_type("image/png")
        .map_err(|_| "Unable to serialise canvas")?;
    Url::revoke_object_url(&url).ok();

    base64::engine::general_purpose::STANDARD
        .decode(data_url.split(',').nth(1).ok_or("Malformed data URL")?)
        .map_err(|_| "PNG decode failed".to_string())
}

#[cfg(not(target_arch = "wasm32"))]
fn build_png_desktop(svg: &str) -> Result<Vec<u8>, String> {
    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();
    let tree = usvg::Tree::from_str(svg, &options).map_err(|err| err.to_string())?;

    let mut pixmap = tiny_skia::Pixmap::new(CHART_WIDTH, CHART_HEIGHT)
        .ok_or("Unable to allocate image buffer")?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    // The chart paints an opaque background, so premultiplied RGBA equals straight RGBA.
    let mut buffer = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buffer, CHART_WIDTH, CHART_HEIGHT);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder
            .write_header()
            .map_err(|err| err.to_string())?
            .write_image_data(pixmap.data())
            .map_err(|err| err.to_string())?;
    }

    Ok(buffer)
}
