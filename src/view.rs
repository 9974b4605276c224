//! View renderer - sole writer of the output region

use std::cell::RefCell;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use tracing::{error, warn};

use crate::dom::{clear, el, Attrs, Element, Node, WeakElement};
use crate::error::SearchError;
use crate::state::{ForecastPoint, Location, ViewState};

pub const LOADING_TEXT: &str = "Leita...";
pub const GENERIC_ERROR: &str = "Óþekkt villa";
pub const RESULTS_HEADING: &str = "Leitarniðurstöður fyrir";
pub const TABLE_HEADERS: [&str; 3] = ["Tími", "Hiti", "Úrkoma"];
pub const MISSING_TEMPERATURE: &str = "N/A";
pub const NO_PRECIPITATION: &str = "Engin úrkoma";
pub const INVALID_DATE: &str = "Invalid Date";

/// Render sink driven by the search flow
pub trait View {
    fn show_loading(&self);
    fn show_error(&self, error: &SearchError);
    fn show_results(&self, location: &Location, points: &[ForecastPoint]);
}

/// Renders view states into the output region it was constructed with.
///
/// Every call replaces the region's content. The document is the region's
/// topmost ancestor at construction; once the region is no longer inside it
/// (removed, or freed) the call is logged and skipped.
#[derive(Debug)]
pub struct ViewRenderer {
    output: WeakElement,
    document: WeakElement,
    state: RefCell<ViewState>,
}

impl ViewRenderer {
    pub fn new(output: &Element) -> Self {
        Self {
            output: output.downgrade(),
            document: output.root().downgrade(),
            state: RefCell::new(ViewState::Idle),
        }
    }

    fn attached_output(&self) -> Option<Element> {
        let output = self.output.upgrade()?;
        let document = self.document.upgrade()?;
        output.is_within(&document).then_some(output)
    }

    /// The view state currently mounted
    pub fn state(&self) -> ViewState {
        self.state.borrow().clone()
    }

    fn mount(&self, content: Element, state: ViewState) {
        let Some(output) = self.attached_output() else {
            warn!("output region not found, skipping render");
            return;
        };
        clear(&output);
        output.append_child(content);
        *self.state.borrow_mut() = state;
    }
}

impl View for ViewRenderer {
    fn show_loading(&self) {
        self.mount(
            el("p", Attrs::new().class("loading"), [LOADING_TEXT]),
            ViewState::Loading,
        );
    }

    fn show_error(&self, err: &SearchError) {
        error!(error = ?err, "search failed");
        let message = error_message(err);
        self.mount(
            el("p", Attrs::new().class("error"), [format!("Villa: {message}")]),
            ViewState::Error(message),
        );
    }

    fn show_results(&self, location: &Location, points: &[ForecastPoint]) {
        self.mount(
            results_section(location, points),
            ViewState::Results {
                location: location.clone(),
                points: points.to_vec(),
            },
        );
    }
}

/// User-facing text for an error; never empty
pub fn error_message(err: &SearchError) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        GENERIC_ERROR.to_string()
    } else {
        message
    }
}

/// Heading plus forecast table for a location
pub fn results_section(location: &Location, points: &[ForecastPoint]) -> Element {
    el(
        "section",
        Attrs::new(),
        [
            el(
                "h2",
                Attrs::new(),
                [format!("{RESULTS_HEADING}: {}", location.title)],
            ),
            forecast_table(points),
        ],
    )
}

/// Header row followed by one row per point, in the order given
pub fn forecast_table(points: &[ForecastPoint]) -> Element {
    let header = el(
        "tr",
        Attrs::new(),
        TABLE_HEADERS.map(|title| el("th", Attrs::new(), [title])),
    );

    let rows = points.iter().map(|point| {
        el(
            "tr",
            Attrs::new(),
            [
                format_time(&point.time),
                format_temperature(point.temperature),
                format_precipitation(point.precipitation),
            ]
            .map(|cell| el("td", Attrs::new(), [cell])),
        )
    });

    el(
        "table",
        Attrs::new().class("forecast"),
        std::iter::once(header).chain(rows).map(Node::from),
    )
}

/// `d.m.yyyy, HH:MM`, or [`INVALID_DATE`] if `raw` is not a timestamp
pub fn format_time(raw: &str) -> String {
    match parse_time(raw) {
        Some(time) => time.format("%-d.%-m.%Y, %H:%M").to_string(),
        None => INVALID_DATE.to_string(),
    }
}

fn parse_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(time) = DateTime::parse_from_rfc3339(raw) {
        return Some(time.with_timezone(&Local).naive_local());
    }
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

pub fn format_temperature(temperature: Option<f64>) -> String {
    match temperature {
        Some(value) => format!("{value} °C"),
        None => MISSING_TEMPERATURE.to_string(),
    }
}

pub fn format_precipitation(precipitation: Option<f64>) -> String {
    match precipitation {
        Some(value) if value != 0.0 && !value.is_nan() => format!("{value} mm"),
        _ => NO_PRECIPITATION.to_string(),
    }
}
