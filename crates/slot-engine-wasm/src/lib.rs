//! WASM bindings for slot-engine.
//!
//! Exposes daily slot generation and month grids to the booking widget via
//! `wasm-bindgen`. Complex types cross the boundary as JSON strings; dates are
//! `YYYY-MM-DD`, months `YYYY-MM`.
//!
//! The widget reads the visitor timezone (`Intl.DateTimeFormat().resolvedOptions().timeZone`)
//! and today's date once and passes them in, so nothing here touches the clock.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p slot-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir packages/slot-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/slot_engine_wasm.wasm
//! ```

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use slot_engine::calendar::{self, CalendarCell, YearMonth};
use slot_engine::slots::{self, TimeSlot};
use slot_engine::{SlotConfig, SlotError};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct TimeSlotDto {
    provider_date: String,
    provider_time: String,
    provider_label: String,
    local_label: String,
    local_date: String,
    start: String,
    end: String,
}

impl From<&TimeSlot> for TimeSlotDto {
    fn from(s: &TimeSlot) -> Self {
        Self {
            provider_date: s.provider_date.to_string(),
            provider_time: s.provider_time.clone(),
            provider_label: s.provider_label.clone(),
            local_label: s.local_label.clone(),
            local_date: s.local_date.to_string(),
            start: s.start.to_rfc3339(),
            end: s.end.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
struct CalendarCellDto {
    index: usize,
    date: Option<String>,
    day: Option<u32>,
    selectable: bool,
    is_today: bool,
    is_selected: bool,
}

impl From<&CalendarCell> for CalendarCellDto {
    fn from(c: &CalendarCell) -> Self {
        Self {
            index: c.index,
            date: c.date.map(|d| d.to_string()),
            day: c.date.map(|d| d.day()),
            selectable: c.selectable,
            is_today: c.is_today,
            is_selected: c.is_selected,
        }
    }
}

#[derive(Serialize)]
struct MonthGridDto {
    month: String,
    label: String,
    cells: Vec<CalendarCellDto>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn to_js(e: SlotError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn parse_date(s: &str) -> Result<NaiveDate, JsValue> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| JsValue::from_str(&format!("Invalid date '{}': {}", s, e)))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// The built-in provider configuration as JSON.
#[wasm_bindgen(js_name = "defaultConfig")]
pub fn default_config() -> Result<String, JsValue> {
    to_json(&SlotConfig::default())
}

/// Generate the slots offered on `reference_date`, labelled for `visitor_tz`.
///
/// `config_json` is a (possibly partial) `SlotConfig`; missing fields take the
/// defaults. Returns a JSON array of slot objects. Throws on an invalid config,
/// timezone, or date.
#[wasm_bindgen(js_name = "generateDailySlots")]
pub fn generate_daily_slots(
    config_json: &str,
    visitor_tz: &str,
    reference_date: &str,
) -> Result<String, JsValue> {
    let schedule = SlotConfig::from_json(config_json)
        .and_then(SlotConfig::into_schedule)
        .map_err(to_js)?;
    let visitor = slot_engine::parse_timezone(visitor_tz).map_err(to_js)?;
    let date = parse_date(reference_date)?;

    let dtos: Vec<TimeSlotDto> = slots::generate_daily_slots(&schedule, visitor, date)
        .iter()
        .map(TimeSlotDto::from)
        .collect();
    to_json(&dtos)
}

/// Build the 42-cell grid for `month` (`YYYY-MM`).
///
/// `today` marks past dates unselectable; `selected` (optional) flags the
/// current selection. Returns `{month, label, cells}` as JSON.
#[wasm_bindgen(js_name = "generateMonthGrid")]
pub fn generate_month_grid(
    month: &str,
    today: &str,
    selected: Option<String>,
) -> Result<String, JsValue> {
    let month: YearMonth = month.parse().map_err(to_js)?;
    let today = parse_date(today)?;
    let selected = selected.as_deref().map(parse_date).transpose()?;

    let cells = calendar::generate_month_grid(month, today, selected);
    to_json(&MonthGridDto {
        month: month.to_string(),
        label: month.label(),
        cells: cells.iter().map(CalendarCellDto::from).collect(),
    })
}

/// Move `month` (`YYYY-MM`) by `delta` months and return the new `YYYY-MM`.
#[wasm_bindgen(js_name = "advanceMonth")]
pub fn advance_month(month: &str, delta: i32) -> Result<String, JsValue> {
    let month: YearMonth = month.parse().map_err(to_js)?;
    Ok(month.advance(delta).map_err(to_js)?.to_string())
}

/// The default booking date: the first weekday after `today`.
#[wasm_bindgen(js_name = "nextSelectableDate")]
pub fn next_selectable_date(today: &str) -> Result<String, JsValue> {
    let today = parse_date(today)?;
    Ok(calendar::next_selectable_date(today).to_string())
}
