//! # slot-engine
//!
//! Timezone-aware meeting slot generation and calendar grids for booking widgets.
//!
//! A provider publishes fixed working hours in their own timezone. The engine
//! enumerates the bookable start times for a day, resolves each one to an
//! absolute instant via `chrono-tz` (including DST gaps and folds), and labels
//! it in the visitor's timezone. Alongside that it builds the fixed 42-cell
//! month grid a date picker renders.
//!
//! Every function here is pure: the visitor timezone and "today" are passed
//! in, never read from the environment.
//!
//! ## Modules
//!
//! - [`config`] — Provider configuration and its validated [`SlotSchedule`] form
//! - [`slots`] — Working-hours window → list of [`TimeSlot`]s for one day
//! - [`calendar`] — Month → 42 [`CalendarCell`]s with selectability
//! - [`dst`] — Resolving provider wall-clock times across DST transitions
//! - [`booking`] — The details → calendar → success booking flow
//! - [`error`] — Error types

pub mod booking;
pub mod calendar;
pub mod config;
pub mod dst;
pub mod error;
pub mod slots;

pub use booking::{
    AttendanceScale, AttendeeDetails, BookingFlow, BookingRequest, BookingSelection, BookingStep,
};
pub use calendar::{generate_month_grid, next_selectable_date, CalendarCell, YearMonth};
pub use config::{parse_timezone, SlotConfig, SlotSchedule};
pub use dst::DstPolicy;
pub use error::SlotError;
pub use slots::{generate_daily_slots, TimeSlot};
