//! Error types for slot-engine operations.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid meeting duration: {0} minutes (must be positive)")]
    InvalidDuration(u32),

    #[error("Invalid working-hours window: start {start} must be before end {end}")]
    InvalidWindow { start: u32, end: u32 },

    #[error("Window bound out of range: {0} minutes past midnight (max 1440)")]
    WindowOutOfRange(u32),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid month: {0}")]
    InvalidMonth(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid booking details: {0}")]
    InvalidDetails(String),

    #[error("Date is not bookable: {0}")]
    DateNotSelectable(NaiveDate),

    #[error("Slot belongs to {slot_date}, but {selected} is selected")]
    SlotDateMismatch { slot_date: NaiveDate, selected: NaiveDate },

    #[error("Cannot {action} while in the {step} step")]
    InvalidTransition { step: &'static str, action: &'static str },
}

pub type Result<T> = std::result::Result<T, SlotError>;
