//! The booking flow that consumes the slot and calendar generators.
//!
//! A visitor fills in their details, picks a date and a slot, and submits.
//! The flow is forward-only apart from the calendar step's "back to details";
//! once a submission completes it is terminal. Submission itself is performed
//! by the caller: [`BookingFlow::begin_submit`] hands out the request and
//! [`BookingFlow::complete_submit`] / [`BookingFlow::fail_submit`] report back.

use std::fmt;

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::calendar::{self, CalendarCell, YearMonth};
use crate::config::SlotSchedule;
use crate::error::{Result, SlotError};
use crate::slots::{self, TimeSlot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStep {
    Details,
    Calendar,
    Success,
}

impl BookingStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStep::Details => "details",
            BookingStep::Calendar => "calendar",
            BookingStep::Success => "success",
        }
    }
}

impl fmt::Display for BookingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expected audience size of the visitor's event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AttendanceScale {
    #[default]
    #[serde(rename = "Under 500")]
    Under500,
    #[serde(rename = "500 - 1,000")]
    Upto1000,
    #[serde(rename = "1,000 - 5,000")]
    Upto5000,
    #[serde(rename = "5,000+")]
    Over5000,
}

impl AttendanceScale {
    pub const ALL: [AttendanceScale; 4] = [
        AttendanceScale::Under500,
        AttendanceScale::Upto1000,
        AttendanceScale::Upto5000,
        AttendanceScale::Over5000,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AttendanceScale::Under500 => "Under 500",
            AttendanceScale::Upto1000 => "500 - 1,000",
            AttendanceScale::Upto5000 => "1,000 - 5,000",
            AttendanceScale::Over5000 => "5,000+",
        }
    }

    /// Parse a display label, ignoring surrounding whitespace.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label() == label.trim())
    }
}

/// What the visitor tells us about themselves before picking a time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttendeeDetails {
    pub name: String,
    pub email: String,
    pub company: String,
    pub conference: String,
    /// Optional free-text description of the problem to discuss.
    #[serde(default)]
    pub challenge: String,
    #[serde(default)]
    pub attendees: AttendanceScale,
}

impl AttendeeDetails {
    /// Check required fields are filled and the email looks like one.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("name", &self.name),
            ("email", &self.email),
            ("company", &self.company),
            ("conference", &self.conference),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(SlotError::InvalidDetails(format!("{field} is required")));
            }
        }
        if !looks_like_email(self.email.trim()) {
            return Err(SlotError::InvalidDetails(format!(
                "'{}' is not a valid email address",
                self.email
            )));
        }
        Ok(())
    }
}

fn looks_like_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !s.contains(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

/// The date and slot the visitor has picked so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingSelection {
    pub selected_date: NaiveDate,
    pub selected_slot: Option<TimeSlot>,
}

/// Payload for the external booking endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub details: AttendeeDetails,
    pub date: NaiveDate,
    pub slot: TimeSlot,
}

/// State machine for one visitor's booking session.
#[derive(Debug, Clone)]
pub struct BookingFlow {
    step: BookingStep,
    details: Option<AttendeeDetails>,
    selection: BookingSelection,
    viewed_month: YearMonth,
    submitting: bool,
}

impl BookingFlow {
    /// Start a session. The selected date defaults to the next weekday after
    /// `today` and the calendar opens on the current month.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            step: BookingStep::Details,
            details: None,
            selection: BookingSelection {
                selected_date: calendar::next_selectable_date(today),
                selected_slot: None,
            },
            viewed_month: YearMonth::of(today),
            submitting: false,
        }
    }

    pub fn step(&self) -> BookingStep {
        self.step
    }

    pub fn details(&self) -> Option<&AttendeeDetails> {
        self.details.as_ref()
    }

    pub fn selection(&self) -> &BookingSelection {
        &self.selection
    }

    pub fn viewed_month(&self) -> YearMonth {
        self.viewed_month
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    fn expect_step(&self, step: BookingStep, action: &'static str) -> Result<()> {
        if self.step != step {
            return Err(SlotError::InvalidTransition {
                step: self.step.as_str(),
                action,
            });
        }
        Ok(())
    }

    /// Record the visitor's details and move on to the calendar.
    pub fn submit_details(&mut self, details: AttendeeDetails) -> Result<()> {
        self.expect_step(BookingStep::Details, "submit details")?;
        details.validate()?;
        self.details = Some(details);
        self.step = BookingStep::Calendar;
        debug!(step = %self.step, "booking details accepted");
        Ok(())
    }

    /// Return from the calendar to edit details. Date and slot are kept.
    pub fn back_to_details(&mut self) -> Result<()> {
        self.expect_step(BookingStep::Calendar, "go back to details")?;
        if self.submitting {
            return Err(SlotError::InvalidTransition {
                step: self.step.as_str(),
                action: "go back while submitting",
            });
        }
        self.step = BookingStep::Details;
        Ok(())
    }

    /// Pick a date. Changing the date clears any chosen slot, since a slot is
    /// pinned to the instants of the date it was generated for.
    pub fn select_date(&mut self, date: NaiveDate, today: NaiveDate) -> Result<()> {
        self.expect_step(BookingStep::Calendar, "select a date")?;
        if !calendar::is_selectable(date, today) {
            return Err(SlotError::DateNotSelectable(date));
        }
        if date != self.selection.selected_date {
            self.selection.selected_slot = None;
        }
        self.selection.selected_date = date;
        Ok(())
    }

    /// Choose a slot. It must have been generated for the selected date.
    pub fn select_slot(&mut self, slot: TimeSlot) -> Result<()> {
        self.expect_step(BookingStep::Calendar, "select a slot")?;
        if slot.provider_date != self.selection.selected_date {
            return Err(SlotError::SlotDateMismatch {
                slot_date: slot.provider_date,
                selected: self.selection.selected_date,
            });
        }
        self.selection.selected_slot = Some(slot);
        Ok(())
    }

    /// Select the slot starting at provider time `provider_time` on the
    /// currently selected date.
    pub fn select_slot_at(
        &mut self,
        schedule: &SlotSchedule,
        visitor_tz: Tz,
        provider_time: &str,
    ) -> Result<()> {
        let available = self.available_slots(schedule, visitor_tz);
        let slot = slots::find_slot(&available, provider_time)
            .cloned()
            .ok_or_else(|| {
                SlotError::InvalidTime(format!(
                    "{provider_time} is not an available slot on {}",
                    self.selection.selected_date
                ))
            })?;
        self.select_slot(slot)
    }

    /// Show a different month. The selection is left alone even when it
    /// scrolls out of view.
    pub fn navigate_month(&mut self, delta: i32) -> Result<()> {
        self.viewed_month = self.viewed_month.advance(delta)?;
        Ok(())
    }

    /// The grid for the month currently in view.
    pub fn grid(&self, today: NaiveDate) -> Vec<CalendarCell> {
        calendar::generate_month_grid(
            self.viewed_month,
            today,
            Some(self.selection.selected_date),
        )
    }

    /// The slots on offer for the selected date.
    pub fn available_slots(&self, schedule: &SlotSchedule, visitor_tz: Tz) -> Vec<TimeSlot> {
        slots::generate_daily_slots(schedule, visitor_tz, self.selection.selected_date)
    }

    pub fn can_submit(&self) -> bool {
        self.step == BookingStep::Calendar
            && self.selection.selected_slot.is_some()
            && !self.submitting
    }

    /// Mark the booking as in flight and return what should be sent.
    pub fn begin_submit(&mut self) -> Result<BookingRequest> {
        self.expect_step(BookingStep::Calendar, "submit")?;
        if !self.can_submit() {
            return Err(SlotError::InvalidTransition {
                step: self.step.as_str(),
                action: "submit without a selected slot",
            });
        }
        let (Some(details), Some(slot)) = (&self.details, &self.selection.selected_slot) else {
            return Err(SlotError::InvalidTransition {
                step: self.step.as_str(),
                action: "submit without details",
            });
        };
        let request = BookingRequest {
            details: details.clone(),
            date: self.selection.selected_date,
            slot: slot.clone(),
        };
        self.submitting = true;
        Ok(request)
    }

    /// The submission succeeded; the session is finished.
    pub fn complete_submit(&mut self) -> Result<()> {
        self.expect_step(BookingStep::Calendar, "complete a submission")?;
        if !self.submitting {
            return Err(SlotError::InvalidTransition {
                step: self.step.as_str(),
                action: "complete a submission that was never started",
            });
        }
        self.submitting = false;
        self.step = BookingStep::Success;
        info!(
            date = %self.selection.selected_date,
            slot = self.selection.selected_slot.as_ref().map(|s| s.provider_time.as_str()),
            "booking confirmed"
        );
        Ok(())
    }

    /// The submission failed; stay on the calendar with the selection intact.
    pub fn fail_submit(&mut self) -> Result<()> {
        self.expect_step(BookingStep::Calendar, "fail a submission")?;
        if !self.submitting {
            return Err(SlotError::InvalidTransition {
                step: self.step.as_str(),
                action: "fail a submission that was never started",
            });
        }
        self.submitting = false;
        Ok(())
    }

    /// Summary shown once the booking is confirmed.
    pub fn confirmation(&self) -> Option<String> {
        if self.step != BookingStep::Success {
            return None;
        }
        let slot = self.selection.selected_slot.as_ref()?;
        Some(format!(
            "Strategy session scheduled for {} at {}.",
            self.selection.selected_date.format("%-d %B"),
            slot.local_label
        ))
    }
}
