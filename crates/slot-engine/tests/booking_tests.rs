//! Tests for the booking flow state machine.

use chrono::NaiveDate;
use slot_engine::booking::{AttendanceScale, AttendeeDetails, BookingFlow, BookingStep};
use slot_engine::calendar::YearMonth;
use slot_engine::{generate_daily_slots, SlotConfig, SlotError, SlotSchedule};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A Monday.
fn today() -> NaiveDate {
    date(2026, 10, 19)
}

fn schedule() -> SlotSchedule {
    SlotConfig::default().into_schedule().unwrap()
}

fn details() -> AttendeeDetails {
    AttendeeDetails {
        name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        company: "Analytical Engines Ltd".to_string(),
        conference: "EngineConf".to_string(),
        challenge: "Sponsorship revenue is flat".to_string(),
        attendees: AttendanceScale::Upto5000,
    }
}

fn flow_on_calendar() -> BookingFlow {
    let mut flow = BookingFlow::new(today());
    flow.submit_details(details()).unwrap();
    flow
}

// ── Initial state ───────────────────────────────────────────────────────────

#[test]
fn new_flow_defaults() {
    let flow = BookingFlow::new(today());
    assert_eq!(flow.step(), BookingStep::Details);
    assert_eq!(flow.selection().selected_date, date(2026, 10, 20));
    assert!(flow.selection().selected_slot.is_none());
    assert_eq!(flow.viewed_month(), YearMonth::new(2026, 10).unwrap());
    assert!(!flow.can_submit());
}

#[test]
fn friday_default_selection_is_next_monday() {
    let flow = BookingFlow::new(date(2026, 10, 23));
    assert_eq!(flow.selection().selected_date, date(2026, 10, 26));
}

// ── Details step ────────────────────────────────────────────────────────────

#[test]
fn details_move_flow_to_calendar() {
    let flow = flow_on_calendar();
    assert_eq!(flow.step(), BookingStep::Calendar);
    assert_eq!(flow.details().unwrap().company, "Analytical Engines Ltd");
}

#[test]
fn missing_required_field_is_rejected() {
    let mut flow = BookingFlow::new(today());
    let err = flow
        .submit_details(AttendeeDetails {
            company: "   ".to_string(),
            ..details()
        })
        .unwrap_err();
    assert_eq!(err, SlotError::InvalidDetails("company is required".to_string()));
    assert_eq!(flow.step(), BookingStep::Details);
}

#[test]
fn challenge_is_optional() {
    let mut flow = BookingFlow::new(today());
    flow.submit_details(AttendeeDetails {
        challenge: String::new(),
        ..details()
    })
    .unwrap();
    assert_eq!(flow.step(), BookingStep::Calendar);
}

#[test]
fn malformed_emails_are_rejected() {
    for email in ["ada", "ada@", "@example.com", "ada@example", "ada @example.com", "a@b@c.com"] {
        let result = AttendeeDetails {
            email: email.to_string(),
            ..details()
        }
        .validate();
        assert!(
            matches!(result, Err(SlotError::InvalidDetails(_))),
            "{email} should be rejected"
        );
    }
}

#[test]
fn attendance_scale_labels() {
    assert_eq!(AttendanceScale::default(), AttendanceScale::Under500);
    assert_eq!(AttendanceScale::from_label("5,000+"), Some(AttendanceScale::Over5000));
    assert_eq!(
        AttendanceScale::from_label(" 500 - 1,000 "),
        Some(AttendanceScale::Upto1000)
    );
    assert_eq!(AttendanceScale::from_label("lots"), None);

    let json = serde_json::to_string(&AttendanceScale::Upto5000).unwrap();
    assert_eq!(json, "\"1,000 - 5,000\"");
}

// ── Calendar step ───────────────────────────────────────────────────────────

#[test]
fn back_to_details_keeps_selection() {
    let mut flow = flow_on_calendar();
    flow.select_slot_at(&schedule(), chrono_tz::UTC, "08:45").unwrap();
    flow.back_to_details().unwrap();

    assert_eq!(flow.step(), BookingStep::Details);
    assert_eq!(
        flow.selection().selected_slot.as_ref().unwrap().provider_time,
        "08:45"
    );
}

#[test]
fn weekend_and_past_dates_cannot_be_selected() {
    let mut flow = flow_on_calendar();
    assert_eq!(
        flow.select_date(date(2026, 10, 24), today()),
        Err(SlotError::DateNotSelectable(date(2026, 10, 24)))
    );
    assert_eq!(
        flow.select_date(date(2026, 10, 16), today()),
        Err(SlotError::DateNotSelectable(date(2026, 10, 16)))
    );
    assert!(flow.select_date(today(), today()).is_ok());
}

#[test]
fn changing_date_clears_slot() {
    let mut flow = flow_on_calendar();
    flow.select_slot_at(&schedule(), chrono_tz::UTC, "10:15").unwrap();

    flow.select_date(date(2026, 10, 20), today()).unwrap();
    assert!(flow.selection().selected_slot.is_some(), "same date keeps slot");

    flow.select_date(date(2026, 10, 22), today()).unwrap();
    assert!(flow.selection().selected_slot.is_none());
    assert!(!flow.can_submit());
}

#[test]
fn unknown_slot_time_is_rejected() {
    let mut flow = flow_on_calendar();
    let err = flow
        .select_slot_at(&schedule(), chrono_tz::UTC, "09:00")
        .unwrap_err();
    assert!(matches!(err, SlotError::InvalidTime(_)));
}

#[test]
fn month_navigation_does_not_clear_selection() {
    let mut flow = flow_on_calendar();
    flow.select_date(date(2026, 10, 30), today()).unwrap();
    flow.navigate_month(2).unwrap();

    assert_eq!(flow.viewed_month(), YearMonth::new(2026, 12).unwrap());
    assert_eq!(flow.selection().selected_date, date(2026, 10, 30));
    assert!(flow.grid(today()).iter().all(|c| !c.is_selected));

    flow.navigate_month(-2).unwrap();
    assert_eq!(flow.grid(today()).iter().filter(|c| c.is_selected).count(), 1);
}

#[test]
fn month_navigation_out_of_range_keeps_viewed_month() {
    let mut flow = flow_on_calendar();
    assert!(matches!(
        flow.navigate_month(i32::MAX),
        Err(SlotError::InvalidMonth(_))
    ));
    assert_eq!(flow.viewed_month(), YearMonth::new(2026, 10).unwrap());
}

#[test]
fn slot_from_another_date_is_rejected() {
    let mut flow = flow_on_calendar();
    flow.select_date(date(2026, 10, 20), today()).unwrap();
    let other_day = generate_daily_slots(&schedule(), chrono_tz::UTC, date(2026, 11, 5));

    assert_eq!(
        flow.select_slot(other_day[0].clone()),
        Err(SlotError::SlotDateMismatch {
            slot_date: date(2026, 11, 5),
            selected: date(2026, 10, 20),
        })
    );
    assert!(flow.selection().selected_slot.is_none());
    assert!(!flow.can_submit());

    let same_day = generate_daily_slots(&schedule(), chrono_tz::UTC, date(2026, 10, 20));
    flow.select_slot(same_day[0].clone()).unwrap();
    assert!(flow.can_submit());
}

#[test]
fn available_slots_follow_selected_date() {
    let mut flow = flow_on_calendar();
    flow.select_date(date(2026, 10, 22), today()).unwrap();
    let slots = flow.available_slots(&schedule(), chrono_tz::UTC);
    assert_eq!(slots.len(), 16);
    // 2026-10-22 is still BST in London, so 08:00 London is 07:00 UTC.
    assert_eq!(slots[0].local_label, "7:00 AM");
}

// ── Submission ──────────────────────────────────────────────────────────────

#[test]
fn submit_requires_a_slot() {
    let mut flow = flow_on_calendar();
    assert!(!flow.can_submit());
    assert!(matches!(
        flow.begin_submit(),
        Err(SlotError::InvalidTransition { .. })
    ));
}

#[test]
fn full_booking_reaches_success() {
    let mut flow = flow_on_calendar();
    flow.select_date(date(2026, 11, 5), today()).unwrap();
    flow.select_slot_at(&schedule(), chrono_tz::Europe::London, "09:30")
        .unwrap();
    assert!(flow.can_submit());

    let request = flow.begin_submit().unwrap();
    assert!(flow.is_submitting());
    assert!(!flow.can_submit(), "no double submission");
    assert_eq!(request.date, date(2026, 11, 5));
    assert_eq!(request.slot.provider_time, "09:30");
    assert_eq!(request.details.email, "ada@example.com");

    flow.complete_submit().unwrap();
    assert_eq!(flow.step(), BookingStep::Success);
    assert!(!flow.is_submitting());
    assert_eq!(
        flow.confirmation().unwrap(),
        "Strategy session scheduled for 5 November at 9:30 AM."
    );
}

#[test]
fn failed_submission_allows_retry() {
    let mut flow = flow_on_calendar();
    flow.select_slot_at(&schedule(), chrono_tz::UTC, "08:00").unwrap();
    flow.begin_submit().unwrap();

    assert!(flow.back_to_details().is_err(), "cannot leave mid-submit");
    flow.fail_submit().unwrap();
    assert_eq!(flow.step(), BookingStep::Calendar);
    assert!(flow.can_submit());
    assert!(flow.begin_submit().is_ok());
}

#[test]
fn fail_submit_requires_a_submission_in_flight() {
    let mut flow = BookingFlow::new(today());
    assert!(matches!(
        flow.fail_submit(),
        Err(SlotError::InvalidTransition { step: "details", .. })
    ));

    flow.submit_details(details()).unwrap();
    assert_eq!(
        flow.fail_submit(),
        Err(SlotError::InvalidTransition {
            step: "calendar",
            action: "fail a submission that was never started",
        })
    );

    flow.select_slot_at(&schedule(), chrono_tz::UTC, "08:00").unwrap();
    flow.begin_submit().unwrap();
    flow.complete_submit().unwrap();
    assert!(matches!(
        flow.fail_submit(),
        Err(SlotError::InvalidTransition { step: "success", .. })
    ));
    assert_eq!(flow.step(), BookingStep::Success);
}

#[test]
fn success_is_terminal() {
    let mut flow = flow_on_calendar();
    flow.select_slot_at(&schedule(), chrono_tz::UTC, "08:00").unwrap();
    flow.begin_submit().unwrap();
    flow.complete_submit().unwrap();

    assert_eq!(
        flow.back_to_details(),
        Err(SlotError::InvalidTransition {
            step: "success",
            action: "go back to details",
        })
    );
    assert!(flow.select_date(date(2026, 10, 21), today()).is_err());
    assert!(flow.begin_submit().is_err());
    assert!(flow.submit_details(details()).is_err());
}

#[test]
fn actions_out_of_order_are_rejected() {
    let mut flow = BookingFlow::new(today());
    assert!(flow.select_date(date(2026, 10, 21), today()).is_err());
    assert!(flow.back_to_details().is_err());
    assert!(flow.complete_submit().is_err());
    assert!(flow.confirmation().is_none());

    let mut flow = flow_on_calendar();
    assert!(flow.complete_submit().is_err(), "never started");
}

#[test]
fn request_serializes_for_the_endpoint() {
    let mut flow = flow_on_calendar();
    flow.select_slot_at(&schedule(), chrono_tz::UTC, "08:00").unwrap();
    let request = flow.begin_submit().unwrap();

    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["date"], "2026-10-20");
    assert_eq!(json["details"]["attendees"], "1,000 - 5,000");
    assert_eq!(json["slot"]["provider_time"], "08:00");
}
