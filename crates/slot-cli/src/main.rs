//! `slots` CLI — list bookable meeting slots, render month grids, and run a
//! booking from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Slots for the next weekday, labelled in the visitor's timezone ($TZ)
//! slots slots
//!
//! # Slots for a given date, as seen from New York
//! slots --visitor-tz America/New_York slots --date 2026-11-05
//!
//! # Custom working hours from a JSON config, overridden on the command line
//! slots --config provider.json --duration 30 slots
//!
//! # Month grid for date picking
//! slots calendar --month 2025-11
//!
//! # Book a slot and print the request as JSON
//! slots --json book --name "Ada" --email ada@example.com \
//!   --company "Engines Ltd" --conference EngineConf --date 2026-11-05 --time 09:30
//! ```

mod logging;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use serde::Serialize;
use slot_engine::booking::{AttendanceScale, AttendeeDetails, BookingFlow};
use slot_engine::calendar::{self, CalendarCell, YearMonth, DAYS_PER_WEEK};
use slot_engine::config::parse_hhmm;
use slot_engine::slots::{self, TimeSlot};
use slot_engine::{SlotConfig, SlotSchedule};
use tracing::{debug, warn};

#[derive(Parser)]
#[command(
    name = "slots",
    version,
    about = "Meeting slot and booking calendar CLI"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON file with the provider configuration (defaults apply to missing fields)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Provider IANA timezone (overrides the config file)
    #[arg(long, global = true)]
    provider_tz: Option<String>,

    /// Start of working hours, HH:MM in provider time
    #[arg(long, global = true)]
    start: Option<String>,

    /// End of working hours, HH:MM in provider time (24:00 allowed)
    #[arg(long, global = true)]
    end: Option<String>,

    /// Meeting length in minutes
    #[arg(long, global = true)]
    duration: Option<u32>,

    /// Visitor IANA timezone (defaults to $TZ, then UTC)
    #[arg(long, global = true)]
    visitor_tz: Option<String>,

    /// Treat this date as today (YYYY-MM-DD)
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the slots offered on a date
    Slots {
        /// Date to list (defaults to the next weekday after today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Render the month grid used for date picking
    Calendar {
        /// Month to render, YYYY-MM (defaults to the current month)
        #[arg(long)]
        month: Option<YearMonth>,
        /// Date to mark as selected (defaults to the next weekday after today)
        #[arg(long)]
        selected: Option<NaiveDate>,
    },
    /// Book a slot and print the confirmation
    Book {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        company: String,
        #[arg(long)]
        conference: String,
        /// What the visitor wants to discuss
        #[arg(long, default_value = "")]
        challenge: String,
        /// Expected audience: "Under 500", "500 - 1,000", "1,000 - 5,000", "5,000+"
        #[arg(long, default_value = "Under 500")]
        attendees: String,
        /// Date of the meeting (defaults to the next weekday after today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Slot start, HH:MM in provider time
        #[arg(long)]
        time: String,
    },
}

/// Everything the commands need from the environment, resolved once.
struct Session {
    schedule: SlotSchedule,
    visitor_tz: Tz,
    today: NaiveDate,
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_cli_logger(cli.verbose);

    let schedule = build_schedule(&cli)?;
    let visitor_tz = resolve_visitor_tz(cli.visitor_tz.as_deref())?;
    let today = cli
        .today
        .unwrap_or_else(|| calendar::today_in(visitor_tz, Utc::now()));
    debug!(%visitor_tz, %today, "session resolved");

    let session = Session {
        schedule,
        visitor_tz,
        today,
        json: cli.json,
    };

    match cli.command {
        Commands::Slots { date } => {
            let date = date.unwrap_or_else(|| calendar::next_selectable_date(session.today));
            let slots = slots::generate_daily_slots(&session.schedule, session.visitor_tz, date);
            if session.json {
                println!("{}", serde_json::to_string_pretty(&slots)?);
            } else {
                print!("{}", render_slots(&session, date, &slots));
            }
        }
        Commands::Calendar { month, selected } => {
            let month = month.unwrap_or_else(|| YearMonth::of(session.today));
            let selected =
                selected.unwrap_or_else(|| calendar::next_selectable_date(session.today));
            let cells = calendar::generate_month_grid(month, session.today, Some(selected));
            if session.json {
                let grid = MonthGridOutput {
                    month: month.to_string(),
                    label: month.label(),
                    cells,
                };
                println!("{}", serde_json::to_string_pretty(&grid)?);
            } else {
                print!("{}", render_grid(month, &cells));
            }
        }
        Commands::Book {
            name,
            email,
            company,
            conference,
            challenge,
            attendees,
            date,
            time,
        } => {
            let attendees = AttendanceScale::from_label(&attendees).with_context(|| {
                format!(
                    "Unknown attendee scale: '{}'. Expected one of: {}",
                    attendees,
                    AttendanceScale::ALL.map(|s| s.label()).join(", ")
                )
            })?;
            let details = AttendeeDetails {
                name,
                email,
                company,
                conference,
                challenge,
                attendees,
            };
            run_booking(&session, details, date, &time)?;
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct MonthGridOutput {
    month: String,
    label: String,
    cells: Vec<CalendarCell>,
}

/// Defaults, then the `--config` file, then individual flags.
fn build_schedule(cli: &Cli) -> Result<SlotSchedule> {
    let mut config = match cli.config.as_deref() {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path))?;
            SlotConfig::from_json(&raw)
                .with_context(|| format!("Failed to parse config file: {}", path))?
        }
        None => SlotConfig::default(),
    };

    if let Some(tz) = &cli.provider_tz {
        config.provider_timezone = tz.clone();
    }
    if let Some(start) = &cli.start {
        config.window_start_minutes = parse_hhmm(start).context("Invalid --start")?;
    }
    if let Some(end) = &cli.end {
        config.window_end_minutes = parse_hhmm(end).context("Invalid --end")?;
    }
    if let Some(duration) = cli.duration {
        config.duration_minutes = duration;
    }

    config
        .into_schedule()
        .context("Invalid slot configuration")
}

/// An explicit `--visitor-tz` must be valid. A `$TZ` we cannot read is
/// ignored in favour of UTC, since the visitor did not choose it.
fn resolve_visitor_tz(flag: Option<&str>) -> Result<Tz> {
    if let Some(name) = flag {
        return slot_engine::parse_timezone(name).context("Invalid --visitor-tz");
    }
    match std::env::var("TZ") {
        Ok(name) if !name.is_empty() => match slot_engine::parse_timezone(&name) {
            Ok(tz) => Ok(tz),
            Err(e) => {
                warn!(error = %e, "ignoring unreadable $TZ; using UTC");
                Ok(chrono_tz::UTC)
            }
        },
        _ => Ok(chrono_tz::UTC),
    }
}

fn run_booking(
    session: &Session,
    details: AttendeeDetails,
    date: Option<NaiveDate>,
    time: &str,
) -> Result<()> {
    let mut flow = BookingFlow::new(session.today);
    flow.submit_details(details)
        .context("Booking details were rejected")?;
    if let Some(date) = date {
        flow.select_date(date, session.today)
            .context("Cannot book on that date")?;
    }
    flow.select_slot_at(&session.schedule, session.visitor_tz, time)
        .context("Cannot book that time")?;

    // The request would go to the booking endpoint here; this CLI only prints it.
    let request = flow.begin_submit().context("Booking could not be submitted")?;
    flow.complete_submit()?;

    if session.json {
        println!("{}", serde_json::to_string_pretty(&request)?);
    } else if let Some(message) = flow.confirmation() {
        println!("{}", message);
    }
    Ok(())
}

fn render_slots(session: &Session, date: NaiveDate, slots: &[TimeSlot]) -> String {
    let mut out = format!(
        "Slots for {} ({} minutes, provider {}, visitor {})\n",
        date,
        session.schedule.duration(),
        session.schedule.provider_tz(),
        session.visitor_tz
    );
    if slots.is_empty() {
        out.push_str("No availability.\n");
        return out;
    }
    for slot in slots {
        out.push_str(&format!(
            "  {}  {:>8}  ->  {:>8}",
            slot.provider_time, slot.provider_label, slot.local_label
        ));
        if slot.local_date != date {
            out.push_str(&format!(" ({})", slot.local_date));
        }
        out.push('\n');
    }
    out
}

/// Six rows of seven cells: `[dd]` selected, `(dd)` unavailable.
fn render_grid(month: YearMonth, cells: &[CalendarCell]) -> String {
    let mut out = format!("{}\n Mo   Tu   We   Th   Fr   Sa   Su\n", month.label());
    for week in cells.chunks(DAYS_PER_WEEK) {
        let row: Vec<String> = week
            .iter()
            .map(|cell| match cell.date {
                None => "    ".to_string(),
                Some(d) => {
                    let day = d.day();
                    if cell.is_selected {
                        format!("[{:>2}]", day)
                    } else if cell.selectable {
                        format!(" {:>2} ", day)
                    } else {
                        format!("({:>2})", day)
                    }
                }
            })
            .collect();
        out.push_str(row.join(" ").trim_end());
        out.push('\n');
    }
    out
}
