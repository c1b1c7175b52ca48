//! Provider configuration for slot generation.
//!
//! [`SlotConfig`] is the raw, serializable form (what a JSON file or a JS
//! caller provides). [`SlotConfig::into_schedule`] validates it once and
//! returns a [`SlotSchedule`], the only type slot generation accepts, so a bad
//! timezone or window fails at startup rather than on every render.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::dst::DstPolicy;
use crate::error::{Result, SlotError};

pub const MINUTES_PER_DAY: u32 = 24 * 60;

pub const DEFAULT_WINDOW_START: u32 = 8 * 60;
pub const DEFAULT_WINDOW_END: u32 = 20 * 60;
pub const DEFAULT_DURATION: u32 = 45;
pub const DEFAULT_PROVIDER_TIMEZONE: &str = "Europe/London";

/// Working hours and meeting length as published by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotConfig {
    /// Minutes past midnight (provider time) at which the first slot may start.
    pub window_start_minutes: u32,
    /// Minutes past midnight (provider time) by which the last slot must end.
    pub window_end_minutes: u32,
    /// Length of every meeting, in minutes.
    pub duration_minutes: u32,
    /// IANA timezone the working hours are defined in.
    pub provider_timezone: String,
    /// How to resolve wall-clock times repeated by a DST fall-back.
    pub dst_policy: DstPolicy,
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            window_start_minutes: DEFAULT_WINDOW_START,
            window_end_minutes: DEFAULT_WINDOW_END,
            duration_minutes: DEFAULT_DURATION,
            provider_timezone: DEFAULT_PROVIDER_TIMEZONE.to_string(),
            dst_policy: DstPolicy::default(),
        }
    }
}

impl SlotConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| SlotError::InvalidConfig(e.to_string()))
    }

    /// Validate the config and parse its timezone.
    ///
    /// # Errors
    /// - `InvalidDuration` if `duration_minutes` is zero
    /// - `WindowOutOfRange` if either bound is past 24:00
    /// - `InvalidWindow` if the window is empty or inverted
    /// - `InvalidTimezone` if `provider_timezone` is not an IANA identifier
    pub fn into_schedule(self) -> Result<SlotSchedule> {
        SlotSchedule::new(self)
    }
}

/// A validated [`SlotConfig`] with its provider timezone resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotSchedule {
    window_start: u32,
    window_end: u32,
    duration: u32,
    provider_tz: Tz,
    dst_policy: DstPolicy,
}

impl SlotSchedule {
    pub fn new(config: SlotConfig) -> Result<Self> {
        if config.duration_minutes == 0 {
            return Err(SlotError::InvalidDuration(config.duration_minutes));
        }
        for bound in [config.window_start_minutes, config.window_end_minutes] {
            if bound > MINUTES_PER_DAY {
                return Err(SlotError::WindowOutOfRange(bound));
            }
        }
        if config.window_start_minutes >= config.window_end_minutes {
            return Err(SlotError::InvalidWindow {
                start: config.window_start_minutes,
                end: config.window_end_minutes,
            });
        }
        let provider_tz = parse_timezone(&config.provider_timezone)?;

        Ok(Self {
            window_start: config.window_start_minutes,
            window_end: config.window_end_minutes,
            duration: config.duration_minutes,
            provider_tz,
            dst_policy: config.dst_policy,
        })
    }

    pub fn window_start(&self) -> u32 {
        self.window_start
    }

    pub fn window_end(&self) -> u32 {
        self.window_end
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn provider_tz(&self) -> Tz {
        self.provider_tz
    }

    pub fn dst_policy(&self) -> DstPolicy {
        self.dst_policy
    }

    /// Number of slots every day yields under this schedule.
    pub fn slots_per_day(&self) -> usize {
        ((self.window_end - self.window_start) / self.duration) as usize
    }
}

/// Parse an IANA timezone identifier.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse()
        .map_err(|_| SlotError::InvalidTimezone(name.to_string()))
}

/// Parse `HH:MM` (24-hour) into minutes past midnight. `24:00` is accepted so
/// a window can run to the end of the day.
pub fn parse_hhmm(s: &str) -> Result<u32> {
    let invalid = || SlotError::InvalidTime(s.to_string());

    let (h, m) = s.trim().split_once(':').ok_or_else(invalid)?;
    if h.is_empty() || h.len() > 2 || m.len() != 2 {
        return Err(invalid());
    }
    let hours: u32 = h.parse().map_err(|_| invalid())?;
    let minutes: u32 = m.parse().map_err(|_| invalid())?;

    if minutes > 59 || hours > 24 || (hours == 24 && minutes != 0) {
        return Err(invalid());
    }
    Ok(hours * 60 + minutes)
}

/// Render minutes past midnight as zero-padded `HH:MM`.
pub fn format_hhmm(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let schedule = SlotConfig::default().into_schedule().unwrap();
        assert_eq!(schedule.window_start(), 480);
        assert_eq!(schedule.window_end(), 1200);
        assert_eq!(schedule.duration(), 45);
        assert_eq!(schedule.provider_tz(), chrono_tz::Europe::London);
        assert_eq!(schedule.slots_per_day(), 16);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = SlotConfig::from_json(r#"{"duration_minutes": 30}"#).unwrap();
        assert_eq!(config.duration_minutes, 30);
        assert_eq!(config.window_start_minutes, DEFAULT_WINDOW_START);
        assert_eq!(config.provider_timezone, DEFAULT_PROVIDER_TIMEZONE);
        assert_eq!(config.dst_policy, DstPolicy::Earlier);
    }

    #[test]
    fn malformed_json_is_config_error() {
        let err = SlotConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, SlotError::InvalidConfig(_)));
    }

    #[test]
    fn zero_duration_rejected() {
        let config = SlotConfig {
            duration_minutes: 0,
            ..SlotConfig::default()
        };
        assert_eq!(config.into_schedule(), Err(SlotError::InvalidDuration(0)));
    }

    #[test]
    fn inverted_window_rejected() {
        let config = SlotConfig {
            window_start_minutes: 1200,
            window_end_minutes: 480,
            ..SlotConfig::default()
        };
        assert_eq!(
            config.into_schedule(),
            Err(SlotError::InvalidWindow {
                start: 1200,
                end: 480
            })
        );
    }

    #[test]
    fn empty_window_rejected() {
        let config = SlotConfig {
            window_start_minutes: 600,
            window_end_minutes: 600,
            ..SlotConfig::default()
        };
        assert!(matches!(
            config.into_schedule(),
            Err(SlotError::InvalidWindow { .. })
        ));
    }

    #[test]
    fn window_past_midnight_rejected() {
        let config = SlotConfig {
            window_end_minutes: 1500,
            ..SlotConfig::default()
        };
        assert_eq!(
            config.into_schedule(),
            Err(SlotError::WindowOutOfRange(1500))
        );
    }

    #[test]
    fn bad_timezone_rejected() {
        let config = SlotConfig {
            provider_timezone: "Mars/Olympus_Mons".to_string(),
            ..SlotConfig::default()
        };
        assert_eq!(
            config.into_schedule(),
            Err(SlotError::InvalidTimezone("Mars/Olympus_Mons".to_string()))
        );
    }

    #[test]
    fn hhmm_parsing() {
        assert_eq!(parse_hhmm("08:00").unwrap(), 480);
        assert_eq!(parse_hhmm("8:30").unwrap(), 510);
        assert_eq!(parse_hhmm("19:15").unwrap(), 1155);
        assert_eq!(parse_hhmm("24:00").unwrap(), 1440);
        assert!(parse_hhmm("24:30").is_err());
        assert!(parse_hhmm("12:60").is_err());
        assert!(parse_hhmm("1200").is_err());
        assert!(parse_hhmm("ab:cd").is_err());
        assert!(parse_hhmm(":30").is_err());
    }

    #[test]
    fn hhmm_formatting() {
        assert_eq!(format_hhmm(0), "00:00");
        assert_eq!(format_hhmm(480), "08:00");
        assert_eq!(format_hhmm(1155), "19:15");
    }
}
