//! Engine configuration.
//!
//! # Responsibility
//! - Describe roster, cadence anchor, swap horizon and calendar feed shape.
//! - Load and validate configuration from TOML.
//!
//! # Invariants
//! - Defaults reproduce the household the engine was written for.
//! - A config that passes `validate()` always yields a usable `Rotation`.

use crate::model::roster::{Roster, RosterError};
use crate::model::week_key::{WeekInputError, WeekKey};
use crate::schedule::rotation::Rotation;
use crate::schedule::swap::DEFAULT_SWAP_HORIZON_WEEKS;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration loading and validation errors.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    Roster(RosterError),
    Anchor(WeekInputError),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::Roster(err) => write!(f, "invalid roster: {err}"),
            Self::Anchor(err) => write!(f, "invalid cadence anchor: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Roster(err) => Some(err),
            Self::Anchor(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

impl From<RosterError> for ConfigError {
    fn from(value: RosterError) -> Self {
        Self::Roster(value)
    }
}

impl From<WeekInputError> for ConfigError {
    fn from(value: WeekInputError) -> Self {
        Self::Anchor(value)
    }
}

/// Cadence anchor as written in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorConfig {
    pub year: i32,
    pub week: u32,
}

/// Active window of each calendar event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventMode {
    /// Wednesday through Saturday, reminder on Tuesday at 20:00 local time.
    MidWeek,
    /// Monday through Sunday, reminder 24 hours before Monday.
    WholeWeek,
}

/// Encoding of event start/end values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateForm {
    /// `VALUE=DATE` all-day values.
    AllDay,
    /// Local midnight timestamps bound to the configured `TZID`.
    Timed,
}

/// Time zone published in the feed's `VTIMEZONE` block.
///
/// Transitions follow the EU rule: last Sunday of March and October.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimezoneConfig {
    pub tzid: String,
    /// Winter offset, e.g. `+0100`.
    pub standard_offset: String,
    /// Summer offset, e.g. `+0200`.
    pub daylight_offset: String,
}

impl Default for TimezoneConfig {
    fn default() -> Self {
        Self {
            tzid: "Europe/Zurich".to_string(),
            standard_offset: "+0100".to_string(),
            daylight_offset: "+0200".to_string(),
        }
    }
}

/// Calendar feed settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub mode: EventMode,
    pub date_form: DateForm,
    pub timezone: TimezoneConfig,
    pub calendar_name: String,
    pub description: String,
    /// Domain suffix of event UIDs.
    pub uid_domain: String,
    /// Optional web app link added to event descriptions.
    pub webapp_url: Option<String>,
    /// Horizon of the served feed, counted from the current week.
    pub feed_horizon_months: u32,
    /// Horizon of one-off file exports.
    pub export_horizon_weeks: u32,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            mode: EventMode::MidWeek,
            date_form: DateForm::AllDay,
            timezone: TimezoneConfig::default(),
            calendar_name: "KitchenDuty".to_string(),
            description: "Kitchen cleaning schedule".to_string(),
            uid_domain: "kitchen-duty.local".to_string(),
            webapp_url: None,
            feed_horizon_months: 3,
            export_horizon_weeks: 26,
        }
    }
}

/// History display settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub recent_limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { recent_limit: 4 }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DutyConfig {
    pub roster: Vec<String>,
    pub special: String,
    pub anchor: AnchorConfig,
    pub swap_horizon_weeks: u32,
    pub calendar: CalendarConfig,
    pub history: HistoryConfig,
}

impl Default for DutyConfig {
    fn default() -> Self {
        Self {
            roster: ["Joya", "Alessandro", "Filippo", "Cédric"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            special: "Maria".to_string(),
            anchor: AnchorConfig {
                year: 2025,
                week: 48,
            },
            swap_horizon_weeks: DEFAULT_SWAP_HORIZON_WEEKS,
            calendar: CalendarConfig::default(),
            history: HistoryConfig::default(),
        }
    }
}

impl DutyConfig {
    /// Parses TOML text and validates the result.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every cross-field rule.
    pub fn validate(&self) -> ConfigResult<()> {
        self.rotation()?;
        if self.swap_horizon_weeks == 0 {
            return Err(ConfigError::Invalid(
                "swap_horizon_weeks must be at least 1".to_string(),
            ));
        }
        if self.calendar.uid_domain.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "calendar.uid_domain cannot be empty".to_string(),
            ));
        }
        if self.calendar.timezone.tzid.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "calendar.timezone.tzid cannot be empty".to_string(),
            ));
        }
        for offset in [
            &self.calendar.timezone.standard_offset,
            &self.calendar.timezone.daylight_offset,
        ] {
            if !is_utc_offset(offset) {
                return Err(ConfigError::Invalid(format!(
                    "timezone offset `{offset}` must look like +HHMM or -HHMM"
                )));
            }
        }
        Ok(())
    }

    /// Builds the roster and anchor into a resolver.
    pub fn rotation(&self) -> ConfigResult<Rotation> {
        let roster = Roster::new(self.roster.iter().cloned(), self.special.clone())?;
        let anchor = WeekKey::new(self.anchor.year, self.anchor.week)?;
        Ok(Rotation::new(roster, anchor))
    }
}

/// Loads configuration from `path`, falling back to defaults when absent.
pub fn load_config(path: Option<&Path>) -> ConfigResult<DutyConfig> {
    let Some(path) = path else {
        return Ok(DutyConfig::default());
    };
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    DutyConfig::from_toml_str(&text)
}

fn is_utc_offset(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 5
        && matches!(bytes[0], b'+' | b'-')
        && bytes[1..].iter().all(u8::is_ascii_digit)
}
