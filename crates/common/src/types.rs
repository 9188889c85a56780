//! Request-side domain types shared by the model and engine crates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Label used by the trained artifacts ("Monday" .. "Sunday").
    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Weekday::ALL
            .iter()
            .copied()
            .find(|day| day.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| Error::InvalidContext(format!("unknown weekday '{}'", trimmed)))
    }
}

/// Situational features a price decision is made under.
///
/// Deserialization goes through [`Context::new`], so a decoded context
/// always has a month in 1..=12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawContext")]
pub struct Context {
    pub weekday: Weekday,
    pub month: u32,
    pub is_event: bool,
}

impl Context {
    /// Build a context, rejecting months outside 1..=12.
    pub fn new(weekday: Weekday, month: u32, is_event: bool) -> crate::Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidContext(format!(
                "month must be in [1,12], got {}",
                month
            )));
        }
        Ok(Self {
            weekday,
            month,
            is_event,
        })
    }

    /// Event flag as the 0/1 integer the model was trained on.
    pub fn event_flag(&self) -> u8 {
        u8::from(self.is_event)
    }
}

#[derive(Deserialize)]
struct RawContext {
    weekday: Weekday,
    month: u32,
    is_event: bool,
}

impl TryFrom<RawContext> for Context {
    type Error = Error;

    fn try_from(raw: RawContext) -> Result<Self, Self::Error> {
        Context::new(raw.weekday, raw.month, raw.is_event)
    }
}

/// One pricing request as received from the front-end.
///
/// `item_id` and `min_margin` stay raw so the engine can report
/// "no item selected" and "invalid guardrail" as outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRequest {
    #[serde(default)]
    pub item_id: Option<String>,
    pub context: Context,
    #[serde(default)]
    pub min_margin: Option<String>,
    #[serde(default = "default_true")]
    pub explore: bool,
}

fn default_true() -> bool {
    true
}
