use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// One roster cell value. `Off` is a real assignment, not an absence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Shift {
    Day,
    Late,
    Night,
    Off,
}

pub const ALL_SHIFTS: [Shift; 4] = [Shift::Day, Shift::Late, Shift::Night, Shift::Off];
pub const WORK_SHIFTS: [Shift; 3] = [Shift::Day, Shift::Late, Shift::Night];

impl Shift {
    /// Stable index into per-shift tables, in ALL_SHIFTS order.
    pub fn index(self) -> usize {
        match self {
            Shift::Day => 0,
            Shift::Late => 1,
            Shift::Night => 2,
            Shift::Off => 3,
        }
    }

    pub fn is_work(self) -> bool {
        self != Shift::Off
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Shift::Day => "DAY",
            Shift::Late => "LATE",
            Shift::Night => "NIGHT",
            Shift::Off => "OFF",
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Shift {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DAY" => Ok(Shift::Day),
            "LATE" => Ok(Shift::Late),
            "NIGHT" => Ok(Shift::Night),
            "OFF" => Ok(Shift::Off),
            other => Err(DomainError::Parse(format!("unknown shift {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Team {
    A,
    B,
    Er,
}

pub const ALL_TEAMS: [Team; 3] = [Team::A, Team::B, Team::Er];

impl Team {
    pub fn as_str(self) -> &'static str {
        match self {
            Team::A => "A",
            Team::B => "B",
            Team::Er => "ER",
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Team {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(Team::A),
            "B" => Ok(Team::B),
            "ER" => Ok(Team::Er),
            other => Err(DomainError::Parse(format!("unknown team {other}"))),
        }
    }
}
