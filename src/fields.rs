//! Enumerations and field types for tasks.
//!
//! This module defines the priority rank, the lifecycle state and the sort
//! vocabulary (fields and directions) shared by the store, the view stages,
//! the CLI and the TUI.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

/// Task priority as a rank. Rank 1 is the highest priority.
///
/// The declaration order matches the rank, so the derived `Ord` sorts
/// `High < Medium < Low` and an ascending priority sort lists the most
/// important work first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Priority {
    High = 1,
    Medium = 2,
    #[default]
    Low = 3,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// Numeric rank, 1 = highest.
    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn from_rank(rank: u64) -> Option<Self> {
        match rank {
            1 => Some(Priority::High),
            2 => Some(Priority::Medium),
            3 => Some(Priority::Low),
            _ => None,
        }
    }

    /// Parse a label such as "high" or "Medium".
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.rank())
    }
}

struct PriorityVisitor;

impl<'de> Visitor<'de> for PriorityVisitor {
    type Value = Priority;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a priority rank 1-3 or one of \"high\", \"medium\", \"low\"")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Priority, E> {
        Priority::from_rank(v).ok_or_else(|| E::custom(format!("priority rank out of range: {v}")))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Priority, E> {
        u64::try_from(v)
            .ok()
            .and_then(Priority::from_rank)
            .ok_or_else(|| E::custom(format!("priority rank out of range: {v}")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Priority, E> {
        // Numeric strings show up when ranks were stored from a text input.
        if let Ok(rank) = v.trim().parse::<u64>() {
            return self.visit_u64(rank);
        }
        Priority::from_label(v).ok_or_else(|| E::unknown_variant(v, &["high", "medium", "low"]))
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PriorityVisitor)
    }
}

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum State {
    #[default]
    #[serde(alias = "Active")]
    Active,
    #[serde(alias = "Completed")]
    Completed,
}

impl State {
    pub const ALL: [State; 2] = [State::Active, State::Completed];

    pub fn flipped(self) -> Self {
        match self {
            State::Active => State::Completed,
            State::Completed => State::Active,
        }
    }
}

/// Task fields a view can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    Id,
    Title,
    Category,
    Description,
    Priority,
    Deadline,
    State,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "id" => Ok(SortField::Id),
            "title" => Ok(SortField::Title),
            "category" | "categories" => Ok(SortField::Category),
            "description" | "desc" => Ok(SortField::Description),
            "priority" => Ok(SortField::Priority),
            "deadline" | "due" => Ok(SortField::Deadline),
            "state" | "status" => Ok(SortField::State),
            other => Err(format!("unknown sort field '{other}'")),
        }
    }
}

/// Sort direction for a single key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn reversed(self) -> Self {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" | "up" => Ok(Direction::Asc),
            "desc" | "descending" | "down" => Ok(Direction::Desc),
            other => Err(format!("unknown sort direction '{other}'")),
        }
    }
}
