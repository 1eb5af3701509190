//! Duty roster model.
//!
//! # Responsibility
//! - Hold the ordered rotating participants and the special participant.
//!
//! # Invariants
//! - The rotating list is non-empty and every name is distinct.
//! - The special participant is never part of the rotating list.
//! - Names are trimmed and non-blank.

use serde::Serialize;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Roster construction errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    EmptyRoster,
    BlankName,
    DuplicateName(String),
    SpecialInRotation(String),
}

impl Display for RosterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyRoster => write!(f, "roster needs at least one rotating participant"),
            Self::BlankName => write!(f, "participant names cannot be blank"),
            Self::DuplicateName(name) => write!(f, "participant `{name}` is listed twice"),
            Self::SpecialInRotation(name) => write!(
                f,
                "special participant `{name}` must not appear in the rotating roster"
            ),
        }
    }
}

impl Error for RosterError {}

/// Ordered rotating participants plus the biweekly special participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Roster {
    members: Vec<String>,
    special: String,
}

impl Roster {
    pub fn new<I, S>(members: I, special: impl Into<String>) -> Result<Self, RosterError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let special = special.into().trim().to_string();
        if special.is_empty() {
            return Err(RosterError::BlankName);
        }

        let mut seen = BTreeSet::new();
        let mut normalized = Vec::new();
        for member in members {
            let name = member.into().trim().to_string();
            if name.is_empty() {
                return Err(RosterError::BlankName);
            }
            if name == special {
                return Err(RosterError::SpecialInRotation(name));
            }
            if !seen.insert(name.clone()) {
                return Err(RosterError::DuplicateName(name));
            }
            normalized.push(name);
        }

        if normalized.is_empty() {
            return Err(RosterError::EmptyRoster);
        }

        Ok(Self {
            members: normalized,
            special,
        })
    }

    /// Rotating participants in rotation order.
    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn special(&self) -> &str {
        &self.special
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Never true for a constructed roster.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_special(&self, name: &str) -> bool {
        self.special == name
    }

    /// Whether `name` is a rotating participant or the special one.
    pub fn contains(&self, name: &str) -> bool {
        self.is_special(name) || self.members.iter().any(|member| member == name)
    }

    /// Every participant: rotating order first, then the special participant.
    pub fn everyone(&self) -> impl Iterator<Item = &str> {
        self.members
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.special.as_str()))
    }
}
