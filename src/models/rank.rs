//! Kendo rank: Mudansha < 10..1 Kyu < 1..8 Dan.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A member's grade. Serialized as its label ("Mudansha", "3 Kyu", "2 Dan").
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Rank {
    /// Ungraded.
    #[default]
    Mudansha,
    /// 10 Kyu (lowest) up to 1 Kyu.
    Kyu(u8),
    /// 1 Dan up to 8 Dan (highest).
    Dan(u8),
}

impl Rank {
    /// Position on the grading ladder: Mudansha = 0, 10 Kyu = 1, ..., 1 Kyu = 10, 1 Dan = 11, ...
    pub fn ordinal(self) -> u8 {
        match self {
            Rank::Mudansha => 0,
            Rank::Kyu(k) => 11u8.saturating_sub(k),
            Rank::Dan(d) => 10u8.saturating_add(d),
        }
    }

    /// Display label, also the searchable text.
    pub fn label(self) -> String {
        self.to_string()
    }
}

impl Ord for Rank {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ordinal().cmp(&other.ordinal())
    }
}

impl PartialOrd for Rank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rank::Mudansha => write!(f, "Mudansha"),
            Rank::Kyu(k) => write!(f, "{} Kyu", k),
            Rank::Dan(d) => write!(f, "{} Dan", d),
        }
    }
}

/// Label that does not name a valid rank.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseRankError(pub String);

impl fmt::Display for ParseRankError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown rank: {}", self.0)
    }
}

impl std::error::Error for ParseRankError {}

impl FromStr for Rank {
    type Err = ParseRankError;

    /// Accepts "Mudansha", "3 Kyu", "3kyu", "2 dan" (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseRankError(s.to_string());
        let lower = s.trim().to_lowercase();
        if lower == "mudansha" {
            return Ok(Rank::Mudansha);
        }
        let (num, kind) = if let Some(n) = lower.strip_suffix("kyu") {
            (n, "kyu")
        } else if let Some(n) = lower.strip_suffix("dan") {
            (n, "dan")
        } else {
            return Err(err());
        };
        let n: u8 = num.trim().parse().map_err(|_| err())?;
        match kind {
            "kyu" if (1..=10).contains(&n) => Ok(Rank::Kyu(n)),
            "dan" if (1..=8).contains(&n) => Ok(Rank::Dan(n)),
            _ => Err(err()),
        }
    }
}

impl TryFrom<String> for Rank {
    type Error = ParseRankError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Rank> for String {
    fn from(r: Rank) -> Self {
        r.to_string()
    }
}
