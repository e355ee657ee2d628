//! Typed ID wrapper for catalog entries.
//!
//! The store assigns the surrogate key on first insert; wrapping it keeps raw
//! integers from leaking across the query and route layers.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Surrogate key of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(i64);

impl MovieId {
    /// The raw integer key.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for MovieId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<MovieId> for i64 {
    fn from(id: MovieId) -> Self {
        id.0
    }
}

impl FromStr for MovieId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self)
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let id: MovieId = "17".parse().unwrap();
        assert_eq!(id.get(), 17);
        assert_eq!(id.to_string(), "17");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("abc".parse::<MovieId>().is_err());
        assert!("".parse::<MovieId>().is_err());
        assert!("1.5".parse::<MovieId>().is_err());
    }

    #[test]
    fn test_serde_transparent() {
        let id = MovieId::from(9);
        assert_eq!(serde_json::to_string(&id).unwrap(), "9");
        let back: MovieId = serde_json::from_str("9").unwrap();
        assert_eq!(back, id);
    }
}
