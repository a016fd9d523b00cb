//! Tournament roster and round-count validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest roster that can fill one doubles match.
pub const MIN_PLAYERS: usize = 4;

/// Input validation failures. These are never fixed up silently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter at least 4 players (got {0})")]
    RosterTooSmall(usize),

    #[error("Player names must not be blank")]
    BlankName,

    #[error("Player {0:?} is already on the roster")]
    DuplicatePlayer(String),

    #[error("Please select a number of rounds")]
    NoRounds,

    #[error("With {players} players, the maximum number of unique partner rounds is {max} (requested {requested})")]
    TooManyRounds {
        players: usize,
        max: usize,
        requested: usize,
    },
}

/// Maximum number of rounds a roster of `players` can be scheduled for.
///
/// An even roster runs out of fresh partners after `n - 1` rounds; an odd
/// roster gets one extra round because somebody always sits out.
pub fn max_rounds(players: usize) -> usize {
    if players % 2 == 0 {
        players.saturating_sub(1)
    } else {
        players
    }
}

/// The fixed set of players entered for one tournament, in entry order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Roster {
    players: Vec<String>,
}

impl Roster {
    /// Build a roster from entered names. Names are trimmed; identity is
    /// case-sensitive.
    pub fn new<I, S>(names: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut players: Vec<String> = Vec::new();
        for name in names {
            let name: String = name.into();
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return Err(ValidationError::BlankName);
            }
            if players.iter().any(|p| p == trimmed) {
                return Err(ValidationError::DuplicatePlayer(trimmed.to_string()));
            }
            players.push(trimmed.to_string());
        }

        if players.len() < MIN_PLAYERS {
            return Err(ValidationError::RosterTooSmall(players.len()));
        }

        Ok(Self { players })
    }

    /// Players in entry order.
    pub fn players(&self) -> &[String] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.players.iter().any(|p| p == name)
    }

    /// Maximum schedulable rounds for this roster.
    pub fn max_rounds(&self) -> usize {
        max_rounds(self.players.len())
    }

    /// Check a requested round count against this roster.
    pub fn validate_round_count(&self, requested: usize) -> Result<(), ValidationError> {
        if requested == 0 {
            return Err(ValidationError::NoRounds);
        }
        let max = self.max_rounds();
        if requested > max {
            return Err(ValidationError::TooManyRounds {
                players: self.players.len(),
                max,
                requested,
            });
        }
        Ok(())
    }
}

impl TryFrom<Vec<String>> for Roster {
    type Error = ValidationError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        Roster::new(names)
    }
}

impl From<Roster> for Vec<String> {
    fn from(roster: Roster) -> Self {
        roster.players
    }
}

/// One entry of the round-count selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoundChoice {
    pub rounds: usize,
    pub enabled: bool,
}

/// Selectable round counts `1..=limit`, enabled up to what the roster allows.
pub fn round_choices(players: usize, limit: usize) -> Vec<RoundChoice> {
    let max = if players >= MIN_PLAYERS {
        max_rounds(players)
    } else {
        0
    };
    (1..=limit)
        .map(|rounds| RoundChoice {
            rounds,
            enabled: rounds <= max,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_rounds() {
        assert_eq!(max_rounds(4), 3);
        assert_eq!(max_rounds(5), 5);
        assert_eq!(max_rounds(8), 7);
        assert_eq!(max_rounds(9), 9);
    }

    #[test]
    fn test_roster_trims_names() {
        let roster = Roster::new(["  Ann ", "Ben", "Cat", "Dan"]).unwrap();
        assert_eq!(roster.players()[0], "Ann");
        assert!(roster.contains("Ann"));
        assert_eq!(roster.len(), 4);
    }

    #[test]
    fn test_roster_too_small() {
        let err = Roster::new(["Ann", "Ben", "Cat"]).unwrap_err();
        assert_eq!(err, ValidationError::RosterTooSmall(3));
    }

    #[test]
    fn test_roster_rejects_duplicates_case_sensitively() {
        let err = Roster::new(["Ann", "Ben", "Cat", "Ann"]).unwrap_err();
        assert_eq!(err, ValidationError::DuplicatePlayer("Ann".to_string()));

        // Different case is a different player.
        assert!(Roster::new(["Ann", "ann", "Cat", "Dan"]).is_ok());
    }

    #[test]
    fn test_roster_rejects_blank() {
        let err = Roster::new(["Ann", "  ", "Cat", "Dan"]).unwrap_err();
        assert_eq!(err, ValidationError::BlankName);
    }

    #[test]
    fn test_validate_round_count() {
        let even = Roster::new(["A", "B", "C", "D", "E", "F"]).unwrap();
        assert!(even.validate_round_count(5).is_ok());
        assert_eq!(
            even.validate_round_count(6),
            Err(ValidationError::TooManyRounds {
                players: 6,
                max: 5,
                requested: 6
            })
        );
        assert_eq!(even.validate_round_count(0), Err(ValidationError::NoRounds));

        let odd = Roster::new(["A", "B", "C", "D", "E"]).unwrap();
        assert!(odd.validate_round_count(5).is_ok());
    }

    #[test]
    fn test_roster_deserialize_validates() {
        let ok: Roster = serde_json::from_str(r#"["A","B","C","D"]"#).unwrap();
        assert_eq!(ok.len(), 4);
        assert!(serde_json::from_str::<Roster>(r#"["A","B"]"#).is_err());
    }

    #[test]
    fn test_round_choices() {
        let choices = round_choices(6, 13);
        assert_eq!(choices.len(), 13);
        assert_eq!(choices.iter().filter(|c| c.enabled).count(), 5);
        assert!(choices[4].enabled);
        assert!(!choices[5].enabled);

        assert!(round_choices(3, 13).iter().all(|c| !c.enabled));
    }
}
