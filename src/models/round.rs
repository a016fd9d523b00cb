//! Rounds, matches and teams.

use serde::{Deserialize, Serialize};

/// Score a team needs to take a match.
pub const WINNING_SCORE: u8 = 3;

/// Which side of a match a team is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Team1,
    Team2,
}

impl Side {
    /// The opposing side.
    pub fn other(self) -> Self {
        match self {
            Side::Team1 => Side::Team2,
            Side::Team2 => Side::Team1,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Team1 => write!(f, "team1"),
            Side::Team2 => write!(f, "team2"),
        }
    }
}

/// Two partnered players and the games they took in this match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub p1: String,
    pub p2: String,
    pub score: Option<u8>,
}

impl Team {
    /// Create an unscored team.
    pub fn new(p1: impl Into<String>, p2: impl Into<String>) -> Self {
        Self {
            p1: p1.into(),
            p2: p2.into(),
            score: None,
        }
    }

    pub fn players(&self) -> [&str; 2] {
        [&self.p1, &self.p2]
    }

    pub fn contains(&self, name: &str) -> bool {
        self.p1 == name || self.p2 == name
    }
}

/// A doubles match between two teams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub team1: Team,
    pub team2: Team,
}

impl Match {
    pub fn new(team1: Team, team2: Team) -> Self {
        Self { team1, team2 }
    }

    pub fn team(&self, side: Side) -> &Team {
        match side {
            Side::Team1 => &self.team1,
            Side::Team2 => &self.team2,
        }
    }

    pub fn team_mut(&mut self, side: Side) -> &mut Team {
        match side {
            Side::Team1 => &mut self.team1,
            Side::Team2 => &mut self.team2,
        }
    }

    /// All four players, team1 first.
    pub fn players(&self) -> [&str; 4] {
        [
            &self.team1.p1,
            &self.team1.p2,
            &self.team2.p1,
            &self.team2.p2,
        ]
    }

    /// Both scores entered and unequal.
    pub fn is_complete(&self) -> bool {
        matches!(
            (self.team1.score, self.team2.score),
            (Some(a), Some(b)) if a != b
        )
    }

    /// Side with the strictly higher score, once complete.
    pub fn winner(&self) -> Option<Side> {
        match (self.team1.score, self.team2.score) {
            (Some(a), Some(b)) if a > b => Some(Side::Team1),
            (Some(a), Some(b)) if b > a => Some(Side::Team2),
            _ => None,
        }
    }
}

/// One generation step: the matches played plus everyone resting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub matches: Vec<Match>,

    /// Players without a match this round, in roster scan order.
    #[serde(default)]
    pub bench: Vec<String>,
}

impl Round {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Whether `name` plays in any match of this round.
    pub fn plays(&self, name: &str) -> bool {
        self.matches
            .iter()
            .any(|m| m.team1.contains(name) || m.team2.contains(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(a: Option<u8>, b: Option<u8>) -> Match {
        let mut m = Match::new(Team::new("A", "B"), Team::new("C", "D"));
        m.team1.score = a;
        m.team2.score = b;
        m
    }

    #[test]
    fn test_match_completion() {
        assert!(!scored(None, None).is_complete());
        assert!(!scored(Some(3), None).is_complete());
        assert!(!scored(Some(3), Some(3)).is_complete());
        assert!(scored(Some(3), Some(1)).is_complete());
        assert!(scored(Some(0), Some(3)).is_complete());
    }

    #[test]
    fn test_match_winner() {
        assert_eq!(scored(Some(3), Some(2)).winner(), Some(Side::Team1));
        assert_eq!(scored(Some(1), Some(3)).winner(), Some(Side::Team2));
        assert_eq!(scored(Some(3), Some(3)).winner(), None);
        assert_eq!(scored(None, Some(3)).winner(), None);
    }

    #[test]
    fn test_side_serialization() {
        assert_eq!(serde_json::to_string(&Side::Team1).unwrap(), "\"team1\"");
        let side: Side = serde_json::from_str("\"team2\"").unwrap();
        assert_eq!(side, Side::Team2);
        assert_eq!(side.other(), Side::Team1);
    }

    #[test]
    fn test_round_plays() {
        let round = Round {
            matches: vec![scored(None, None)],
            bench: vec!["E".to_string()],
        };
        assert!(round.plays("C"));
        assert!(!round.plays("E"));
    }
}
