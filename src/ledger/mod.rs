//! Match score entry.
//!
//! Matches are best-of format: the winner always ends on [`WINNING_SCORE`].
//! Entering a losing score (< 3) for one team pins the other team to 3.
//! Entering 3 leaves the opponent alone, so both teams can briefly sit on 3;
//! such a match stays incomplete until one side is corrected.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::{Match, Round, Side, WINNING_SCORE};

/// Errors from score entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Score {0} is out of range (0-3)")]
    ScoreOutOfRange(u8),

    #[error("Round {0} does not exist")]
    UnknownRound(usize),

    #[error("Match {match_index} does not exist in round {round}")]
    UnknownMatch { round: usize, match_index: usize },
}

/// Position of a match within the schedule (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRef {
    pub round: usize,
    pub match_index: usize,
}

impl std::fmt::Display for MatchRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "round {} match {}", self.round + 1, self.match_index + 1)
    }
}

/// Record `value` for `side` of a single match.
pub fn apply_score(m: &mut Match, side: Side, value: u8) -> Result<(), LedgerError> {
    if value > WINNING_SCORE {
        return Err(LedgerError::ScoreOutOfRange(value));
    }

    m.team_mut(side).score = Some(value);
    if value < WINNING_SCORE {
        m.team_mut(side.other()).score = Some(WINNING_SCORE);
    }
    Ok(())
}

/// Record `value` for `side` of match `match_index` in round `round`.
pub fn set_score(
    rounds: &mut [Round],
    round: usize,
    match_index: usize,
    side: Side,
    value: u8,
) -> Result<(), LedgerError> {
    let m = rounds
        .get_mut(round)
        .ok_or(LedgerError::UnknownRound(round))?
        .matches
        .get_mut(match_index)
        .ok_or(LedgerError::UnknownMatch { round, match_index })?;

    apply_score(m, side, value)?;
    debug!(
        "Score set: round {} match {} {} = {} ({:?} - {:?})",
        round + 1,
        match_index + 1,
        side,
        value,
        m.team1.score,
        m.team2.score
    );
    Ok(())
}

/// Every match in every round is decided.
pub fn is_tournament_complete(rounds: &[Round]) -> bool {
    rounds
        .iter()
        .all(|round| round.matches.iter().all(Match::is_complete))
}

/// Matches still missing a decisive score, in schedule order.
pub fn outstanding_matches(rounds: &[Round]) -> Vec<MatchRef> {
    rounds
        .iter()
        .enumerate()
        .flat_map(|(r, round)| {
            round
                .matches
                .iter()
                .enumerate()
                .filter(|(_, m)| !m.is_complete())
                .map(move |(i, _)| MatchRef {
                    round: r,
                    match_index: i,
                })
        })
        .collect()
}
