//! Leaderboard aggregation.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::models::{Leaderboard, PlayerTournamentResult, Roster, Round, Standing};

/// Fold every complete match into per-player totals and rank the roster.
///
/// Incomplete matches (missing or tied scores) contribute nothing.
pub fn aggregate(roster: &Roster, rounds: &[Round]) -> Leaderboard {
    let mut totals: BTreeMap<&str, PlayerTournamentResult> = roster
        .players()
        .iter()
        .map(|p| (p.as_str(), PlayerTournamentResult::default()))
        .collect();

    let mut counted = 0;
    for m in rounds.iter().flat_map(|round| &round.matches) {
        let (Some(s1), Some(s2)) = (m.team1.score, m.team2.score) else {
            continue;
        };
        if s1 == s2 {
            continue;
        }
        counted += 1;

        let sides = [(&m.team1, &m.team2, s1, s2), (&m.team2, &m.team1, s2, s1)];
        for (own, opposing, own_score, opposing_score) in sides {
            let diff = own_score as i32 - opposing_score as i32;
            for player in own.players() {
                let Some(res) = totals.get_mut(player) else {
                    warn!("Ignoring result for {:?}: not on the roster", player);
                    continue;
                };
                res.matches_played += 1;
                res.total_games_played += u32::from(s1) + u32::from(s2);
                res.games_won += u32::from(own_score);
                res.games_lost += u32::from(opposing_score);
                if own_score > opposing_score {
                    res.match_wins += 1;
                }
                for opponent in opposing.players() {
                    *res.opponents.entry(opponent.to_string()).or_insert(0) += diff;
                }
            }
        }
    }

    debug!(
        "Aggregated {} complete matches for {} players",
        counted,
        totals.len()
    );

    let standings = totals
        .into_iter()
        .map(|(name, result)| Standing {
            name: name.to_string(),
            result,
        })
        .collect();

    Leaderboard {
        standings: rank(standings),
    }
}

/// Ranking order: match wins, then games won, then head-to-head differential,
/// then name. `Less` means `a` ranks above `b`.
pub fn compare_standings(a: &Standing, b: &Standing) -> Ordering {
    b.result
        .match_wins
        .cmp(&a.result.match_wins)
        .then_with(|| b.result.games_won.cmp(&a.result.games_won))
        .then_with(|| {
            let head_to_head =
                a.result.differential_against(&b.name) - b.result.differential_against(&a.name);
            0.cmp(&head_to_head)
        })
        .then_with(|| a.name.cmp(&b.name))
}

/// Insert each standing before the first one it outranks.
///
/// Head-to-head results can be cyclic among three or more tied players, so
/// the comparison is not transitive and must not be handed to `sort_by`.
/// Every adjacent pair in the output is still correctly ordered.
fn rank(standings: Vec<Standing>) -> Vec<Standing> {
    let mut ranked: Vec<Standing> = Vec::with_capacity(standings.len());
    for standing in standings {
        let pos = ranked
            .iter()
            .position(|placed| compare_standings(&standing, placed) == Ordering::Less)
            .unwrap_or(ranked.len());
        ranked.insert(pos, standing);
    }
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::set_score;
    use crate::models::{Match, Side, Team};
    use crate::schedule::{LeftoverPolicy, PairingScheduler};
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn game(t1: (&str, &str), s1: u8, t2: (&str, &str), s2: u8) -> Match {
        let mut m = Match::new(Team::new(t1.0, t1.1), Team::new(t2.0, t2.1));
        m.team1.score = Some(s1);
        m.team2.score = Some(s2);
        m
    }

    fn round(matches: Vec<Match>) -> Round {
        Round {
            matches,
            bench: Vec::new(),
        }
    }

    #[test]
    fn test_single_match_example() {
        let roster = Roster::new(["A", "B", "C", "D"]).unwrap();
        let rounds = vec![round(vec![game(("A", "B"), 3, ("C", "D"), 1)])];

        let board = aggregate(&roster, &rounds);
        assert_eq!(board.names(), vec!["A", "B", "C", "D"]);

        let a = board.get("A").unwrap();
        assert_eq!(a.match_wins, 1);
        assert_eq!(a.games_won, 3);
        assert_eq!(a.games_lost, 1);
        assert_eq!(a.total_games_played, 4);
        assert_eq!(a.differential_against("C"), 2);
        assert_eq!(a.differential_against("B"), 0);

        let c = board.get("C").unwrap();
        assert_eq!(c.match_wins, 0);
        assert_eq!(c.games_won, 1);
        assert_eq!(c.matches_played, 1);
        assert_eq!(c.differential_against("A"), -2);
    }

    #[test]
    fn test_incomplete_matches_are_skipped() {
        let roster = Roster::new(["A", "B", "C", "D"]).unwrap();
        let tied = game(("A", "B"), 3, ("C", "D"), 3);
        let mut unscored = game(("A", "C"), 0, ("B", "D"), 0);
        unscored.team1.score = None;
        unscored.team2.score = None;

        let board = aggregate(&roster, &[round(vec![tied]), round(vec![unscored])]);
        for standing in &board.standings {
            assert_eq!(standing.result, PlayerTournamentResult::default());
        }
        // No results at all: alphabetical.
        assert_eq!(board.names(), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_differential_accumulates_across_meetings() {
        let roster = Roster::new(["A", "B", "C", "D"]).unwrap();
        let rounds = vec![
            round(vec![game(("A", "B"), 3, ("C", "D"), 1)]),
            round(vec![game(("A", "D"), 0, ("C", "B"), 3)]),
        ];
        let board = aggregate(&roster, &rounds);
        let a = board.get("A").unwrap();
        // +2 in round one, -3 in round two.
        assert_eq!(a.differential_against("C"), -1);
        assert_eq!(a.differential_against("D"), 2);
        assert_eq!(a.differential_against("B"), -3);
        assert_eq!(a.win_loss_diff(), -1);
    }

    #[test]
    fn test_head_to_head_beats_name_order() {
        let roster = Roster::new(["Amy", "Zed", "P1", "P2", "P3", "P4", "P5", "P6"]).unwrap();
        let rounds = vec![
            round(vec![game(("Zed", "P1"), 3, ("Amy", "P2"), 2)]),
            round(vec![
                game(("Amy", "P3"), 3, ("P4", "P5"), 1),
                game(("P1", "P6"), 3, ("Zed", "P2"), 2),
            ]),
        ];

        let board = aggregate(&roster, &rounds);
        let amy = board.get("Amy").unwrap();
        let zed = board.get("Zed").unwrap();
        assert_eq!((amy.match_wins, amy.games_won), (1, 5));
        assert_eq!((zed.match_wins, zed.games_won), (1, 5));
        assert!(board.rank_of("Zed").unwrap() < board.rank_of("Amy").unwrap());
    }

    #[test]
    fn test_games_won_breaks_equal_wins() {
        let roster = Roster::new(["A", "B", "C", "D"]).unwrap();
        let rounds = vec![
            round(vec![game(("A", "B"), 3, ("C", "D"), 2)]),
            round(vec![game(("A", "C"), 3, ("B", "D"), 0)]),
        ];
        let board = aggregate(&roster, &rounds);
        // A: 2 wins; B and C: 1 win each, C won more games; D: 0 wins.
        assert_eq!(board.names(), vec!["A", "C", "B", "D"]);
    }

    #[test]
    fn test_aggregate_ignores_roster_order() {
        let rounds = vec![
            round(vec![game(("A", "B"), 3, ("C", "D"), 2)]),
            round(vec![game(("A", "C"), 1, ("B", "D"), 3)]),
        ];
        let forward = aggregate(&Roster::new(["A", "B", "C", "D"]).unwrap(), &rounds);
        let backward = aggregate(&Roster::new(["D", "C", "B", "A"]).unwrap(), &rounds);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_cyclic_head_to_head_still_ranks_everyone() {
        // X beats Y, Y beats Z, Z beats X, all on identical totals.
        let roster = Roster::new(["X", "Y", "Z", "F1", "F2", "F3"]).unwrap();
        let rounds = vec![
            round(vec![game(("X", "F1"), 3, ("Y", "F2"), 2)]),
            round(vec![game(("Y", "F3"), 3, ("Z", "F1"), 2)]),
            round(vec![game(("Z", "F2"), 3, ("X", "F3"), 2)]),
        ];
        let first = aggregate(&roster, &rounds);
        let second = aggregate(&roster, &rounds);
        assert_eq!(first, second);
        assert_eq!(first.len(), 6);
        for pair in first.standings.windows(2) {
            assert_eq!(compare_standings(&pair[0], &pair[1]), Ordering::Less);
        }
    }

    #[test]
    fn test_generated_tournament_is_totally_ordered() {
        let names: Vec<String> = (1..=9).map(|i| format!("Player{}", i)).collect();
        let roster = Roster::new(names).unwrap();
        let mut rng = StdRng::seed_from_u64(17);
        let schedule = PairingScheduler::new(LeftoverPolicy::CountAsPlayed)
            .generate_rounds(&roster, 9, &mut rng);
        let mut rounds = schedule.rounds;

        for r in 0..rounds.len() {
            for m in 0..rounds[r].matches.len() {
                let side = if rng.gen_bool(0.5) {
                    Side::Team1
                } else {
                    Side::Team2
                };
                set_score(&mut rounds, r, m, side, rng.gen_range(0..3)).unwrap();
            }
        }

        let board = aggregate(&roster, &rounds);
        assert_eq!(board.len(), 9);
        for a in &board.standings {
            for b in &board.standings {
                if a.name != b.name {
                    assert_eq!(compare_standings(a, b), compare_standings(b, a).reverse());
                }
            }
        }
        for pair in board.standings.windows(2) {
            assert_eq!(compare_standings(&pair[0], &pair[1]), Ordering::Less);
        }

        let total_wins: u32 = board.standings.iter().map(|s| s.result.match_wins).sum();
        let total_played: u32 = board.standings.iter().map(|s| s.result.matches_played).sum();
        assert_eq!(total_wins * 2, total_played);
    }
}
