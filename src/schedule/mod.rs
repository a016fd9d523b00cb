//! Rotating-partner round scheduler.
//!
//! Rounds are generated up front. Each round:
//! 1. Orders the roster by sit-outs so far (most first, stable).
//! 2. Greedily gives each unpaired player the later partner they have been
//!    paired with least often (first minimum in scan order wins).
//! 3. Shuffles the pairs and pops them two at a time into matches.
//! 4. Credits a sit-out to everyone left without a pair and bumps the
//!    partnership count of every pair formed.
//!
//! This is a greedy heuristic, not an optimal matching.

use std::collections::{BTreeMap, HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::models::{Match, Roster, Round, Team};

/// Canonical display key for a partnership: both names sorted and joined.
pub fn pair_key(p1: &str, p2: &str) -> String {
    if p1 <= p2 {
        format!("{}-{}", p1, p2)
    } else {
        format!("{}-{}", p2, p1)
    }
}

/// What happens to the pair left over when a round forms an odd number of pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LeftoverPolicy {
    /// Whichever pair is left after the shuffle rests, but its players are
    /// not credited a sit-out.
    #[default]
    CountAsPlayed,

    /// The last pair formed (fewest sit-outs) rests before the shuffle and
    /// both players are credited a sit-out.
    SitOut,
}

/// How many rounds each unordered pair has been partnered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartnershipCounts {
    counts: HashMap<(String, String), u32>,
}

impl PartnershipCounts {
    fn ordered(p1: &str, p2: &str) -> (String, String) {
        if p1 <= p2 {
            (p1.to_string(), p2.to_string())
        } else {
            (p2.to_string(), p1.to_string())
        }
    }

    /// Rounds `p1` and `p2` have been partnered (order-insensitive).
    pub fn get(&self, p1: &str, p2: &str) -> u32 {
        self.counts
            .get(&Self::ordered(p1, p2))
            .copied()
            .unwrap_or(0)
    }

    pub fn increment(&mut self, p1: &str, p2: &str) {
        *self.counts.entry(Self::ordered(p1, p2)).or_insert(0) += 1;
    }

    /// Highest count over all recorded pairs (0 when empty).
    pub fn max(&self) -> u32 {
        self.counts.values().copied().max().unwrap_or(0)
    }

    /// Number of distinct pairs partnered at least once.
    pub fn distinct_pairs(&self) -> usize {
        self.counts.len()
    }

    /// Counts keyed by [`pair_key`], sorted.
    pub fn to_keyed(&self) -> BTreeMap<String, u32> {
        self.counts
            .iter()
            .map(|((a, b), count)| (pair_key(a, b), *count))
            .collect()
    }
}

/// Rounds sat out per roster player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SitOutCounts {
    counts: BTreeMap<String, u32>,
}

impl SitOutCounts {
    /// Zero for every roster member.
    pub fn for_roster(roster: &Roster) -> Self {
        Self {
            counts: roster.players().iter().map(|p| (p.clone(), 0)).collect(),
        }
    }

    pub fn get(&self, player: &str) -> u32 {
        self.counts.get(player).copied().unwrap_or(0)
    }

    fn increment(&mut self, player: &str) {
        if let Some(count) = self.counts.get_mut(player) {
            *count += 1;
        }
    }

    /// Max minus min over the roster.
    pub fn spread(&self) -> u32 {
        let max = self.counts.values().copied().max().unwrap_or(0);
        let min = self.counts.values().copied().min().unwrap_or(0);
        max - min
    }
}

/// Generated rounds plus the bookkeeping carried between them.
#[derive(Debug, Clone)]
pub struct Schedule {
    pub rounds: Vec<Round>,
    pub requested: usize,
    pub partnerships: PartnershipCounts,
    pub sit_outs: SitOutCounts,
}

impl Schedule {
    /// Fewer rounds were produced than requested.
    pub fn is_exhausted(&self) -> bool {
        self.rounds.len() < self.requested
    }
}

/// Output of one round before it is committed.
struct RoundPlan {
    round: Round,
    /// Every pair formed, including one that did not get a match.
    pairs: Vec<(String, String)>,
    /// Players credited a sit-out this round.
    sat_out: Vec<String>,
}

/// Greedy rotating-partner scheduler.
#[derive(Debug, Clone, Copy, Default)]
pub struct PairingScheduler {
    leftover: LeftoverPolicy,
}

impl PairingScheduler {
    pub fn new(leftover: LeftoverPolicy) -> Self {
        Self { leftover }
    }

    pub fn leftover_policy(&self) -> LeftoverPolicy {
        self.leftover
    }

    /// Generate `round_count` rounds for `roster`.
    ///
    /// The caller validates `round_count` against [`Roster::validate_round_count`].
    /// A round that cannot form a single match is dropped and logged; the
    /// schedule then holds fewer rounds than requested.
    pub fn generate_rounds<R: Rng + ?Sized>(
        &self,
        roster: &Roster,
        round_count: usize,
        rng: &mut R,
    ) -> Schedule {
        let mut partnerships = PartnershipCounts::default();
        let mut sit_outs = SitOutCounts::for_roster(roster);
        let mut rounds = Vec::with_capacity(round_count);

        for i in 0..round_count {
            let plan = self.plan_round(roster, &partnerships, &sit_outs, rng);
            if plan.round.is_empty() {
                warn!("Could not generate round {}. Pairings exhausted.", i + 1);
                continue;
            }

            for (p1, p2) in &plan.pairs {
                partnerships.increment(p1, p2);
            }
            for player in &plan.sat_out {
                sit_outs.increment(player);
            }

            debug!(
                "Round {}: {} matches, bench {:?}",
                i + 1,
                plan.round.matches.len(),
                plan.round.bench
            );
            rounds.push(plan.round);
        }

        info!(
            "Scheduled {}/{} rounds for {} players",
            rounds.len(),
            round_count,
            roster.len()
        );

        Schedule {
            rounds,
            requested: round_count,
            partnerships,
            sit_outs,
        }
    }

    fn plan_round<R: Rng + ?Sized>(
        &self,
        roster: &Roster,
        partnerships: &PartnershipCounts,
        sit_outs: &SitOutCounts,
        rng: &mut R,
    ) -> RoundPlan {
        let mut order: Vec<&str> = roster.players().iter().map(String::as_str).collect();
        // Stable: equal sit-outs keep roster order.
        order.sort_by(|a, b| sit_outs.get(b).cmp(&sit_outs.get(a)));

        let mut paired: HashSet<&str> = HashSet::new();
        let mut pairs: Vec<(&str, &str)> = Vec::new();

        for (i, &p1) in order.iter().enumerate() {
            if paired.contains(p1) {
                continue;
            }

            let mut best: Option<(&str, u32)> = None;
            for &p2 in &order[i + 1..] {
                if paired.contains(p2) {
                    continue;
                }
                let count = partnerships.get(p1, p2);
                if best.map_or(true, |(_, min)| count < min) {
                    best = Some((p2, count));
                }
            }

            if let Some((p2, _)) = best {
                paired.insert(p1);
                paired.insert(p2);
                pairs.push((p1, p2));
            }
        }

        let formed: Vec<(String, String)> = pairs
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect();

        let mut sat_out: Vec<String> = order
            .iter()
            .filter(|p| !paired.contains(*p))
            .map(|p| p.to_string())
            .collect();

        if pairs.len() % 2 == 1 && self.leftover == LeftoverPolicy::SitOut {
            if let Some((a, b)) = pairs.pop() {
                sat_out.push(a.to_string());
                sat_out.push(b.to_string());
            }
        }

        pairs.shuffle(rng);

        // Pairs are taken off the back, two at a time.
        let matches: Vec<Match> = pairs
            .rchunks_exact(2)
            .map(|chunk| {
                let (t1, t2) = (chunk[1], chunk[0]);
                Match::new(Team::new(t1.0, t1.1), Team::new(t2.0, t2.1))
            })
            .collect();

        let playing: HashSet<&str> = matches.iter().flat_map(|m| m.players()).collect();
        let bench = order
            .iter()
            .filter(|p| !playing.contains(*p))
            .map(|p| p.to_string())
            .collect();

        RoundPlan {
            round: Round { matches, bench },
            pairs: formed,
            sat_out,
        }
    }
}
