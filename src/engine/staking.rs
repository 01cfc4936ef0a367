//! Selection and staking policy.
//!
//! For a valued fixture the single outcome with the highest edge is picked
//! (ties resolved in the order HOME, DRAW, AWAY). A bet is only made when that
//! edge is strictly greater than `min_edge`; the stake is a flat fraction of
//! the portfolio's balance at the moment of selection and is never revised.

use crate::db::models::Outcome;

use super::value::{OutcomeEdges, Valuation};

pub const DEFAULT_MIN_EDGE: f64 = 0.10;
pub const DEFAULT_STAKE_FRACTION: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StakingPolicy {
    /// Exclusive gate on the best edge
    pub min_edge: f64,
    /// Fraction of current balance staked per wager (0.0–1.0)
    pub stake_fraction: f64,
}

impl Default for StakingPolicy {
    fn default() -> Self {
        StakingPolicy {
            min_edge: DEFAULT_MIN_EDGE,
            stake_fraction: DEFAULT_STAKE_FRACTION,
        }
    }
}

/// A bet the policy accepted, with everything frozen onto the wager.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BetSlip {
    pub outcome: Outcome,
    pub stake: f64,
    pub odds: f64,
    pub probability: f64,
    pub edge: f64,
}

/// Highest finite edge; earlier outcomes win ties.
pub fn best_outcome(edges: &OutcomeEdges) -> Option<(Outcome, f64)> {
    let mut best: Option<(Outcome, f64)> = None;
    for outcome in Outcome::ALL {
        let e = edges.get(outcome);
        if !e.is_finite() {
            continue;
        }
        match best {
            Some((_, b)) if e <= b => {}
            _ => best = Some((outcome, e)),
        }
    }
    best
}

/// Flat-fraction stake on the current balance.
pub fn stake_for(balance: f64, stake_fraction: f64) -> f64 {
    if balance <= 0.0 || !balance.is_finite() {
        return 0.0;
    }
    (balance * stake_fraction).clamp(0.0, balance)
}

impl StakingPolicy {
    /// Whether an edge clears the gate. The boundary itself does not.
    pub fn passes_gate(&self, edge: f64) -> bool {
        edge > self.min_edge
    }

    /// Decide whether and how much to bet on a valued fixture.
    pub fn select(&self, valuation: &Valuation, balance: f64) -> Option<BetSlip> {
        let (outcome, edge) = best_outcome(&valuation.edges)?;
        if !self.passes_gate(edge) {
            return None;
        }
        let stake = stake_for(balance, self.stake_fraction);
        if stake <= 0.0 {
            return None;
        }
        Some(BetSlip {
            outcome,
            stake,
            odds: valuation.odds.get(outcome),
            probability: valuation.probabilities.get(outcome),
            edge,
        })
    }
}
