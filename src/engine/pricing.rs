//! Pre-match outcome pricing from season aggregates.
//!
//! Each side's goal count is modelled as an independent Poisson variable whose
//! mean comes from an attack/defence rating against the pooled average of the
//! two teams:
//!
//!   attack  = (goals for / played) / avg_for
//!   defence = (goals against / played) / avg_against
//!   λ_home  = home_attack · away_defence · avg_for
//!   λ_away  = away_attack · home_defence · avg_for
//!
//! Both λ use `avg_for` as the scale. The scoreline grid is truncated at
//! [`MAX_GOALS`] per side and the three outcome masses are renormalised.

use serde::Serialize;

use crate::db::models::{Outcome, TeamSeasonStats};

/// Highest goal count per side enumerated in the scoreline grid (0..=7 → 64 cells).
pub const MAX_GOALS: usize = 7;

/// Normalised 1X2 probabilities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutcomeProbabilities {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

impl OutcomeProbabilities {
    pub fn get(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Home => self.home,
            Outcome::Draw => self.draw,
            Outcome::Away => self.away,
        }
    }

    pub fn sum(&self) -> f64 {
        self.home + self.draw + self.away
    }
}

/// Expected goals for each side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpectedGoals {
    pub home: f64,
    pub away: f64,
}

/// Expected goals from the two teams' season aggregates.
///
/// `None` when either team has no matches played or the pooled averages are
/// zero; callers treat that as "no opinion".
pub fn expected_goals(home: &TeamSeasonStats, away: &TeamSeasonStats) -> Option<ExpectedGoals> {
    if home.played == 0 || away.played == 0 {
        return None;
    }

    let played = (home.played + away.played) as f64;
    let avg_for = (home.goals_for + away.goals_for) as f64 / played;
    let avg_against = (home.goals_against + away.goals_against) as f64 / played;
    if avg_for <= 0.0 || avg_against <= 0.0 {
        return None;
    }

    let per_match = |goals: u32, played: u32| goals as f64 / played as f64;
    let home_attack = per_match(home.goals_for, home.played) / avg_for;
    let home_defence = per_match(home.goals_against, home.played) / avg_against;
    let away_attack = per_match(away.goals_for, away.played) / avg_for;
    let away_defence = per_match(away.goals_against, away.played) / avg_against;

    Some(ExpectedGoals {
        home: home_attack * away_defence * avg_for,
        away: away_attack * home_defence * avg_for,
    })
}

/// Price a fixture. Returns `None` whenever the inputs cannot support an
/// estimate; never a default probability.
pub fn price_fixture(home: &TeamSeasonStats, away: &TeamSeasonStats) -> Option<OutcomeProbabilities> {
    let xg = expected_goals(home, away)?;
    outcome_probabilities(xg.home, xg.away)
}

/// Accumulate the truncated Poisson scoreline grid into 1X2 and renormalise.
pub fn outcome_probabilities(lambda_home: f64, lambda_away: f64) -> Option<OutcomeProbabilities> {
    if !lambda_home.is_finite() || !lambda_away.is_finite() {
        return None;
    }
    let home_pmf = poisson_pmf(lambda_home);
    let away_pmf = poisson_pmf(lambda_away);

    let (mut home, mut draw, mut away) = (0.0, 0.0, 0.0);
    for (h, ph) in home_pmf.iter().enumerate() {
        for (a, pa) in away_pmf.iter().enumerate() {
            let p = ph * pa;
            match h.cmp(&a) {
                std::cmp::Ordering::Greater => home += p,
                std::cmp::Ordering::Equal => draw += p,
                std::cmp::Ordering::Less => away += p,
            }
        }
    }

    let total = home + draw + away;
    if total <= 0.0 || !total.is_finite() {
        return None;
    }
    Some(OutcomeProbabilities {
        home: home / total,
        draw: draw / total,
        away: away / total,
    })
}

/// P(X = k) for k in 0..=MAX_GOALS, built by the recurrence p(k) = p(k-1)·λ/k.
fn poisson_pmf(lambda: f64) -> [f64; MAX_GOALS + 1] {
    let mut pmf = [0.0; MAX_GOALS + 1];
    pmf[0] = (-lambda).exp();
    for k in 1..=MAX_GOALS {
        pmf[k] = pmf[k - 1] * lambda / k as f64;
    }
    pmf
}

// ── Tests ────────────────────────────────────────────────────────────────────
