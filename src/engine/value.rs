//! Value detection: compare model probabilities against market prices.

use clap::ValueEnum;
use serde::Serialize;

use super::pricing::OutcomeProbabilities;
use crate::db::models::{MarketQuote, Outcome};

/// Decimal odds for the three match outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutcomeOdds {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

impl OutcomeOdds {
    pub fn get(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Home => self.home,
            Outcome::Draw => self.draw,
            Outcome::Away => self.away,
        }
    }

    /// Every price is finite and greater than 1.0.
    pub fn is_usable(&self) -> bool {
        [self.home, self.draw, self.away]
            .iter()
            .all(|o| o.is_finite() && *o > 1.0)
    }
}

impl From<&MarketQuote> for OutcomeOdds {
    fn from(q: &MarketQuote) -> Self {
        OutcomeOdds {
            home: q.home,
            draw: q.draw,
            away: q.away,
        }
    }
}

/// How the market reference price is picked when several bookmakers quote a fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum QuoteSelection {
    /// First usable quote in stored order
    #[default]
    First,
    /// Highest price per outcome across all usable quotes
    Best,
}

/// Reduce a fixture's quotes to one reference price triple.
///
/// Returns `None` when no usable quote exists; the fixture is then skipped.
pub fn reference_odds(quotes: &[MarketQuote], selection: QuoteSelection) -> Option<OutcomeOdds> {
    let mut usable = quotes.iter().map(OutcomeOdds::from).filter(|o| o.is_usable());
    match selection {
        QuoteSelection::First => usable.next(),
        QuoteSelection::Best => usable.reduce(|best, o| OutcomeOdds {
            home: best.home.max(o.home),
            draw: best.draw.max(o.draw),
            away: best.away.max(o.away),
        }),
    }
}

/// Per-outcome fair odds and edge for one fixture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Valuation {
    pub probabilities: OutcomeProbabilities,
    pub odds: OutcomeOdds,
    pub fair_odds: OutcomeOdds,
    pub edges: OutcomeEdges,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutcomeEdges {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

impl OutcomeEdges {
    pub fn get(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Home => self.home,
            Outcome::Draw => self.draw,
            Outcome::Away => self.away,
        }
    }
}

/// Fair price for a probability: `1/p`, or +∞ when `p == 0`.
pub fn fair_odds(probability: f64) -> f64 {
    if probability <= 0.0 {
        f64::INFINITY
    } else {
        1.0 / probability
    }
}

/// Expected return per unit staked above break-even: `odds · p − 1`.
pub fn edge(market_odds: f64, probability: f64) -> f64 {
    market_odds * probability - 1.0
}

/// Pure valuation of a priced fixture against a reference price.
pub fn evaluate(probabilities: OutcomeProbabilities, odds: OutcomeOdds) -> Valuation {
    Valuation {
        probabilities,
        odds,
        fair_odds: OutcomeOdds {
            home: fair_odds(probabilities.home),
            draw: fair_odds(probabilities.draw),
            away: fair_odds(probabilities.away),
        },
        edges: OutcomeEdges {
            home: edge(odds.home, probabilities.home),
            draw: edge(odds.draw, probabilities.draw),
            away: edge(odds.away, probabilities.away),
        },
    }
}
