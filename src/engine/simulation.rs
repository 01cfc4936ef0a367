use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::data::MatchDataSource;
use crate::db::models::{Fixture, Market, NewWager, Portfolio, Wager};
use crate::db::Database;
use crate::error::{is_persistence, is_systemic, EngineError};

use super::pricing::price_fixture;
use super::staking::StakingPolicy;
use super::value::{evaluate, reference_odds, QuoteSelection, Valuation};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimulationReport {
    pub portfolios: usize,
    pub fixtures: usize,
    pub priced: usize,
    /// No stats, undefined rating or no usable quote
    pub skipped: usize,
    pub placed: usize,
    pub already_wagered: usize,
    /// Best edge did not clear the gate
    pub no_value: usize,
    pub failed: usize,
}

enum Placement {
    Placed(Wager),
    AlreadyWagered,
    NoValue,
}

/// Periodic pass that prices upcoming fixtures and places simulated wagers
/// for every active portfolio.
///
/// Each (portfolio, fixture) pair is an independent unit of work. A failure
/// in one unit is logged and the pass moves on; only store-level failures end
/// the pass early.
pub struct Simulator {
    db: Database,
    source: Arc<dyn MatchDataSource>,
    policy: StakingPolicy,
    quote_selection: QuoteSelection,
}

impl Simulator {
    pub fn new(
        db: Database,
        source: Arc<dyn MatchDataSource>,
        policy: StakingPolicy,
        quote_selection: QuoteSelection,
    ) -> Self {
        Simulator {
            db,
            source,
            policy,
            quote_selection,
        }
    }

    pub async fn run(&self, now: DateTime<Utc>) -> Result<SimulationReport> {
        let portfolios = self.db.list_active_portfolios()?;
        let mut report = SimulationReport {
            portfolios: portfolios.len(),
            ..Default::default()
        };
        if portfolios.is_empty() {
            debug!("No active portfolios; simulation pass idle");
            return Ok(report);
        }

        let fixtures = self.source.upcoming_fixtures(now).await?;
        report.fixtures = fixtures.len();

        for fixture in &fixtures {
            let valuation = match self.value_fixture(fixture).await {
                Ok(Some(v)) => v,
                Ok(None) => {
                    report.skipped += 1;
                    continue;
                }
                Err(e) if is_systemic(&e) => {
                    error!("Simulation aborted at fixture {}: {:#}", fixture.id, e);
                    return Err(e);
                }
                Err(e) => {
                    warn!("Failed to value fixture {} via {}: {:#}", fixture.id, self.source.name(), e);
                    report.failed += portfolios.len();
                    continue;
                }
            };
            report.priced += 1;

            for portfolio in &portfolios {
                match self.place_for(portfolio.id, fixture, &valuation) {
                    Ok(Placement::Placed(wager)) => {
                        info!(
                            "Wager {} placed: portfolio {} fixture {} {} @ {:.2} stake={:.2} p={:.3} edge={:.3}",
                            wager.id,
                            portfolio.id,
                            fixture.id,
                            wager.selection.as_str(),
                            wager.odds,
                            wager.stake,
                            wager.model_probability,
                            wager.edge
                        );
                        report.placed += 1;
                    }
                    Ok(Placement::AlreadyWagered) => report.already_wagered += 1,
                    Ok(Placement::NoValue) => report.no_value += 1,
                    Err(e) if is_systemic(&e) => {
                        error!(
                            "Simulation aborted at portfolio {} fixture {}: {:#}",
                            portfolio.id, fixture.id, e
                        );
                        return Err(e);
                    }
                    Err(e) if is_persistence(&e) => {
                        error!(
                            "Failed to place wager for portfolio {} fixture {}: {:#}",
                            portfolio.id, fixture.id, e
                        );
                        report.failed += 1;
                    }
                    Err(e) => {
                        warn!(
                            "Skipped portfolio {} fixture {}: {:#}",
                            portfolio.id, fixture.id, e
                        );
                        report.failed += 1;
                    }
                }
            }
        }

        info!(
            "Simulation pass: portfolios={}, fixtures={}, priced={}, skipped={}, placed={}, no_value={}, failed={}",
            report.portfolios,
            report.fixtures,
            report.priced,
            report.skipped,
            report.placed,
            report.no_value,
            report.failed
        );
        Ok(report)
    }

    /// Price a fixture and compare it with the reference market price.
    /// `Ok(None)` when the data can't support an opinion yet.
    async fn value_fixture(&self, fixture: &Fixture) -> Result<Option<Valuation>> {
        let home = self
            .source
            .team_stats(fixture.league_id, fixture.season, fixture.home_team_id)
            .await?;
        let away = self
            .source
            .team_stats(fixture.league_id, fixture.season, fixture.away_team_id)
            .await?;
        let (Some(home), Some(away)) = (home, away) else {
            debug!("Fixture {}: team stats missing, skipping", fixture.id);
            return Ok(None);
        };

        let Some(probabilities) = price_fixture(&home, &away) else {
            debug!("Fixture {}: rating undefined, skipping", fixture.id);
            return Ok(None);
        };

        let quotes = self.source.quotes(fixture.id).await?;
        let Some(odds) = reference_odds(&quotes, self.quote_selection) else {
            debug!("Fixture {}: no usable quote among {}", fixture.id, quotes.len());
            return Ok(None);
        };

        let valuation = evaluate(probabilities, odds);
        debug!(
            "Fixture {}: p=({:.3}, {:.3}, {:.3}) odds=({:.2}, {:.2}, {:.2}) edge=({:+.3}, {:+.3}, {:+.3})",
            fixture.id,
            probabilities.home,
            probabilities.draw,
            probabilities.away,
            odds.home,
            odds.draw,
            odds.away,
            valuation.edges.home,
            valuation.edges.draw,
            valuation.edges.away
        );
        Ok(Some(valuation))
    }

    fn place_for(&self, portfolio_id: i64, fixture: &Fixture, valuation: &Valuation) -> Result<Placement> {
        if self.db.has_wager(portfolio_id, fixture.id, Market::MatchOutcome)? {
            return Ok(Placement::AlreadyWagered);
        }

        // Re-read so the stake reflects settlements and earlier placements.
        let portfolio: Portfolio = self
            .db
            .get_portfolio(portfolio_id)?
            .ok_or(EngineError::PortfolioNotFound(portfolio_id))?;
        if !portfolio.active {
            return Ok(Placement::NoValue);
        }

        let Some(slip) = self.policy.select(valuation, portfolio.current_balance) else {
            return Ok(Placement::NoValue);
        };

        let (wager, _balance_after) = self.db.place_wager(&NewWager {
            portfolio_id,
            fixture_id: fixture.id,
            market: Market::MatchOutcome,
            selection: slip.outcome,
            stake: slip.stake,
            odds: slip.odds,
            model_probability: slip.probability,
            edge: slip.edge,
        })?;
        Ok(Placement::Placed(wager))
    }
}
