use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::data::MatchDataSource;
use crate::db::models::{Fixture, Market, Resolution, Wager, WagerStatus};
use crate::db::Database;
use crate::error::{is_persistence, is_systemic, EngineError};

/// Decide the terminal state of a pending wager against its fixture.
///
/// `None` means "not yet": the fixture hasn't concluded, the final score is
/// missing, or the market is one this engine cannot settle. The wager stays
/// PENDING and is looked at again next pass.
pub fn resolve(wager: &Wager, fixture: &Fixture) -> Option<Resolution> {
    match Market::from_code(&wager.market)? {
        Market::MatchOutcome => {}
    }

    if fixture.is_void() {
        return Some(Resolution {
            status: WagerStatus::Push,
            profit: 0.0,
            credit: wager.stake,
        });
    }

    let result = fixture.result()?;
    if result == wager.selection {
        let profit = wager.stake * (wager.odds - 1.0);
        Some(Resolution {
            status: WagerStatus::Won,
            profit,
            credit: wager.stake + profit,
        })
    } else {
        // Stake was already debited at placement.
        Some(Resolution {
            status: WagerStatus::Lost,
            profit: -wager.stake,
            credit: 0.0,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SettlementReport {
    pub examined: usize,
    pub won: usize,
    pub lost: usize,
    pub pushed: usize,
    /// Still pending: fixture not concluded, score missing or unsupported market
    pub deferred: usize,
    /// Someone else moved the wager out of PENDING first
    pub already_settled: usize,
    pub failed: usize,
}

enum SettleOutcome {
    Settled(WagerStatus),
    Deferred,
    AlreadySettled,
}

/// Periodic settlement pass over every PENDING wager.
pub struct Settler {
    db: Database,
    source: Arc<dyn MatchDataSource>,
}

impl Settler {
    pub fn new(db: Database, source: Arc<dyn MatchDataSource>) -> Self {
        Settler { db, source }
    }

    pub async fn run(&self) -> Result<SettlementReport> {
        let pending = self.db.list_pending_wagers()?;
        let mut report = SettlementReport {
            examined: pending.len(),
            ..Default::default()
        };
        let mut fixtures: HashMap<i64, Fixture> = HashMap::new();

        for wager in &pending {
            match self.settle_one(wager, &mut fixtures).await {
                Ok(SettleOutcome::Settled(WagerStatus::Won)) => report.won += 1,
                Ok(SettleOutcome::Settled(WagerStatus::Lost)) => report.lost += 1,
                Ok(SettleOutcome::Settled(_)) => report.pushed += 1,
                Ok(SettleOutcome::Deferred) => report.deferred += 1,
                Ok(SettleOutcome::AlreadySettled) => report.already_settled += 1,
                Err(e) if is_systemic(&e) => {
                    error!("Settlement aborted at wager {}: {:#}", wager.id, e);
                    return Err(e);
                }
                Err(e) if is_persistence(&e) => {
                    error!("Failed to record settlement of wager {}: {:#}", wager.id, e);
                    report.failed += 1;
                }
                Err(e) => {
                    warn!("Failed to settle wager {}: {:#}", wager.id, e);
                    report.failed += 1;
                }
            }
        }

        info!(
            "Settlement pass: examined={}, won={}, lost={}, push={}, deferred={}, failed={}",
            report.examined, report.won, report.lost, report.pushed, report.deferred, report.failed
        );
        Ok(report)
    }

    async fn settle_one(
        &self,
        wager: &Wager,
        fixtures: &mut HashMap<i64, Fixture>,
    ) -> Result<SettleOutcome> {
        if !fixtures.contains_key(&wager.fixture_id) {
            let fixture = self
                .source
                .fixture(wager.fixture_id)
                .await?
                .ok_or(EngineError::FixtureNotFound(wager.fixture_id))?;
            fixtures.insert(wager.fixture_id, fixture);
        }
        let Some(fixture) = fixtures.get(&wager.fixture_id) else {
            return Err(EngineError::FixtureNotFound(wager.fixture_id).into());
        };

        let Some(resolution) = resolve(wager, fixture) else {
            debug!(
                "Wager {} deferred (fixture {} status={}, market={})",
                wager.id, fixture.id, fixture.status, wager.market
            );
            return Ok(SettleOutcome::Deferred);
        };

        if !self.db.settle_wager(wager.id, &resolution)? {
            return Ok(SettleOutcome::AlreadySettled);
        }
        info!(
            "Settled wager {} (portfolio {}, fixture {} {} @ {:.2}): {} profit={:+.2}",
            wager.id,
            wager.portfolio_id,
            fixture.id,
            wager.selection.as_str(),
            wager.odds,
            resolution.status.as_str(),
            resolution.profit
        );
        Ok(SettleOutcome::Settled(resolution.status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::provider::fake::InMemorySource;
    use crate::db::models::{AnalysisModel, NewPortfolio, NewWager, Outcome};
    use approx::assert_relative_eq;
    use chrono::{Duration, Utc};

    fn wager(selection: Outcome, stake: f64, odds: f64) -> Wager {
        Wager {
            id: 1,
            portfolio_id: 1,
            fixture_id: 10,
            market: Market::MatchOutcome.code().into(),
            selection,
            stake,
            odds,
            model_probability: 0.5,
            edge: odds * 0.5 - 1.0,
            status: WagerStatus::Pending,
            profit: None,
            created_at: Utc::now(),
            settled_at: None,
        }
    }

    fn fixture(id: i64, status: &str, home: Option<i32>, away: Option<i32>) -> Fixture {
        Fixture {
            id,
            league_id: 39,
            season: 2024,
            home_team_id: 1,
            away_team_id: 2,
            kickoff: Utc::now() - Duration::hours(3),
            status: status.into(),
            home_goals: home,
            away_goals: away,
        }
    }

    #[test]
    fn winning_selection_credits_stake_plus_profit() {
        let r = resolve(&wager(Outcome::Home, 10.0, 2.5), &fixture(10, "FT", Some(2), Some(0))).unwrap();
        assert_eq!(r.status, WagerStatus::Won);
        assert_relative_eq!(r.profit, 15.0, epsilon = 1e-12);
        assert_relative_eq!(r.credit, 25.0, epsilon = 1e-12);
    }

    #[test]
    fn losing_selection_credits_nothing() {
        let r = resolve(&wager(Outcome::Away, 10.0, 4.0), &fixture(10, "PEN", Some(1), Some(1))).unwrap();
        assert_eq!(r.status, WagerStatus::Lost);
        assert_relative_eq!(r.profit, -10.0, epsilon = 1e-12);
        assert_eq!(r.credit, 0.0);
    }

    #[test]
    fn draw_after_extra_time_wins_draw_bet() {
        let r = resolve(&wager(Outcome::Draw, 5.0, 3.3), &fixture(10, "AET", Some(2), Some(2))).unwrap();
        assert_eq!(r.status, WagerStatus::Won);
    }

    #[test]
    fn unfinished_or_scoreless_fixtures_defer() {
        let w = wager(Outcome::Home, 10.0, 2.0);
        assert!(resolve(&w, &fixture(10, "2H", Some(1), Some(0))).is_none());
        assert!(resolve(&w, &fixture(10, "FT", None, Some(0))).is_none());
        assert!(resolve(&w, &fixture(10, "PST", None, None)).is_none());
    }

    #[test]
    fn cancelled_fixture_pushes_with_refund() {
        let r = resolve(&wager(Outcome::Home, 10.0, 2.0), &fixture(10, "CANC", None, None)).unwrap();
        assert_eq!(r.status, WagerStatus::Push);
        assert_eq!(r.profit, 0.0);
        assert_relative_eq!(r.credit, 10.0, epsilon = 1e-12);
    }

    #[test]
    fn unknown_market_never_settles() {
        let mut w = wager(Outcome::Home, 10.0, 2.0);
        w.market = "both_teams_to_score".into();
        assert!(resolve(&w, &fixture(10, "FT", Some(1), Some(0))).is_none());
    }

    // ── Pass-level behaviour ─────────────────────────────────────────────────

    struct Harness {
        db: Database,
        source: Arc<InMemorySource>,
        settler: Settler,
        portfolio_id: i64,
    }

    fn harness() -> Harness {
        let db = Database::open_in_memory().unwrap();
        db.upsert_model(&AnalysisModel {
            id: 1,
            name: "poisson-v1".into(),
            description: None,
        })
        .unwrap();
        let portfolio_id = db
            .create_portfolio(&NewPortfolio {
                name: "Main".into(),
                model_id: 1,
                starting_balance: 1000.0,
                notify_url: None,
            })
            .unwrap()
            .id;
        let source = Arc::new(InMemorySource::default());
        let settler = Settler::new(db.clone(), source.clone());
        Harness {
            db,
            source,
            settler,
            portfolio_id,
        }
    }

    impl Harness {
        fn bet(&self, fixture_id: i64, selection: Outcome, stake: f64, odds: f64) -> Wager {
            self.db
                .place_wager(&NewWager {
                    portfolio_id: self.portfolio_id,
                    fixture_id,
                    market: Market::MatchOutcome,
                    selection,
                    stake,
                    odds,
                    model_probability: 0.5,
                    edge: odds * 0.5 - 1.0,
                })
                .unwrap()
                .0
        }

        fn balance(&self) -> f64 {
            self.db
                .get_portfolio(self.portfolio_id)
                .unwrap()
                .unwrap()
                .current_balance
        }
    }

    #[tokio::test]
    async fn rerunning_settlement_never_double_credits() {
        let h = harness();
        h.source.add_fixture(fixture(10, "FT", Some(3), Some(1)));
        h.bet(10, Outcome::Home, 10.0, 2.0);

        let first = h.settler.run().await.unwrap();
        assert_eq!(first.won, 1);
        let after_first = h.balance();
        assert_relative_eq!(after_first, 1010.0, epsilon = 1e-9);

        let second = h.settler.run().await.unwrap();
        assert_eq!(second.examined, 0);
        assert_relative_eq!(h.balance(), after_first, epsilon = 1e-12);
    }

    #[tokio::test]
    async fn lost_wager_leaves_balance_untouched() {
        let h = harness();
        h.source.add_fixture(fixture(10, "FT", Some(0), Some(1)));
        h.bet(10, Outcome::Home, 10.0, 2.0);
        let before = h.balance();

        let report = h.settler.run().await.unwrap();
        assert_eq!(report.lost, 1);
        assert_relative_eq!(h.balance(), before, epsilon = 1e-12);

        let p = h.db.get_portfolio(h.portfolio_id).unwrap().unwrap();
        assert_eq!(p.losses, 1);
        let w = &h.db.list_wagers(h.portfolio_id, 1).unwrap()[0];
        assert_eq!(w.status, WagerStatus::Lost);
        assert_eq!(w.profit, Some(-10.0));
    }

    #[tokio::test]
    async fn missing_fixture_fails_only_that_wager() {
        let h = harness();
        h.source.add_fixture(fixture(10, "FT", Some(1), Some(0)));
        h.bet(10, Outcome::Home, 10.0, 2.0);
        h.bet(99, Outcome::Home, 10.0, 2.0);
        h.bet(11, Outcome::Home, 10.0, 2.0);
        h.source.add_fixture(fixture(11, "FT", Some(0), Some(0)));
        h.source.failing.lock().unwrap().push(11);

        let report = h.settler.run().await.unwrap();
        assert_eq!(report.examined, 3);
        assert_eq!(report.won, 1);
        assert_eq!(report.failed, 2);
        assert_eq!(h.db.list_pending_wagers().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn pending_until_fixture_concludes() {
        let h = harness();
        h.source.add_fixture(fixture(10, "1H", Some(0), Some(0)));
        h.bet(10, Outcome::Draw, 10.0, 3.3);

        let report = h.settler.run().await.unwrap();
        assert_eq!(report.deferred, 1);
        assert_eq!(h.db.list_pending_wagers().unwrap().len(), 1);

        h.source.set_result(10, "FT", Some(1), Some(1));
        let report = h.settler.run().await.unwrap();
        assert_eq!(report.won, 1);
        assert_relative_eq!(h.balance(), 1000.0 - 10.0 + 33.0, epsilon = 1e-9);
    }

    #[tokio::test]
    async fn abandoned_fixture_refunds_stake() {
        let h = harness();
        h.source.add_fixture(fixture(10, "ABD", Some(1), Some(0)));
        h.bet(10, Outcome::Away, 25.0, 4.0);
        assert_relative_eq!(h.balance(), 975.0, epsilon = 1e-9);

        let report = h.settler.run().await.unwrap();
        assert_eq!(report.pushed, 1);
        assert_relative_eq!(h.balance(), 1000.0, epsilon = 1e-9);
        let p = h.db.get_portfolio(h.portfolio_id).unwrap().unwrap();
        assert_eq!(p.pushes, 1);
    }
}
