use anyhow::Result;
use async_trait::async_trait;

use crate::db::models::{Fixture, MarketQuote, TeamSeasonStats};
use crate::db::Database;

/// Read-only view of already-materialised fixtures, team statistics and odds.
///
/// This is the only seam between the pricing engine and however that data
/// was fetched. Implementations never perform network I/O.
#[async_trait]
pub trait MatchDataSource: Send + Sync {
    /// Fixtures not yet started, kicking off after `now`, with at least one quote.
    async fn upcoming_fixtures(&self, now: chrono::DateTime<chrono::Utc>) -> Result<Vec<Fixture>>;

    async fn fixture(&self, fixture_id: i64) -> Result<Option<Fixture>>;

    async fn team_stats(
        &self,
        league_id: i64,
        season: i32,
        team_id: i64,
    ) -> Result<Option<TeamSeasonStats>>;

    /// Quotes for a fixture, in the order the collaborator stored them.
    async fn quotes(&self, fixture_id: i64) -> Result<Vec<MarketQuote>>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

#[async_trait]
impl MatchDataSource for Database {
    async fn upcoming_fixtures(&self, now: chrono::DateTime<chrono::Utc>) -> Result<Vec<Fixture>> {
        self.list_upcoming_fixtures(now)
    }

    async fn fixture(&self, fixture_id: i64) -> Result<Option<Fixture>> {
        self.get_fixture(fixture_id)
    }

    async fn team_stats(
        &self,
        league_id: i64,
        season: i32,
        team_id: i64,
    ) -> Result<Option<TeamSeasonStats>> {
        self.get_team_stats(league_id, season, team_id)
    }

    async fn quotes(&self, fixture_id: i64) -> Result<Vec<MarketQuote>> {
        self.list_quotes(fixture_id)
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}
