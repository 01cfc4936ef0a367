//! Bulk import of collaborator data (models, fixtures, team stats, odds) from
//! a JSON snapshot. Used to seed or refresh the local store; the engine itself
//! only ever reads what this writes.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

use crate::db::models::{AnalysisModel, Fixture, MarketQuote, TeamSeasonStats};
use crate::db::{self, Database};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub models: Vec<AnalysisModel>,
    pub fixtures: Vec<Fixture>,
    pub team_stats: Vec<TeamSeasonStats>,
    pub quotes: Vec<MarketQuote>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportCounts {
    pub models: usize,
    pub fixtures: usize,
    pub team_stats: usize,
    pub quotes: usize,
}

impl Snapshot {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("Failed to parse snapshot {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Write everything in one transaction: either the whole snapshot lands or none of it.
    pub fn import(&self, store: &Database) -> Result<ImportCounts> {
        store.with_transaction(|tx| {
            for m in &self.models {
                db::upsert_model(tx, m)?;
            }
            for f in &self.fixtures {
                db::upsert_fixture(tx, f)?;
            }
            for s in &self.team_stats {
                db::upsert_team_stats(tx, s)?;
            }
            for q in &self.quotes {
                db::insert_quote(tx, q)?;
            }
            Ok(())
        })?;

        let counts = ImportCounts {
            models: self.models.len(),
            fixtures: self.fixtures.len(),
            team_stats: self.team_stats.len(),
            quotes: self.quotes.len(),
        };
        info!(
            "Snapshot imported: {} models, {} fixtures, {} team stats, {} quotes",
            counts.models, counts.fixtures, counts.team_stats, counts.quotes
        );
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "models": [{"id": 1, "name": "poisson-v1", "description": "season attack/defence"}],
        "fixtures": [{
            "id": 1001, "league_id": 39, "season": 2024,
            "home_team_id": 33, "away_team_id": 34,
            "kickoff": "2099-08-17T14:00:00Z", "status": "NS",
            "home_goals": null, "away_goals": null
        }],
        "team_stats": [
            {"team_id": 33, "league_id": 39, "season": 2024, "played": 20,
             "wins": 11, "draws": 5, "losses": 4, "goals_for": 30, "goals_against": 20},
            {"team_id": 34, "league_id": 39, "season": 2024, "played": 20,
             "wins": 8, "draws": 6, "losses": 6, "goals_for": 25, "goals_against": 22}
        ],
        "quotes": [{
            "fixture_id": 1001, "bookmaker_id": 8, "bookmaker": "Bet365",
            "home": 2.0, "draw": 3.3, "away": 4.0,
            "updated_at": "2099-08-16T10:00:00Z"
        }]
    }"#;

    #[test]
    fn import_populates_store() {
        let db = Database::open_in_memory().unwrap();
        let counts = Snapshot::from_json(SAMPLE).unwrap().import(&db).unwrap();
        assert_eq!(counts.fixtures, 1);
        assert_eq!(counts.team_stats, 2);

        let fixture = db.get_fixture(1001).unwrap().unwrap();
        assert_eq!(fixture.status, "NS");
        assert_eq!(db.get_team_stats(39, 2024, 33).unwrap().unwrap().goals_for, 30);
        assert_eq!(db.list_quotes(1001).unwrap().len(), 1);
    }

    #[test]
    fn reimport_updates_fixture_result() {
        let db = Database::open_in_memory().unwrap();
        Snapshot::from_json(SAMPLE).unwrap().import(&db).unwrap();

        let update = r#"{"fixtures": [{
            "id": 1001, "league_id": 39, "season": 2024,
            "home_team_id": 33, "away_team_id": 34,
            "kickoff": "2099-08-17T14:00:00Z", "status": "FT",
            "home_goals": 2, "away_goals": 1
        }]}"#;
        Snapshot::from_json(update).unwrap().import(&db).unwrap();

        let fixture = db.get_fixture(1001).unwrap().unwrap();
        assert_eq!(fixture.status, "FT");
        assert_eq!((fixture.home_goals, fixture.away_goals), (Some(2), Some(1)));
    }

    #[test]
    fn malformed_snapshot_is_rejected() {
        assert!(Snapshot::from_json(r#"{"fixtures": [{"id": "x"}]}"#).is_err());
    }
}
