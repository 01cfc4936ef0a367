use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::sync::{Arc, Mutex, MutexGuard};

pub mod models;
use models::*;

use crate::error::EngineError;

/// Thread-safe SQLite handle (single connection with mutex)
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the SQLite database at the given path
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        Self::from_connection(conn)
    }

    /// Fresh private database, used by tests
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Database {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::Error::from(EngineError::LockPoisoned))
    }

    /// Run `f` inside one transaction; nothing is written unless it returns Ok.
    pub fn with_transaction<T>(&self, f: impl FnOnce(&Transaction<'_>) -> Result<T>) -> Result<T> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }

    // ── Collaborator data ────────────────────────────────────────────────────

    pub fn upsert_model(&self, model: &AnalysisModel) -> Result<()> {
        upsert_model(&*self.conn()?, model)
    }

    pub fn upsert_fixture(&self, fixture: &Fixture) -> Result<()> {
        upsert_fixture(&*self.conn()?, fixture)
    }

    pub fn upsert_team_stats(&self, stats: &TeamSeasonStats) -> Result<()> {
        upsert_team_stats(&*self.conn()?, stats)
    }

    pub fn insert_quote(&self, quote: &MarketQuote) -> Result<()> {
        insert_quote(&*self.conn()?, quote)
    }

    pub fn get_fixture(&self, id: i64) -> Result<Option<Fixture>> {
        let conn = self.conn()?;
        let fixture = conn
            .query_row(
                "SELECT id, league_id, season, home_team_id, away_team_id,
                        kickoff, status, home_goals, away_goals
                 FROM fixtures WHERE id = ?1",
                params![id],
                map_fixture,
            )
            .optional()?;
        Ok(fixture)
    }

    /// Not-yet-started fixtures kicking off after `now` with at least one quote
    pub fn list_upcoming_fixtures(&self, now: DateTime<Utc>) -> Result<Vec<Fixture>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, league_id, season, home_team_id, away_team_id,
                    kickoff, status, home_goals, away_goals
             FROM fixtures f
             WHERE status IN ('NS', 'TBD')
               AND EXISTS (SELECT 1 FROM market_quotes q WHERE q.fixture_id = f.id)
             ORDER BY id",
        )?;
        let mut fixtures = stmt
            .query_map([], map_fixture)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        fixtures.retain(|f| f.kickoff > now);
        fixtures.sort_by_key(|f| f.kickoff);
        Ok(fixtures)
    }

    pub fn get_team_stats(
        &self,
        league_id: i64,
        season: i32,
        team_id: i64,
    ) -> Result<Option<TeamSeasonStats>> {
        let conn = self.conn()?;
        let stats = conn
            .query_row(
                "SELECT team_id, league_id, season, played, wins, draws, losses,
                        goals_for, goals_against
                 FROM team_stats WHERE league_id = ?1 AND season = ?2 AND team_id = ?3",
                params![league_id, season, team_id],
                map_team_stats,
            )
            .optional()?;
        Ok(stats)
    }

    /// Quotes for a fixture in the order they were stored
    pub fn list_quotes(&self, fixture_id: i64) -> Result<Vec<MarketQuote>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT fixture_id, bookmaker_id, bookmaker, home_odds, draw_odds, away_odds, updated_at
             FROM market_quotes WHERE fixture_id = ?1 ORDER BY id",
        )?;
        let quotes = stmt
            .query_map(params![fixture_id], map_quote)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(quotes)
    }

    // ── Portfolios ───────────────────────────────────────────────────────────

    pub fn create_portfolio(&self, new: &NewPortfolio) -> Result<Portfolio> {
        if new.name.trim().is_empty() {
            return Err(EngineError::InvalidPortfolio("name must not be empty".into()).into());
        }
        if !new.starting_balance.is_finite() || new.starting_balance <= 0.0 {
            return Err(EngineError::InvalidPortfolio(format!(
                "starting balance must be positive, got {}",
                new.starting_balance
            ))
            .into());
        }

        let conn = self.conn()?;
        let model_exists: bool = conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM analysis_models WHERE id = ?1)",
            params![new.model_id],
            |row| row.get(0),
        )?;
        if !model_exists {
            return Err(EngineError::ModelNotFound(new.model_id).into());
        }

        let created_at = Utc::now();
        conn.execute(
            "INSERT INTO portfolios (
                name, model_id, starting_balance, current_balance, active,
                total_wagers, wins, losses, pushes, notify_url, created_at
             ) VALUES (?1, ?2, ?3, ?3, 1, 0, 0, 0, 0, ?4, ?5)",
            params![
                new.name.trim(),
                new.model_id,
                new.starting_balance,
                new.notify_url,
                created_at,
            ],
        )?;
        Ok(Portfolio {
            id: conn.last_insert_rowid(),
            name: new.name.trim().to_string(),
            model_id: new.model_id,
            starting_balance: new.starting_balance,
            current_balance: new.starting_balance,
            active: true,
            total_wagers: 0,
            wins: 0,
            losses: 0,
            pushes: 0,
            notify_url: new.notify_url.clone(),
            created_at,
        })
    }

    pub fn get_portfolio(&self, id: i64) -> Result<Option<Portfolio>> {
        let conn = self.conn()?;
        let portfolio = conn
            .query_row(
                &format!("SELECT {PORTFOLIO_COLUMNS} FROM portfolios p WHERE p.id = ?1"),
                params![id],
                map_portfolio,
            )
            .optional()?;
        Ok(portfolio)
    }

    pub fn set_portfolio_active(&self, id: i64, active: bool) -> Result<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE portfolios SET active = ?1 WHERE id = ?2",
            params![active, id],
        )?;
        if changed == 0 {
            return Err(EngineError::PortfolioNotFound(id).into());
        }
        Ok(())
    }

    /// Delete a portfolio together with its wager history
    pub fn delete_portfolio(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let changed = conn.execute("DELETE FROM portfolios WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(EngineError::PortfolioNotFound(id).into());
        }
        Ok(())
    }

    pub fn list_active_portfolios(&self) -> Result<Vec<Portfolio>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {PORTFOLIO_COLUMNS} FROM portfolios p WHERE p.active = 1 ORDER BY p.id"
        ))?;
        let portfolios = stmt
            .query_map([], map_portfolio)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(portfolios)
    }

    /// All portfolios with their attached analysis model
    pub fn list_portfolios(&self) -> Result<Vec<PortfolioSummary>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {PORTFOLIO_COLUMNS}, m.id, m.name, m.description
             FROM portfolios p
             LEFT JOIN analysis_models m ON m.id = p.model_id
             ORDER BY p.created_at DESC, p.id DESC"
        ))?;
        let rows = stmt
            .query_map([], |row| {
                let portfolio = map_portfolio(row)?;
                let model_id: Option<i64> = row.get(12)?;
                let model = match model_id {
                    Some(id) => Some(AnalysisModel {
                        id,
                        name: row.get(13)?,
                        description: row.get(14)?,
                    }),
                    None => None,
                };
                Ok(PortfolioSummary { portfolio, model })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    // ── Wagers ───────────────────────────────────────────────────────────────

    pub fn has_wager(&self, portfolio_id: i64, fixture_id: i64, market: Market) -> Result<bool> {
        let conn = self.conn()?;
        let exists = conn.query_row(
            "SELECT EXISTS (
                SELECT 1 FROM wagers WHERE portfolio_id = ?1 AND fixture_id = ?2 AND market = ?3
             )",
            params![portfolio_id, fixture_id, market.code()],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Write a PENDING wager and debit its stake in one transaction.
    ///
    /// Returns the stored wager and the portfolio balance after the debit.
    pub fn place_wager(&self, new: &NewWager) -> Result<(Wager, f64)> {
        if !new.stake.is_finite() || new.stake <= 0.0 {
            bail!("stake must be positive, got {}", new.stake);
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let balance: Option<f64> = tx
            .query_row(
                "SELECT current_balance FROM portfolios WHERE id = ?1",
                params![new.portfolio_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(balance) = balance else {
            return Err(EngineError::PortfolioNotFound(new.portfolio_id).into());
        };
        if balance < new.stake {
            return Err(EngineError::InsufficientBalance {
                portfolio_id: new.portfolio_id,
                balance,
                stake: new.stake,
            }
            .into());
        }

        let created_at = Utc::now();
        tx.execute(
            "INSERT INTO wagers (
                portfolio_id, fixture_id, market, selection, stake, odds,
                model_probability, edge, status, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                new.portfolio_id,
                new.fixture_id,
                new.market.code(),
                new.selection,
                new.stake,
                new.odds,
                new.model_probability,
                new.edge,
                WagerStatus::Pending,
                created_at,
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.execute(
            "UPDATE portfolios
             SET current_balance = current_balance - ?1, total_wagers = total_wagers + 1
             WHERE id = ?2",
            params![new.stake, new.portfolio_id],
        )?;
        let balance_after: f64 = tx.query_row(
            "SELECT current_balance FROM portfolios WHERE id = ?1",
            params![new.portfolio_id],
            |row| row.get(0),
        )?;
        tx.commit()?;

        let wager = Wager {
            id,
            portfolio_id: new.portfolio_id,
            fixture_id: new.fixture_id,
            market: new.market.code().to_string(),
            selection: new.selection,
            stake: new.stake,
            odds: new.odds,
            model_probability: new.model_probability,
            edge: new.edge,
            status: WagerStatus::Pending,
            profit: None,
            created_at,
            settled_at: None,
        };
        Ok((wager, balance_after))
    }

    pub fn list_pending_wagers(&self) -> Result<Vec<Wager>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {WAGER_COLUMNS} FROM wagers WHERE status = 'PENDING' ORDER BY fixture_id, id"
        ))?;
        let wagers = stmt
            .query_map([], map_wager)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(wagers)
    }

    /// Apply a terminal transition to a pending wager and credit its portfolio,
    /// all in one transaction.
    ///
    /// Returns `false` without touching anything if the wager already left
    /// PENDING, so repeated settlement never double-credits.
    pub fn settle_wager(&self, wager_id: i64, resolution: &Resolution) -> Result<bool> {
        if resolution.status == WagerStatus::Pending {
            bail!("wager {wager_id}: PENDING is not a terminal status");
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let changed = tx.execute(
            "UPDATE wagers SET status = ?1, profit = ?2, settled_at = ?3
             WHERE id = ?4 AND status = 'PENDING'",
            params![resolution.status, resolution.profit, Utc::now(), wager_id],
        )?;
        if changed == 0 {
            return Ok(false);
        }

        let (won, lost, push) = match resolution.status {
            WagerStatus::Won => (1, 0, 0),
            WagerStatus::Lost => (0, 1, 0),
            WagerStatus::Push => (0, 0, 1),
            WagerStatus::Pending => (0, 0, 0),
        };
        tx.execute(
            "UPDATE portfolios
             SET current_balance = current_balance + ?1,
                 wins = wins + ?2, losses = losses + ?3, pushes = pushes + ?4
             WHERE id = (SELECT portfolio_id FROM wagers WHERE id = ?5)",
            params![resolution.credit, won, lost, push, wager_id],
        )?;
        tx.commit()?;
        Ok(true)
    }

    /// Wager history for a portfolio, newest first
    pub fn list_wagers(&self, portfolio_id: i64, limit: i64) -> Result<Vec<Wager>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {WAGER_COLUMNS} FROM wagers WHERE portfolio_id = ?1 ORDER BY id DESC LIMIT ?2"
        ))?;
        let wagers = stmt
            .query_map(params![portfolio_id, limit], map_wager)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(wagers)
    }

    pub fn portfolio_stats(&self, portfolio_id: i64) -> Result<PortfolioStats> {
        let conn = self.conn()?;
        let (pending, settled, won, lost, settled_stake, total_staked, total_profit): (
            i64,
            i64,
            i64,
            i64,
            f64,
            f64,
            f64,
        ) = conn.query_row(
            "SELECT
                COALESCE(SUM(CASE WHEN status = 'PENDING' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status != 'PENDING' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'WON' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'LOST' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status != 'PENDING' THEN stake ELSE 0 END), 0.0),
                COALESCE(SUM(stake), 0.0),
                COALESCE(SUM(profit), 0.0)
             FROM wagers WHERE portfolio_id = ?1",
            params![portfolio_id],
            |r| {
                Ok((
                    r.get(0)?,
                    r.get(1)?,
                    r.get(2)?,
                    r.get(3)?,
                    r.get(4)?,
                    r.get(5)?,
                    r.get(6)?,
                ))
            },
        )?;
        let roi = if settled_stake > 0.0 {
            total_profit / settled_stake
        } else {
            0.0
        };
        let hit_rate = if won + lost > 0 {
            won as f64 / (won + lost) as f64
        } else {
            0.0
        };
        Ok(PortfolioStats {
            portfolio_id,
            pending,
            settled,
            total_staked,
            total_profit,
            roi,
            hit_rate,
        })
    }
}

// ── Collaborator writes (usable inside a transaction) ──────────────────────────

pub fn upsert_model(conn: &Connection, model: &AnalysisModel) -> Result<()> {
    conn.execute(
        "INSERT INTO analysis_models (id, name, description) VALUES (?1, ?2, ?3)
         ON CONFLICT(id) DO UPDATE SET name = excluded.name, description = excluded.description",
        params![model.id, model.name, model.description],
    )?;
    Ok(())
}

pub fn upsert_fixture(conn: &Connection, f: &Fixture) -> Result<()> {
    conn.execute(
        "INSERT INTO fixtures (
            id, league_id, season, home_team_id, away_team_id,
            kickoff, status, home_goals, away_goals
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(id) DO UPDATE SET
            kickoff = excluded.kickoff,
            status = excluded.status,
            home_goals = excluded.home_goals,
            away_goals = excluded.away_goals",
        params![
            f.id,
            f.league_id,
            f.season,
            f.home_team_id,
            f.away_team_id,
            f.kickoff,
            f.status,
            f.home_goals,
            f.away_goals,
        ],
    )?;
    Ok(())
}

pub fn upsert_team_stats(conn: &Connection, s: &TeamSeasonStats) -> Result<()> {
    conn.execute(
        "INSERT INTO team_stats (
            team_id, league_id, season, played, wins, draws, losses, goals_for, goals_against
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(league_id, season, team_id) DO UPDATE SET
            played = excluded.played,
            wins = excluded.wins,
            draws = excluded.draws,
            losses = excluded.losses,
            goals_for = excluded.goals_for,
            goals_against = excluded.goals_against",
        params![
            s.team_id,
            s.league_id,
            s.season,
            s.played,
            s.wins,
            s.draws,
            s.losses,
            s.goals_for,
            s.goals_against,
        ],
    )?;
    Ok(())
}

pub fn insert_quote(conn: &Connection, q: &MarketQuote) -> Result<()> {
    conn.execute(
        "INSERT INTO market_quotes (
            fixture_id, bookmaker_id, bookmaker, home_odds, draw_odds, away_odds, updated_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            q.fixture_id,
            q.bookmaker_id,
            q.bookmaker,
            q.home,
            q.draw,
            q.away,
            q.updated_at,
        ],
    )?;
    Ok(())
}

// ── SQL helpers ────────────────────────────────────────────────────────────────

const PORTFOLIO_COLUMNS: &str = "p.id, p.name, p.model_id, p.starting_balance, p.current_balance,
    p.active, p.total_wagers, p.wins, p.losses, p.pushes, p.notify_url, p.created_at";

const WAGER_COLUMNS: &str = "id, portfolio_id, fixture_id, market, selection, stake, odds,
    model_probability, edge, status, profit, created_at, settled_at";

fn map_fixture(row: &rusqlite::Row) -> rusqlite::Result<Fixture> {
    Ok(Fixture {
        id: row.get(0)?,
        league_id: row.get(1)?,
        season: row.get(2)?,
        home_team_id: row.get(3)?,
        away_team_id: row.get(4)?,
        kickoff: row.get(5)?,
        status: row.get(6)?,
        home_goals: row.get(7)?,
        away_goals: row.get(8)?,
    })
}

fn map_team_stats(row: &rusqlite::Row) -> rusqlite::Result<TeamSeasonStats> {
    Ok(TeamSeasonStats {
        team_id: row.get(0)?,
        league_id: row.get(1)?,
        season: row.get(2)?,
        played: row.get(3)?,
        wins: row.get(4)?,
        draws: row.get(5)?,
        losses: row.get(6)?,
        goals_for: row.get(7)?,
        goals_against: row.get(8)?,
    })
}

fn map_quote(row: &rusqlite::Row) -> rusqlite::Result<MarketQuote> {
    Ok(MarketQuote {
        fixture_id: row.get(0)?,
        bookmaker_id: row.get(1)?,
        bookmaker: row.get(2)?,
        home: row.get(3)?,
        draw: row.get(4)?,
        away: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn map_portfolio(row: &rusqlite::Row) -> rusqlite::Result<Portfolio> {
    Ok(Portfolio {
        id: row.get(0)?,
        name: row.get(1)?,
        model_id: row.get(2)?,
        starting_balance: row.get(3)?,
        current_balance: row.get(4)?,
        active: row.get(5)?,
        total_wagers: row.get(6)?,
        wins: row.get(7)?,
        losses: row.get(8)?,
        pushes: row.get(9)?,
        notify_url: row.get(10)?,
        created_at: row.get(11)?,
    })
}

fn map_wager(row: &rusqlite::Row) -> rusqlite::Result<Wager> {
    Ok(Wager {
        id: row.get(0)?,
        portfolio_id: row.get(1)?,
        fixture_id: row.get(2)?,
        market: row.get(3)?,
        selection: row.get(4)?,
        stake: row.get(5)?,
        odds: row.get(6)?,
        model_probability: row.get(7)?,
        edge: row.get(8)?,
        status: row.get(9)?,
        profit: row.get(10)?,
        created_at: row.get(11)?,
        settled_at: row.get(12)?,
    })
}

/// SQLite schema (idempotent CREATE IF NOT EXISTS)
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS analysis_models (
    id          INTEGER PRIMARY KEY,
    name        TEXT    NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS fixtures (
    id           INTEGER PRIMARY KEY,
    league_id    INTEGER NOT NULL,
    season       INTEGER NOT NULL,
    home_team_id INTEGER NOT NULL,
    away_team_id INTEGER NOT NULL,
    kickoff      TEXT    NOT NULL,
    status       TEXT    NOT NULL,
    home_goals   INTEGER,
    away_goals   INTEGER
);

CREATE TABLE IF NOT EXISTS team_stats (
    team_id       INTEGER NOT NULL,
    league_id     INTEGER NOT NULL,
    season        INTEGER NOT NULL,
    played        INTEGER NOT NULL,
    wins          INTEGER NOT NULL,
    draws         INTEGER NOT NULL,
    losses        INTEGER NOT NULL,
    goals_for     INTEGER NOT NULL,
    goals_against INTEGER NOT NULL,
    PRIMARY KEY (league_id, season, team_id)
);

CREATE TABLE IF NOT EXISTS market_quotes (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    fixture_id   INTEGER NOT NULL,
    bookmaker_id INTEGER NOT NULL,
    bookmaker    TEXT    NOT NULL,
    home_odds    REAL    NOT NULL,
    draw_odds    REAL    NOT NULL,
    away_odds    REAL    NOT NULL,
    updated_at   TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS portfolios (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    name             TEXT    NOT NULL,
    model_id         INTEGER NOT NULL,
    starting_balance REAL    NOT NULL,
    current_balance  REAL    NOT NULL,
    active           INTEGER NOT NULL DEFAULT 1,
    total_wagers     INTEGER NOT NULL DEFAULT 0,
    wins             INTEGER NOT NULL DEFAULT 0,
    losses           INTEGER NOT NULL DEFAULT 0,
    pushes           INTEGER NOT NULL DEFAULT 0,
    notify_url       TEXT,
    created_at       TEXT    NOT NULL,
    FOREIGN KEY (model_id) REFERENCES analysis_models(id)
);

CREATE TABLE IF NOT EXISTS wagers (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    portfolio_id      INTEGER NOT NULL,
    fixture_id        INTEGER NOT NULL,
    market            TEXT    NOT NULL,
    selection         TEXT    NOT NULL,
    stake             REAL    NOT NULL,
    odds              REAL    NOT NULL,
    model_probability REAL    NOT NULL,
    edge              REAL    NOT NULL,
    status            TEXT    NOT NULL DEFAULT 'PENDING',
    profit            REAL,
    created_at        TEXT    NOT NULL,
    settled_at        TEXT,
    FOREIGN KEY (portfolio_id) REFERENCES portfolios(id) ON DELETE CASCADE
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_wagers_unique_bet ON wagers(portfolio_id, fixture_id, market);
CREATE INDEX IF NOT EXISTS idx_wagers_status ON wagers(status);
CREATE INDEX IF NOT EXISTS idx_quotes_fixture ON market_quotes(fixture_id);
CREATE INDEX IF NOT EXISTS idx_fixtures_status ON fixtures(status);
"#;
