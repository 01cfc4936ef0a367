use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Fixture status codes that mean the final score is in.
pub const CONCLUDED_STATUSES: [&str; 3] = ["FT", "AET", "PEN"];
/// Fixture status codes that void match-outcome wagers.
pub const VOID_STATUSES: [&str; 2] = ["CANC", "ABD"];
/// Fixture status codes for matches that have not kicked off.
pub const UPCOMING_STATUSES: [&str; 2] = ["NS", "TBD"];

/// A football fixture as materialised by the ingestion collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: i64,
    pub league_id: i64,
    pub season: i32,
    pub home_team_id: i64,
    pub away_team_id: i64,
    pub kickoff: DateTime<Utc>,
    /// Provider status code, e.g. "NS", "1H", "FT", "PST", "CANC"
    pub status: String,
    pub home_goals: Option<i32>,
    pub away_goals: Option<i32>,
}

impl Fixture {
    pub fn is_concluded(&self) -> bool {
        CONCLUDED_STATUSES.contains(&self.status.as_str())
    }

    pub fn is_void(&self) -> bool {
        VOID_STATUSES.contains(&self.status.as_str())
    }

    pub fn is_upcoming(&self) -> bool {
        UPCOMING_STATUSES.contains(&self.status.as_str())
    }

    /// Final match-outcome result, if the match concluded with a known score.
    pub fn result(&self) -> Option<Outcome> {
        if !self.is_concluded() {
            return None;
        }
        let (home, away) = (self.home_goals?, self.away_goals?);
        Some(match home.cmp(&away) {
            std::cmp::Ordering::Greater => Outcome::Home,
            std::cmp::Ordering::Equal => Outcome::Draw,
            std::cmp::Ordering::Less => Outcome::Away,
        })
    }
}

/// Season aggregates for one team in one league.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSeasonStats {
    pub team_id: i64,
    pub league_id: i64,
    pub season: i32,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
}

/// Decimal 1X2 odds from one bookmaker for one fixture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketQuote {
    pub fixture_id: i64,
    pub bookmaker_id: i64,
    pub bookmaker: String,
    pub home: f64,
    pub draw: f64,
    pub away: f64,
    pub updated_at: DateTime<Utc>,
}

/// Opaque model identity a portfolio is attributed to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisModel {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// A simulated betting account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub id: i64,
    pub name: String,
    pub model_id: i64,
    pub starting_balance: f64,
    pub current_balance: f64,
    pub active: bool,
    pub total_wagers: i64,
    pub wins: i64,
    pub losses: i64,
    pub pushes: i64,
    /// Notification sink reference; stored, never interpreted here
    pub notify_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPortfolio {
    pub name: String,
    pub model_id: i64,
    pub starting_balance: f64,
    #[serde(default)]
    pub notify_url: Option<String>,
}

/// Portfolio row joined with its attached analysis model.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioSummary {
    #[serde(flatten)]
    pub portfolio: Portfolio,
    pub model: Option<AnalysisModel>,
}

/// Aggregate performance over a portfolio's settled wagers.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioStats {
    pub portfolio_id: i64,
    pub pending: i64,
    pub settled: i64,
    pub total_staked: f64,
    pub total_profit: f64,
    /// Profit over settled stake, 0 when nothing is settled
    pub roi: f64,
    /// Wins over decided (won + lost) wagers
    pub hit_rate: f64,
}

/// A match-outcome selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Home,
    Draw,
    Away,
}

impl Outcome {
    /// Iteration order, which is also the tie-break order for selection.
    pub const ALL: [Outcome; 3] = [Outcome::Home, Outcome::Draw, Outcome::Away];

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Home => "HOME",
            Outcome::Draw => "DRAW",
            Outcome::Away => "AWAY",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "HOME" => Some(Outcome::Home),
            "DRAW" => Some(Outcome::Draw),
            "AWAY" => Some(Outcome::Away),
            _ => None,
        }
    }
}

/// Wager markets the engine knows how to place and settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Market {
    MatchOutcome,
}

impl Market {
    pub fn code(self) -> &'static str {
        match self {
            Market::MatchOutcome => "match_outcome",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "match_outcome" => Some(Market::MatchOutcome),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WagerStatus {
    Pending,
    Won,
    Lost,
    Push,
}

impl WagerStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            WagerStatus::Pending => "PENDING",
            WagerStatus::Won => "WON",
            WagerStatus::Lost => "LOST",
            WagerStatus::Push => "PUSH",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(WagerStatus::Pending),
            "WON" => Some(WagerStatus::Won),
            "LOST" => Some(WagerStatus::Lost),
            "PUSH" => Some(WagerStatus::Push),
            _ => None,
        }
    }
}

/// A ledger entry. Stake, odds, probability and edge are fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wager {
    pub id: i64,
    pub portfolio_id: i64,
    pub fixture_id: i64,
    /// Market code; unknown codes are never settled
    pub market: String,
    pub selection: Outcome,
    pub stake: f64,
    pub odds: f64,
    pub model_probability: f64,
    pub edge: f64,
    pub status: WagerStatus,
    pub profit: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
}

/// Terminal transition for a pending wager, with the amount returned to the
/// portfolio balance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub status: WagerStatus,
    pub profit: f64,
    pub credit: f64,
}

/// Everything needed to write a new PENDING wager.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWager {
    pub portfolio_id: i64,
    pub fixture_id: i64,
    pub market: Market,
    pub selection: Outcome,
    pub stake: f64,
    pub odds: f64,
    pub model_probability: f64,
    pub edge: f64,
}

// ── SQLite conversions ───────────────────────────────────────────────────────

impl ToSql for Outcome {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Outcome {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        Outcome::parse(s).ok_or_else(|| FromSqlError::Other(format!("bad outcome {s:?}").into()))
    }
}

impl ToSql for WagerStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for WagerStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        WagerStatus::parse(s)
            .ok_or_else(|| FromSqlError::Other(format!("bad wager status {s:?}").into()))
    }
}
