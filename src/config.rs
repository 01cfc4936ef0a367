use clap::Parser;
use std::time::Duration;

use crate::engine::staking::{StakingPolicy, DEFAULT_MIN_EDGE, DEFAULT_STAKE_FRACTION};
use crate::engine::value::QuoteSelection;

/// Football value-betting engine with simulated portfolios
#[derive(Parser, Debug, Clone)]
#[command(name = "valuebet-engine", version, about)]
pub struct Config {
    /// SQLite database path
    #[arg(long, env = "DATABASE_PATH", default_value = "valuebet.db")]
    pub database_path: String,

    /// Portfolio API listen address
    #[arg(long, env = "API_ADDR", default_value = "0.0.0.0:8080")]
    pub api_addr: String,

    /// Seconds between simulation passes
    #[arg(long, env = "SIMULATION_INTERVAL_SECS", default_value = "3600")]
    pub simulation_interval_secs: u64,

    /// Seconds between settlement passes
    #[arg(long, env = "SETTLEMENT_INTERVAL_SECS", default_value = "900")]
    pub settlement_interval_secs: u64,

    /// Minimum edge a selection must exceed to be bet (e.g. 0.10 = 10%)
    #[arg(long, env = "MIN_EDGE", default_value_t = DEFAULT_MIN_EDGE)]
    pub min_edge: f64,

    /// Fraction of current balance staked per wager (0.0–1.0)
    #[arg(long, env = "STAKE_FRACTION", default_value_t = DEFAULT_STAKE_FRACTION)]
    pub stake_fraction: f64,

    /// Which bookmaker price to value against when several quote a fixture
    #[arg(long, env = "QUOTE_SELECTION", value_enum, default_value_t = QuoteSelection::First)]
    pub quote_selection: QuoteSelection,

    /// JSON snapshot of models, fixtures, stats and quotes to load at startup
    #[arg(long, env = "IMPORT_SNAPSHOT")]
    pub import_snapshot: Option<String>,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.simulation_interval_secs == 0 {
            anyhow::bail!("simulation_interval_secs must be positive");
        }
        if self.settlement_interval_secs == 0 {
            anyhow::bail!("settlement_interval_secs must be positive");
        }
        if !self.min_edge.is_finite() || self.min_edge < 0.0 {
            anyhow::bail!("min_edge must be a non-negative number");
        }
        if !(self.stake_fraction > 0.0 && self.stake_fraction <= 1.0) {
            anyhow::bail!("stake_fraction must be in (0.0, 1.0]");
        }
        Ok(())
    }

    pub fn staking_policy(&self) -> StakingPolicy {
        StakingPolicy {
            min_edge: self.min_edge,
            stake_fraction: self.stake_fraction,
        }
    }

    pub fn simulation_interval(&self) -> Duration {
        Duration::from_secs(self.simulation_interval_secs)
    }

    pub fn settlement_interval(&self) -> Duration {
        Duration::from_secs(self.settlement_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("valuebet-engine").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_match_house_policy() {
        let c = parse(&[]);
        c.validate().unwrap();
        assert_eq!(c.simulation_interval(), Duration::from_secs(3600));
        assert_eq!(c.settlement_interval(), Duration::from_secs(900));
        assert_eq!(c.staking_policy(), StakingPolicy::default());
        assert_eq!(c.quote_selection, QuoteSelection::First);
    }

    #[test]
    fn quote_selection_flag() {
        assert_eq!(parse(&["--quote-selection", "best"]).quote_selection, QuoteSelection::Best);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(parse(&["--stake-fraction", "0"]).validate().is_err());
        assert!(parse(&["--stake-fraction", "1.5"]).validate().is_err());
        assert!(parse(&["--min-edge=-0.1"]).validate().is_err());
        assert!(parse(&["--settlement-interval-secs", "0"]).validate().is_err());
    }
}
