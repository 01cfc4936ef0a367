pub mod provider;
pub mod snapshot;

pub use provider::MatchDataSource;
pub use snapshot::Snapshot;
