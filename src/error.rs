use thiserror::Error;

/// Engine-level failures that abort a single unit of work.
///
/// Data insufficiency (missing stats, no quote, no final score) is never an
/// error: those paths return `None` and the unit is reconsidered next pass.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("portfolio {0} not found")]
    PortfolioNotFound(i64),

    #[error("analysis model {0} not found")]
    ModelNotFound(i64),

    #[error("fixture {0} not found")]
    FixtureNotFound(i64),

    #[error("portfolio {portfolio_id} balance {balance:.2} cannot cover stake {stake:.2}")]
    InsufficientBalance {
        portfolio_id: i64,
        balance: f64,
        stake: f64,
    },

    #[error("invalid portfolio: {0}")]
    InvalidPortfolio(String),

    #[error("database connection lock poisoned")]
    LockPoisoned,
}

/// Whether a failure means the store itself is unusable, in which case the
/// current pass ends and is retried on the next tick.
pub fn is_systemic(err: &anyhow::Error) -> bool {
    if let Some(EngineError::LockPoisoned) = err.downcast_ref::<EngineError>() {
        return true;
    }
    match err.downcast_ref::<rusqlite::Error>() {
        Some(rusqlite::Error::SqliteFailure(e, _)) => matches!(
            e.code,
            rusqlite::ErrorCode::CannotOpen
                | rusqlite::ErrorCode::SystemIoFailure
                | rusqlite::ErrorCode::DatabaseCorrupt
                | rusqlite::ErrorCode::NotADatabase
                | rusqlite::ErrorCode::OutOfMemory
                | rusqlite::ErrorCode::DiskFull
        ),
        _ => false,
    }
}

/// Whether a failure came from the store rather than from missing data.
pub fn is_persistence(err: &anyhow::Error) -> bool {
    err.downcast_ref::<rusqlite::Error>().is_some()
        || matches!(err.downcast_ref::<EngineError>(), Some(EngineError::LockPoisoned))
}
