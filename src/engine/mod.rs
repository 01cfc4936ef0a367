pub mod pricing;
pub mod settlement;
pub mod simulation;
pub mod staking;
pub mod value;

pub use settlement::{SettlementReport, Settler};
pub use simulation::{SimulationReport, Simulator};
