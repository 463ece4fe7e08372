//! Kingdom subsystems
//!
//! Each subsystem owns its own state and exposes clamping setters. Updates
//! that depend on another subsystem take it by reference; the orchestrator
//! in [`crate::kingdom::state`] decides the order.

pub mod army;
pub mod bank;
pub mod diplomacy;
pub mod economy;
pub mod market;
pub mod population;

pub use army::{Army, Losses, UnitType};
pub use bank::Bank;
pub use diplomacy::{BattleOutcome, BattleReport, Diplomacy, ForeignKingdom, TradeDeal};
pub use economy::{Economy, Estate, Upkeep};
pub use market::Market;
pub use population::Population;
