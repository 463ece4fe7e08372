//! Core infrastructure shared by the simulation and its front ends

pub mod clock;
pub mod config;
pub mod error;

pub use clock::{SessionClock, SimulatedDelay};
pub use config::KingdomConfig;
pub use error::{KingdomError, Result};
