//! Kingdom Simulation
//!
//! One player-controlled kingdom advanced a year at a time. The
//! [`Kingdom`] owns every subsystem, the random stream and the session
//! clock, and runs the yearly pipeline in a fixed order.

pub mod chronicle;
pub mod events;
pub mod leader;
pub mod output;
pub mod realm;
pub mod report;
pub mod resource;
pub mod save;
pub mod simulation;
pub mod state;
pub mod systems;

pub use chronicle::{Chronicle, ChronicleEntry, Entry, UnrestCause};
pub use events::{EventKind, EventOutcome, RandomEvents};
pub use leader::{ActionOutcome, Commander, GuildLeader, GuildType, King, Leader, LeaderStats, RulerAction, RulerWarning};
pub use output::{simulate, SimulationOutput, SimulationStats};
pub use realm::Realm;
pub use resource::{Resource, ResourceKind};
pub use save::{SaveRecord, SAVE_VERSION};
pub use simulation::YearReport;
pub use state::Kingdom;
