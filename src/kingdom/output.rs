//! Headless simulation runs and their serializable output

use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::clock::SessionClock;
use crate::core::config::KingdomConfig;
use crate::kingdom::chronicle::{Chronicle, ChronicleEntry};
use crate::kingdom::save::SaveRecord;
use crate::kingdom::state::Kingdom;

/// Session time that passes per simulated year; longer than the default event cooldown
pub const YEAR_STEP: Duration = Duration::from_secs(6);

/// Complete result of a headless run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationOutput {
    pub seed: u64,
    pub final_state: SaveRecord,
    pub chronicle: Chronicle,
    pub statistics: SimulationStats,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationStats {
    pub years_requested: u32,
    pub years_simulated: u32,
    pub simulation_time_ms: u64,
    pub total_entries: u32,
    pub events: u32,
    pub battles: u32,
    pub unrest: u32,
    pub corruption_scandals: u32,
    pub commander_plots: u32,
    pub taxes_collected: i64,
    pub game_over: bool,
}

/// Advance a fresh kingdom up to `years` times, stopping early if it falls
pub fn simulate(name: &str, config: &KingdomConfig, seed: u64, years: u32) -> SimulationOutput {
    let start = Instant::now();
    let mut kingdom = Kingdom::with_config(
        name,
        config,
        ChaCha8Rng::seed_from_u64(seed),
        SessionClock::manual(),
    );

    let mut years_simulated = 0;
    while years_simulated < years && !kingdom.is_game_over() {
        kingdom.clock_mut().advance(YEAR_STEP);
        kingdom.advance_year();
        years_simulated += 1;
    }

    SimulationOutput::new(seed, &kingdom, years, years_simulated, start.elapsed())
}

impl SimulationOutput {
    pub fn new(seed: u64, kingdom: &Kingdom, years_requested: u32, years_simulated: u32, elapsed: Duration) -> Self {
        let chronicle = kingdom.chronicle().clone();
        let count = |pred: fn(&ChronicleEntry) -> bool| {
            chronicle.entries.iter().filter(|e| pred(&e.entry)).count() as u32
        };

        let taxes_collected = chronicle
            .entries
            .iter()
            .filter_map(|e| match e.entry {
                ChronicleEntry::TaxesCollected { amount } => Some(amount),
                _ => None,
            })
            .sum();

        let statistics = SimulationStats {
            years_requested,
            years_simulated,
            simulation_time_ms: elapsed.as_millis() as u64,
            total_entries: chronicle.len() as u32,
            events: chronicle.count_events() as u32,
            battles: chronicle.count_battles() as u32,
            unrest: count(|e| matches!(e, ChronicleEntry::Unrest { .. })),
            corruption_scandals: count(|e| matches!(e, ChronicleEntry::CorruptionScandal { .. })),
            commander_plots: count(|e| matches!(e, ChronicleEntry::CommanderPlotting { .. })),
            taxes_collected,
            game_over: kingdom.is_game_over(),
        };

        Self {
            seed,
            final_state: SaveRecord::capture(kingdom),
            chronicle,
            statistics,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn summary(&self) -> String {
        format!(
            "{} ruled {} of {} years in {}ms (score {})\n{} events, {} battles, {} unrest, {} scandals{}",
            self.final_state.name,
            self.statistics.years_simulated,
            self.statistics.years_requested,
            self.statistics.simulation_time_ms,
            self.final_state.score,
            self.statistics.events,
            self.statistics.battles,
            self.statistics.unrest,
            self.statistics.corruption_scandals,
            if self.statistics.game_over { "\nThe kingdom has fallen" } else { "" },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulate_is_reproducible() {
        let config = KingdomConfig::default();
        let a = simulate("Avalon", &config, 7, 15);
        let b = simulate("Avalon", &config, 7, 15);

        assert_eq!(a.final_state, b.final_state);
        assert_eq!(a.chronicle.entries, b.chronicle.entries);
    }

    #[test]
    fn test_statistics_match_chronicle() {
        let output = simulate("Avalon", &KingdomConfig::default(), 11, 10);
        let stats = &output.statistics;

        assert!(stats.years_simulated <= 10);
        assert_eq!(stats.total_entries as usize, output.chronicle.len());
        assert!(stats.taxes_collected > 0);
        assert_eq!(output.final_state.year, 1 + stats.years_simulated);
    }

    #[test]
    fn test_json_contains_sections() {
        let output = simulate("Avalon", &KingdomConfig::default(), 3, 2);
        let json = output.to_json();
        assert!(json.contains("\"final_state\""));
        assert!(json.contains("\"statistics\""));
        assert!(output.summary().starts_with("Avalon ruled"));
    }
}
