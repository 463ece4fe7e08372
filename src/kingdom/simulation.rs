//! The yearly update pipeline

use serde::{Deserialize, Serialize};

use crate::kingdom::chronicle::{ChronicleEntry, Entry, UnrestCause};
use crate::kingdom::events::EventKind;
use crate::kingdom::resource::ResourceKind;
use crate::kingdom::state::Kingdom;
use crate::kingdom::systems::Upkeep;

/// Summary of one `advance_year` call
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct YearReport {
    /// The year the kingdom has now reached
    pub year: u32,
    pub upkeep: Upkeep,
    pub taxes: i64,
    pub score: i64,
    /// Everything chronicled during the year just completed
    pub entries: Vec<Entry>,
}

impl Kingdom {
    /// Run one full year of the simulation
    ///
    /// Stages run in a fixed order: population, happiness, morale, economy,
    /// prices, production, consumption, diplomacy, interest, corruption,
    /// ruler effects, resource effects, random event, unrest, taxes. The year
    /// then advances and the score is recomputed.
    pub fn advance_year(&mut self) -> YearReport {
        let year = self.year;
        tracing::info!(year = year + 1, kingdom = %self.name, "advancing year");

        let food_security = self.food_security();
        self.population
            .update_population(&self.economy, food_security, &mut self.rng);
        self.population.calculate_happiness(&self.economy, &self.army);
        self.army.update_morale(&self.economy, &self.population);
        let upkeep = self.economy.update_economy(&self.population, &self.army);

        self.market.update_prices(&self.economy, &mut self.rng);
        self.market.produce_resources(&self.population);
        self.market.consume_resources(&self.population, &self.army);

        let battles = self.diplomacy.update_diplomacy(&self.army, &mut self.rng);
        for report in battles {
            self.record(ChronicleEntry::Battle(report));
        }

        self.bank.update_interest(&mut self.economy);
        if let Some(skimmed) =
            self.bank
                .attempt_corruption(&mut self.economy, &mut self.population, &mut self.rng)
        {
            self.record(ChronicleEntry::CorruptionScandal { skimmed });
        }

        self.apply_ruler_effects();

        for kind in [ResourceKind::Food, ResourceKind::Iron] {
            self.market
                .resource(kind)
                .apply_effects(&mut self.population, &mut self.army);
        }

        if self.events.check_for_event(self.clock.elapsed(), &mut self.rng) {
            let kind = self.events.generate_event(&mut self.rng);
            let outcome = self.apply_event(kind);
            self.record(ChronicleEntry::Event { outcome, manual: false });
        }

        if let Some(cause) = self.check_unrest() {
            tracing::warn!(?cause, "unrest threatens the kingdom");
            self.record(ChronicleEntry::Unrest { cause });
            let outcome = self.apply_event(EventKind::Rebellion);
            self.record(ChronicleEntry::Event { outcome, manual: false });
        }

        let taxes = self.economy.collect_taxes(&self.population);
        self.record(ChronicleEntry::TaxesCollected { amount: taxes });

        self.year += 1;
        let score = self.calculate_score();
        tracing::debug!(
            year = self.year,
            score,
            treasury = self.economy.treasury(),
            population = self.population.total(),
            "year complete"
        );

        YearReport {
            year: self.year,
            upkeep,
            taxes,
            score,
            entries: self.chronicle.entries_for_year(year).cloned().collect(),
        }
    }

    /// First unrest source that boils over this year, if any
    fn check_unrest(&mut self) -> Option<UnrestCause> {
        if self.population.check_rebellion(&mut self.rng) {
            Some(UnrestCause::Populace)
        } else if self.army.check_rebellion(&self.population, &mut self.rng) {
            Some(UnrestCause::Army)
        } else if self.economy.check_riots(&self.population, &mut self.rng) {
            Some(UnrestCause::Riots)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::SessionClock;
    use crate::core::config::KingdomConfig;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn quiet_config() -> KingdomConfig {
        let mut config = KingdomConfig::default();
        config.events.chance = 0;
        config
    }

    #[test]
    fn test_year_advances_and_reports_taxes() {
        let mut kingdom = Kingdom::with_config(
            "Test",
            &quiet_config(),
            ChaCha8Rng::seed_from_u64(1),
            SessionClock::manual(),
        );
        let report = kingdom.advance_year();

        assert_eq!(report.year, 2);
        assert_eq!(kingdom.year(), 2);
        assert!(report.taxes > 0);
        assert_eq!(report.upkeep.army, 160);
        assert!(report
            .entries
            .iter()
            .any(|e| matches!(e.entry, ChronicleEntry::TaxesCollected { .. })));
        assert_eq!(report.score, kingdom.score());
    }

    #[test]
    fn test_no_event_before_cooldown() {
        let mut config = KingdomConfig::default();
        config.events.chance = 100;
        let mut kingdom =
            Kingdom::with_config("Test", &config, ChaCha8Rng::seed_from_u64(2), SessionClock::manual());

        kingdom.advance_year();
        let fired = kingdom
            .chronicle()
            .entries
            .iter()
            .filter(|e| matches!(e.entry, ChronicleEntry::Event { manual: false, .. }))
            .count();
        let unrest = kingdom
            .chronicle()
            .entries
            .iter()
            .filter(|e| matches!(e.entry, ChronicleEntry::Unrest { .. }))
            .count();
        assert_eq!(fired, unrest);
    }

    #[test]
    fn test_event_fires_after_cooldown() {
        let mut config = KingdomConfig::default();
        config.events.chance = 100;
        let mut kingdom =
            Kingdom::with_config("Test", &config, ChaCha8Rng::seed_from_u64(2), SessionClock::manual());

        kingdom.clock_mut().advance(std::time::Duration::from_secs(5));
        kingdom.advance_year();
        assert!(kingdom.chronicle().count_events() >= 1);
    }

    #[test]
    fn test_same_seed_same_history() {
        let run = |seed| {
            let mut kingdom = Kingdom::with_seed("Test", seed);
            for _ in 0..10 {
                kingdom.clock_mut().advance(std::time::Duration::from_secs(6));
                kingdom.advance_year();
            }
            (kingdom.score(), kingdom.population().total(), kingdom.economy().treasury())
        };
        assert_eq!(run(42), run(42));
    }
}
