//! Population - peasant/merchant/noble cohorts, growth and contentment

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::kingdom::systems::{Army, Economy};

/// Demographic state of the kingdom
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Population {
    peasants: u32,
    merchants: u32,
    nobles: u32,
    growth_rate: f64,
    happiness: f64,
}

impl Default for Population {
    fn default() -> Self {
        Self::new(100, 20, 5)
    }
}

impl Population {
    pub fn new(peasants: u32, merchants: u32, nobles: u32) -> Self {
        Self {
            peasants,
            merchants,
            nobles,
            growth_rate: 0.05,
            happiness: 0.5,
        }
    }

    pub fn peasants(&self) -> u32 {
        self.peasants
    }

    pub fn merchants(&self) -> u32 {
        self.merchants
    }

    pub fn nobles(&self) -> u32 {
        self.nobles
    }

    pub fn total(&self) -> u32 {
        self.peasants.saturating_add(self.merchants).saturating_add(self.nobles)
    }

    pub fn growth_rate(&self) -> f64 {
        self.growth_rate
    }

    pub fn happiness(&self) -> f64 {
        self.happiness
    }

    pub fn set_peasants(&mut self, count: u32) {
        self.peasants = count;
    }

    pub fn set_merchants(&mut self, count: u32) {
        self.merchants = count;
    }

    pub fn set_nobles(&mut self, count: u32) {
        self.nobles = count;
    }

    pub fn set_growth_rate(&mut self, rate: f64) {
        self.growth_rate = rate.clamp(0.0, 0.2);
    }

    pub fn set_happiness(&mut self, value: f64) {
        self.happiness = value.clamp(0.0, 1.0);
    }

    /// Grow every cohort and roll for social mobility
    ///
    /// `food_security` is the fraction of the population the granary can
    /// feed this year, 0.0 - 1.0.
    pub fn update_population<R: Rng + ?Sized>(
        &mut self,
        economy: &Economy,
        food_security: f64,
        rng: &mut R,
    ) {
        let tax_burden = economy.peasant_tax_rate() + economy.merchant_tax_rate() + economy.noble_tax_rate();

        let rate = 0.05 + self.happiness * 0.05 - tax_burden * 0.1 + food_security * 0.02;
        self.growth_rate = rate.clamp(0.01, 0.2);

        self.peasants = self.peasants.saturating_add((self.peasants as f64 * self.growth_rate) as u32);
        self.merchants = self
            .merchants
            .saturating_add((self.merchants as f64 * (self.growth_rate * 0.8)) as u32);
        self.nobles = self.nobles.saturating_add((self.nobles as f64 * (self.growth_rate * 0.5)) as u32);

        // Peasants rising into trade
        if rng.gen_range(0..100) < 5 {
            let movers = ((self.peasants as f64 * 0.01) as u32).max(1).min(self.peasants);
            self.peasants -= movers;
            self.merchants = self.merchants.saturating_add(movers);
        }

        // Merchants bought into the nobility
        if rng.gen_range(0..100) < 2 {
            let movers = ((self.merchants as f64 * 0.01) as u32).max(1).min(self.merchants);
            self.merchants -= movers;
            self.nobles = self.nobles.saturating_add(movers);
        }

        tracing::debug!(
            growth_rate = self.growth_rate,
            total = self.total(),
            "population updated"
        );
    }

    /// Blend last year's happiness with taxes, garrison presence and inflation
    pub fn calculate_happiness(&mut self, economy: &Economy, army: &Army) {
        let tax_factor = 1.0
            - (economy.peasant_tax_rate() * 2.0
                + economy.merchant_tax_rate() * 1.5
                + economy.noble_tax_rate() * 0.5);

        let army_presence = if self.total() == 0 {
            1.0
        } else {
            (army.total() as f64 / self.total() as f64 * 0.5).min(1.0)
        };

        let inflation_factor = 1.0 - economy.inflation() * 2.0;

        let blended = self.happiness * 0.7
            + tax_factor * 0.1
            + army_presence * 0.1
            + inflation_factor * 0.1;

        self.happiness = blended.clamp(0.0, 1.0);
    }

    /// Whether a miserable population rises up this year
    pub fn check_rebellion<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        if self.happiness < 0.2 {
            let chance = (0.2 - self.happiness) * 100.0 * 2.0;
            return (rng.gen_range(0..100) as f64) < chance;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_default_growth() {
        let mut population = Population::default();
        let economy = Economy::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        population.update_population(&economy, 1.0, &mut rng);

        // 0.05 + 0.025 - 0.045 + 0.02
        assert!((population.growth_rate() - 0.05).abs() < 1e-9);
        assert!(population.total() > 125);
    }

    #[test]
    fn test_growth_rate_clamped_low() {
        let mut population = Population::new(100, 20, 5);
        population.set_happiness(0.0);
        let mut economy = Economy::default();
        economy.set_peasant_tax_rate(0.5);
        economy.set_merchant_tax_rate(0.5);
        economy.set_noble_tax_rate(0.5);

        population.update_population(&economy, 0.0, &mut ChaCha8Rng::seed_from_u64(1));
        assert_eq!(population.growth_rate(), 0.01);
    }

    #[test]
    fn test_social_mobility_on_low_roll() {
        // A roll of zero passes both mobility checks
        let mut population = Population::new(1000, 100, 10);
        population.set_happiness(0.0);
        let mut economy = Economy::default();
        economy.set_peasant_tax_rate(0.5);
        economy.set_merchant_tax_rate(0.5);
        economy.set_noble_tax_rate(0.5);

        population.update_population(&economy, 0.0, &mut StepRng::new(0, 0));

        // growth 1% : 1000 -> 1010, then 10 move up; 100 -> 100 + 10, then 1 moves up
        assert_eq!(population.peasants(), 1000);
        assert_eq!(population.merchants(), 109);
        assert_eq!(population.nobles(), 11);
    }

    #[test]
    fn test_huge_estates_saturate_instead_of_overflowing() {
        let mut population = Population::new(4_000_000_000, 10, 10);
        let economy = Economy::default();

        population.update_population(&economy, 1.0, &mut StepRng::new(0, 0));

        assert!(population.peasants() >= 4_000_000_000);
        assert_eq!(population.total(), u32::MAX);
    }

    #[test]
    fn test_happiness_blend() {
        let mut population = Population::default();
        let economy = Economy::default();
        let army = Army::default();

        population.calculate_happiness(&economy, &army);

        // tax 1 - (0.2 + 0.225 + 0.1) = 0.475, presence min(1, 80/125*0.5) = 0.32,
        // inflation 1 - 0.04 = 0.96
        let expected = 0.35 + 0.0475 + 0.032 + 0.096;
        assert!((population.happiness() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_content_population_never_rebels() {
        let population = Population::default();
        assert!(!population.check_rebellion(&mut StepRng::new(0, 0)));
    }

    #[test]
    fn test_miserable_population_rebels_on_low_roll() {
        let mut population = Population::default();
        population.set_happiness(0.05);
        assert!(population.check_rebellion(&mut StepRng::new(0, 0)));
    }

    proptest! {
        #[test]
        fn prop_happiness_setter_in_range(value in -1.0e6..1.0e6f64) {
            let mut population = Population::default();
            population.set_happiness(value);
            prop_assert!((0.0..=1.0).contains(&population.happiness()));
        }

        #[test]
        fn prop_growth_rate_setter_in_range(value in -1.0e6..1.0e6f64) {
            let mut population = Population::default();
            population.set_growth_rate(value);
            prop_assert!((0.0..=0.2).contains(&population.growth_rate()));
        }
    }
}
