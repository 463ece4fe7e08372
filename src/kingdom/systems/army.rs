//! Army - standing forces, morale and training

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::clock::SimulatedDelay;
use crate::core::error::{KingdomError, Result};
use crate::kingdom::systems::{Economy, Population};

/// Arms a kingdom can recruit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitType {
    Infantry,
    Cavalry,
    Archers,
}

impl UnitType {
    /// Gold per recruit
    pub fn recruit_cost(&self) -> i64 {
        match self {
            UnitType::Infantry => 10,
            UnitType::Cavalry => 20,
            UnitType::Archers => 15,
        }
    }

    /// Largest batch the recruiting office takes at once
    pub fn max_batch(&self) -> u32 {
        match self {
            UnitType::Infantry => 100,
            UnitType::Cavalry | UnitType::Archers => 50,
        }
    }
}

/// Casualties split across the three arms
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Losses {
    pub infantry: u32,
    pub cavalry: u32,
    pub archers: u32,
}

impl Losses {
    pub fn total(&self) -> u32 {
        self.infantry.saturating_add(self.cavalry).saturating_add(self.archers)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Army {
    infantry: u32,
    cavalry: u32,
    archers: u32,
    morale: f64,
    training_level: u32,
    at_war: bool,
}

impl Default for Army {
    fn default() -> Self {
        Self::new(50, 10, 20)
    }
}

impl Army {
    pub fn new(infantry: u32, cavalry: u32, archers: u32) -> Self {
        Self {
            infantry,
            cavalry,
            archers,
            morale: 0.7,
            training_level: 1,
            at_war: false,
        }
    }

    pub fn infantry(&self) -> u32 {
        self.infantry
    }

    pub fn cavalry(&self) -> u32 {
        self.cavalry
    }

    pub fn archers(&self) -> u32 {
        self.archers
    }

    pub fn total(&self) -> u32 {
        self.infantry.saturating_add(self.cavalry).saturating_add(self.archers)
    }

    pub fn morale(&self) -> f64 {
        self.morale
    }

    pub fn training_level(&self) -> u32 {
        self.training_level
    }

    pub fn is_at_war(&self) -> bool {
        self.at_war
    }

    pub fn set_infantry(&mut self, count: u32) {
        self.infantry = count;
    }

    pub fn set_cavalry(&mut self, count: u32) {
        self.cavalry = count;
    }

    pub fn set_archers(&mut self, count: u32) {
        self.archers = count;
    }

    pub fn set_morale(&mut self, value: f64) {
        self.morale = value.clamp(0.0, 1.0);
    }

    pub fn set_training_level(&mut self, level: u32) {
        self.training_level = level.max(1);
    }

    pub fn set_war_status(&mut self, at_war: bool) {
        self.at_war = at_war;
    }

    /// Drill the troops: +1 training, +0.1 morale
    pub fn train(&mut self) -> SimulatedDelay {
        self.training_level += 1;
        self.morale = (self.morale + 0.1).min(1.0);
        tracing::info!(
            training_level = self.training_level,
            morale = self.morale,
            "army trained"
        );
        SimulatedDelay::drill("Training army units")
    }

    /// Enlist `count` soldiers of one arm, paid from the treasury up front
    pub fn recruit(&mut self, unit: UnitType, count: u32, economy: &mut Economy) -> Result<i64> {
        if count == 0 {
            return Err(KingdomError::Validation("recruit count must be positive".into()));
        }
        let cost = unit.recruit_cost() * count as i64;
        if economy.treasury() < cost {
            return Err(KingdomError::InsufficientFunds {
                needed: cost,
                available: economy.treasury(),
            });
        }

        economy.set_treasury(economy.treasury() - cost);
        match unit {
            UnitType::Infantry => self.infantry = self.infantry.saturating_add(count),
            UnitType::Cavalry => self.cavalry = self.cavalry.saturating_add(count),
            UnitType::Archers => self.archers = self.archers.saturating_add(count),
        }
        Ok(cost)
    }

    /// Weighted head count scaled by morale and training
    pub fn calculate_strength(&self) -> i64 {
        let base = self.infantry as f64 + self.cavalry as f64 * 3.0 + self.archers as f64 * 2.0;
        let morale_multiplier = 0.5 + self.morale * 0.5;
        let training_multiplier = 0.8 + self.training_level as f64 * 0.2;
        (base * morale_multiplier * training_multiplier) as i64
    }

    /// Blend morale with pay, popular support and the war situation
    pub fn update_morale(&mut self, economy: &Economy, population: &Population) {
        let pay_factor = if self.total() == 0 {
            1.0
        } else {
            (economy.treasury() as f64 / (self.total() as f64 * 5.0)).min(1.0)
        };
        let war_effect = if self.at_war { -0.1 } else { 0.05 };

        let blended = self.morale * 0.7 + pay_factor * 0.1 + population.happiness() * 0.1 + war_effect;
        self.morale = blended.clamp(0.1, 1.0);
    }

    /// Lose soldiers to low morale; returns how many left
    pub fn calculate_desertion(&mut self) -> u32 {
        if self.morale >= 0.4 {
            return 0;
        }
        let rate = (0.4 - self.morale) * 0.5;
        let deserters = (self.total() as f64 * rate) as u32;
        let losses = self.take_losses(
            (deserters as f64 * 0.6) as u32,
            (deserters as f64 * 0.2) as u32,
            (deserters as f64 * 0.2) as u32,
        );
        if losses.total() > 0 {
            tracing::warn!(deserters = losses.total(), "soldiers deserted");
        }
        losses.total()
    }

    /// Whether the troops turn on the ruler; needs both army and people at breaking point
    pub fn check_rebellion<R: Rng + ?Sized>(&self, population: &Population, rng: &mut R) -> bool {
        if self.morale < 0.2 && population.happiness() < 0.3 {
            let chance = (0.2 - self.morale) * 100.0 * 3.0;
            return (rng.gen_range(0..100) as f64) < chance;
        }
        false
    }

    /// Lose a tenth of the army split 6/2/2 across infantry, cavalry and archers
    pub(crate) fn suffer_defeat(&mut self) -> Losses {
        let loss = self.total() / 10;
        self.take_losses(loss * 6 / 10, loss * 2 / 10, loss * 2 / 10)
    }

    pub(crate) fn take_losses(&mut self, infantry: u32, cavalry: u32, archers: u32) -> Losses {
        let losses = Losses {
            infantry: infantry.min(self.infantry),
            cavalry: cavalry.min(self.cavalry),
            archers: archers.min(self.archers),
        };
        self.infantry -= losses.infantry;
        self.cavalry -= losses.cavalry;
        self.archers -= losses.archers;
        losses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn test_default_strength() {
        // (50 + 30 + 40) * 0.85 * 1.0
        assert_eq!(Army::default().calculate_strength(), 102);
    }

    #[test]
    fn test_morale_update_at_peace() {
        let mut army = Army::default();
        let economy = Economy::default();
        let population = Population::default();

        army.update_morale(&economy, &population);

        // 0.49 + 0.1 + 0.05 + 0.05
        assert!((army.morale() - 0.69).abs() < 1e-9);
    }

    #[test]
    fn test_morale_floor_after_update() {
        let mut army = Army::default();
        army.set_morale(0.0);
        army.set_war_status(true);
        let mut economy = Economy::default();
        economy.set_treasury(0);
        let mut population = Population::default();
        population.set_happiness(0.0);

        army.update_morale(&economy, &population);
        assert_eq!(army.morale(), 0.1);
    }

    #[test]
    fn test_desertion_split() {
        let mut army = Army::new(100, 50, 50);
        army.set_morale(0.2);

        // rate 0.1 of 200 = 20 -> 12 / 4 / 4
        let deserted = army.calculate_desertion();
        assert_eq!(deserted, 20);
        assert_eq!(army.infantry(), 88);
        assert_eq!(army.cavalry(), 46);
        assert_eq!(army.archers(), 46);
    }

    #[test]
    fn test_no_desertion_with_good_morale() {
        let mut army = Army::default();
        assert_eq!(army.calculate_desertion(), 0);
        assert_eq!(army.total(), 80);
    }

    #[test]
    fn test_rebellion_needs_both_conditions() {
        let mut army = Army::default();
        army.set_morale(0.1);
        let mut population = Population::default();

        assert!(!army.check_rebellion(&population, &mut StepRng::new(0, 0)));

        population.set_happiness(0.2);
        assert!(army.check_rebellion(&population, &mut StepRng::new(0, 0)));
    }

    #[test]
    fn test_train() {
        let mut army = Army::default();
        let delay = army.train();
        assert_eq!(army.training_level(), 2);
        assert!((army.morale() - 0.8).abs() < 1e-9);
        assert_eq!(delay.steps, 3);
    }

    #[test]
    fn test_recruit_charges_treasury() {
        let mut army = Army::default();
        let mut economy = Economy::default();

        let cost = army.recruit(UnitType::Cavalry, 10, &mut economy).unwrap();
        assert_eq!(cost, 200);
        assert_eq!(army.cavalry(), 20);
        assert_eq!(economy.treasury(), 800);
    }

    #[test]
    fn test_recruit_underfunded_is_noop() {
        let mut army = Army::default();
        let mut economy = Economy::default();
        economy.set_treasury(50);

        let result = army.recruit(UnitType::Infantry, 6, &mut economy);
        assert!(matches!(result, Err(KingdomError::InsufficientFunds { needed: 60, .. })));
        assert_eq!(army.infantry(), 50);
        assert_eq!(economy.treasury(), 50);
    }

    #[test]
    fn test_recruit_saturates_head_count() {
        let mut army = Army::default();
        army.set_infantry(u32::MAX - 5);
        let mut economy = Economy::default();

        let cost = army.recruit(UnitType::Infantry, 10, &mut economy).unwrap();
        assert_eq!(cost, 100);
        assert_eq!(army.infantry(), u32::MAX);
        assert_eq!(army.total(), u32::MAX);
    }

    #[test]
    fn test_defeat_losses() {
        let mut army = Army::default();
        let losses = army.suffer_defeat();
        // 8 lost -> 4 / 1 / 1
        assert_eq!(losses, Losses { infantry: 4, cavalry: 1, archers: 1 });
        assert_eq!(army.total(), 74);
    }

    proptest! {
        #[test]
        fn prop_morale_setter_in_range(value in -1.0e6..1.0e6f64) {
            let mut army = Army::default();
            army.set_morale(value);
            prop_assert!((0.0..=1.0).contains(&army.morale()));
        }

        #[test]
        fn prop_training_never_below_one(level in 0..1000u32) {
            let mut army = Army::default();
            army.set_training_level(level);
            prop_assert!(army.training_level() >= 1);
        }
    }
}
