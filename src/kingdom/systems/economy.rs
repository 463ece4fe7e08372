//! Economy - tax rates, inflation, treasury and debt

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::kingdom::systems::{Army, Population};

/// Which estate a tax rate applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Estate {
    Peasants,
    Merchants,
    Nobles,
}

/// Gold actually paid out during a yearly economy update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upkeep {
    pub army: i64,
    pub bureaucracy: i64,
}

impl Upkeep {
    pub fn total(&self) -> i64 {
        self.army + self.bureaucracy
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Economy {
    peasant_tax_rate: f64,
    merchant_tax_rate: f64,
    noble_tax_rate: f64,
    inflation: f64,
    treasury: i64,
    debt: i64,
}

impl Default for Economy {
    fn default() -> Self {
        Self::new(0.10, 0.15, 0.20)
    }
}

impl Economy {
    pub fn new(peasant_tax_rate: f64, merchant_tax_rate: f64, noble_tax_rate: f64) -> Self {
        let mut economy = Self {
            peasant_tax_rate: 0.0,
            merchant_tax_rate: 0.0,
            noble_tax_rate: 0.0,
            inflation: 0.02,
            treasury: 1000,
            debt: 0,
        };
        economy.set_peasant_tax_rate(peasant_tax_rate);
        economy.set_merchant_tax_rate(merchant_tax_rate);
        economy.set_noble_tax_rate(noble_tax_rate);
        economy
    }

    pub fn peasant_tax_rate(&self) -> f64 {
        self.peasant_tax_rate
    }

    pub fn merchant_tax_rate(&self) -> f64 {
        self.merchant_tax_rate
    }

    pub fn noble_tax_rate(&self) -> f64 {
        self.noble_tax_rate
    }

    pub fn tax_rate(&self, estate: Estate) -> f64 {
        match estate {
            Estate::Peasants => self.peasant_tax_rate,
            Estate::Merchants => self.merchant_tax_rate,
            Estate::Nobles => self.noble_tax_rate,
        }
    }

    pub fn inflation(&self) -> f64 {
        self.inflation
    }

    pub fn treasury(&self) -> i64 {
        self.treasury
    }

    pub fn debt(&self) -> i64 {
        self.debt
    }

    pub fn set_peasant_tax_rate(&mut self, rate: f64) {
        self.peasant_tax_rate = rate.clamp(0.0, 0.5);
    }

    pub fn set_merchant_tax_rate(&mut self, rate: f64) {
        self.merchant_tax_rate = rate.clamp(0.0, 0.5);
    }

    pub fn set_noble_tax_rate(&mut self, rate: f64) {
        self.noble_tax_rate = rate.clamp(0.0, 0.5);
    }

    pub fn set_tax_rate(&mut self, estate: Estate, rate: f64) {
        match estate {
            Estate::Peasants => self.set_peasant_tax_rate(rate),
            Estate::Merchants => self.set_merchant_tax_rate(rate),
            Estate::Nobles => self.set_noble_tax_rate(rate),
        }
    }

    pub fn set_inflation(&mut self, value: f64) {
        self.inflation = value.clamp(0.01, 0.2);
    }

    pub fn set_treasury(&mut self, amount: i64) {
        self.treasury = amount.max(0);
    }

    pub fn set_debt(&mut self, amount: i64) {
        self.debt = amount.max(0);
    }

    /// Levy every estate and deposit the proceeds; returns the total collected
    pub fn collect_taxes(&mut self, population: &Population) -> i64 {
        let peasant_tax = (population.peasants() as f64 * 2.0 * self.peasant_tax_rate) as i64;
        let merchant_tax = (population.merchants() as f64 * 10.0 * self.merchant_tax_rate) as i64;
        let noble_tax = (population.nobles() as f64 * 50.0 * self.noble_tax_rate) as i64;

        let total = peasant_tax + merchant_tax + noble_tax;
        self.treasury = self.treasury.saturating_add(total);
        total
    }

    /// Pay upkeep, drift inflation and accrue interest on outstanding debt
    pub fn update_economy(&mut self, population: &Population, army: &Army) -> Upkeep {
        let army_cost = (army.total() as i64 * 2).min(self.treasury);
        self.treasury -= army_cost;

        let bureaucracy_cost = (population.total() as i64 / 10).min(self.treasury);
        self.treasury -= bureaucracy_cost;

        let economic_activity = population.total() as f64 / 1000.0;
        let treasury_ratio = (self.treasury as f64 / 10000.0).min(1.0);
        let inflation = self.inflation * 0.8 + economic_activity * 0.05 - treasury_ratio * 0.03;
        self.inflation = inflation.clamp(0.01, 0.2);

        if self.debt > 0 {
            self.debt = self.debt.saturating_add((self.debt as f64 * 0.1) as i64);
        }

        tracing::debug!(
            army_cost,
            bureaucracy_cost,
            inflation = self.inflation,
            debt = self.debt,
            "economy updated"
        );

        Upkeep {
            army: army_cost,
            bureaucracy: bureaucracy_cost,
        }
    }

    /// Economic instability; may be negative for a content, lightly taxed realm
    pub fn calculate_unrest(&self, population: &Population) -> f64 {
        let tax_burden = (self.peasant_tax_rate + self.merchant_tax_rate + self.noble_tax_rate) / 3.0;
        let inflation_impact = self.inflation * 5.0;
        (tax_burden * 0.5 + inflation_impact * 0.3 - population.happiness() * 0.5).min(1.0)
    }

    pub fn check_riots<R: Rng + ?Sized>(&self, population: &Population, rng: &mut R) -> bool {
        let unrest = self.calculate_unrest(population);
        unrest > 0.6 && (rng.gen_range(0..100) as f64) < unrest * 100.0
    }
}
