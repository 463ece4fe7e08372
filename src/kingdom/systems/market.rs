//! Market - the kingdom's stockpiles, prices and trade

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::MarketConfig;
use crate::core::error::{KingdomError, Result};
use crate::kingdom::resource::{Resource, ResourceKind};
use crate::kingdom::systems::{Army, Economy, Population};

/// Fee the market keeps on every sale
const SALE_FEE: f64 = 0.1;

/// Base unit value before inflation and noise
fn base_value(kind: ResourceKind) -> Option<f64> {
    match kind {
        ResourceKind::Food => Some(1.0),
        ResourceKind::Wood => Some(2.0),
        ResourceKind::Stone => Some(3.0),
        ResourceKind::Iron => Some(5.0),
        ResourceKind::Gold => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    food: Resource,
    gold: Resource,
    wood: Resource,
    stone: Resource,
    iron: Resource,
    price_fluctuation: f64,
}

impl Default for Market {
    fn default() -> Self {
        Self::from_config(&MarketConfig::default())
    }
}

impl Market {
    pub fn from_config(config: &MarketConfig) -> Self {
        Self {
            food: Resource::new(ResourceKind::Food, config.food),
            gold: Resource::new(ResourceKind::Gold, config.gold),
            wood: Resource::new(ResourceKind::Wood, config.wood),
            stone: Resource::new(ResourceKind::Stone, config.stone),
            iron: Resource::new(ResourceKind::Iron, config.iron),
            price_fluctuation: config.price_fluctuation,
        }
    }

    pub fn resource(&self, kind: ResourceKind) -> &Resource {
        match kind {
            ResourceKind::Food => &self.food,
            ResourceKind::Gold => &self.gold,
            ResourceKind::Wood => &self.wood,
            ResourceKind::Stone => &self.stone,
            ResourceKind::Iron => &self.iron,
        }
    }

    pub fn resource_mut(&mut self, kind: ResourceKind) -> &mut Resource {
        match kind {
            ResourceKind::Food => &mut self.food,
            ResourceKind::Gold => &mut self.gold,
            ResourceKind::Wood => &mut self.wood,
            ResourceKind::Stone => &mut self.stone,
            ResourceKind::Iron => &mut self.iron,
        }
    }

    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        ResourceKind::ALL.into_iter().map(move |kind| self.resource(kind))
    }

    pub fn amount(&self, kind: ResourceKind) -> u32 {
        self.resource(kind).amount()
    }

    pub fn price_fluctuation(&self) -> f64 {
        self.price_fluctuation
    }

    /// Reprice every tradeable good: base * (1 + inflation) * (1 +/- fluctuation)
    pub fn update_prices<R: Rng + ?Sized>(&mut self, economy: &Economy, rng: &mut R) {
        let inflation_factor = 1.0 + economy.inflation();
        let span = ((self.price_fluctuation * 100.0) as i32).max(1);
        for kind in [ResourceKind::Food, ResourceKind::Wood, ResourceKind::Stone, ResourceKind::Iron] {
            let Some(base) = base_value(kind) else {
                continue;
            };
            let noise = (rng.gen_range(0..span * 2) - span) as f64 * 0.01;
            self.resource_mut(kind).set_value(base * inflation_factor * (1.0 + noise));
        }
    }

    /// Purchase `amount` units; nothing changes unless the treasury covers the cost
    pub fn buy_resource(&mut self, kind: ResourceKind, amount: u32, economy: &mut Economy) -> Result<i64> {
        Self::check_tradeable(kind, amount)?;

        let cost = (amount as f64 * self.resource(kind).value()) as i64;
        if economy.treasury() < cost {
            return Err(KingdomError::InsufficientFunds {
                needed: cost,
                available: economy.treasury(),
            });
        }

        economy.set_treasury(economy.treasury() - cost);
        self.resource_mut(kind).change_amount(amount as i64);
        tracing::info!(resource = %kind, amount, cost, "bought from market");
        Ok(cost)
    }

    /// Sell `amount` units less the market fee; fails untouched if stock is short
    pub fn sell_resource(&mut self, kind: ResourceKind, amount: u32, economy: &mut Economy) -> Result<i64> {
        Self::check_tradeable(kind, amount)?;

        let stock = self.resource(kind).amount();
        if stock < amount {
            return Err(KingdomError::InsufficientStock {
                resource: kind,
                needed: amount,
                available: stock,
            });
        }

        let revenue = (amount as f64 * self.resource(kind).value() * (1.0 - SALE_FEE)) as i64;
        self.resource_mut(kind).change_amount(-(amount as i64));
        economy.set_treasury(economy.treasury() + revenue);
        tracing::info!(resource = %kind, amount, revenue, "sold to market");
        Ok(revenue)
    }

    fn check_tradeable(kind: ResourceKind, amount: u32) -> Result<()> {
        if !kind.is_tradeable() {
            return Err(KingdomError::NotTradeable(kind));
        }
        if amount == 0 {
            return Err(KingdomError::Validation("trade amount must be positive".into()));
        }
        Ok(())
    }

    /// Yearly output of the working estates
    pub fn produce_resources(&mut self, population: &Population) {
        let peasant_output = (population.peasants() / 5) as i64;
        let merchant_output = (population.merchants() / 2) as i64;

        self.food.change_amount(peasant_output * 2);
        self.wood.change_amount(peasant_output);
        self.stone.change_amount(peasant_output / 2);
        self.iron.change_amount(peasant_output / 4);
        self.gold.change_amount(merchant_output * 2);
    }

    /// Yearly upkeep in goods; soldiers eat double rations
    pub fn consume_resources(&mut self, population: &Population, army: &Army) {
        let people = population.total() as i64;
        let soldiers = army.total() as i64;

        self.food.change_amount(-(people + soldiers * 2));
        self.wood.change_amount(-(people / 10));
        self.iron.change_amount(-(people / 50 + soldiers / 20));
    }
}
