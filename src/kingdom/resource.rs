//! Resources - stockpiled goods with a yearly side effect per kind

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::KingdomError;
use crate::kingdom::systems::{Army, Population};

/// The five goods a kingdom stockpiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Food,
    Gold,
    Wood,
    Stone,
    Iron,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Food,
        ResourceKind::Gold,
        ResourceKind::Wood,
        ResourceKind::Stone,
        ResourceKind::Iron,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ResourceKind::Food => "Food",
            ResourceKind::Gold => "Gold",
            ResourceKind::Wood => "Wood",
            ResourceKind::Stone => "Stone",
            ResourceKind::Iron => "Iron",
        }
    }

    /// Whether the market buys and sells this good
    pub fn is_tradeable(&self) -> bool {
        !matches!(self, ResourceKind::Gold)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResourceKind {
    type Err = KingdomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| KingdomError::UnknownResource(s.to_string()))
    }
}

/// A stockpile of one good and its current unit value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    kind: ResourceKind,
    amount: u32,
    value: f64,
}

impl Resource {
    pub fn new(kind: ResourceKind, amount: u32) -> Self {
        Self {
            kind,
            amount,
            value: 1.0,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn amount(&self) -> u32 {
        self.amount
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn set_amount(&mut self, amount: u32) {
        self.amount = amount;
    }

    /// Add or remove stock; never drops below zero
    pub fn change_amount(&mut self, delta: i64) {
        self.amount = (self.amount as i64 + delta).clamp(0, u32::MAX as i64) as u32;
    }

    pub fn set_value(&mut self, value: f64) {
        self.value = if value > 0.0 { value } else { 0.0 };
    }

    pub fn total_value(&self) -> f64 {
        self.amount as f64 * self.value
    }

    /// Yearly side effect of holding this stock
    ///
    /// Food feeds happiness through the per-capita ratio, a large iron stock
    /// equips the army. Gold, wood and stone have no yearly effect.
    pub fn apply_effects(&self, population: &mut Population, army: &mut Army) {
        match self.kind {
            ResourceKind::Food => {
                let total = population.total();
                if total == 0 {
                    return;
                }
                let per_person = self.amount as f64 / total as f64;
                let delta = food_happiness_delta(per_person);
                population.set_happiness(population.happiness() + delta);
            }
            ResourceKind::Iron => {
                if self.amount > 100 {
                    army.set_training_level(army.training_level() + 1);
                }
            }
            ResourceKind::Gold | ResourceKind::Wood | ResourceKind::Stone => {}
        }
    }
}

/// Happiness change for a given amount of food per person
pub fn food_happiness_delta(per_person: f64) -> f64 {
    if per_person > 1.5 {
        0.10
    } else if per_person > 1.0 {
        0.05
    } else if per_person < 0.25 {
        -0.40
    } else if per_person < 0.5 {
        -0.20
    } else {
        0.0
    }
}
