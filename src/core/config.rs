//! Kingdom configuration with documented starting values
//!
//! Every starting quantity of a new session is collected here. The formulas
//! of the yearly pipeline live next to the subsystem they drive; only the
//! initial state and the tunable rates are configurable.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{KingdomError, Result};

/// Starting state and tunables for a new kingdom
///
/// Loaded from TOML. Every section falls back to its default, so a config
/// file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KingdomConfig {
    pub population: PopulationConfig,
    pub army: ArmyConfig,
    pub economy: EconomyConfig,
    pub market: MarketConfig,
    pub bank: BankConfig,
    pub events: EventConfig,
    pub ruler: RulerConfig,
    /// Foreign kingdoms present at the start, in listing order
    pub roster: Vec<RivalConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub peasants: u32,
    pub merchants: u32,
    pub nobles: u32,
    /// Starting contentment, 0.0 - 1.0
    pub happiness: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmyConfig {
    pub infantry: u32,
    pub cavalry: u32,
    pub archers: u32,
    pub morale: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    pub peasant_tax: f64,
    pub merchant_tax: f64,
    pub noble_tax: f64,
    pub inflation: f64,
    pub treasury: i64,
}

/// Opening market stock
///
/// Unit values start at 1.0 and are repriced on the first yearly update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    pub food: u32,
    pub gold: u32,
    pub wood: u32,
    pub stone: u32,
    pub iron: u32,
    /// Largest yearly price swing either side of the inflated base, 0.0 - 0.5
    pub price_fluctuation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BankConfig {
    /// Yearly interest on outstanding debt, 0.01 - 0.2
    pub interest_rate: f64,
    /// Largest single loan, at least 100
    pub max_loan: i64,
    /// Percent chance per year of a banking scandal, 0 - 100
    pub corruption: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Percent chance that a random event fires once the cooldown has passed
    pub chance: u32,
    /// Minimum session time between two random events, in seconds
    ///
    /// Manual triggers from the menu ignore this.
    pub cooldown_secs: u64,
}

/// The ruler a new session starts with (always a King)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulerConfig {
    pub name: String,
    pub charisma: i32,
    pub intelligence: i32,
    pub strength: i32,
    pub royal_bloodline: i32,
}

/// A foreign kingdom on the starting roster
///
/// Strength is rolled as `base_strength + rand[0, strength_spread)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RivalConfig {
    pub name: String,
    pub base_strength: i32,
    pub strength_spread: i32,
}

impl Default for KingdomConfig {
    fn default() -> Self {
        Self {
            population: PopulationConfig::default(),
            army: ArmyConfig::default(),
            economy: EconomyConfig::default(),
            market: MarketConfig::default(),
            bank: BankConfig::default(),
            events: EventConfig::default(),
            ruler: RulerConfig::default(),
            roster: vec![
                RivalConfig::new("Northlands", 500, 500),
                RivalConfig::new("Eastern Empire", 600, 600),
                RivalConfig::new("Southern Realms", 400, 400),
            ],
        }
    }
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            peasants: 100,
            merchants: 20,
            nobles: 5,
            happiness: 0.5,
        }
    }
}

impl Default for ArmyConfig {
    fn default() -> Self {
        Self {
            infantry: 50,
            cavalry: 10,
            archers: 20,
            morale: 0.7,
        }
    }
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            peasant_tax: 0.10,
            merchant_tax: 0.15,
            noble_tax: 0.20,
            inflation: 0.02,
            treasury: 1000,
        }
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            food: 1000,
            gold: 500,
            wood: 500,
            stone: 300,
            iron: 200,
            price_fluctuation: 0.1,
        }
    }
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            interest_rate: 0.05,
            max_loan: 1000,
            corruption: 0,
        }
    }
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            chance: 15,
            cooldown_secs: 5,
        }
    }
}

impl Default for RulerConfig {
    fn default() -> Self {
        Self {
            name: "Default King".into(),
            charisma: 50,
            intelligence: 50,
            strength: 50,
            royal_bloodline: 50,
        }
    }
}

impl RivalConfig {
    pub fn new(name: &str, base_strength: i32, strength_spread: i32) -> Self {
        Self {
            name: name.into(),
            base_strength,
            strength_spread,
        }
    }
}

impl KingdomConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| KingdomError::Config(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let taxes = [
            ("peasant_tax", self.economy.peasant_tax),
            ("merchant_tax", self.economy.merchant_tax),
            ("noble_tax", self.economy.noble_tax),
        ];
        for (field, rate) in taxes {
            if !(0.0..=0.5).contains(&rate) {
                return Err(KingdomError::Config(format!(
                    "{} ({}) must be within 0.0 - 0.5",
                    field, rate
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.population.happiness) {
            return Err(KingdomError::Config(format!(
                "happiness ({}) must be within 0.0 - 1.0",
                self.population.happiness
            )));
        }

        if !(0.0..=0.5).contains(&self.market.price_fluctuation) {
            return Err(KingdomError::Config(format!(
                "price_fluctuation ({}) must be within 0.0 - 0.5",
                self.market.price_fluctuation
            )));
        }

        if self.events.chance > 100 {
            return Err(KingdomError::Config(format!(
                "event chance ({}) must be a percentage",
                self.events.chance
            )));
        }

        if !(0.01..=0.2).contains(&self.bank.interest_rate) {
            return Err(KingdomError::Config(format!(
                "interest_rate ({}) must be within 0.01 - 0.2",
                self.bank.interest_rate
            )));
        }

        if self.bank.max_loan < 100 {
            return Err(KingdomError::Config(format!(
                "max_loan ({}) must be at least 100",
                self.bank.max_loan
            )));
        }

        if self.bank.corruption > 100 {
            return Err(KingdomError::Config(format!(
                "corruption ({}) must be a percentage",
                self.bank.corruption
            )));
        }

        let mut seen = std::collections::HashSet::new();
        for rival in &self.roster {
            if rival.name.trim().is_empty() {
                return Err(KingdomError::Config("roster names must not be empty".into()));
            }
            if !seen.insert(rival.name.as_str()) {
                return Err(KingdomError::Config(format!(
                    "roster lists '{}' twice",
                    rival.name
                )));
            }
            if rival.strength_spread < 0 || rival.base_strength < 0 {
                return Err(KingdomError::Config(format!(
                    "strength of '{}' must not be negative",
                    rival.name
                )));
            }
        }

        Ok(())
    }
}
