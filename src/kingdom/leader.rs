//! Rulers - the three kinds of leader and what they do for the realm
//!
//! A ruler has a player-triggered special action and a passive effect that
//! runs once per year. The kingdom holds exactly one ruler at a time and
//! replaces it wholesale on elections and assassinations.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::clock::SimulatedDelay;
use crate::core::config::RulerConfig;
use crate::kingdom::realm::Realm;
use crate::kingdom::resource::ResourceKind;

/// Attributes shared by every ruler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderStats {
    pub name: String,
    pub charisma: i32,
    pub intelligence: i32,
    pub strength: i32,
}

impl LeaderStats {
    pub fn new(name: impl Into<String>, charisma: i32, intelligence: i32, strength: i32) -> Self {
        Self {
            name: name.into(),
            charisma,
            intelligence,
            strength,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct King {
    pub stats: LeaderStats,
    pub royal_bloodline: i32,
    pub years_in_power: u32,
}

impl King {
    pub fn new(stats: LeaderStats, royal_bloodline: i32) -> Self {
        Self {
            stats,
            royal_bloodline,
            years_in_power: 0,
        }
    }

    /// Diplomatic standing from charisma; nothing consumes it yet
    pub fn diplomacy_bonus(&self) -> f64 {
        self.stats.charisma as f64 * 0.01
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commander {
    pub stats: LeaderStats,
    pub tactical_skill: i32,
    loyalty: i32,
}

impl Commander {
    /// Loyalty starts somewhere in 50 - 100
    pub fn new<R: Rng + ?Sized>(stats: LeaderStats, tactical_skill: i32, rng: &mut R) -> Self {
        Self {
            stats,
            tactical_skill,
            loyalty: 50 + rng.gen_range(0..51),
        }
    }

    pub fn loyalty(&self) -> i32 {
        self.loyalty
    }

    pub fn set_loyalty(&mut self, loyalty: i32) {
        self.loyalty = loyalty.clamp(0, 100);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GuildType {
    Merchants,
    Craftsmen,
    Farmers,
}

impl fmt::Display for GuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GuildType::Merchants => "Merchants",
            GuildType::Craftsmen => "Craftsmen",
            GuildType::Farmers => "Farmers",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildLeader {
    pub stats: LeaderStats,
    pub guild_type: GuildType,
    pub business_acumen: i32,
}

impl GuildLeader {
    pub fn new(stats: LeaderStats, guild_type: GuildType, business_acumen: i32) -> Self {
        Self {
            stats,
            guild_type,
            business_acumen,
        }
    }
}

/// What a ruler's special action accomplished
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActionOutcome {
    /// Royal decree stimulating the economy
    Stimulus { gold: i64 },
    /// Royal decree granting tax relief
    TaxRelief { happiness: f64 },
    /// Royal decree honouring the military
    MilitaryHonours { morale: f64 },
    Drill { levels: u32 },
    Rally { morale: f64 },
    TradeDeals { gold: i64 },
    Craftsmanship { wood: u32, iron: u32 },
    Harvest { food: u32 },
}

impl fmt::Display for ActionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionOutcome::Stimulus { gold } => {
                write!(f, "The decree stimulates the economy: treasury +{}", gold)
            }
            ActionOutcome::TaxRelief { .. } => write!(f, "The decree grants minor tax relief, improving happiness"),
            ActionOutcome::MilitaryHonours { .. } => write!(f, "The decree honors the military, boosting army morale"),
            ActionOutcome::Drill { levels } => write!(f, "The army's training level increases by {}", levels),
            ActionOutcome::Rally { .. } => write!(f, "Troop morale is significantly improved"),
            ActionOutcome::TradeDeals { gold } => write!(f, "New trade deals bring {} gold", gold),
            ActionOutcome::Craftsmanship { wood, iron } => {
                write!(f, "Improved crafting yields {} wood and {} iron", wood, iron)
            }
            ActionOutcome::Harvest { food } => write!(f, "Agricultural innovations yield {} food", food),
        }
    }
}

/// Result of a special action, with an optional pacing pause for the caller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RulerAction {
    pub outcome: ActionOutcome,
    pub delay: Option<SimulatedDelay>,
}

/// Something a ruler's yearly effect wants the player to know
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RulerWarning {
    Plotting { commander: String, loyalty: i32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Leader {
    King(King),
    Commander(Commander),
    GuildLeader(GuildLeader),
}

impl Leader {
    pub fn from_config(config: &RulerConfig) -> Self {
        Leader::King(King::new(
            LeaderStats::new(config.name.clone(), config.charisma, config.intelligence, config.strength),
            config.royal_bloodline,
        ))
    }

    /// Uniformly pick one of the three kinds of elected ruler
    pub fn elect<R: Rng + ?Sized>(rng: &mut R) -> Self {
        match rng.gen_range(0..3) {
            0 => Leader::King(King::new(LeaderStats::new("Elected King", 60, 50, 50), 60)),
            1 => Leader::Commander(Commander::new(
                LeaderStats::new("Elected Commander", 50, 50, 70),
                60,
                rng,
            )),
            _ => Leader::GuildLeader(GuildLeader::new(
                LeaderStats::new("Elected Guild Leader", 50, 60, 50),
                GuildType::Merchants,
                60,
            )),
        }
    }

    /// Replacement crowned after a successful assassination
    pub fn successor() -> Self {
        Leader::King(King::new(LeaderStats::new("New King", 50, 50, 50), 50))
    }

    pub fn stats(&self) -> &LeaderStats {
        match self {
            Leader::King(king) => &king.stats,
            Leader::Commander(commander) => &commander.stats,
            Leader::GuildLeader(guild) => &guild.stats,
        }
    }

    pub fn name(&self) -> &str {
        &self.stats().name
    }

    pub fn title(&self) -> &'static str {
        match self {
            Leader::King(_) => "King",
            Leader::Commander(_) => "Commander",
            Leader::GuildLeader(_) => "Guild Leader",
        }
    }

    /// The player-triggered ability of this ruler
    pub fn special_action<R: Rng + ?Sized>(&self, realm: &mut Realm<'_>, rng: &mut R) -> RulerAction {
        match self {
            Leader::King(_) => {
                let outcome = match rng.gen_range(0..3) {
                    0 => {
                        let before = realm.economy.treasury();
                        realm.economy.set_treasury((before as f64 * 1.1) as i64);
                        ActionOutcome::Stimulus {
                            gold: realm.economy.treasury() - before,
                        }
                    }
                    1 => {
                        let before = realm.population.happiness();
                        realm.population.set_happiness(before + 0.1);
                        ActionOutcome::TaxRelief {
                            happiness: realm.population.happiness() - before,
                        }
                    }
                    _ => {
                        let before = realm.army.morale();
                        realm.army.set_morale(before + 0.15);
                        ActionOutcome::MilitaryHonours {
                            morale: realm.army.morale() - before,
                        }
                    }
                };
                RulerAction { outcome, delay: None }
            }
            Leader::Commander(commander) => {
                let outcome = if rng.gen_range(0..2) == 0 {
                    let levels = (1 + commander.tactical_skill / 20).max(0) as u32;
                    realm.army.set_training_level(realm.army.training_level() + levels);
                    ActionOutcome::Drill { levels }
                } else {
                    let before = realm.army.morale();
                    let boost = 0.2 + commander.stats.charisma as f64 * 0.01;
                    realm.army.set_morale(before + boost);
                    ActionOutcome::Rally {
                        morale: realm.army.morale() - before,
                    }
                };
                RulerAction {
                    outcome,
                    delay: Some(SimulatedDelay::drill("Training troops")),
                }
            }
            Leader::GuildLeader(guild) => {
                let acumen = guild.business_acumen;
                let outcome = match guild.guild_type {
                    GuildType::Merchants => {
                        let gold = 100 + 5 * acumen as i64;
                        realm.economy.set_treasury(realm.economy.treasury() + gold);
                        ActionOutcome::TradeDeals { gold }
                    }
                    GuildType::Craftsmen => {
                        let wood = (50 + 2 * acumen).max(0) as u32;
                        let iron = (20 + acumen).max(0) as u32;
                        realm.market.resource_mut(ResourceKind::Wood).change_amount(wood as i64);
                        realm.market.resource_mut(ResourceKind::Iron).change_amount(iron as i64);
                        ActionOutcome::Craftsmanship { wood, iron }
                    }
                    GuildType::Farmers => {
                        let food = (100 + 5 * acumen).max(0) as u32;
                        realm.market.resource_mut(ResourceKind::Food).change_amount(food as i64);
                        ActionOutcome::Harvest { food }
                    }
                };
                RulerAction { outcome, delay: None }
            }
        }
    }

    /// Passive yearly influence of the ruler on the realm
    pub fn apply_effects<R: Rng + ?Sized>(&mut self, realm: &mut Realm<'_>, rng: &mut R) -> Option<RulerWarning> {
        match self {
            Leader::King(king) => {
                let economy_bonus = king.stats.intelligence as f64 * 0.01;
                realm
                    .economy
                    .set_inflation((realm.economy.inflation() - economy_bonus).max(0.01));

                let army_bonus = king.stats.strength as f64 * 0.01;
                realm.army.set_morale((realm.army.morale() + army_bonus).min(1.0));

                let loyalty_bonus = king.royal_bloodline as f64 * 0.02;
                realm
                    .population
                    .set_happiness((realm.population.happiness() + loyalty_bonus).min(1.0));

                king.years_in_power += 1;
                None
            }
            Leader::Commander(commander) => {
                let bonus = commander.tactical_skill as f64 * 0.02 * 0.1;
                realm.army.set_morale((realm.army.morale() + bonus).min(1.0));

                if commander.loyalty < 30 && rng.gen_range(0..100) < 30 - commander.loyalty {
                    tracing::warn!(
                        commander = %commander.stats.name,
                        loyalty = commander.loyalty,
                        "commander is plotting"
                    );
                    return Some(RulerWarning::Plotting {
                        commander: commander.stats.name.clone(),
                        loyalty: commander.loyalty,
                    });
                }
                None
            }
            Leader::GuildLeader(guild) => {
                let economy_bonus = guild.business_acumen as f64 * 0.02;
                realm
                    .economy
                    .set_inflation((realm.economy.inflation() - economy_bonus * 0.01).max(0.01));

                match guild.guild_type {
                    GuildType::Merchants => {
                        let bonus = realm.population.merchants() as i64 * guild.business_acumen as i64 / 100;
                        realm.economy.set_treasury(realm.economy.treasury() + bonus);
                    }
                    GuildType::Craftsmen => {}
                    GuildType::Farmers => {
                        let food = guild.business_acumen / 10 + 5;
                        realm
                            .market
                            .resource_mut(ResourceKind::Food)
                            .change_amount(food as i64);
                    }
                }
                None
            }
        }
    }
}

impl fmt::Display for Leader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Leader::GuildLeader(guild) => {
                write!(f, "Guild Leader {} of the {} Guild", guild.stats.name, guild.guild_type)
            }
            _ => write!(f, "{} {}", self.title(), self.name()),
        }
    }
}
