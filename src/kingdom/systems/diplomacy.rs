//! Diplomacy - relations with a fixed roster of foreign kingdoms
//!
//! Each foreign kingdom is a small state machine over (relation, ally, war).
//! The roster is fixed at construction: no duplicates and no removal.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::RivalConfig;
use crate::core::error::{KingdomError, Result};
use crate::kingdom::resource::ResourceKind;
use crate::kingdom::systems::{Army, Economy, Losses, Market};

pub const MIN_RELATION: i32 = -10;
pub const MAX_RELATION: i32 = 10;

/// Relation needed before a kingdom will sign an alliance
pub const ALLIANCE_THRESHOLD: i32 = 5;
/// Relation needed before a kingdom will open trade
pub const TRADE_THRESHOLD: i32 = 2;

/// Weakest a defeated foreign army can be worn down to
const MIN_FOREIGN_STRENGTH: i64 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKingdom {
    pub name: String,
    pub relation_level: i32,
    pub is_ally: bool,
    pub at_war: bool,
    pub strength: i64,
}

impl ForeignKingdom {
    pub fn new(name: impl Into<String>, strength: i64) -> Self {
        Self {
            name: name.into(),
            relation_level: 0,
            is_ally: false,
            at_war: false,
            strength,
        }
    }

    pub fn relation_label(&self) -> &'static str {
        relation_label(self.relation_level)
    }

    pub fn status_label(&self) -> &'static str {
        if self.at_war {
            "At War"
        } else if self.is_ally {
            "Allied"
        } else {
            "Peaceful"
        }
    }

    fn shift_relation(&mut self, delta: i32) {
        self.relation_level = (self.relation_level + delta).clamp(MIN_RELATION, MAX_RELATION);
    }
}

/// Human-readable band for a relation level
pub fn relation_label(level: i32) -> &'static str {
    match level {
        l if l >= 7 => "Friendly",
        l if l >= 3 => "Cordial",
        l if l >= 0 => "Neutral",
        l if l >= -3 => "Suspicious",
        _ => "Hostile",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleOutcome {
    Victory,
    Defeat,
}

/// One engagement against a foreign kingdom
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleReport {
    pub kingdom: String,
    pub outcome: BattleOutcome,
    pub our_strength: i64,
    pub their_strength: i64,
    /// Our casualties; yearly skirmishes never cost troops
    pub losses: Option<Losses>,
}

/// Goods and gold received from a trade agreement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeDeal {
    pub food: u32,
    pub wood: u32,
    pub iron: u32,
    pub gold: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diplomacy {
    roster: Vec<ForeignKingdom>,
}

impl Diplomacy {
    /// Build the roster, rolling each kingdom's strength as base + [0, spread)
    pub fn from_config<R: Rng + ?Sized>(roster: &[RivalConfig], rng: &mut R) -> Self {
        let mut diplomacy = Self::default();
        for rival in roster {
            let bonus = if rival.strength_spread > 0 {
                rng.gen_range(0..rival.strength_spread)
            } else {
                0
            };
            diplomacy.add_kingdom(ForeignKingdom::new(
                rival.name.clone(),
                rival.base_strength as i64 + bonus as i64,
            ));
        }
        diplomacy
    }

    /// Append to the roster; a name already present is ignored
    fn add_kingdom(&mut self, kingdom: ForeignKingdom) -> bool {
        if self.get(&kingdom.name).is_some() {
            tracing::warn!(name = %kingdom.name, "duplicate foreign kingdom ignored");
            return false;
        }
        self.roster.push(kingdom);
        true
    }

    pub fn kingdoms(&self) -> &[ForeignKingdom] {
        &self.roster
    }

    pub fn get(&self, name: &str) -> Option<&ForeignKingdom> {
        self.roster.iter().find(|k| k.name == name)
    }

    fn find_mut(&mut self, name: &str) -> Result<&mut ForeignKingdom> {
        self.roster
            .iter_mut()
            .find(|k| k.name == name)
            .ok_or_else(|| KingdomError::UnknownKingdom(name.to_string()))
    }

    /// Relation with a kingdom; unknown names read as neutral
    pub fn relation_level(&self, name: &str) -> i32 {
        self.get(name).map_or(0, |k| k.relation_level)
    }

    pub fn any_at_war(&self) -> bool {
        self.roster.iter().any(|k| k.at_war)
    }

    /// Gifts and envoys: +2 relation for 20 + 5 * relation gold
    pub fn improve_relations(&mut self, name: &str, economy: &mut Economy) -> Result<i64> {
        let kingdom = self.find_mut(name)?;
        let cost = (20 + 5 * kingdom.relation_level as i64).max(0);
        if economy.treasury() < cost {
            return Err(KingdomError::InsufficientFunds {
                needed: cost,
                available: economy.treasury(),
            });
        }

        economy.set_treasury(economy.treasury() - cost);
        kingdom.shift_relation(2);
        tracing::info!(kingdom = name, cost, relation = kingdom.relation_level, "relations improved");
        Ok(cost)
    }

    pub fn declare_war(&mut self, name: &str, army: &mut Army) -> Result<()> {
        let kingdom = self.find_mut(name)?;
        if kingdom.at_war {
            return Err(KingdomError::AlreadyAtWar(name.to_string()));
        }

        kingdom.at_war = true;
        kingdom.is_ally = false;
        kingdom.shift_relation(-5);
        army.set_war_status(true);
        tracing::info!(kingdom = name, relation = kingdom.relation_level, "war declared");
        Ok(())
    }

    /// Pay reparations of 200 + strength / 10 to end a war
    pub fn sign_peace(&mut self, name: &str, economy: &mut Economy, army: &mut Army) -> Result<i64> {
        let kingdom = self.find_mut(name)?;
        if !kingdom.at_war {
            return Err(KingdomError::NotAtWar(name.to_string()));
        }
        let cost = 200 + kingdom.strength / 10;
        if economy.treasury() < cost {
            return Err(KingdomError::InsufficientFunds {
                needed: cost,
                available: economy.treasury(),
            });
        }

        economy.set_treasury(economy.treasury() - cost);
        kingdom.at_war = false;
        kingdom.relation_level = 0;

        if !self.any_at_war() {
            army.set_war_status(false);
        }
        tracing::info!(kingdom = name, cost, "peace signed");
        Ok(cost)
    }

    pub fn form_alliance(&mut self, name: &str) -> Result<()> {
        let kingdom = self.find_mut(name)?;
        if kingdom.at_war {
            return Err(KingdomError::AlreadyAtWar(name.to_string()));
        }
        if kingdom.relation_level < ALLIANCE_THRESHOLD {
            return Err(KingdomError::RelationsTooLow {
                kingdom: name.to_string(),
                required: ALLIANCE_THRESHOLD,
                current: kingdom.relation_level,
            });
        }

        kingdom.is_ally = true;
        kingdom.shift_relation(1);
        tracing::info!(kingdom = name, "alliance formed");
        Ok(())
    }

    /// One-off exchange of goods; grows with the relation level
    pub fn establish_trade(&mut self, name: &str, market: &mut Market, economy: &mut Economy) -> Result<TradeDeal> {
        let kingdom = self.find_mut(name)?;
        if kingdom.at_war {
            return Err(KingdomError::AlreadyAtWar(name.to_string()));
        }
        let r = kingdom.relation_level;
        if r < TRADE_THRESHOLD {
            return Err(KingdomError::RelationsTooLow {
                kingdom: name.to_string(),
                required: TRADE_THRESHOLD,
                current: r,
            });
        }

        let deal = TradeDeal {
            food: (100 + 20 * r) as u32,
            wood: (50 + 10 * r) as u32,
            iron: (30 + 5 * r) as u32,
            gold: (200 + 50 * r) as i64,
        };
        market.resource_mut(ResourceKind::Food).change_amount(deal.food as i64);
        market.resource_mut(ResourceKind::Wood).change_amount(deal.wood as i64);
        market.resource_mut(ResourceKind::Iron).change_amount(deal.iron as i64);
        economy.set_treasury(economy.treasury() + deal.gold);
        tracing::info!(kingdom = name, gold = deal.gold, "trade established");
        Ok(deal)
    }

    /// Commit the army to a pitched battle against a kingdom we are at war with
    pub fn battle(&mut self, name: &str, army: &mut Army) -> Result<BattleReport> {
        let kingdom = self.find_mut(name)?;
        if !kingdom.at_war {
            return Err(KingdomError::NotAtWar(name.to_string()));
        }

        let ours = army.calculate_strength();
        let theirs = kingdom.strength;
        let report = if ours > theirs {
            kingdom.strength = (theirs - ours / 10).max(MIN_FOREIGN_STRENGTH);
            army.set_morale(army.morale() + 0.1);
            BattleReport {
                kingdom: name.to_string(),
                outcome: BattleOutcome::Victory,
                our_strength: ours,
                their_strength: theirs,
                losses: None,
            }
        } else {
            let losses = army.suffer_defeat();
            army.set_morale(army.morale() - 0.1);
            BattleReport {
                kingdom: name.to_string(),
                outcome: BattleOutcome::Defeat,
                our_strength: ours,
                their_strength: theirs,
                losses: Some(losses),
            }
        };

        tracing::info!(kingdom = name, outcome = ?report.outcome, ours, theirs, "battle fought");
        Ok(report)
    }

    /// Yearly drift: wars sour relations and may flare into battle, peace wanders
    pub fn update_diplomacy<R: Rng + ?Sized>(&mut self, army: &Army, rng: &mut R) -> Vec<BattleReport> {
        let ours = army.calculate_strength();
        let mut reports = Vec::new();

        for kingdom in &mut self.roster {
            if kingdom.at_war {
                kingdom.shift_relation(-1);

                if rng.gen_range(0..100) < 20 {
                    let theirs = kingdom.strength;
                    let outcome = if ours > theirs {
                        kingdom.strength = (theirs - ours / 10).max(MIN_FOREIGN_STRENGTH);
                        BattleOutcome::Victory
                    } else {
                        BattleOutcome::Defeat
                    };
                    tracing::info!(kingdom = %kingdom.name, ?outcome, "border battle");
                    reports.push(BattleReport {
                        kingdom: kingdom.name.clone(),
                        outcome,
                        our_strength: ours,
                        their_strength: theirs,
                        losses: None,
                    });
                }
            } else {
                let drift = rng.gen_range(0..3) - 1;
                kingdom.shift_relation(drift);
            }
        }

        reports
    }
}
