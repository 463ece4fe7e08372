//! Save files
//!
//! A snapshot covers a fixed subset of the kingdom: name, year, score, the
//! population, army and economy fields, four market stocks and the ruler's
//! name, bloodline and years in power. The default encoding is positional
//! text, one field per line. Paths ending in `.json` get the same record as
//! self-describing JSON instead. Loading parses the whole file before
//! touching the kingdom, so a bad file changes nothing.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::{KingdomError, Result};
use crate::kingdom::leader::{King, Leader, LeaderStats};
use crate::kingdom::resource::ResourceKind;
use crate::kingdom::state::Kingdom;

pub const SAVE_VERSION: u32 = 1;

/// Every persisted field, in file order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveRecord {
    pub version: u32,
    pub name: String,
    pub year: u32,
    pub score: i64,
    pub peasants: u32,
    pub merchants: u32,
    pub nobles: u32,
    pub happiness: f64,
    pub growth_rate: f64,
    pub infantry: u32,
    pub cavalry: u32,
    pub archers: u32,
    pub morale: f64,
    pub training_level: u32,
    pub at_war: bool,
    pub treasury: i64,
    pub debt: i64,
    pub peasant_tax: f64,
    pub merchant_tax: f64,
    pub noble_tax: f64,
    pub inflation: f64,
    pub food: u32,
    pub wood: u32,
    pub stone: u32,
    pub iron: u32,
    pub ruler_name: String,
    /// Zero when the ruler is not a King
    pub royal_bloodline: i32,
    /// Zero when the ruler is not a King
    pub years_in_power: u32,
}

impl SaveRecord {
    pub fn capture(kingdom: &Kingdom) -> Self {
        let population = kingdom.population();
        let army = kingdom.army();
        let economy = kingdom.economy();
        let market = kingdom.market();
        let (royal_bloodline, years_in_power) = match kingdom.ruler() {
            Leader::King(king) => (king.royal_bloodline, king.years_in_power),
            _ => (0, 0),
        };

        Self {
            version: SAVE_VERSION,
            name: kingdom.name().to_string(),
            year: kingdom.year(),
            score: kingdom.score(),
            peasants: population.peasants(),
            merchants: population.merchants(),
            nobles: population.nobles(),
            happiness: population.happiness(),
            growth_rate: population.growth_rate(),
            infantry: army.infantry(),
            cavalry: army.cavalry(),
            archers: army.archers(),
            morale: army.morale(),
            training_level: army.training_level(),
            at_war: army.is_at_war(),
            treasury: economy.treasury(),
            debt: economy.debt(),
            peasant_tax: economy.peasant_tax_rate(),
            merchant_tax: economy.merchant_tax_rate(),
            noble_tax: economy.noble_tax_rate(),
            inflation: economy.inflation(),
            food: market.amount(ResourceKind::Food),
            wood: market.amount(ResourceKind::Wood),
            stone: market.amount(ResourceKind::Stone),
            iron: market.amount(ResourceKind::Iron),
            ruler_name: kingdom.ruler().name().to_string(),
            royal_bloodline,
            years_in_power,
        }
    }

    /// Write every field into the kingdom through its clamping setters
    ///
    /// The ruler always comes back as a King with 50/50/50 stats.
    pub fn apply(self, kingdom: &mut Kingdom) {
        kingdom.set_name(self.name);
        kingdom.set_year(self.year);
        kingdom.set_score(self.score);

        let population = kingdom.population_mut();
        population.set_peasants(self.peasants);
        population.set_merchants(self.merchants);
        population.set_nobles(self.nobles);
        population.set_happiness(self.happiness);
        population.set_growth_rate(self.growth_rate);

        let army = kingdom.army_mut();
        army.set_infantry(self.infantry);
        army.set_cavalry(self.cavalry);
        army.set_archers(self.archers);
        army.set_morale(self.morale);
        army.set_training_level(self.training_level);
        army.set_war_status(self.at_war);

        let economy = kingdom.economy_mut();
        economy.set_treasury(self.treasury);
        economy.set_debt(self.debt);
        economy.set_peasant_tax_rate(self.peasant_tax);
        economy.set_merchant_tax_rate(self.merchant_tax);
        economy.set_noble_tax_rate(self.noble_tax);
        economy.set_inflation(self.inflation);

        let market = kingdom.market_mut();
        market.resource_mut(ResourceKind::Food).set_amount(self.food);
        market.resource_mut(ResourceKind::Wood).set_amount(self.wood);
        market.resource_mut(ResourceKind::Stone).set_amount(self.stone);
        market.resource_mut(ResourceKind::Iron).set_amount(self.iron);

        let mut king = King::new(LeaderStats::new(self.ruler_name, 50, 50, 50), self.royal_bloodline);
        king.years_in_power = self.years_in_power;
        kingdom.set_ruler(Leader::King(king));
    }

    pub fn to_positional(&self) -> String {
        let fields = [
            self.name.clone(),
            self.year.to_string(),
            self.score.to_string(),
            self.peasants.to_string(),
            self.merchants.to_string(),
            self.nobles.to_string(),
            self.happiness.to_string(),
            self.growth_rate.to_string(),
            self.infantry.to_string(),
            self.cavalry.to_string(),
            self.archers.to_string(),
            self.morale.to_string(),
            self.training_level.to_string(),
            u8::from(self.at_war).to_string(),
            self.treasury.to_string(),
            self.debt.to_string(),
            self.peasant_tax.to_string(),
            self.merchant_tax.to_string(),
            self.noble_tax.to_string(),
            self.inflation.to_string(),
            self.food.to_string(),
            self.wood.to_string(),
            self.stone.to_string(),
            self.iron.to_string(),
            self.ruler_name.clone(),
            self.royal_bloodline.to_string(),
            self.years_in_power.to_string(),
        ];
        let mut text = fields.join("\n");
        text.push('\n');
        text
    }

    pub fn from_positional(text: &str) -> Result<Self> {
        let mut fields = FieldReader::new(text);
        Ok(Self {
            version: SAVE_VERSION,
            name: fields.text("name")?,
            year: fields.parse("year")?,
            score: fields.parse("score")?,
            peasants: fields.parse("peasants")?,
            merchants: fields.parse("merchants")?,
            nobles: fields.parse("nobles")?,
            happiness: fields.parse("happiness")?,
            growth_rate: fields.parse("growth_rate")?,
            infantry: fields.parse("infantry")?,
            cavalry: fields.parse("cavalry")?,
            archers: fields.parse("archers")?,
            morale: fields.parse("morale")?,
            training_level: fields.parse("training_level")?,
            at_war: fields.flag("at_war")?,
            treasury: fields.parse("treasury")?,
            debt: fields.parse("debt")?,
            peasant_tax: fields.parse("peasant_tax")?,
            merchant_tax: fields.parse("merchant_tax")?,
            noble_tax: fields.parse("noble_tax")?,
            inflation: fields.parse("inflation")?,
            food: fields.parse("food")?,
            wood: fields.parse("wood")?,
            stone: fields.parse("stone")?,
            iron: fields.parse("iron")?,
            ruler_name: fields.text("ruler_name")?,
            royal_bloodline: fields.parse("royal_bloodline")?,
            years_in_power: fields.parse("years_in_power")?,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let record: Self = serde_json::from_str(text)?;
        if record.version > SAVE_VERSION {
            return Err(KingdomError::MalformedSave {
                line: 1,
                field: "version",
                reason: format!("save version {} is newer than {}", record.version, SAVE_VERSION),
            });
        }
        Ok(record)
    }

    /// Decode either encoding. Text opening with a brace is tried as JSON first,
    /// then as positional, since a kingdom name may itself start with `{`.
    pub fn decode(text: &str) -> Result<Self> {
        if !text.trim_start().starts_with('{') {
            return Self::from_positional(text);
        }
        match Self::from_json(text) {
            Ok(record) => Ok(record),
            Err(json_err) => Self::from_positional(text).map_err(|_| json_err),
        }
    }
}

/// Walks the positional encoding one line per field
struct FieldReader<'a> {
    lines: std::str::Lines<'a>,
    line: usize,
}

impl<'a> FieldReader<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines(),
            line: 0,
        }
    }

    fn text(&mut self, field: &'static str) -> Result<String> {
        self.line += 1;
        self.lines
            .next()
            .map(|line| line.trim_end_matches('\r').to_string())
            .ok_or_else(|| KingdomError::MalformedSave {
                line: self.line,
                field,
                reason: "unexpected end of file".into(),
            })
    }

    fn parse<T>(&mut self, field: &'static str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.text(field)?;
        raw.trim().parse().map_err(|e: T::Err| KingdomError::MalformedSave {
            line: self.line,
            field,
            reason: format!("{:?}: {}", raw, e),
        })
    }

    fn flag(&mut self, field: &'static str) -> Result<bool> {
        let raw: i64 = self.parse(field)?;
        Ok(raw != 0)
    }
}

impl Kingdom {
    /// Write a snapshot; `.json` paths get JSON, anything else positional text
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let record = SaveRecord::capture(self);
        let is_json = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
        let content = if is_json {
            record.to_json()?
        } else {
            record.to_positional()
        };

        fs::write(path, content)?;
        tracing::info!(path = %path.display(), year = self.year, "game saved");
        Ok(())
    }

    /// Restore a snapshot; on any error the kingdom is left untouched
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let record = fs::read_to_string(path)
            .map_err(KingdomError::from)
            .and_then(|text| SaveRecord::decode(&text))
            .map_err(|e| {
                tracing::warn!(path = %path.display(), error = %e, "load failed");
                e
            })?;

        record.apply(self);
        tracing::info!(path = %path.display(), kingdom = %self.name, year = self.year, "game loaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kingdom::leader::{GuildLeader, GuildType};

    fn record() -> SaveRecord {
        let mut kingdom = Kingdom::with_seed("Avalon", 1);
        kingdom.economy_mut().set_treasury(4321);
        kingdom.population_mut().set_happiness(0.123456789);
        SaveRecord::capture(&kingdom)
    }

    #[test]
    fn test_positional_layout() {
        let text = record().to_positional();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 27);
        assert_eq!(lines[0], "Avalon");
        assert_eq!(lines[1], "1");
        assert_eq!(lines[6], "0.123456789");
        assert_eq!(lines[13], "0");
        assert_eq!(lines[14], "4321");
        assert_eq!(lines[24], "Default King");
        assert_eq!(lines[25], "50");
    }

    #[test]
    fn test_positional_decodes_to_same_record() {
        let original = record();
        let decoded = SaveRecord::decode(&original.to_positional()).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_json_decodes_to_same_record() {
        let original = record();
        let json = original.to_json().unwrap();
        assert!(json.contains("\"version\": 1"));
        assert_eq!(SaveRecord::decode(&json).unwrap(), original);
    }

    #[test]
    fn test_truncated_file_reports_field() {
        let text: String = record().to_positional().lines().take(10).collect::<Vec<_>>().join("\n");
        match SaveRecord::decode(&text) {
            Err(KingdomError::MalformedSave { line, field, .. }) => {
                assert_eq!(line, 11);
                assert_eq!(field, "archers");
            }
            other => panic!("expected malformed save, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_number_reports_line() {
        let text = record().to_positional().replacen("4321", "lots", 1);
        assert!(matches!(
            SaveRecord::decode(&text),
            Err(KingdomError::MalformedSave { line: 15, field: "treasury", .. })
        ));
    }

    #[test]
    fn test_future_version_rejected() {
        let mut newer = record();
        newer.version = SAVE_VERSION + 1;
        let json = serde_json::to_string(&newer).unwrap();
        assert!(SaveRecord::decode(&json).is_err());
    }

    #[test]
    fn test_brace_prefixed_name_decodes_as_positional() {
        let mut kingdom = Kingdom::with_seed("{Avalon}", 1);
        kingdom.economy_mut().set_treasury(4321);
        let original = SaveRecord::capture(&kingdom);

        let decoded = SaveRecord::decode(&original.to_positional()).unwrap();
        assert_eq!(decoded.name, "{Avalon}");
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_non_king_saves_zero_bloodline() {
        let mut kingdom = Kingdom::with_seed("Avalon", 1);
        kingdom.set_ruler(Leader::GuildLeader(GuildLeader::new(
            LeaderStats::new("Guildmaster", 50, 60, 50),
            GuildType::Merchants,
            60,
        )));
        let record = SaveRecord::capture(&kingdom);
        assert_eq!(record.ruler_name, "Guildmaster");
        assert_eq!((record.royal_bloodline, record.years_in_power), (0, 0));
    }

    #[test]
    fn test_apply_clamps_out_of_range_values() {
        let mut record = record();
        record.happiness = 3.0;
        record.peasant_tax = 0.9;
        record.training_level = 0;
        record.year = 0;
        record.score = -10;

        let mut kingdom = Kingdom::with_seed("Elsewhere", 2);
        record.apply(&mut kingdom);
        assert_eq!(kingdom.population().happiness(), 1.0);
        assert_eq!(kingdom.economy().peasant_tax_rate(), 0.5);
        assert_eq!(kingdom.army().training_level(), 1);
        assert_eq!(kingdom.year(), 1);
        assert_eq!(kingdom.score(), 0);
    }
}
