//! Plain-text views of the kingdom for the menu front end

use crate::kingdom::resource::ResourceKind;
use crate::kingdom::state::Kingdom;

const MARKET_ROWS: [ResourceKind; 4] = [
    ResourceKind::Food,
    ResourceKind::Wood,
    ResourceKind::Stone,
    ResourceKind::Iron,
];

fn percent(value: f64) -> i64 {
    (value * 100.0) as i64
}

impl Kingdom {
    /// Full status sheet: ruler, population, army, economy and market
    pub fn status_report(&self) -> String {
        let population = &self.population;
        let army = &self.army;
        let economy = &self.economy;

        let mut out = format!(
            "===== Kingdom Status: {} (Year {}) =====\nRuler: {}\nScore: {}\n",
            self.name, self.year, self.ruler, self.score
        );

        out.push_str(&format!(
            "\nPopulation:\n  Peasants: {}\n  Merchants: {}\n  Nobles: {}\n  Happiness: {}%\n",
            population.peasants(),
            population.merchants(),
            population.nobles(),
            percent(population.happiness()),
        ));

        out.push_str(&format!(
            "\nArmy:\n  Infantry: {}\n  Cavalry: {}\n  Archers: {}\n  Morale: {}%\n  Training Level: {}\n  Status: {}\n",
            army.infantry(),
            army.cavalry(),
            army.archers(),
            percent(army.morale()),
            army.training_level(),
            if army.is_at_war() { "At War" } else { "At Peace" },
        ));

        out.push_str(&format!(
            "\nEconomy:\n  Treasury: {} gold\n  Debt: {} gold\n  Taxes: peasants {}%, merchants {}%, nobles {}%\n  Inflation: {}%\n",
            economy.treasury(),
            economy.debt(),
            percent(economy.peasant_tax_rate()),
            percent(economy.merchant_tax_rate()),
            percent(economy.noble_tax_rate()),
            percent(economy.inflation()),
        ));

        out.push_str("\nMarket:\n");
        for kind in MARKET_ROWS {
            let resource = self.market.resource(kind);
            out.push_str(&format!(
                "  {}: {} (Value: {:.2})\n",
                kind,
                resource.amount(),
                resource.value()
            ));
        }
        out
    }

    /// One line per foreign kingdom, in roster order
    pub fn roster_report(&self) -> String {
        let rows: String = self
            .diplomacy
            .kingdoms()
            .iter()
            .enumerate()
            .map(|(i, kingdom)| {
                format!(
                    "{}. {} - Relations: {} ({}), Status: {}, Strength: {}\n",
                    i + 1,
                    kingdom.name,
                    kingdom.relation_label(),
                    kingdom.relation_level,
                    kingdom.status_label(),
                    kingdom.strength,
                )
            })
            .collect();
        format!("Foreign Kingdoms:\n{}", rows)
    }

    pub fn bank_report(&self) -> String {
        format!(
            "Bank Status:\n  Interest Rate: {}%\n  Max Loan: {} gold\n  Current Loans: {} gold\n  Corruption Level: {}\n",
            percent(self.bank.interest_rate()),
            self.bank.max_loan_amount(),
            self.bank.current_loans(),
            self.bank.corruption_level(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_report_sections() {
        let kingdom = Kingdom::with_seed("Avalon", 3);
        let report = kingdom.status_report();

        assert!(report.starts_with("===== Kingdom Status: Avalon (Year 1) ====="));
        assert!(report.contains("Ruler: King Default King"));
        assert!(report.contains("  Peasants: 100"));
        assert!(report.contains("  Happiness: 50%"));
        assert!(report.contains("  Status: At Peace"));
        assert!(report.contains("  Treasury: 1000 gold"));
        assert!(report.contains("  Food: 1000"));
        assert!(!report.contains("Gold:"));
    }

    #[test]
    fn test_status_report_layout() {
        let kingdom = Kingdom::with_seed("Avalon", 3);
        let report = kingdom.status_report();
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(lines[1], "Ruler: King Default King");
        assert_eq!(lines[2], "Score: 0");
        assert_eq!(lines[3], "");
        assert_eq!(lines[4], "Population:");
        assert!(report.contains("  Taxes: peasants 10%, merchants 15%, nobles 20%\n"));
        assert!(report.ends_with("  Iron: 200 (Value: 1.00)\n"));
    }

    #[test]
    fn test_roster_report_lists_every_kingdom() {
        let mut kingdom = Kingdom::with_seed("Avalon", 3);
        kingdom.declare_war("Northlands").unwrap();
        let report = kingdom.roster_report();

        assert_eq!(report.lines().count(), 4);
        assert!(report.contains("1. Northlands - Relations: Hostile (-5), Status: At War"));
        assert!(report.contains("2. Eastern Empire - Relations: Neutral (0), Status: Peaceful"));
    }

    #[test]
    fn test_bank_report() {
        let kingdom = Kingdom::with_seed("Avalon", 3);
        let report = kingdom.bank_report();
        assert!(report.contains("Interest Rate: 5%"));
        assert!(report.contains("Max Loan: 1000 gold"));
        assert!(report.contains("Corruption Level: 0"));
    }
}
