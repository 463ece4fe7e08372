//! Bank - royal loans, interest and corruption

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::BankConfig;
use crate::core::error::{KingdomError, Result};
use crate::kingdom::systems::{Economy, Population};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bank {
    interest_rate: f64,
    max_loan_amount: i64,
    current_loans: i64,
    corruption_level: u32,
}

impl Default for Bank {
    fn default() -> Self {
        Self::new(0.05, 1000)
    }
}

impl Bank {
    pub fn new(interest_rate: f64, max_loan_amount: i64) -> Self {
        let mut bank = Self {
            interest_rate: 0.05,
            max_loan_amount: 1000,
            current_loans: 0,
            corruption_level: 0,
        };
        bank.set_interest_rate(interest_rate);
        bank.set_max_loan_amount(max_loan_amount);
        bank
    }

    pub fn from_config(config: &BankConfig) -> Self {
        let mut bank = Self::new(config.interest_rate, config.max_loan);
        bank.set_corruption_level(config.corruption);
        bank
    }

    pub fn interest_rate(&self) -> f64 {
        self.interest_rate
    }

    pub fn max_loan_amount(&self) -> i64 {
        self.max_loan_amount
    }

    pub fn current_loans(&self) -> i64 {
        self.current_loans
    }

    pub fn corruption_level(&self) -> u32 {
        self.corruption_level
    }

    pub fn set_interest_rate(&mut self, rate: f64) {
        self.interest_rate = rate.clamp(0.01, 0.2);
    }

    pub fn set_max_loan_amount(&mut self, amount: i64) {
        self.max_loan_amount = amount.max(100);
    }

    pub fn set_corruption_level(&mut self, level: u32) {
        self.corruption_level = level.min(100);
    }

    /// Borrow up to the per-loan limit; the gold lands in the treasury as debt
    pub fn take_loan(&mut self, amount: i64, economy: &mut Economy) -> Result<()> {
        if amount <= 0 || amount > self.max_loan_amount {
            return Err(KingdomError::InvalidLoanAmount {
                amount,
                max: self.max_loan_amount,
            });
        }

        economy.set_debt(economy.debt() + amount);
        economy.set_treasury(economy.treasury() + amount);
        self.current_loans += amount;
        tracing::info!(amount, debt = economy.debt(), "loan taken");
        Ok(())
    }

    /// Pay down debt from the treasury
    pub fn repay_loan(&mut self, amount: i64, economy: &mut Economy) -> Result<()> {
        if amount <= 0 || amount > economy.treasury() || amount > economy.debt() {
            return Err(KingdomError::InvalidRepayment { amount });
        }

        economy.set_treasury(economy.treasury() - amount);
        economy.set_debt(economy.debt() - amount);
        self.current_loans = (self.current_loans - amount).max(0);
        tracing::info!(amount, debt = economy.debt(), "loan repaid");
        Ok(())
    }

    pub fn update_interest(&self, economy: &mut Economy) {
        let interest = (economy.debt() as f64 * self.interest_rate) as i64;
        economy.set_debt(economy.debt() + interest);
    }

    /// Roll for a banking scandal; returns the gold skimmed if one broke out
    pub fn attempt_corruption<R: Rng + ?Sized>(
        &self,
        economy: &mut Economy,
        population: &mut Population,
        rng: &mut R,
    ) -> Option<i64> {
        if self.corruption_level == 0 || rng.gen_range(0..100) >= self.corruption_level {
            return None;
        }

        let level = self.corruption_level as i64;
        let skimmed = economy.treasury() * level / 1000;
        economy.set_treasury(economy.treasury() - skimmed);

        let impact = 0.05 + self.corruption_level as f64 / 1000.0;
        population.set_happiness(population.happiness() - impact);

        tracing::warn!(skimmed, corruption = self.corruption_level, "corruption scandal");
        Some(skimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn test_loan_limit() {
        let mut bank = Bank::default();
        let mut economy = Economy::default();

        assert!(matches!(
            bank.take_loan(1001, &mut economy),
            Err(KingdomError::InvalidLoanAmount { amount: 1001, max: 1000 })
        ));
        assert_eq!(economy.treasury(), 1000);
        assert_eq!(economy.debt(), 0);

        bank.take_loan(1000, &mut economy).unwrap();
        assert_eq!(economy.treasury(), 2000);
        assert_eq!(economy.debt(), 1000);
        assert_eq!(bank.current_loans(), 1000);
    }

    #[test]
    fn test_loan_rejects_non_positive() {
        let mut bank = Bank::default();
        let mut economy = Economy::default();
        assert!(bank.take_loan(0, &mut economy).is_err());
        assert!(bank.take_loan(-5, &mut economy).is_err());
        assert_eq!(bank.current_loans(), 0);
    }

    #[test]
    fn test_repay_bounds() {
        let mut bank = Bank::default();
        let mut economy = Economy::default();
        bank.take_loan(500, &mut economy).unwrap();

        // more than the debt
        assert!(matches!(
            bank.repay_loan(501, &mut economy),
            Err(KingdomError::InvalidRepayment { amount: 501 })
        ));

        economy.set_treasury(100);
        // more than the treasury
        assert!(bank.repay_loan(200, &mut economy).is_err());

        bank.repay_loan(100, &mut economy).unwrap();
        assert_eq!(economy.treasury(), 0);
        assert_eq!(economy.debt(), 400);
        assert_eq!(bank.current_loans(), 400);
    }

    #[test]
    fn test_repay_interest_never_drives_loans_negative() {
        let mut bank = Bank::default();
        let mut economy = Economy::default();
        bank.take_loan(100, &mut economy).unwrap();
        bank.update_interest(&mut economy);
        assert_eq!(economy.debt(), 105);

        bank.repay_loan(105, &mut economy).unwrap();
        assert_eq!(economy.debt(), 0);
        assert_eq!(bank.current_loans(), 0);
    }

    #[test]
    fn test_clean_bank_never_skims() {
        let bank = Bank::default();
        let mut economy = Economy::default();
        let mut population = Population::default();

        assert_eq!(bank.attempt_corruption(&mut economy, &mut population, &mut StepRng::new(0, 0)), None);
        assert_eq!(economy.treasury(), 1000);
    }

    #[test]
    fn test_corruption_scandal() {
        let mut bank = Bank::default();
        bank.set_corruption_level(50);
        let mut economy = Economy::default();
        let mut population = Population::default();

        let skimmed = bank.attempt_corruption(&mut economy, &mut population, &mut StepRng::new(0, 0));
        assert_eq!(skimmed, Some(50));
        assert_eq!(economy.treasury(), 950);
        assert!((population.happiness() - 0.4).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn prop_setters_clamp(rate in -10.0..10.0f64, amount in -1_000_000..1_000_000i64, level in 0..10_000u32) {
            let mut bank = Bank::default();
            bank.set_interest_rate(rate);
            bank.set_max_loan_amount(amount);
            bank.set_corruption_level(level);

            prop_assert!((0.01..=0.2).contains(&bank.interest_rate()));
            prop_assert!(bank.max_loan_amount() >= 100);
            prop_assert!(bank.corruption_level() <= 100);
        }
    }
}
