//! Kingdom - the orchestrator owning every subsystem of one session

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::core::clock::{SessionClock, SimulatedDelay};
use crate::core::config::KingdomConfig;
use crate::core::error::{KingdomError, Result};
use crate::kingdom::chronicle::{Chronicle, ChronicleEntry};
use crate::kingdom::events::{self, EventKind, EventOutcome, RandomEvents};
use crate::kingdom::leader::{Leader, RulerAction, RulerWarning};
use crate::kingdom::realm::Realm;
use crate::kingdom::resource::ResourceKind;
use crate::kingdom::systems::{
    Army, Bank, BattleReport, Diplomacy, Economy, Estate, Market, Population, TradeDeal, UnitType,
};

/// One kingdom for the lifetime of a session
///
/// All simulation state lives here. Collaborators read it through the
/// accessors and change it through the operations below or the clamping
/// setters of each subsystem.
pub struct Kingdom {
    pub(super) name: String,
    pub(super) year: u32,
    pub(super) score: i64,
    pub(super) population: Population,
    pub(super) army: Army,
    pub(super) economy: Economy,
    pub(super) market: Market,
    pub(super) diplomacy: Diplomacy,
    pub(super) bank: Bank,
    pub(super) events: RandomEvents,
    pub(super) ruler: Leader,
    /// Every probabilistic decision draws from this stream
    pub(super) rng: ChaCha8Rng,
    pub(super) clock: SessionClock,
    pub(super) chronicle: Chronicle,
}

impl Kingdom {
    /// Default kingdom on the wall clock with an entropy-seeded stream
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(
            name,
            &KingdomConfig::default(),
            ChaCha8Rng::from_entropy(),
            SessionClock::wall(),
        )
    }

    /// Default kingdom with a reproducible stream and a manual clock
    pub fn with_seed(name: impl Into<String>, seed: u64) -> Self {
        Self::with_config(
            name,
            &KingdomConfig::default(),
            ChaCha8Rng::seed_from_u64(seed),
            SessionClock::manual(),
        )
    }

    pub fn with_config(
        name: impl Into<String>,
        config: &KingdomConfig,
        mut rng: ChaCha8Rng,
        clock: SessionClock,
    ) -> Self {
        let mut population = Population::new(
            config.population.peasants,
            config.population.merchants,
            config.population.nobles,
        );
        population.set_happiness(config.population.happiness);

        let mut army = Army::new(config.army.infantry, config.army.cavalry, config.army.archers);
        army.set_morale(config.army.morale);

        let mut economy = Economy::new(
            config.economy.peasant_tax,
            config.economy.merchant_tax,
            config.economy.noble_tax,
        );
        economy.set_inflation(config.economy.inflation);
        economy.set_treasury(config.economy.treasury);

        let diplomacy = Diplomacy::from_config(&config.roster, &mut rng);
        let events = RandomEvents::from_config(&config.events, clock.elapsed());

        Self {
            name: name.into(),
            year: 1,
            score: 0,
            population,
            army,
            economy,
            market: Market::from_config(&config.market),
            diplomacy,
            bank: Bank::from_config(&config.bank),
            events,
            ruler: Leader::from_config(&config.ruler),
            rng,
            clock,
            chronicle: Chronicle::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn year(&self) -> u32 {
        self.year
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn army(&self) -> &Army {
        &self.army
    }

    pub fn economy(&self) -> &Economy {
        &self.economy
    }

    pub fn market(&self) -> &Market {
        &self.market
    }

    pub fn diplomacy(&self) -> &Diplomacy {
        &self.diplomacy
    }

    pub fn bank(&self) -> &Bank {
        &self.bank
    }

    pub fn events(&self) -> &RandomEvents {
        &self.events
    }

    pub fn ruler(&self) -> &Leader {
        &self.ruler
    }

    pub fn chronicle(&self) -> &Chronicle {
        &self.chronicle
    }

    pub fn clock(&self) -> &SessionClock {
        &self.clock
    }

    pub fn population_mut(&mut self) -> &mut Population {
        &mut self.population
    }

    pub fn army_mut(&mut self) -> &mut Army {
        &mut self.army
    }

    pub fn economy_mut(&mut self) -> &mut Economy {
        &mut self.economy
    }

    pub fn market_mut(&mut self) -> &mut Market {
        &mut self.market
    }

    pub fn bank_mut(&mut self) -> &mut Bank {
        &mut self.bank
    }

    pub fn clock_mut(&mut self) -> &mut SessionClock {
        &mut self.clock
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_year(&mut self, year: u32) {
        self.year = year.max(1);
    }

    pub fn set_score(&mut self, score: i64) {
        self.score = score.max(0);
    }

    pub fn set_ruler(&mut self, ruler: Leader) {
        self.ruler = ruler;
    }

    /// Split into the realm view, the ruler and the random stream
    pub(super) fn split(&mut self) -> (Realm<'_>, &mut Leader, &mut ChaCha8Rng) {
        (
            Realm {
                population: &mut self.population,
                army: &mut self.army,
                economy: &mut self.economy,
                market: &mut self.market,
            },
            &mut self.ruler,
            &mut self.rng,
        )
    }

    pub(super) fn record(&mut self, entry: ChronicleEntry) {
        self.chronicle.record(self.year, entry);
    }

    /// Recompute the score from the current state; the result may be negative
    pub fn calculate_score(&mut self) -> i64 {
        let score = self.population.total() as i64 * 10
            + self.army.total() as i64 * 20
            + self.economy.treasury() / 10
            + (self.population.happiness() * 1000.0) as i64
            + self.year as i64 * 100
            - self.economy.debt() / 5
            - (self.economy.inflation() * 2000.0) as i64;
        self.score = score;
        score
    }

    pub fn is_game_over(&self) -> bool {
        self.population.total() < 10
            || (self.economy.treasury() <= 0 && self.economy.debt() > 5000)
            || (self.population.happiness() < 0.1 && self.army.morale() < 0.1)
    }

    /// Fraction of the population the granary can feed, 0.0 - 1.0
    pub fn food_security(&self) -> f64 {
        let total = self.population.total();
        if total == 0 {
            return 1.0;
        }
        (self.market.amount(ResourceKind::Food) as f64 / total as f64).min(1.0)
    }

    pub fn buy_resource(&mut self, kind: ResourceKind, amount: u32) -> Result<i64> {
        self.market.buy_resource(kind, amount, &mut self.economy)
    }

    pub fn sell_resource(&mut self, kind: ResourceKind, amount: u32) -> Result<i64> {
        self.market.sell_resource(kind, amount, &mut self.economy)
    }

    pub fn recruit(&mut self, unit: UnitType, count: u32) -> Result<i64> {
        self.army.recruit(unit, count, &mut self.economy)
    }

    pub fn train_army(&mut self) -> SimulatedDelay {
        self.army.train()
    }

    /// Set one estate's tax rate; rates outside 0.0 - 0.5 are rejected
    pub fn set_tax_rate(&mut self, estate: Estate, rate: f64) -> Result<()> {
        if !(0.0..=0.5).contains(&rate) {
            return Err(KingdomError::Validation(format!(
                "tax rate {} must be between 0.0 and 0.5",
                rate
            )));
        }
        self.economy.set_tax_rate(estate, rate);
        Ok(())
    }

    pub fn improve_relations(&mut self, kingdom: &str) -> Result<i64> {
        self.diplomacy.improve_relations(kingdom, &mut self.economy)
    }

    pub fn declare_war(&mut self, kingdom: &str) -> Result<()> {
        self.diplomacy.declare_war(kingdom, &mut self.army)
    }

    pub fn sign_peace(&mut self, kingdom: &str) -> Result<i64> {
        self.diplomacy.sign_peace(kingdom, &mut self.economy, &mut self.army)
    }

    pub fn form_alliance(&mut self, kingdom: &str) -> Result<()> {
        self.diplomacy.form_alliance(kingdom)
    }

    pub fn establish_trade(&mut self, kingdom: &str) -> Result<TradeDeal> {
        self.diplomacy
            .establish_trade(kingdom, &mut self.market, &mut self.economy)
    }

    pub fn battle(&mut self, kingdom: &str) -> Result<BattleReport> {
        let report = self.diplomacy.battle(kingdom, &mut self.army)?;
        self.record(ChronicleEntry::Battle(report.clone()));
        Ok(report)
    }

    pub fn take_loan(&mut self, amount: i64) -> Result<()> {
        self.bank.take_loan(amount, &mut self.economy)
    }

    pub fn repay_loan(&mut self, amount: i64) -> Result<()> {
        self.bank.repay_loan(amount, &mut self.economy)
    }

    /// Replace the ruler with a freshly elected one; the change lifts spirits
    pub fn hold_elections(&mut self) -> &Leader {
        self.ruler = Leader::elect(&mut self.rng);
        self.population.set_happiness(self.population.happiness() + 0.1);

        let ruler = self.ruler.to_string();
        tracing::info!(%ruler, "elections held");
        self.record(ChronicleEntry::Election { ruler });
        &self.ruler
    }

    pub fn perform_ruler_action(&mut self) -> RulerAction {
        let (mut realm, ruler, rng) = self.split();
        let action = ruler.special_action(&mut realm, rng);

        let ruler = self.ruler.to_string();
        tracing::info!(%ruler, outcome = %action.outcome, "ruler action");
        self.record(ChronicleEntry::RulerAction {
            ruler,
            outcome: action.outcome,
        });
        action
    }

    /// Fire a random event on demand, ignoring the cooldown
    pub fn trigger_random_event(&mut self) -> EventOutcome {
        let kind = self.events.generate_event(&mut self.rng);
        let outcome = self.apply_event(kind);
        self.record(ChronicleEntry::Event { outcome, manual: true });
        outcome
    }

    pub(super) fn apply_event(&mut self, kind: EventKind) -> EventOutcome {
        let (mut realm, ruler, rng) = self.split();
        events::apply_event(kind, &mut realm, ruler, rng)
    }

    pub(super) fn apply_ruler_effects(&mut self) {
        let (mut realm, ruler, rng) = self.split();
        if let Some(RulerWarning::Plotting { commander, loyalty }) = ruler.apply_effects(&mut realm, rng) {
            self.record(ChronicleEntry::CommanderPlotting { commander, loyalty });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kingdom::leader::{Commander, LeaderStats};

    #[test]
    fn test_default_kingdom() {
        let kingdom = Kingdom::with_seed("Test", 1);
        assert_eq!(kingdom.year(), 1);
        assert_eq!(kingdom.score(), 0);
        assert_eq!(kingdom.population().total(), 125);
        assert_eq!(kingdom.diplomacy().kingdoms().len(), 3);
        assert_eq!(kingdom.ruler().name(), "Default King");
    }

    #[test]
    fn test_default_score() {
        let mut kingdom = Kingdom::with_seed("Test", 1);
        // 1250 + 1600 + 100 + 500 + 100 - 0 - 40
        assert_eq!(kingdom.calculate_score(), 3510);
        assert_eq!(kingdom.score(), 3510);
    }

    #[test]
    fn test_score_can_go_negative_but_setter_clamps() {
        let mut kingdom = Kingdom::with_seed("Test", 1);
        kingdom.economy_mut().set_debt(1_000_000);
        assert!(kingdom.calculate_score() < 0);

        kingdom.set_score(-5);
        assert_eq!(kingdom.score(), 0);
        kingdom.set_year(0);
        assert_eq!(kingdom.year(), 1);
    }

    #[test]
    fn test_food_security() {
        let mut kingdom = Kingdom::with_seed("Test", 1);
        assert_eq!(kingdom.food_security(), 1.0);

        kingdom.market_mut().resource_mut(ResourceKind::Food).set_amount(25);
        assert_eq!(kingdom.food_security(), 0.2);

        kingdom.market_mut().resource_mut(ResourceKind::Food).set_amount(0);
        assert_eq!(kingdom.food_security(), 0.0);
    }

    #[test]
    fn test_tax_rate_validation() {
        let mut kingdom = Kingdom::with_seed("Test", 1);
        assert!(matches!(
            kingdom.set_tax_rate(Estate::Peasants, 0.6),
            Err(KingdomError::Validation(_))
        ));
        assert_eq!(kingdom.economy().peasant_tax_rate(), 0.10);

        kingdom.set_tax_rate(Estate::Nobles, 0.3).unwrap();
        assert_eq!(kingdom.economy().noble_tax_rate(), 0.3);
    }

    #[test]
    fn test_elections_replace_ruler_and_lift_spirits() {
        let mut kingdom = Kingdom::with_seed("Test", 9);
        let ruler = kingdom.hold_elections().name().to_string();

        assert!(ruler.starts_with("Elected"));
        assert!((kingdom.population().happiness() - 0.6).abs() < 1e-9);
        assert_eq!(kingdom.chronicle().len(), 1);
    }

    #[test]
    fn test_elections_reach_every_kind() {
        let mut kingdom = Kingdom::with_seed("Test", 3);
        let mut titles = std::collections::HashSet::new();
        for _ in 0..60 {
            titles.insert(kingdom.hold_elections().title());
        }
        assert_eq!(titles.len(), 3);
    }

    #[test]
    fn test_ruler_action_is_chronicled() {
        let mut kingdom = Kingdom::with_seed("Test", 2);
        kingdom.perform_ruler_action();
        assert!(matches!(
            kingdom.chronicle().entries[0].entry,
            ChronicleEntry::RulerAction { .. }
        ));
    }

    #[test]
    fn test_disloyal_commander_chronicled() {
        let mut kingdom = Kingdom::with_seed("Test", 4);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut commander = Commander::new(LeaderStats::new("Marshal", 50, 50, 70), 60, &mut rng);
        commander.set_loyalty(0);
        kingdom.set_ruler(Leader::Commander(commander));

        // 30% per year; 50 years without a plot is practically impossible
        for _ in 0..50 {
            kingdom.apply_ruler_effects();
        }
        assert!(kingdom
            .chronicle()
            .entries
            .iter()
            .any(|e| matches!(e.entry, ChronicleEntry::CommanderPlotting { .. })));
    }

    #[test]
    fn test_manual_event_ignores_cooldown() {
        let mut kingdom = Kingdom::with_seed("Test", 5);
        kingdom.trigger_random_event();
        kingdom.trigger_random_event();
        assert_eq!(kingdom.chronicle().count_events(), 2);
    }

    #[test]
    fn test_battle_is_chronicled() {
        let mut kingdom = Kingdom::with_seed("Test", 6);
        kingdom.declare_war("Northlands").unwrap();
        kingdom.battle("Northlands").unwrap();
        assert_eq!(kingdom.chronicle().count_battles(), 1);
    }
}
