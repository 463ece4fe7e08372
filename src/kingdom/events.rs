//! Random events - a cooldown-gated catalog of windfalls and disasters

use std::fmt;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::EventConfig;
use crate::kingdom::leader::Leader;
use crate::kingdom::realm::Realm;
use crate::kingdom::resource::ResourceKind;
use crate::kingdom::systems::Losses;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Plague,
    GoodHarvest,
    Drought,
    ForeignInvasion,
    Rebellion,
    Assassination,
    Discovery,
    Festival,
    Fire,
    Earthquake,
}

impl EventKind {
    pub const ALL: [EventKind; 10] = [
        EventKind::Plague,
        EventKind::GoodHarvest,
        EventKind::Drought,
        EventKind::ForeignInvasion,
        EventKind::Rebellion,
        EventKind::Assassination,
        EventKind::Discovery,
        EventKind::Festival,
        EventKind::Fire,
        EventKind::Earthquake,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Plague => "Plague",
            EventKind::GoodHarvest => "Good Harvest",
            EventKind::Drought => "Drought",
            EventKind::ForeignInvasion => "Foreign Invasion",
            EventKind::Rebellion => "Rebellion",
            EventKind::Assassination => "Assassination Attempt",
            EventKind::Discovery => "Discovery",
            EventKind::Festival => "Festival",
            EventKind::Fire => "Fire",
            EventKind::Earthquake => "Earthquake",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What an event actually did to the kingdom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventOutcome {
    Plague { deaths: u32 },
    GoodHarvest { food: u32 },
    Drought { food_lost: u32 },
    ForeignInvasion { losses: Losses },
    Rebellion { citizens: u32, soldiers: u32 },
    Assassination { ruler_replaced: bool },
    Discovery { resource: ResourceKind, amount: u32 },
    Festival { cost: i64 },
    Fire { wood_lost: u32, food_lost: u32 },
    Earthquake { stone_lost: u32, deaths: u32 },
}

impl EventOutcome {
    pub fn kind(&self) -> EventKind {
        match self {
            EventOutcome::Plague { .. } => EventKind::Plague,
            EventOutcome::GoodHarvest { .. } => EventKind::GoodHarvest,
            EventOutcome::Drought { .. } => EventKind::Drought,
            EventOutcome::ForeignInvasion { .. } => EventKind::ForeignInvasion,
            EventOutcome::Rebellion { .. } => EventKind::Rebellion,
            EventOutcome::Assassination { .. } => EventKind::Assassination,
            EventOutcome::Discovery { .. } => EventKind::Discovery,
            EventOutcome::Festival { .. } => EventKind::Festival,
            EventOutcome::Fire { .. } => EventKind::Fire,
            EventOutcome::Earthquake { .. } => EventKind::Earthquake,
        }
    }
}

impl fmt::Display for EventOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventOutcome::Plague { deaths } => write!(f, "A terrible plague claims {} lives", deaths),
            EventOutcome::GoodHarvest { food } => write!(f, "A bountiful harvest adds {} food", food),
            EventOutcome::Drought { food_lost } => write!(f, "A severe drought destroys {} food", food_lost),
            EventOutcome::ForeignInvasion { losses } => {
                write!(f, "Invaders kill {} soldiers; the kingdom is at war", losses.total())
            }
            EventOutcome::Rebellion { citizens, soldiers } => {
                write!(f, "A rebellion claims {} citizens and {} soldiers", citizens, soldiers)
            }
            EventOutcome::Assassination { ruler_replaced: true } => {
                write!(f, "The ruler is gravely wounded and must be replaced")
            }
            EventOutcome::Assassination { ruler_replaced: false } => {
                write!(f, "An assassination attempt fails, but the kingdom is shaken")
            }
            EventOutcome::Discovery { resource, amount } => {
                write!(f, "Scholars uncover a deposit of {} {}", amount, resource)
            }
            EventOutcome::Festival { cost } => write!(f, "A grand festival costs {} gold", cost),
            EventOutcome::Fire { wood_lost, food_lost } => {
                write!(f, "A fire destroys {} wood and {} food", wood_lost, food_lost)
            }
            EventOutcome::Earthquake { stone_lost, deaths } => {
                write!(f, "An earthquake destroys {} stone and claims {} lives", stone_lost, deaths)
            }
        }
    }
}

/// Cooldown and odds for events fired by the yearly update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomEvents {
    event_chance: u32,
    cooldown: Duration,
    last_event: Duration,
}

impl Default for RandomEvents {
    fn default() -> Self {
        Self::new(15, Duration::from_secs(5), Duration::ZERO)
    }
}

impl RandomEvents {
    /// `started` is the session time the cooldown counts from
    pub fn new(event_chance: u32, cooldown: Duration, started: Duration) -> Self {
        Self {
            event_chance: event_chance.min(100),
            cooldown,
            last_event: started,
        }
    }

    pub fn from_config(config: &EventConfig, started: Duration) -> Self {
        Self::new(config.chance, Duration::from_secs(config.cooldown_secs), started)
    }

    pub fn event_chance(&self) -> u32 {
        self.event_chance
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Whether an event fires at session time `now`; a hit restarts the cooldown
    pub fn check_for_event<R: Rng + ?Sized>(&mut self, now: Duration, rng: &mut R) -> bool {
        if now.saturating_sub(self.last_event) < self.cooldown {
            return false;
        }
        if rng.gen_range(0..100) < self.event_chance {
            self.last_event = now;
            return true;
        }
        false
    }

    pub fn generate_event<R: Rng + ?Sized>(&self, rng: &mut R) -> EventKind {
        EventKind::ALL[rng.gen_range(0..EventKind::ALL.len())]
    }
}

/// Apply an event to the realm; assassinations may replace the ruler
pub fn apply_event<R: Rng + ?Sized>(
    kind: EventKind,
    realm: &mut Realm<'_>,
    ruler: &mut Leader,
    rng: &mut R,
) -> EventOutcome {
    let population = &mut *realm.population;
    let army = &mut *realm.army;
    let market = &mut *realm.market;

    let outcome = match kind {
        EventKind::Plague => {
            let before = population.total();
            let loss = before / 10;
            population.set_peasants(population.peasants().saturating_sub(loss * 8 / 10));
            population.set_merchants(reduce(population.merchants(), loss as f64 * 0.15));
            population.set_nobles(reduce(population.nobles(), loss as f64 * 0.05));
            population.set_happiness(population.happiness() - 0.2);
            EventOutcome::Plague {
                deaths: before - population.total(),
            }
        }
        EventKind::GoodHarvest => {
            let food = population.peasants().saturating_mul(2);
            market.resource_mut(ResourceKind::Food).change_amount(food as i64);
            population.set_happiness(population.happiness() + 0.15);
            EventOutcome::GoodHarvest { food }
        }
        EventKind::Drought => {
            let food_lost = market.amount(ResourceKind::Food) / 3;
            market.resource_mut(ResourceKind::Food).change_amount(-(food_lost as i64));
            population.set_happiness(population.happiness() - 0.1);
            EventOutcome::Drought { food_lost }
        }
        EventKind::ForeignInvasion => {
            let losses = army.suffer_defeat();
            army.set_war_status(true);
            army.set_morale(army.morale() - 0.15);
            EventOutcome::ForeignInvasion { losses }
        }
        EventKind::Rebellion => {
            let citizens = (population.total() / 10).min(population.peasants());
            population.set_peasants(population.peasants() - citizens);
            let soldiers = army.take_losses(army.total() / 10, 0, 0).infantry;
            population.set_happiness(population.happiness() - 0.2);
            army.set_morale(army.morale() - 0.2);
            EventOutcome::Rebellion { citizens, soldiers }
        }
        EventKind::Assassination => {
            let ruler_replaced = rng.gen_range(0..2) != 0;
            if ruler_replaced {
                *ruler = Leader::successor();
                population.set_happiness(population.happiness() - 0.3);
            } else {
                population.set_happiness(population.happiness() - 0.1);
            }
            EventOutcome::Assassination { ruler_replaced }
        }
        EventKind::Discovery => {
            let (resource, amount) = match rng.gen_range(0..3) {
                0 => (ResourceKind::Iron, 100 + rng.gen_range(0..100)),
                1 => (ResourceKind::Wood, 200 + rng.gen_range(0..200)),
                _ => (ResourceKind::Stone, 150 + rng.gen_range(0..150)),
            };
            market.resource_mut(resource).change_amount(amount as i64);
            population.set_happiness(population.happiness() + 0.1);
            EventOutcome::Discovery { resource, amount }
        }
        EventKind::Festival => {
            let before = realm.economy.treasury();
            realm.economy.set_treasury(before - 100);
            population.set_happiness(population.happiness() + 0.2);
            EventOutcome::Festival {
                cost: before - realm.economy.treasury(),
            }
        }
        EventKind::Fire => {
            let wood_lost = market.amount(ResourceKind::Wood) / 4;
            let food_lost = market.amount(ResourceKind::Food) / 5;
            market.resource_mut(ResourceKind::Wood).change_amount(-(wood_lost as i64));
            market.resource_mut(ResourceKind::Food).change_amount(-(food_lost as i64));
            population.set_happiness(population.happiness() - 0.15);
            EventOutcome::Fire { wood_lost, food_lost }
        }
        EventKind::Earthquake => {
            let stone_lost = market.amount(ResourceKind::Stone) / 3;
            market.resource_mut(ResourceKind::Stone).change_amount(-(stone_lost as i64));
            let deaths = (population.total() / 20).min(population.peasants());
            population.set_peasants(population.peasants() - deaths);
            population.set_happiness(population.happiness() - 0.2);
            EventOutcome::Earthquake { stone_lost, deaths }
        }
    };

    tracing::info!(event = %kind, %outcome, "event applied");
    outcome
}

/// Subtract a fractional loss from a head count, truncating afterwards
fn reduce(count: u32, loss: f64) -> u32 {
    (count as f64 - loss).max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kingdom::leader::{King, LeaderStats};
    use crate::kingdom::systems::{Army, Economy, Market, Population};
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    struct Fixture {
        population: Population,
        army: Army,
        economy: Economy,
        market: Market,
        ruler: Leader,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                population: Population::default(),
                army: Army::default(),
                economy: Economy::default(),
                market: Market::default(),
                ruler: Leader::King(King::new(LeaderStats::new("Aldric", 70, 60, 50), 80)),
            }
        }

        fn apply(&mut self, kind: EventKind, rng: &mut impl Rng) -> EventOutcome {
            let mut realm = Realm {
                population: &mut self.population,
                army: &mut self.army,
                economy: &mut self.economy,
                market: &mut self.market,
            };
            apply_event(kind, &mut realm, &mut self.ruler, rng)
        }
    }

    #[test]
    fn test_cooldown_blocks_until_elapsed() {
        let mut events = RandomEvents::new(100, Duration::from_secs(5), Duration::ZERO);
        let mut rng = StepRng::new(0, 0);

        assert!(!events.check_for_event(Duration::from_secs(4), &mut rng));
        assert!(events.check_for_event(Duration::from_secs(5), &mut rng));
        // cooldown restarts from the hit
        assert!(!events.check_for_event(Duration::from_secs(9), &mut rng));
        assert!(events.check_for_event(Duration::from_secs(10), &mut rng));
    }

    #[test]
    fn test_zero_chance_never_fires() {
        let mut events = RandomEvents::new(0, Duration::ZERO, Duration::ZERO);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for secs in 0..200 {
            assert!(!events.check_for_event(Duration::from_secs(secs), &mut rng));
        }
    }

    #[test]
    fn test_generate_covers_catalog() {
        let events = RandomEvents::default();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(events.generate_event(&mut rng));
        }
        assert_eq!(seen.len(), EventKind::ALL.len());
    }

    #[test]
    fn test_plague() {
        let mut fixture = Fixture::new();
        let outcome = fixture.apply(EventKind::Plague, &mut StepRng::new(0, 0));

        // 125 / 10 = 12 -> peasants -9, merchants 20 - 1.8, nobles 5 - 0.6
        assert_eq!(outcome, EventOutcome::Plague { deaths: 12 });
        assert_eq!(fixture.population.peasants(), 91);
        assert_eq!(fixture.population.merchants(), 18);
        assert_eq!(fixture.population.nobles(), 4);
        assert!((fixture.population.happiness() - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_plague_reports_deaths_actually_applied() {
        let mut fixture = Fixture::new();
        fixture.population = Population::new(0, 0, 30);
        let outcome = fixture.apply(EventKind::Plague, &mut StepRng::new(0, 0));

        // 3 requested, but only the nobles lose anyone: 30 - 0.15 truncates to 29
        assert_eq!(outcome, EventOutcome::Plague { deaths: 1 });
        assert_eq!(fixture.population.total(), 29);
    }

    #[test]
    fn test_foreign_invasion() {
        let mut fixture = Fixture::new();
        let outcome = fixture.apply(EventKind::ForeignInvasion, &mut StepRng::new(0, 0));

        assert_eq!(
            outcome,
            EventOutcome::ForeignInvasion {
                losses: Losses { infantry: 4, cavalry: 1, archers: 1 }
            }
        );
        assert!(fixture.army.is_at_war());
        assert!((fixture.army.morale() - 0.55).abs() < 1e-9);
    }

    #[test]
    fn test_rebellion() {
        let mut fixture = Fixture::new();
        let outcome = fixture.apply(EventKind::Rebellion, &mut StepRng::new(0, 0));

        assert_eq!(outcome, EventOutcome::Rebellion { citizens: 12, soldiers: 8 });
        assert_eq!(fixture.population.peasants(), 88);
        assert_eq!(fixture.army.infantry(), 42);
    }

    #[test]
    fn test_assassination_fails_on_low_roll() {
        let mut fixture = Fixture::new();
        let outcome = fixture.apply(EventKind::Assassination, &mut StepRng::new(0, 0));

        assert_eq!(outcome, EventOutcome::Assassination { ruler_replaced: false });
        assert_eq!(fixture.ruler.name(), "Aldric");
        assert!((fixture.population.happiness() - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_successful_assassination_crowns_new_king() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for _ in 0..64 {
            let mut fixture = Fixture::new();
            if let EventOutcome::Assassination { ruler_replaced: true } = fixture.apply(EventKind::Assassination, &mut rng) {
                assert_eq!(fixture.ruler.name(), "New King");
                assert!((fixture.population.happiness() - 0.2).abs() < 1e-9);
                return;
            }
        }
        panic!("no successful assassination in 64 attempts");
    }

    #[test]
    fn test_discovery_on_low_roll_finds_iron() {
        let mut fixture = Fixture::new();
        let outcome = fixture.apply(EventKind::Discovery, &mut StepRng::new(0, 0));

        assert_eq!(outcome, EventOutcome::Discovery { resource: ResourceKind::Iron, amount: 100 });
        assert_eq!(fixture.market.amount(ResourceKind::Iron), 300);
    }

    #[test]
    fn test_festival_cost_floors_treasury() {
        let mut fixture = Fixture::new();
        fixture.economy.set_treasury(40);
        let outcome = fixture.apply(EventKind::Festival, &mut StepRng::new(0, 0));

        assert_eq!(outcome, EventOutcome::Festival { cost: 40 });
        assert_eq!(fixture.economy.treasury(), 0);
        assert!((fixture.population.happiness() - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_stock_disasters() {
        let mut fixture = Fixture::new();
        let mut rng = StepRng::new(0, 0);

        assert_eq!(fixture.apply(EventKind::Drought, &mut rng), EventOutcome::Drought { food_lost: 333 });
        assert_eq!(fixture.market.amount(ResourceKind::Food), 667);

        assert_eq!(
            fixture.apply(EventKind::Fire, &mut rng),
            EventOutcome::Fire { wood_lost: 125, food_lost: 133 }
        );
        assert_eq!(fixture.market.amount(ResourceKind::Wood), 375);
        assert_eq!(fixture.market.amount(ResourceKind::Food), 534);

        assert_eq!(
            fixture.apply(EventKind::Earthquake, &mut rng),
            EventOutcome::Earthquake { stone_lost: 100, deaths: 6 }
        );
        assert_eq!(fixture.market.amount(ResourceKind::Stone), 200);
        assert_eq!(fixture.population.peasants(), 94);
    }

    #[test]
    fn test_good_harvest() {
        let mut fixture = Fixture::new();
        let outcome = fixture.apply(EventKind::GoodHarvest, &mut StepRng::new(0, 0));
        assert_eq!(outcome, EventOutcome::GoodHarvest { food: 200 });
        assert_eq!(fixture.market.amount(ResourceKind::Food), 1200);
    }
}
