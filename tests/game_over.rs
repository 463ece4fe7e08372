//! Integration tests for the terminal conditions
//!
//! The kingdom falls when its people dwindle below ten, when it is broke
//! and buried in debt, or when both the people and the army lose heart.

use stronghold::kingdom::Kingdom;

fn kingdom() -> Kingdom {
    Kingdom::with_seed("Avalon", 1)
}

#[test]
fn test_default_kingdom_stands() {
    assert!(!kingdom().is_game_over());
}

#[test]
fn test_population_boundary() {
    let mut k = kingdom();
    k.population_mut().set_peasants(0);
    k.population_mut().set_merchants(5);
    k.population_mut().set_nobles(5);
    assert!(!k.is_game_over());

    k.population_mut().set_nobles(4);
    assert!(k.is_game_over());
}

#[test]
fn test_bankruptcy_boundary() {
    let mut k = kingdom();
    k.economy_mut().set_treasury(0);
    k.economy_mut().set_debt(5000);
    assert!(!k.is_game_over());

    k.economy_mut().set_debt(5001);
    assert!(k.is_game_over());

    k.economy_mut().set_treasury(1);
    assert!(!k.is_game_over());
}

#[test]
fn test_despair_boundary() {
    let mut k = kingdom();
    k.population_mut().set_happiness(0.05);
    k.army_mut().set_morale(0.1);
    assert!(!k.is_game_over());

    k.army_mut().set_morale(0.05);
    assert!(k.is_game_over());

    k.population_mut().set_happiness(0.1);
    assert!(!k.is_game_over());
}
