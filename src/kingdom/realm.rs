//! Mutable view over the subsystems a ruler or event can touch

use crate::kingdom::systems::{Army, Economy, Market, Population};

/// Borrowed subsystems, split off the kingdom so the ruler can be borrowed alongside
pub struct Realm<'a> {
    pub population: &'a mut Population,
    pub army: &'a mut Army,
    pub economy: &'a mut Economy,
    pub market: &'a mut Market,
}
