//! Stronghold - turn-based medieval kingdom management

pub mod core;
pub mod kingdom;
