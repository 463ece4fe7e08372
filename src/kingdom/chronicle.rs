//! Chronicle - the record of notable happenings, year by year

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::kingdom::events::EventOutcome;
use crate::kingdom::leader::ActionOutcome;
use crate::kingdom::systems::{BattleOutcome, BattleReport};

/// A single recorded happening
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: u32,
    pub year: u32,
    pub entry: ChronicleEntry,
}

/// Why unrest broke out
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnrestCause {
    Populace,
    Army,
    Riots,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ChronicleEntry {
    // Fortune
    Event { outcome: EventOutcome, manual: bool },
    Unrest { cause: UnrestCause },

    // War
    Battle(BattleReport),

    // Court
    Election { ruler: String },
    RulerAction { ruler: String, outcome: ActionOutcome },
    CommanderPlotting { commander: String, loyalty: i32 },

    // Treasury
    CorruptionScandal { skimmed: i64 },
    TaxesCollected { amount: i64 },
}

impl fmt::Display for ChronicleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChronicleEntry::Event { outcome, .. } => write!(f, "EVENT ({}): {}", outcome.kind(), outcome),
            ChronicleEntry::Unrest { cause } => {
                let cause = match cause {
                    UnrestCause::Populace => "the people",
                    UnrestCause::Army => "the army",
                    UnrestCause::Riots => "rioting",
                };
                write!(f, "WARNING: Unrest threatens the stability of your kingdom ({})", cause)
            }
            ChronicleEntry::Battle(report) => match report.outcome {
                BattleOutcome::Victory => write!(f, "Your forces defeat {} in battle", report.kingdom),
                BattleOutcome::Defeat => write!(f, "Your forces suffer defeat against {}", report.kingdom),
            },
            ChronicleEntry::Election { ruler } => write!(f, "Elections held: {} takes power", ruler),
            ChronicleEntry::RulerAction { ruler, outcome } => write!(f, "{}: {}", ruler, outcome),
            ChronicleEntry::CommanderPlotting { commander, .. } => {
                write!(f, "WARNING: Commander {} is plotting against you", commander)
            }
            ChronicleEntry::CorruptionScandal { skimmed } => {
                write!(f, "A corruption scandal has cost the treasury {} gold", skimmed)
            }
            ChronicleEntry::TaxesCollected { amount } => write!(f, "Collected {} gold in taxes", amount),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Chronicle {
    pub entries: Vec<Entry>,
    next_id: u32,
}

impl Chronicle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, year: u32, entry: ChronicleEntry) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(Entry { id, year, entry });
        id
    }

    pub fn entries_for_year(&self, year: u32) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(move |e| e.year == year)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count_events(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.entry, ChronicleEntry::Event { .. }))
            .count()
    }

    pub fn count_battles(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.entry, ChronicleEntry::Battle(_)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_increase_and_filter_by_year() {
        let mut chronicle = Chronicle::new();
        let a = chronicle.record(1, ChronicleEntry::TaxesCollected { amount: 100 });
        let b = chronicle.record(2, ChronicleEntry::CorruptionScandal { skimmed: 5 });
        let c = chronicle.record(2, ChronicleEntry::TaxesCollected { amount: 90 });

        assert_eq!((a, b, c), (0, 1, 2));
        assert_eq!(chronicle.entries_for_year(2).count(), 2);
        assert_eq!(chronicle.entries_for_year(3).count(), 0);
    }

    #[test]
    fn test_entry_text() {
        let entry = ChronicleEntry::Event {
            outcome: EventOutcome::Festival { cost: 100 },
            manual: false,
        };
        assert_eq!(entry.to_string(), "EVENT (Festival): A grand festival costs 100 gold");
    }
}
