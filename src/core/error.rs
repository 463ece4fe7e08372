use thiserror::Error;

use crate::kingdom::resource::ResourceKind;

#[derive(Error, Debug)]
pub enum KingdomError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Insufficient funds: need {needed} gold, treasury holds {available}")]
    InsufficientFunds { needed: i64, available: i64 },

    #[error("Insufficient {resource}: need {needed}, stock holds {available}")]
    InsufficientStock {
        resource: ResourceKind,
        needed: u32,
        available: u32,
    },

    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    #[error("{0} cannot be traded on the market")]
    NotTradeable(ResourceKind),

    #[error("Kingdom '{0}' not found")]
    UnknownKingdom(String),

    #[error("Already at war with {0}")]
    AlreadyAtWar(String),

    #[error("Not at war with {0}")]
    NotAtWar(String),

    #[error("Relations with {kingdom} too low: need {required}, have {current}")]
    RelationsTooLow {
        kingdom: String,
        required: i32,
        current: i32,
    },

    #[error("Loan of {amount} rejected (must be between 1 and {max})")]
    InvalidLoanAmount { amount: i64, max: i64 },

    #[error("Repayment of {amount} rejected (must be positive and covered by treasury and debt)")]
    InvalidRepayment { amount: i64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed save at line {line} ({field}): {reason}")]
    MalformedSave {
        line: usize,
        field: &'static str,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, KingdomError>;
