use crate::types::Credits;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unknown commodity '{0}'")]
    UnknownCommodity(String),

    #[error("Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Credits, available: Credits },

    #[error("Insufficient cargo space: need {needed}, free {free}")]
    InsufficientCargoSpace { needed: i64, free: i64 },

    #[error("Insufficient cargo: selling {requested}, holding {held}")]
    InsufficientCargo { requested: i64, held: i64 },

    #[error("Insufficient stock: requested {requested}, market holds {available}")]
    InsufficientStock { requested: i64, available: i64 },

    #[error("No operational marketplace in {system}")]
    NoMarketplace { system: String },

    #[error("Realized copy of {system} diverges from generator output")]
    RealizationMismatch { system: String },

    #[error("Ledger lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EngineError {
    /// True for business-rule rejections that leave state untouched and are
    /// reported back to the trader. False for infrastructure failures.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::UnknownCommodity(_)
                | Self::InsufficientFunds { .. }
                | Self::InsufficientCargoSpace { .. }
                | Self::InsufficientCargo { .. }
                | Self::InsufficientStock { .. }
                | Self::NoMarketplace { .. }
        )
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
