pub mod error;
pub mod stats;
pub mod types;
pub mod units;

#[cfg(feature = "valuation")]
pub mod valuation;

pub use error::PeerValuationError;
pub use types::*;
pub use units::{normalize, UnitTag};

/// Standard result type for fallible peer-valuation operations
pub type PeerValuationResult<T> = Result<T, PeerValuationError>;
