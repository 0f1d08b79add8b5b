// Ledger engine
//
// This module contains the core ledger implementation including:
// - Transaction and Block data model
// - Canonical serialization and block hashing
// - Balance accounting, transaction admission and block minting
// - Proof of work algorithm
// - Chain validation

pub mod amount;
pub mod block;
pub mod chain;
pub mod codec;
pub mod crypto;
pub mod pow;
pub mod transaction;
pub mod validation;

// Re-export main components for easier access
pub use amount::Amount;
pub use block::Block;
pub use chain::{Ledger, LedgerError};
pub use codec::FormatError;
pub use crypto::{Address, BlockHash};
pub use transaction::Transaction;
pub use validation::valid_chain;
