use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::codec::{to_canonical_json, FormatError};
use super::crypto::{sha256, BlockHash};
use super::transaction::Transaction;

/// Represents a block in the blockchain
///
/// A block is never modified once it has been appended to a ledger. Its hash
/// is derived from the fields on demand rather than stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Block {
    /// Position in the chain, starting at 1 for the genesis block
    pub index: u64,

    /// Creation time in milliseconds since the Unix epoch
    pub timestamp: i64,

    /// Proof of work
    pub proof: u64,

    /// Hash of the previous block
    #[schema(value_type = String, example = "0000000000000000000000000000000000000000000000000000000000000000")]
    pub previous_hash: BlockHash,

    /// Transactions included in this block, mining reward included
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn new(
        index: u64,
        timestamp: i64,
        proof: u64,
        previous_hash: BlockHash,
        transactions: Vec<Transaction>,
    ) -> Self {
        Block {
            index,
            timestamp,
            proof,
            previous_hash,
            transactions,
        }
    }

    /// Serializes the block into its canonical mapping
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "index": self.index,
            "timestamp": self.timestamp,
            "proof": self.proof,
            "previous_hash": self.previous_hash.to_hex(),
            "transactions": self.transactions.iter().map(Transaction::to_value).collect::<Vec<_>>(),
        })
    }

    /// Parses a block from its canonical mapping
    pub fn from_value(data: &Value) -> Result<Self, FormatError> {
        Ok(serde_json::from_value(data.clone())?)
    }

    /// Calculates the hash of the block
    ///
    /// SHA-256 over the canonical JSON encoding: keys sorted, `", "` between
    /// items and `": "` after keys. Chains written by other nodes hash with
    /// the same preimage, so the encoding must not drift.
    pub fn hash(&self) -> BlockHash {
        BlockHash(sha256(&to_canonical_json(&self.to_value())))
    }
}
