use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::amount::Amount;
use super::chain::{mining_reward, mining_reward_sender, MINING_REWARD_SENDER};
use super::codec::FormatError;
use super::crypto::Address;

/// A transfer of an amount from one address to another
///
/// Transactions carry no identity of their own: two transfers with the same
/// fields are indistinguishable and both may be admitted. Validity depends on
/// the ledger a transaction is submitted to, see `Ledger::valid_transaction`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct Transaction {
    /// Sender's address (hex)
    #[schema(value_type = String, example = "5ca60de0575441718094ea0ffcb02aa4")]
    pub sender: Address,

    /// Recipient's address (hex)
    #[schema(value_type = String, example = "33ee49f83681417e82660cb9585d13b1")]
    pub recipient: Address,

    /// Amount being transferred, as a decimal string
    #[schema(value_type = String, example = "0.5")]
    pub amount: Amount,
}

impl Transaction {
    pub fn new(sender: Address, recipient: Address, amount: Amount) -> Self {
        Transaction {
            sender,
            recipient,
            amount,
        }
    }

    /// Creates the reward transaction crediting whoever minted a block
    pub fn mining_reward(recipient: Address) -> Self {
        Transaction::new(mining_reward_sender(), recipient, mining_reward())
    }

    /// Checks if the transaction is sent by the reserved mining reward sender
    pub fn is_mining_reward(&self) -> bool {
        self.sender.as_bytes() == MINING_REWARD_SENDER
    }

    /// Serializes the transaction into its canonical mapping
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "sender": self.sender.to_hex(),
            "recipient": self.recipient.to_hex(),
            "amount": self.amount.to_string(),
        })
    }

    /// Parses a transaction from its canonical mapping
    pub fn from_value(data: &Value) -> Result<Self, FormatError> {
        Ok(serde_json::from_value(data.clone())?)
    }
}
