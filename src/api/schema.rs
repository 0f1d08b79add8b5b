use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::blockchain::{Address, Amount, Block, FormatError, Transaction};

/// Response for the chain endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChainResponse {
    /// The blocks in the chain
    pub chain: Vec<Block>,

    /// The length of the chain
    pub length: usize,
}

/// Request for the transaction endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TransactionRequest {
    /// The sender's address (hex)
    pub sender: String,

    /// The recipient's address (hex)
    pub recipient: String,

    /// The amount to transfer, as a decimal string or a JSON number
    #[schema(value_type = String, example = "0.5")]
    pub amount: Value,
}

impl TransactionRequest {
    /// Parses the submitted fields into a transaction
    pub fn into_transaction(self) -> Result<Transaction, FormatError> {
        let amount = match &self.amount {
            Value::String(text) => text.parse::<Amount>()?,
            Value::Number(number) => number.to_string().parse::<Amount>()?,
            other => return Err(FormatError::InvalidDecimal(other.to_string())),
        };

        Ok(Transaction::new(
            Address::from_hex(&self.sender)?,
            Address::from_hex(&self.recipient)?,
            amount,
        ))
    }
}

/// Response for the transaction endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TransactionResponse {
    /// The message
    pub message: String,

    /// The index of the block that will include this transaction
    pub index: u64,
}

/// Response for the mine endpoint: the message followed by the new block's fields
#[derive(Debug, Serialize, ToSchema)]
pub struct MineResponse {
    /// The message
    pub message: String,

    /// The newly mined block
    #[serde(flatten)]
    pub block: Block,
}

/// Response for the validate endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ValidationResponse {
    /// Whether the chain is valid
    pub valid: bool,

    /// The length of the validated chain
    pub length: usize,
}

/// Response for the balance endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BalanceResponse {
    /// The address (hex)
    pub address: String,

    /// The balance, as a decimal string
    pub balance: String,
}

/// Request for the node registration endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterNodesRequest {
    /// URLs of the nodes to register
    pub nodes: Option<Vec<String>>,
}

/// Response for the node registration endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterNodesResponse {
    /// The message
    pub message: String,

    /// Every node known after registration
    pub total_nodes: Vec<String>,
}
