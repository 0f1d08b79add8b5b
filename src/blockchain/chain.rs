use chrono::Utc;
use log::{debug, info};
use thiserror::Error;

use super::amount::Amount;
use super::block::Block;
use super::crypto::{Address, BlockHash};
use super::pow;
use super::transaction::Transaction;
use super::validation;

/// Raw bytes of the reserved sender that mints mining rewards
pub const MINING_REWARD_SENDER: [u8; 16] = [0u8; 16];

/// Previous hash carried by every genesis block
pub const GENESIS_PREVIOUS_HASH: BlockHash = BlockHash::ZERO;

/// Proof carried by every genesis block
pub const GENESIS_PROOF: u64 = 1;

/// The reserved mining reward sender as an address
pub fn mining_reward_sender() -> Address {
    Address::new(MINING_REWARD_SENDER.to_vec())
}

/// Amount credited by every mining reward transaction
pub fn mining_reward() -> Amount {
    Amount::one()
}

/// Errors that can occur during ledger operations
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Mining reward must be {expected}")]
    InvalidReward { expected: Amount },

    #[error("Sender {sender} does not have sufficient balance: {requested} (have {balance})")]
    InsufficientBalance {
        sender: Address,
        requested: Amount,
        balance: Amount,
    },

    #[error("An empty chain can only be started with an explicit previous hash")]
    MissingPreviousHash,

    #[error("Pending pool is full: {capacity} transactions waiting")]
    PendingPoolFull { capacity: usize },
}

/// The chain of committed blocks together with the pool of pending transactions
///
/// Blocks are only ever appended, and the pending pool is drained exactly
/// when a block is minted. Both collections are private; callers read them
/// through slices and change them through the admission and minting
/// operations below.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    chain: Vec<Block>,
    current_transactions: Vec<Transaction>,
    pending_capacity: Option<usize>,
}

impl Ledger {
    /// Creates an empty ledger without a genesis block
    pub fn new() -> Self {
        Ledger::default()
    }

    /// Creates an empty ledger whose pending pool holds at most `capacity`
    /// transfers (mining rewards are never refused)
    pub fn with_pending_capacity(capacity: usize) -> Self {
        Ledger {
            pending_capacity: Some(capacity),
            ..Ledger::default()
        }
    }

    /// Rebuilds a ledger from already committed blocks, without validating them
    pub(crate) fn from_blocks(blocks: &[Block]) -> Self {
        Ledger {
            chain: blocks.to_vec(),
            ..Ledger::default()
        }
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn current_transactions(&self) -> &[Transaction] {
        &self.current_transactions
    }

    pub fn last_block(&self) -> Option<&Block> {
        self.chain.last()
    }

    /// Computes the balance of an address
    ///
    /// Walks every committed transaction in chain order followed by the
    /// pending pool. The mining reward sender is a virtual source of funds
    /// and always reports zero.
    pub fn balance_of(&self, address: &Address) -> Amount {
        let mut balance = Amount::zero();
        if address.as_bytes() == MINING_REWARD_SENDER {
            return balance;
        }

        let transactions = self
            .chain
            .iter()
            .flat_map(|block| block.transactions.iter())
            .chain(self.current_transactions.iter());

        for transaction in transactions {
            if &transaction.sender == address {
                balance -= &transaction.amount;
            }
            if &transaction.recipient == address {
                balance += &transaction.amount;
            }
        }

        balance
    }

    /// Checks whether a transaction may enter the pending pool
    pub fn valid_transaction(&self, transaction: &Transaction) -> Result<(), LedgerError> {
        if transaction.is_mining_reward() {
            let expected = mining_reward();
            if transaction.amount != expected {
                return Err(LedgerError::InvalidReward { expected });
            }
            return Ok(());
        }

        let balance = self.balance_of(&transaction.sender);
        if balance < transaction.amount {
            return Err(LedgerError::InsufficientBalance {
                sender: transaction.sender.clone(),
                requested: transaction.amount.clone(),
                balance,
            });
        }

        Ok(())
    }

    /// Adds a transaction to the pending pool
    ///
    /// Returns the index of the block the transaction will be minted into.
    pub fn append_transaction(&mut self, transaction: Transaction) -> Result<u64, LedgerError> {
        if let Some(capacity) = self.pending_capacity {
            if !transaction.is_mining_reward() && self.current_transactions.len() >= capacity {
                return Err(LedgerError::PendingPoolFull { capacity });
            }
        }

        self.valid_transaction(&transaction)?;
        debug!(
            "Admitted transfer of {} from {} to {}",
            transaction.amount, transaction.sender, transaction.recipient
        );
        self.current_transactions.push(transaction);

        Ok(self.next_index())
    }

    /// Mints a new block from the pending pool
    ///
    /// A mining reward for `reward_recipient` is admitted first, then every
    /// pending transaction moves into the new block. Without an explicit
    /// `previous_hash` the block links to the hash of the current last block;
    /// an empty chain therefore needs one. Without a `timestamp` the wall
    /// clock is used.
    pub fn create_block(
        &mut self,
        proof: u64,
        reward_recipient: Address,
        previous_hash: Option<BlockHash>,
        timestamp: Option<i64>,
    ) -> Result<&Block, LedgerError> {
        let previous_hash = match previous_hash {
            Some(hash) => hash,
            None => self
                .last_block()
                .map(Block::hash)
                .ok_or(LedgerError::MissingPreviousHash)?,
        };

        let reward = Transaction::mining_reward(reward_recipient);
        self.valid_transaction(&reward)?;
        self.current_transactions.push(reward);

        let block = Block::new(
            self.next_index(),
            timestamp.unwrap_or_else(|| Utc::now().timestamp_millis()),
            proof,
            previous_hash,
            std::mem::take(&mut self.current_transactions),
        );

        info!(
            "Minted block {} with {} transactions",
            block.index,
            block.transactions.len()
        );
        Ok(self.commit(block))
    }

    /// Starts the chain with a genesis block crediting `reward_recipient`
    pub fn create_genesis_block(
        &mut self,
        reward_recipient: Address,
        timestamp: Option<i64>,
    ) -> Result<&Block, LedgerError> {
        self.create_block(
            GENESIS_PROOF,
            reward_recipient,
            Some(GENESIS_PREVIOUS_HASH),
            timestamp,
        )
    }

    /// Searches a proof against the last block and mints a block with it
    ///
    /// Blocks the calling thread for the whole search.
    pub fn mine(&mut self, reward_recipient: Address) -> Result<&Block, LedgerError> {
        let last_proof = self
            .last_block()
            .map(|block| block.proof)
            .ok_or(LedgerError::MissingPreviousHash)?;
        let proof = pow::proof_of_work(last_proof);
        self.create_block(proof, reward_recipient, None, None)
    }

    /// Checks the ledger's own chain with `valid_chain`
    pub fn is_valid(&self) -> bool {
        validation::valid_chain(&self.chain)
    }

    /// Appends an already formed block and returns a reference to it
    fn commit(&mut self, block: Block) -> &Block {
        self.chain.push(block);
        &self.chain[self.chain.len() - 1]
    }

    /// Moves a transaction into the pending pool without admission checks
    pub(crate) fn push_unchecked(&mut self, transaction: Transaction) {
        self.current_transactions.push(transaction);
    }

    /// Commits a block whose transactions were replayed into the pending pool
    pub(crate) fn commit_replayed(&mut self, block: Block) {
        self.current_transactions.clear();
        self.chain.push(block);
    }

    fn next_index(&self) -> u64 {
        self.last_block().map_or(1, |block| block.index + 1)
    }
}
