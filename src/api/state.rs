use log::info;
use parking_lot::RwLock;
use uuid::Uuid;

use std::time::Duration;

use crate::blockchain::{Address, Ledger, LedgerError};

use super::nodes::NodeRegistry;

/// State shared by every request handler of a node
///
/// All ledger mutations go through the single writer lock so that a balance
/// read and the admission decision based on it cannot interleave with
/// another append.
#[derive(Debug)]
pub struct AppState {
    /// The ledger served by this node
    pub ledger: RwLock<Ledger>,

    /// Peer node addresses registered with this node
    pub nodes: NodeRegistry,

    /// Identifier of this node, credited with every mining reward it earns
    pub node_id: Address,

    /// How long a mining request may search for a proof
    pub mining_timeout: Duration,
}

impl AppState {
    pub fn new(ledger: Ledger, node_id: Address, mining_timeout: Duration) -> Self {
        AppState {
            ledger: RwLock::new(ledger),
            nodes: NodeRegistry::new(),
            node_id,
            mining_timeout,
        }
    }

    /// Starts a node whose ledger opens with a genesis block crediting `node_id`
    pub fn with_genesis(
        mut ledger: Ledger,
        node_id: Address,
        mining_timeout: Duration,
    ) -> Result<Self, LedgerError> {
        let genesis = ledger.create_genesis_block(node_id.clone(), None)?;
        info!("Created genesis block at {}", genesis.timestamp);
        Ok(AppState::new(ledger, node_id, mining_timeout))
    }
}

/// Generates a fresh node identifier: the 16 bytes of a random UUID
pub fn generate_node_id() -> Address {
    Address::new(Uuid::new_v4().as_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::Amount;

    #[test]
    fn test_generate_node_id() {
        let first = generate_node_id();
        let second = generate_node_id();

        assert_eq!(first.as_bytes().len(), 16);
        assert_eq!(first.to_hex().len(), 32);
        assert_ne!(first, second);
    }

    #[test]
    fn test_with_genesis_credits_node() {
        let node_id = generate_node_id();
        let state =
            AppState::with_genesis(Ledger::new(), node_id.clone(), Duration::from_secs(1)).unwrap();

        let ledger = state.ledger.read();
        assert_eq!(ledger.chain().len(), 1);
        assert_eq!(ledger.balance_of(&node_id), Amount::one());
    }
}
