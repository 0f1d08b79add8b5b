use log::debug;

use super::block::Block;
use super::chain::{mining_reward, Ledger};
use super::pow;

/// Upper bound (exclusive) on the time between two consecutive blocks, in ms
pub const MAX_BLOCK_INTERVAL_MS: i64 = 2 * 60 * 60 * 1000;

/// Determines whether a candidate chain is valid
///
/// Every block after the genesis block must follow its predecessor by
/// exactly one index, link to its hash, be minted strictly later but less
/// than two hours after it, and carry a proof valid against the
/// predecessor's proof. It must also contain exactly one mining reward of
/// the right amount, and every other transaction must be affordable when the
/// block's transactions are replayed in order on top of the chain before it.
/// The genesis block itself is taken as given.
///
/// An empty candidate is not a chain and is rejected.
pub fn valid_chain(chain: &[Block]) -> bool {
    let Some(genesis) = chain.first() else {
        debug!("Rejected chain: no genesis block");
        return false;
    };

    let mut replay = Ledger::from_blocks(std::slice::from_ref(genesis));

    for pair in chain.windows(2) {
        let (previous, block) = (&pair[0], &pair[1]);

        if let Err(reason) = check_link(previous, block) {
            debug!("Rejected chain at block {}: {}", block.index, reason);
            return false;
        }

        if let Err(reason) = replay_block(&mut replay, block) {
            debug!("Rejected chain at block {}: {}", block.index, reason);
            return false;
        }
    }

    true
}

/// Checks the header-level rules linking `block` to `previous`
fn check_link(previous: &Block, block: &Block) -> Result<(), String> {
    if block.index.checked_sub(previous.index) != Some(1) {
        return Err(format!(
            "index {} does not follow {}",
            block.index, previous.index
        ));
    }

    if block.previous_hash != previous.hash() {
        return Err("previous hash does not match".to_string());
    }

    let interval = block.timestamp.saturating_sub(previous.timestamp);
    if !(0 < interval && interval < MAX_BLOCK_INTERVAL_MS) {
        return Err(format!("{interval} ms since the previous block"));
    }

    if !pow::valid_proof(previous.proof, block.proof) {
        return Err(format!(
            "proof {} is not valid against {}",
            block.proof, previous.proof
        ));
    }

    Ok(())
}

/// Replays the transactions of `block` on `replay`, then commits the block
fn replay_block(replay: &mut Ledger, block: &Block) -> Result<(), String> {
    let mut rewarded = false;

    for transaction in &block.transactions {
        if transaction.is_mining_reward() {
            if rewarded {
                return Err("more than one mining reward".to_string());
            }
            if transaction.amount != mining_reward() {
                return Err(format!("mining reward of {}", transaction.amount));
            }
            rewarded = true;
        } else {
            replay
                .valid_transaction(transaction)
                .map_err(|e| e.to_string())?;
        }
        replay.push_unchecked(transaction.clone());
    }

    if !rewarded {
        return Err("no mining reward".to_string());
    }

    replay.commit_replayed(block.clone());
    Ok(())
}
