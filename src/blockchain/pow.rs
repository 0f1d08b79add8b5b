use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;

use super::crypto::sha256_hex;

/// Number of leading `'0'` hex characters a proof hash must start with
pub const DIFFICULTY: usize = 4;

/// How many candidates are tried between two looks at the cancel flag
const CANCEL_CHECK_INTERVAL: u64 = 1024;

/// Validates a proof
///
/// The proof is valid when the hex SHA-256 of the decimal text of
/// `last_proof` immediately followed by `proof` starts with `DIFFICULTY`
/// zeros.
pub fn valid_proof(last_proof: u64, proof: u64) -> bool {
    let guess = format!("{last_proof}{proof}");
    sha256_hex(guess.as_bytes())
        .bytes()
        .take(DIFFICULTY)
        .all(|c| c == b'0')
}

/// Finds the smallest proof that is valid against `last_proof`
///
/// Blocks until a proof is found. Use `proof_of_work_cancellable` when the
/// caller needs to give up.
pub fn proof_of_work(last_proof: u64) -> u64 {
    let mut proof = 0;
    while !valid_proof(last_proof, proof) {
        proof += 1;
    }
    proof
}

/// Runs the same search as `proof_of_work`, stopping early once `cancel` is set
///
/// Returns `None` when the search was cancelled before a proof was found.
pub fn proof_of_work_cancellable(last_proof: u64, cancel: &AtomicBool) -> Option<u64> {
    let mut proof = 0;
    loop {
        if proof % CANCEL_CHECK_INTERVAL == 0 && cancel.load(Ordering::Relaxed) {
            debug!("Proof search on {} cancelled at candidate {}", last_proof, proof);
            return None;
        }
        if valid_proof(last_proof, proof) {
            return Some(proof);
        }
        proof += 1;
    }
}
