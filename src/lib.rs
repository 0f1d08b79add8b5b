//! A proof-of-work balance ledger.
//!
//! [`blockchain`] holds the engine: blocks, transactions, balances,
//! admission, minting, proof of work and chain validation. [`api`] wraps a
//! shared ledger in a small HTTP node.

pub mod api;
pub mod blockchain;
pub mod config;
