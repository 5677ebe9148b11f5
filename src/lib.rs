/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! tendermint_core is a Rust implementation of the core state transition logic of the Tendermint
//! consensus protocol, as described by the pseudocode in the whitepaper
//! (https://arxiv.org/pdf/1807.04938.pdf). It offers:
//! 1. The per-height [algorithm](algorithm::protocol::Algorithm) with the whitepaper's upon-rules,
//! 2. A [message store](store::MessageStore) with network-level deduplication and per-slot
//!    equivocation detection,
//! 3. A narrow [oracle](algorithm::oracle::Oracle) seam between the two, designed for easy
//!    analysis and testing.
//!
//! Everything else a full validator needs - networking, signing, proposer election, value
//! production and validation, wall-clock timers, persistence - is the embedder's: the crate tells
//! the embedder what to broadcast, what to schedule and when a value was decided, and the embedder
//! feeds back messages and expired timeouts.

pub mod algorithm;

pub mod config;

pub mod event_bus;

pub mod events;

pub mod logging;

pub mod messages;

pub mod store;

pub mod types;

// Re-exports
pub use algorithm::{Algorithm, Oracle, Output, QuorumOracle, RoundChange, Timeout};
pub use config::{AlgorithmConfig, TimeoutSchedule};
pub use messages::{ConsensusMessage, MessageDigest, Step};
pub use store::{AddMessageError, Equivocation, MessageStore};
pub use types::basic::{Height, NodeId, Round, ValueHash};
