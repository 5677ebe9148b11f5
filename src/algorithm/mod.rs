/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Implementation of the core state transition logic of the Tendermint consensus protocol, as
//! described by the pseudocode in the whitepaper (https://arxiv.org/pdf/1807.04938.pdf).
//!
//! The [algorithm](protocol::Algorithm) is a pure, deterministic state machine. Everything it
//! needs to know about the outside world it learns through the [oracle](oracle::Oracle) it is
//! constructed with, and everything it wants the outside world to do it expresses as an
//! [output](protocol::Output) for the embedder to act on: messages to broadcast, timeouts to
//! schedule, and round changes to perform.

pub mod oracle;

pub mod protocol;

pub use oracle::{Oracle, QuorumOracle};
pub use protocol::{Algorithm, Output, RoundChange, Timeout};
