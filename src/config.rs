/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Configuration of an [algorithm](crate::algorithm::protocol::Algorithm) instance.

use crate::types::basic::{NodeId, Round};

/// Immutable parameters that define the behavior of one algorithm instance and never change over
/// its lifetime.
#[derive(Clone, Copy, Debug)]
pub struct AlgorithmConfig {
    /// The identity under which this node's outgoing messages are emitted.
    pub node_id: NodeId,
    /// How long the embedder is asked to wait before firing each scheduled timeout.
    pub timeouts: TimeoutSchedule,
}

impl AlgorithmConfig {
    /// Configuration with the default timeout schedule.
    pub fn new(node_id: NodeId) -> AlgorithmConfig {
        AlgorithmConfig {
            node_id,
            timeouts: TimeoutSchedule::default(),
        }
    }
}

/// Timeout delays grow linearly with the round number, so that rounds get progressively more
/// patient as a height fails to decide. The unit of `base` and `increment` is whatever unit the
/// embedder's timer service interprets delays in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeoutSchedule {
    pub base: u64,
    pub increment: u64,
}

impl TimeoutSchedule {
    /// The delay for a timeout scheduled in the given round: `base + round * increment`.
    pub fn delay(&self, round: Round) -> u64 {
        self.base + round.int() as u64 * self.increment
    }
}

impl Default for TimeoutSchedule {
    fn default() -> TimeoutSchedule {
        TimeoutSchedule {
            base: 1,
            increment: 1,
        }
    }
}
