/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Notifications that are emitted when significant things happen in the local consensus instance.
//!
//! ## Event enum
//!
//! Significant occurrences include entering a round, broadcasting a proposal or a vote, asking the
//! embedder to schedule a timeout, skipping ahead to a later round, and deciding on a value. Each
//! corresponds to a variant of the [event enum](Event), and each variant tuple contains an inner
//! struct type with the information that summarizes the occurrence, always including a timestamp
//! taken when the event was created.
//!
//! ## Registering event handlers
//!
//! Embedders can register event handler closures with the
//! [event bus](crate::event_bus::start_event_bus), which calls them whenever the handler's
//! particular event variant happens. Default handlers that log events out are defined in
//! [logging](crate::logging).
//!
//! ## Timing
//!
//! Events are always emitted **after** the corresponding state transition has completed. For
//! example, the [start round event](StartRoundEvent) is only emitted once the algorithm's round
//! and step have been updated.

use std::sync::mpsc::Sender;
use std::time::SystemTime;

use crate::algorithm::protocol::Timeout;
use crate::messages::ConsensusMessage;
use crate::types::basic::Round;

/// Enumerates the events emitted by an [algorithm](crate::algorithm::protocol::Algorithm)
/// instance.
pub enum Event {
    StartRound(StartRoundEvent),
    Propose(ProposeEvent),
    Vote(VoteEvent),
    ScheduleTimeout(ScheduleTimeoutEvent),
    Decide(DecideEvent),
    AdvanceRound(AdvanceRoundEvent),
}

impl Event {
    /// Publishes the event on the event publisher channel, if one is defined.
    pub fn publish(self, event_publisher: &Option<Sender<Event>>) {
        if let Some(event_publisher) = event_publisher {
            let _ = event_publisher.send(self);
        }
    }
}

/// A new round was entered and the algorithm's step moved back to Propose.
pub struct StartRoundEvent {
    pub timestamp: SystemTime,
    pub round: Round,
}

/// This node is the round's proposer and emitted a proposal to be broadcast.
pub struct ProposeEvent {
    pub timestamp: SystemTime,
    pub proposal: ConsensusMessage,
}

/// The algorithm emitted a prevote or precommit to be broadcast.
pub struct VoteEvent {
    pub timestamp: SystemTime,
    pub vote: ConsensusMessage,
}

/// The algorithm asked the embedder to schedule a timeout.
pub struct ScheduleTimeoutEvent {
    pub timestamp: SystemTime,
    pub timeout: Timeout,
}

/// A precommit quorum was observed for a proposal: the height is decided.
pub struct DecideEvent {
    pub timestamp: SystemTime,
    pub proposal: ConsensusMessage,
}

/// The algorithm asked the embedder to move to a later round, either because the current round's
/// precommit timeout fired or because the failure threshold was reached in a future round.
pub struct AdvanceRoundEvent {
    pub timestamp: SystemTime,
    pub round: Round,
}
