/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Functions that log out events.
//!
//! The crate logs using the [log](https://docs.rs/log/latest/log/) crate. To get these messages
//! printed onto a terminal or to a file, set up a
//! [logging implementation](https://docs.rs/log/latest/log/#available-logging-implementations).
//!
//! ## Log message format
//!
//! Log messages are CSVs (Comma Separated Values) with at least two values. The first two values
//! are always:
//! 1. The name of the [event](crate::events) in PascalCase (defined in this module as constants).
//! 2. The time the event was emitted (as number of seconds since the Unix Epoch).
//!
//! The rest of the values differ depending on the kind of event. For example, the following
//! snippet is how a [Vote](crate::events::VoteEvent) is printed:
//!
//! ```text
//! Vote, 1701329264, s:pv  h:1   r:0   v:fNGCJyk
//! ```

use std::time::SystemTime;

use crate::events::*;

// Names of each event in PascalCase for printing:
pub const START_ROUND: &str = "StartRound";
pub const PROPOSE: &str = "Propose";
pub const VOTE: &str = "Vote";
pub const SCHEDULE_TIMEOUT: &str = "ScheduleTimeout";
pub const DECIDE: &str = "Decide";
pub const ADVANCE_ROUND: &str = "AdvanceRound";

/// Implemented by event types. Used to get a closure that logs the event.
pub trait Logger {
    /// Returns a pointer to the default logging handler for a given event type.
    fn get_logger() -> Box<dyn Fn(&Self) + Send>;
}

impl Logger for StartRoundEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |start_round_event: &StartRoundEvent| {
            log::info!(
                "{}, {}, {}",
                START_ROUND,
                secs_since_unix_epoch(start_round_event.timestamp),
                start_round_event.round
            )
        };
        Box::new(logger)
    }
}

impl Logger for ProposeEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |propose_event: &ProposeEvent| {
            log::info!(
                "{}, {}, {}",
                PROPOSE,
                secs_since_unix_epoch(propose_event.timestamp),
                propose_event.proposal
            )
        };
        Box::new(logger)
    }
}

impl Logger for VoteEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |vote_event: &VoteEvent| {
            log::info!(
                "{}, {}, {}",
                VOTE,
                secs_since_unix_epoch(vote_event.timestamp),
                vote_event.vote
            )
        };
        Box::new(logger)
    }
}

impl Logger for ScheduleTimeoutEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |schedule_timeout_event: &ScheduleTimeoutEvent| {
            log::info!(
                "{}, {}, {}, {}, {}",
                SCHEDULE_TIMEOUT,
                secs_since_unix_epoch(schedule_timeout_event.timestamp),
                schedule_timeout_event.timeout.kind.short_str(),
                schedule_timeout_event.timeout.round,
                schedule_timeout_event.timeout.delay
            )
        };
        Box::new(logger)
    }
}

impl Logger for DecideEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |decide_event: &DecideEvent| {
            log::info!(
                "{}, {}, {}, {}",
                DECIDE,
                secs_since_unix_epoch(decide_event.timestamp),
                decide_event.proposal.value,
                decide_event.proposal.round
            )
        };
        Box::new(logger)
    }
}

impl Logger for AdvanceRoundEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |advance_round_event: &AdvanceRoundEvent| {
            log::info!(
                "{}, {}, {}",
                ADVANCE_ROUND,
                secs_since_unix_epoch(advance_round_event.timestamp),
                advance_round_event.round
            )
        };
        Box::new(logger)
    }
}

fn secs_since_unix_epoch(timestamp: SystemTime) -> u64 {
    timestamp
        .duration_since(SystemTime::UNIX_EPOCH)
        .expect("Event occured before the Unix Epoch.")
        .as_secs()
}
