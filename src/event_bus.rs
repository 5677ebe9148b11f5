/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Thread that receives events emitted by an [algorithm](crate::algorithm::protocol::Algorithm)
//! instance and passes them to event handlers.
//!
//! When the thread receives a message containing an [event](crate::events::Event), it triggers the
//! execution of all handlers defined for the contained event type, where the handlers for each
//! event type are stored in [`EventHandlers`].
//!
//! ## Event Handlers
//!
//! An instance of `EventHandlers` contains, per event type:
//! 1. An optional handler provided by the embedder, and
//! 2. If logging is enabled, the default logging handler defined in
//!    [logging](crate::logging).

use std::{
    sync::mpsc::{Receiver, TryRecvError},
    thread,
    thread::JoinHandle,
};

use crate::{events::*, logging::Logger};

/// Pointer to a handler closure, parametrised by the argument (for our use case, event) type.
pub type HandlerPtr<T> = Box<dyn Fn(&T) + Send>;

/// Stores the two optional handlers enabled for an event type that implements the [`Logger`]
/// trait, namely one logging handler, defined in [`logging`](crate::logging), and one handler
/// defined by the embedder.
pub struct HandlerPair<T: Logger> {
    pub user_defined_handler: Option<HandlerPtr<T>>,
    pub logging_handler: Option<HandlerPtr<T>>,
}

impl<T: Logger> HandlerPair<T> {
    // Checks if no event handlers are defined for this event.
    fn is_empty(&self) -> bool {
        self.user_defined_handler.is_none() && self.logging_handler.is_none()
    }

    /// Creates a new `HandlerPair` with the user-defined handler, and the default logging handler
    /// if logging is enabled.
    pub fn new(log: bool, user_defined_handler: Option<HandlerPtr<T>>) -> HandlerPair<T> {
        HandlerPair {
            user_defined_handler,
            logging_handler: if log { Some(T::get_logger()) } else { None },
        }
    }
}

/// Stores the [`HandlerPair`] of user-defined and optional logging handlers for each pre-defined
/// event type from [events](crate::events).
pub struct EventHandlers {
    pub start_round_handlers: HandlerPair<StartRoundEvent>,
    pub propose_handlers: HandlerPair<ProposeEvent>,
    pub vote_handlers: HandlerPair<VoteEvent>,
    pub schedule_timeout_handlers: HandlerPair<ScheduleTimeoutEvent>,
    pub decide_handlers: HandlerPair<DecideEvent>,
    pub advance_round_handlers: HandlerPair<AdvanceRoundEvent>,
}

impl EventHandlers {
    /// Creates the [handler pairs](HandlerPair) for all pre-defined event types from
    /// [events](crate::events) given the user-defined handlers, and information on whether
    /// logging is enabled.
    pub fn new(
        log: bool,
        start_round_handler: Option<HandlerPtr<StartRoundEvent>>,
        propose_handler: Option<HandlerPtr<ProposeEvent>>,
        vote_handler: Option<HandlerPtr<VoteEvent>>,
        schedule_timeout_handler: Option<HandlerPtr<ScheduleTimeoutEvent>>,
        decide_handler: Option<HandlerPtr<DecideEvent>>,
        advance_round_handler: Option<HandlerPtr<AdvanceRoundEvent>>,
    ) -> EventHandlers {
        EventHandlers {
            start_round_handlers: HandlerPair::new(log, start_round_handler),
            propose_handlers: HandlerPair::new(log, propose_handler),
            vote_handlers: HandlerPair::new(log, vote_handler),
            schedule_timeout_handlers: HandlerPair::new(log, schedule_timeout_handler),
            decide_handlers: HandlerPair::new(log, decide_handler),
            advance_round_handlers: HandlerPair::new(log, advance_round_handler),
        }
    }

    /// Checks if no handlers are defined, i.e., neither user-defined handlers were defined nor
    /// logging is enabled. When this holds there is no point starting the event bus thread.
    pub fn is_empty(&self) -> bool {
        self.start_round_handlers.is_empty()
            && self.propose_handlers.is_empty()
            && self.vote_handlers.is_empty()
            && self.schedule_timeout_handlers.is_empty()
            && self.decide_handlers.is_empty()
            && self.advance_round_handlers.is_empty()
    }

    /// Triggers the execution of each of the two handlers - the user-defined and the logging
    /// handler, if defined - for a given event type from [events](crate::events).
    pub fn fire_handlers(&self, event: Event) {
        match event {
            Event::StartRound(start_round_event) => {
                self.start_round_handlers
                    .user_defined_handler
                    .iter()
                    .for_each(|handler| handler(&start_round_event));
                self.start_round_handlers
                    .logging_handler
                    .iter()
                    .for_each(|handler| handler(&start_round_event));
            }
            Event::Propose(propose_event) => {
                self.propose_handlers
                    .user_defined_handler
                    .iter()
                    .for_each(|handler| handler(&propose_event));
                self.propose_handlers
                    .logging_handler
                    .iter()
                    .for_each(|handler| handler(&propose_event));
            }
            Event::Vote(vote_event) => {
                self.vote_handlers
                    .user_defined_handler
                    .iter()
                    .for_each(|handler| handler(&vote_event));
                self.vote_handlers
                    .logging_handler
                    .iter()
                    .for_each(|handler| handler(&vote_event));
            }
            Event::ScheduleTimeout(schedule_timeout_event) => {
                self.schedule_timeout_handlers
                    .user_defined_handler
                    .iter()
                    .for_each(|handler| handler(&schedule_timeout_event));
                self.schedule_timeout_handlers
                    .logging_handler
                    .iter()
                    .for_each(|handler| handler(&schedule_timeout_event));
            }
            Event::Decide(decide_event) => {
                self.decide_handlers
                    .user_defined_handler
                    .iter()
                    .for_each(|handler| handler(&decide_event));
                self.decide_handlers
                    .logging_handler
                    .iter()
                    .for_each(|handler| handler(&decide_event));
            }
            Event::AdvanceRound(advance_round_event) => {
                self.advance_round_handlers
                    .user_defined_handler
                    .iter()
                    .for_each(|handler| handler(&advance_round_event));
                self.advance_round_handlers
                    .logging_handler
                    .iter()
                    .for_each(|handler| handler(&advance_round_event));
            }
        }
    }
}

/// Starts the event bus thread, which runs an infinite loop until a shutdown signal is received
/// from the parent thread. In each iteration of the loop, the thread checks if it received any
/// event notifications, and if so, then triggers the execution of the handlers defined for the
/// event.
pub fn start_event_bus(
    event_handlers: EventHandlers,
    event_subscriber: Receiver<Event>,
    shutdown_signal: Receiver<()>,
) -> JoinHandle<()> {
    thread::spawn(move || loop {
        match shutdown_signal.try_recv() {
            Ok(()) => return,
            Err(TryRecvError::Empty) => (),
            Err(TryRecvError::Disconnected) => {
                panic!("event_bus thread disconnected from main thread")
            }
        }

        match event_subscriber.try_recv() {
            Ok(event) => event_handlers.fire_handlers(event),
            Err(TryRecvError::Empty) => (),
            Err(TryRecvError::Disconnected) => return,
        }
    })
}
