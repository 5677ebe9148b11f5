/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The per-height consensus state machine: the state transitions defined by the Tendermint
//! whitepaper.
//!
//! [`Algorithm`] has two main entry points: [`start_round`](Algorithm::start_round), called at the
//! beginning of each round, and [`receive_message`](Algorithm::receive_message), called with each
//! message received from the network, which drives subsequent state changes. A third entry point,
//! [`on_timeout`](Algorithm::on_timeout), is called by the embedder's timer service when a
//! previously requested [`Timeout`] expires.
//!
//! References to line numbers in this module refer to the line numbers of the whitepaper
//! pseudocode (https://arxiv.org/pdf/1807.04938.pdf).

use std::sync::mpsc::Sender;
use std::time::SystemTime;

use crate::algorithm::oracle::Oracle;
use crate::config::AlgorithmConfig;
use crate::events::{
    AdvanceRoundEvent, DecideEvent, Event, ProposeEvent, ScheduleTimeoutEvent, StartRoundEvent,
    VoteEvent,
};
use crate::messages::{ConsensusMessage, Step};
use crate::types::basic::{Height, Round, ValueHash};

/// Asks the embedder to schedule a call to [`Algorithm::on_timeout`] after `delay`. The height,
/// round and kind are carried along so that the algorithm can recognize a timeout that is no
/// longer relevant when it fires: timeouts are only honored if they trigger in the same height,
/// round and step as when they were scheduled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timeout {
    pub kind: Step,
    pub height: Height,
    pub round: Round,
    pub delay: u64,
}

/// Asks the embedder to initiate a round change by calling [`Algorithm::start_round`] with the
/// enclosed round. If `decision` is set, a decision has been reached and it contains the proposal
/// that was decided on; the embedder should construct the next height's instance instead, and
/// `round` is the starting round (0) of that height.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundChange {
    pub round: Round,
    pub decision: Option<ConsensusMessage>,
}

/// The outcome of one state transition. Never carries more than one payload.
///
/// - [`Message`](Output::Message) should be broadcast to the rest of the network, including back
///   to this node's own store, since a node counts its own votes. This can happen asynchronously.
/// - [`Timeout`](Output::Timeout) should be scheduled to call [`Algorithm::on_timeout`] after its
///   delay. This can happen asynchronously.
/// - [`RoundChange`](Output::RoundChange) must be acted on by the calling thread before any other
///   call to [`Algorithm::receive_message`]: the algorithm assumes its round always matches the
///   round it last transitioned into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Output {
    None,
    Message(ConsensusMessage),
    Timeout(Timeout),
    RoundChange(RoundChange),
}

/// An instance of the consensus state machine. One instance drives one node through one height;
/// on a decision the embedder constructs a fresh instance for the next height.
///
/// The instance is a single-owner, single-threaded object: the embedder serializes calls to the
/// three entry points. No call blocks or suspends.
pub struct Algorithm<O: Oracle> {
    config: AlgorithmConfig,
    oracle: O,
    round: Round,
    step: Step,
    locked_round: Round,
    locked_value: ValueHash,
    valid_round: Round,
    valid_value: ValueHash,
    line34_executed: bool,
    line36_executed: bool,
    line47_executed: bool,
    event_publisher: Option<Sender<Event>>,
}

impl<O: Oracle> Algorithm<O> {
    /// A fresh instance for the oracle's height. The round starts at [`Round::NIL`] so that the
    /// first [`start_round`](Algorithm::start_round) satisfies the strictly-increasing-round
    /// contract.
    pub fn new(
        config: AlgorithmConfig,
        oracle: O,
        event_publisher: Option<Sender<Event>>,
    ) -> Algorithm<O> {
        Algorithm {
            config,
            oracle,
            round: Round::NIL,
            step: Step::Propose,
            locked_round: Round::NIL,
            locked_value: ValueHash::NIL,
            valid_round: Round::NIL,
            valid_value: ValueHash::NIL,
            line34_executed: false,
            line36_executed: false,
            line47_executed: false,
            event_publisher,
        }
    }

    pub fn round(&self) -> Round {
        self.round
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }

    /// Enters the given round and clears the first-time flags. If this node is the round's
    /// proposer (indicated by a non-nil `proposal_value`; proposer election is the embedder's
    /// job), returns a proposal to be broadcast, otherwise returns a Propose timeout to be
    /// scheduled.
    ///
    /// # Panics
    ///
    /// Panics unless `round` is greater than the current round. Entering a round twice would
    /// re-clear the first-time flags and cause duplicate votes.
    pub fn start_round(&mut self, proposal_value: ValueHash, round: Round) -> Output {
        if round <= self.round {
            panic!(
                "new round must be greater than the current round. current round: {}, new round: {}",
                self.round, round
            );
        }

        self.line34_executed = false;
        self.line36_executed = false;
        self.line47_executed = false;

        self.round = round;
        self.step = Step::Propose;
        Event::StartRound(StartRoundEvent {
            timestamp: SystemTime::now(),
            round,
        })
        .publish(&self.event_publisher);

        if !proposal_value.is_nil() {
            // Line 15: if we saw a prevote quorum for a value in an earlier round, that value must
            // be re-proposed instead of a fresh one.
            let value = if !self.valid_value.is_nil() {
                self.valid_value
            } else {
                proposal_value
            };
            let proposal = self.message(Step::Propose, value);
            Event::Propose(ProposeEvent {
                timestamp: SystemTime::now(),
                proposal,
            })
            .publish(&self.event_publisher);
            Output::Message(proposal)
        } else {
            self.schedule_timeout(Step::Propose)
        }
    }

    /// Processes one consensus message and returns the resulting output, which is
    /// [`Output::None`] when no upon-rule fired.
    ///
    /// The caller must already have verified that the message's height equals the oracle's
    /// height, that proposals come from the round's elected proposer, and must have inserted the
    /// message into the store, so that the oracle's answers account for it.
    pub fn receive_message(&mut self, msg: &ConsensusMessage) -> Output {
        let r = self.round;
        let s = self.step;
        let t = msg.msg_type;

        // Look up the matching proposal; when `msg` is itself a proposal that the caller stored,
        // the matching proposal is `msg`.
        let p = self.oracle.matching_proposal(msg.round, &msg.value);

        // The upon-rules are evaluated in a fixed order and the first whose condition holds
        // returns. Rules whose outcome supersedes that of other rules come first: for a given
        // step, the rules that broadcast a vote for a value or decide precede the rules that
        // schedule timeouts.

        // Line 22
        if t == Step::Propose && msg.round == r && msg.valid_round.is_nil() && s == Step::Propose {
            self.step = Step::Prevote;
            let vote = if self.oracle.valid(&msg.value)
                && (self.locked_round.is_nil() || self.locked_value == msg.value)
            {
                msg.value
            } else {
                ValueHash::NIL
            };
            return self.broadcast_vote(Step::Prevote, vote);
        }

        // Line 28
        if let Some(p) = p {
            if matches!(t, Step::Propose | Step::Prevote)
                && p.round == r
                && s == Step::Propose
                && p.valid_round.int() >= 0
                && p.valid_round < r
                && self.oracle.prevote_qthresh(p.valid_round, Some(&p.value))
            {
                self.step = Step::Prevote;
                let vote = if self.oracle.valid(&p.value)
                    && (self.locked_round <= p.valid_round || self.locked_value == p.value)
                {
                    p.value
                } else {
                    ValueHash::NIL
                };
                return self.broadcast_vote(Step::Prevote, vote);
            }
        }

        // Line 36
        if let Some(p) = p {
            if matches!(t, Step::Propose | Step::Prevote)
                && p.round == r
                && self.oracle.prevote_qthresh(r, Some(&p.value))
                && self.oracle.valid(&p.value)
                && s >= Step::Prevote
                && !self.line36_executed
            {
                self.line36_executed = true;
                if s == Step::Prevote {
                    self.locked_value = p.value;
                    self.locked_round = r;
                    self.step = Step::Precommit;
                }
                self.valid_value = p.value;
                self.valid_round = r;
                return self.broadcast_vote(Step::Precommit, p.value);
            }
        }

        // Line 44
        if t == Step::Prevote
            && msg.round == r
            && self.oracle.prevote_qthresh(r, Some(&ValueHash::NIL))
            && s == Step::Prevote
        {
            self.step = Step::Precommit;
            return self.broadcast_vote(Step::Precommit, ValueHash::NIL);
        }

        // Line 34
        if t == Step::Prevote
            && msg.round == r
            && self.oracle.prevote_qthresh(r, None)
            && s == Step::Prevote
            && !self.line34_executed
        {
            self.line34_executed = true;
            return self.schedule_timeout(Step::Prevote);
        }

        // Line 49
        if let Some(p) = p {
            if matches!(t, Step::Propose | Step::Precommit)
                && self.oracle.precommit_qthresh(p.round, Some(&p.value))
            {
                if self.oracle.valid(&p.value) {
                    self.locked_round = Round::NIL;
                    self.locked_value = ValueHash::NIL;
                    self.valid_round = Round::NIL;
                    self.valid_value = ValueHash::NIL;
                }
                Event::Decide(DecideEvent {
                    timestamp: SystemTime::now(),
                    proposal: p,
                })
                .publish(&self.event_publisher);
                // Round 0 is the starting round of the next height.
                return Output::RoundChange(RoundChange {
                    round: Round::new(0),
                    decision: Some(p),
                });
            }
        }

        // Line 47
        if t == Step::Precommit
            && msg.round == r
            && self.oracle.precommit_qthresh(r, None)
            && !self.line47_executed
        {
            self.line47_executed = true;
            return self.schedule_timeout(Step::Precommit);
        }

        // Line 55
        if msg.round > r && self.oracle.f_thresh(msg.round) {
            Event::AdvanceRound(AdvanceRoundEvent {
                timestamp: SystemTime::now(),
                round: msg.round,
            })
            .publish(&self.event_publisher);
            return Output::RoundChange(RoundChange {
                round: msg.round,
                decision: None,
            });
        }

        Output::None
    }

    /// Handles an expired timeout. A timeout that does not match the current height, round and
    /// step is stale and is discarded without any state change.
    pub fn on_timeout(&mut self, timeout: &Timeout) -> Output {
        if timeout.height != self.oracle.height()
            || timeout.round != self.round
            || timeout.kind != self.step
        {
            return Output::None;
        }

        match timeout.kind {
            // Line 57
            Step::Propose => {
                self.step = Step::Prevote;
                self.broadcast_vote(Step::Prevote, ValueHash::NIL)
            }
            // Line 61
            Step::Prevote => {
                self.step = Step::Precommit;
                self.broadcast_vote(Step::Precommit, ValueHash::NIL)
            }
            // Line 65
            Step::Precommit => {
                let round = self.round.next();
                Event::AdvanceRound(AdvanceRoundEvent {
                    timestamp: SystemTime::now(),
                    round,
                })
                .publish(&self.event_publisher);
                Output::RoundChange(RoundChange {
                    round,
                    decision: None,
                })
            }
        }
    }

    fn message(&self, msg_type: Step, value: ValueHash) -> ConsensusMessage {
        ConsensusMessage {
            sender: self.config.node_id,
            msg_type,
            height: self.oracle.height(),
            round: self.round,
            value,
            // valid_round only has meaning for proposals; votes carry the sentinel so their wire
            // encoding is canonical.
            valid_round: if msg_type == Step::Propose {
                self.valid_round
            } else {
                Round::NIL
            },
        }
    }

    fn broadcast_vote(&self, msg_type: Step, value: ValueHash) -> Output {
        let vote = self.message(msg_type, value);
        Event::Vote(VoteEvent {
            timestamp: SystemTime::now(),
            vote,
        })
        .publish(&self.event_publisher);
        Output::Message(vote)
    }

    fn schedule_timeout(&self, kind: Step) -> Output {
        if self.round.int() < 0 {
            panic!(
                "no timeout can be scheduled before the first round has started. current round: {}",
                self.round
            );
        }
        let timeout = Timeout {
            kind,
            height: self.oracle.height(),
            round: self.round,
            delay: self.config.timeouts.delay(self.round),
        };
        Event::ScheduleTimeout(ScheduleTimeoutEvent {
            timestamp: SystemTime::now(),
            timeout,
        })
        .publish(&self.event_publisher);
        Output::Timeout(timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::basic::NodeId;

    /// A scripted oracle: every predicate answers from a fixed table, so each test can state
    /// exactly which quorums and proposals exist without going through a store.
    #[derive(Default)]
    struct MockOracle {
        height: u64,
        valid: Vec<ValueHash>,
        proposals: Vec<ConsensusMessage>,
        prevote_quorums: Vec<(Round, Option<ValueHash>)>,
        precommit_quorums: Vec<(Round, Option<ValueHash>)>,
        failure_rounds: Vec<Round>,
    }

    impl Oracle for MockOracle {
        fn valid(&self, value: &ValueHash) -> bool {
            self.valid.contains(value)
        }

        fn matching_proposal(&self, round: Round, value: &ValueHash) -> Option<ConsensusMessage> {
            self.proposals
                .iter()
                .find(|p| p.round == round && p.value == *value)
                .copied()
        }

        fn prevote_qthresh(&self, round: Round, value: Option<&ValueHash>) -> bool {
            self.prevote_quorums
                .iter()
                .any(|(r, v)| *r == round && v.as_ref() == value)
        }

        fn precommit_qthresh(&self, round: Round, value: Option<&ValueHash>) -> bool {
            self.precommit_quorums
                .iter()
                .any(|(r, v)| *r == round && v.as_ref() == value)
        }

        fn f_thresh(&self, round: Round) -> bool {
            self.failure_rounds.contains(&round)
        }

        fn height(&self) -> Height {
            Height::new(self.height)
        }
    }

    fn node(byte: u8) -> NodeId {
        NodeId::new([byte; 20])
    }

    fn value(byte: u8) -> ValueHash {
        ValueHash::new([byte; 32])
    }

    fn algorithm(oracle: MockOracle) -> Algorithm<MockOracle> {
        Algorithm::new(AlgorithmConfig::new(node(0)), oracle, None)
    }

    fn proposal(round: Round, value: ValueHash, valid_round: Round) -> ConsensusMessage {
        ConsensusMessage {
            sender: node(9),
            msg_type: Step::Propose,
            height: Height::new(1),
            round,
            value,
            valid_round,
        }
    }

    fn prevote(sender: NodeId, round: Round, value: ValueHash) -> ConsensusMessage {
        ConsensusMessage {
            sender,
            msg_type: Step::Prevote,
            height: Height::new(1),
            round,
            value,
            valid_round: Round::NIL,
        }
    }

    fn precommit(sender: NodeId, round: Round, value: ValueHash) -> ConsensusMessage {
        ConsensusMessage {
            sender,
            msg_type: Step::Precommit,
            height: Height::new(1),
            round,
            value,
            valid_round: Round::NIL,
        }
    }

    #[test]
    fn start_round_as_proposer() {
        let mut algo = algorithm(MockOracle {
            height: 1,
            ..MockOracle::default()
        });
        let v = value(1);

        let out = algo.start_round(v, Round::new(0));

        let expected = ConsensusMessage {
            sender: node(0),
            msg_type: Step::Propose,
            height: Height::new(1),
            round: Round::new(0),
            value: v,
            valid_round: Round::NIL,
        };
        assert_eq!(out, Output::Message(expected));
        assert_eq!(algo.step(), Step::Propose);
    }

    #[test]
    fn start_round_as_proposer_reproposes_valid_value() {
        let mut algo = algorithm(MockOracle {
            height: 1,
            ..MockOracle::default()
        });
        algo.valid_value = value(2);

        let out = algo.start_round(value(1), Round::new(0));

        match out {
            Output::Message(proposal) => {
                assert_eq!(proposal.value, value(2));
                assert_eq!(proposal.valid_round, Round::NIL);
            }
            other => panic!("expected a proposal, got {:?}", other),
        }
    }

    #[test]
    fn start_round_as_non_proposer() {
        let mut algo = algorithm(MockOracle {
            height: 1,
            ..MockOracle::default()
        });

        let out = algo.start_round(ValueHash::NIL, Round::new(0));

        assert_eq!(
            out,
            Output::Timeout(Timeout {
                kind: Step::Propose,
                height: Height::new(1),
                round: Round::new(0),
                delay: 1,
            })
        );
    }

    #[test]
    #[should_panic(expected = "new round must be greater")]
    fn start_round_rejects_non_increasing_rounds() {
        let mut algo = algorithm(MockOracle::default());
        algo.start_round(ValueHash::NIL, Round::new(3));
        algo.start_round(ValueHash::NIL, Round::new(3));
    }

    #[test]
    fn timeout_delay_grows_with_the_round() {
        let mut algo = algorithm(MockOracle::default());

        match algo.start_round(ValueHash::NIL, Round::new(4)) {
            Output::Timeout(timeout) => assert_eq!(timeout.delay, 5),
            other => panic!("expected a timeout, got {:?}", other),
        }
    }

    #[test]
    fn propose_timeout_prevotes_nil() {
        let oracle = MockOracle {
            height: 1,
            ..MockOracle::default()
        };
        let mut algo = algorithm(oracle);
        let timeout = Timeout {
            kind: Step::Propose,
            height: Height::new(1),
            round: algo.round(),
            delay: 1,
        };

        let out = algo.on_timeout(&timeout);

        assert_eq!(
            out,
            Output::Message(prevote(node(0), Round::NIL, ValueHash::NIL))
        );
        assert_eq!(algo.step(), Step::Prevote);
    }

    #[test]
    fn prevote_timeout_precommits_nil() {
        let mut algo = algorithm(MockOracle {
            height: 1,
            ..MockOracle::default()
        });
        algo.step = Step::Prevote;
        let timeout = Timeout {
            kind: Step::Prevote,
            height: Height::new(1),
            round: algo.round(),
            delay: 1,
        };

        let out = algo.on_timeout(&timeout);

        assert_eq!(
            out,
            Output::Message(precommit(node(0), Round::NIL, ValueHash::NIL))
        );
        assert_eq!(algo.step(), Step::Precommit);
    }

    #[test]
    fn precommit_timeout_advances_the_round() {
        let mut algo = algorithm(MockOracle {
            height: 1,
            ..MockOracle::default()
        });
        algo.step = Step::Precommit;
        let timeout = Timeout {
            kind: Step::Precommit,
            height: Height::new(1),
            round: algo.round(),
            delay: 1,
        };

        let out = algo.on_timeout(&timeout);

        assert_eq!(
            out,
            Output::RoundChange(RoundChange {
                round: algo.round().next(),
                decision: None,
            })
        );
    }

    #[test]
    fn stale_timeouts_are_discarded() {
        let mut algo = algorithm(MockOracle {
            height: 1,
            ..MockOracle::default()
        });
        algo.start_round(ValueHash::NIL, Round::new(0));

        // Wrong step: the algorithm is at Propose.
        let wrong_step = Timeout {
            kind: Step::Prevote,
            height: Height::new(1),
            round: Round::new(0),
            delay: 1,
        };
        assert_eq!(algo.on_timeout(&wrong_step), Output::None);

        // Wrong round.
        let wrong_round = Timeout {
            kind: Step::Propose,
            height: Height::new(1),
            round: Round::new(1),
            delay: 1,
        };
        assert_eq!(algo.on_timeout(&wrong_round), Output::None);

        // Wrong height.
        let wrong_height = Timeout {
            kind: Step::Propose,
            height: Height::new(2),
            round: Round::new(0),
            delay: 1,
        };
        assert_eq!(algo.on_timeout(&wrong_height), Output::None);

        assert_eq!(algo.step(), Step::Propose);
    }

    #[test]
    fn new_proposal_is_prevoted_when_unlocked() {
        let v = value(1);
        let mut algo = algorithm(MockOracle {
            height: 1,
            valid: vec![v],
            ..MockOracle::default()
        });
        algo.start_round(ValueHash::NIL, Round::new(0));

        let out = algo.receive_message(&proposal(Round::new(0), v, Round::NIL));

        assert_eq!(out, Output::Message(prevote(node(0), Round::new(0), v)));
        assert_eq!(algo.step(), Step::Prevote);
    }

    #[test]
    fn lock_blocks_a_conflicting_proposal() {
        let v_new = value(2);
        let mut algo = algorithm(MockOracle {
            height: 1,
            valid: vec![v_new],
            ..MockOracle::default()
        });
        algo.start_round(ValueHash::NIL, Round::new(0));
        algo.start_round(ValueHash::NIL, Round::new(1));
        algo.locked_round = Round::new(0);
        algo.locked_value = value(1);

        let out = algo.receive_message(&proposal(Round::new(1), v_new, Round::NIL));

        assert_eq!(
            out,
            Output::Message(prevote(node(0), Round::new(1), ValueHash::NIL))
        );
    }

    #[test]
    fn lock_matches_the_new_proposal() {
        let v_new = value(2);
        let mut algo = algorithm(MockOracle {
            height: 1,
            valid: vec![v_new],
            ..MockOracle::default()
        });
        algo.start_round(ValueHash::NIL, Round::new(0));
        algo.start_round(ValueHash::NIL, Round::new(1));
        algo.locked_round = Round::new(0);
        algo.locked_value = v_new;

        let out = algo.receive_message(&proposal(Round::new(1), v_new, Round::NIL));

        assert_eq!(out, Output::Message(prevote(node(0), Round::new(1), v_new)));
    }

    #[test]
    fn invalid_proposal_is_prevoted_nil() {
        // The proposal's value was never marked valid.
        let mut algo = algorithm(MockOracle {
            height: 1,
            ..MockOracle::default()
        });
        algo.start_round(ValueHash::NIL, Round::new(0));

        let out = algo.receive_message(&proposal(Round::new(0), value(1), Round::NIL));

        assert_eq!(
            out,
            Output::Message(prevote(node(0), Round::new(0), ValueHash::NIL))
        );
    }

    #[test]
    fn proposal_with_earlier_valid_round_is_prevoted() {
        let v = value(1);
        let p = proposal(Round::new(1), v, Round::new(0));
        let mut algo = algorithm(MockOracle {
            height: 1,
            valid: vec![v],
            proposals: vec![p],
            prevote_quorums: vec![(Round::new(0), Some(v))],
            ..MockOracle::default()
        });
        algo.start_round(ValueHash::NIL, Round::new(0));
        algo.start_round(ValueHash::NIL, Round::new(1));

        let out = algo.receive_message(&p);

        assert_eq!(out, Output::Message(prevote(node(0), Round::new(1), v)));
        assert_eq!(algo.step(), Step::Prevote);
    }

    #[test]
    fn proposal_with_earlier_valid_round_blocked_by_later_lock() {
        let v = value(1);
        let p = proposal(Round::new(2), v, Round::new(0));
        let mut algo = algorithm(MockOracle {
            height: 1,
            valid: vec![v],
            proposals: vec![p],
            prevote_quorums: vec![(Round::new(0), Some(v))],
            ..MockOracle::default()
        });
        algo.start_round(ValueHash::NIL, Round::new(0));
        algo.start_round(ValueHash::NIL, Round::new(2));
        // Locked on a different value in a round later than the proposal's valid round.
        algo.locked_round = Round::new(1);
        algo.locked_value = value(3);

        let out = algo.receive_message(&p);

        assert_eq!(
            out,
            Output::Message(prevote(node(0), Round::new(2), ValueHash::NIL))
        );
    }

    #[test]
    fn prevote_quorum_for_proposal_locks_and_precommits() {
        let v = value(1);
        let p = proposal(Round::new(0), v, Round::NIL);
        let mut algo = algorithm(MockOracle {
            height: 1,
            valid: vec![v],
            proposals: vec![p],
            prevote_quorums: vec![(Round::new(0), Some(v))],
            ..MockOracle::default()
        });
        algo.start_round(ValueHash::NIL, Round::new(0));
        algo.step = Step::Prevote;

        let out = algo.receive_message(&prevote(node(1), Round::new(0), v));

        assert_eq!(out, Output::Message(precommit(node(0), Round::new(0), v)));
        assert_eq!(algo.step(), Step::Precommit);
        assert_eq!(algo.locked_round, Round::new(0));
        assert_eq!(algo.locked_value, v);
        assert_eq!(algo.valid_round, Round::new(0));
        assert_eq!(algo.valid_value, v);

        // The rule is latched: a further prevote for the same quorum does nothing.
        assert_eq!(
            algo.receive_message(&prevote(node(2), Round::new(0), v)),
            Output::None
        );
    }

    #[test]
    fn prevote_quorum_past_prevote_step_updates_valid_but_not_locked() {
        let v = value(1);
        let p = proposal(Round::new(0), v, Round::NIL);
        let mut algo = algorithm(MockOracle {
            height: 1,
            valid: vec![v],
            proposals: vec![p],
            prevote_quorums: vec![(Round::new(0), Some(v))],
            ..MockOracle::default()
        });
        algo.start_round(ValueHash::NIL, Round::new(0));
        algo.step = Step::Precommit;

        let out = algo.receive_message(&prevote(node(1), Round::new(0), v));

        assert_eq!(out, Output::Message(precommit(node(0), Round::new(0), v)));
        assert_eq!(algo.locked_round, Round::NIL);
        assert_eq!(algo.valid_round, Round::new(0));
        assert_eq!(algo.valid_value, v);
    }

    #[test]
    fn nil_prevote_quorum_precommits_nil() {
        let mut algo = algorithm(MockOracle {
            height: 1,
            prevote_quorums: vec![(Round::new(0), Some(ValueHash::NIL))],
            ..MockOracle::default()
        });
        algo.start_round(ValueHash::NIL, Round::new(0));
        algo.step = Step::Prevote;

        let out = algo.receive_message(&prevote(node(1), Round::new(0), ValueHash::NIL));

        assert_eq!(
            out,
            Output::Message(precommit(node(0), Round::new(0), ValueHash::NIL))
        );
        assert_eq!(algo.step(), Step::Precommit);
    }

    #[test]
    fn mixed_prevote_quorum_schedules_a_prevote_timeout_once() {
        let mut algo = algorithm(MockOracle {
            height: 1,
            prevote_quorums: vec![(Round::new(0), None)],
            ..MockOracle::default()
        });
        algo.start_round(ValueHash::NIL, Round::new(0));
        algo.step = Step::Prevote;

        let first = algo.receive_message(&prevote(node(1), Round::new(0), value(1)));
        let second = algo.receive_message(&prevote(node(2), Round::new(0), value(2)));

        assert_eq!(
            first,
            Output::Timeout(Timeout {
                kind: Step::Prevote,
                height: Height::new(1),
                round: Round::new(0),
                delay: 1,
            })
        );
        assert_eq!(second, Output::None);
    }

    #[test]
    fn precommit_quorum_decides_and_resets_locked_and_valid_state() {
        let v = value(1);
        let p = proposal(Round::new(0), v, Round::NIL);
        let mut algo = algorithm(MockOracle {
            height: 1,
            valid: vec![v],
            proposals: vec![p],
            precommit_quorums: vec![(Round::new(0), Some(v))],
            ..MockOracle::default()
        });
        algo.start_round(ValueHash::NIL, Round::new(0));
        algo.locked_round = Round::new(0);
        algo.locked_value = v;
        algo.valid_round = Round::new(0);
        algo.valid_value = v;

        let out = algo.receive_message(&precommit(node(1), Round::new(0), v));

        assert_eq!(
            out,
            Output::RoundChange(RoundChange {
                round: Round::new(0),
                decision: Some(p),
            })
        );
        assert_eq!(algo.locked_round, Round::NIL);
        assert_eq!(algo.locked_value, ValueHash::NIL);
        assert_eq!(algo.valid_round, Round::NIL);
        assert_eq!(algo.valid_value, ValueHash::NIL);
    }

    #[test]
    fn any_precommit_quorum_schedules_a_precommit_timeout_once() {
        let mut algo = algorithm(MockOracle {
            height: 1,
            precommit_quorums: vec![(Round::new(0), None)],
            ..MockOracle::default()
        });
        algo.start_round(ValueHash::NIL, Round::new(0));

        let first = algo.receive_message(&precommit(node(1), Round::new(0), value(1)));
        let second = algo.receive_message(&precommit(node(2), Round::new(0), value(2)));

        assert_eq!(
            first,
            Output::Timeout(Timeout {
                kind: Step::Precommit,
                height: Height::new(1),
                round: Round::new(0),
                delay: 1,
            })
        );
        assert_eq!(second, Output::None);
    }

    #[test]
    fn failure_threshold_in_a_future_round_skips_ahead() {
        let mut algo = algorithm(MockOracle {
            height: 1,
            failure_rounds: vec![Round::new(5)],
            ..MockOracle::default()
        });
        algo.start_round(ValueHash::NIL, Round::new(0));

        let out = algo.receive_message(&prevote(node(1), Round::new(5), ValueHash::NIL));

        assert_eq!(
            out,
            Output::RoundChange(RoundChange {
                round: Round::new(5),
                decision: None,
            })
        );
    }

    #[test]
    fn first_time_flags_are_cleared_by_start_round() {
        let mut algo = algorithm(MockOracle {
            height: 1,
            prevote_quorums: vec![(Round::new(0), None), (Round::new(1), None)],
            ..MockOracle::default()
        });
        algo.start_round(ValueHash::NIL, Round::new(0));
        algo.step = Step::Prevote;
        assert!(matches!(
            algo.receive_message(&prevote(node(1), Round::new(0), value(1))),
            Output::Timeout(_)
        ));

        algo.start_round(ValueHash::NIL, Round::new(1));
        algo.step = Step::Prevote;
        assert!(matches!(
            algo.receive_message(&prevote(node(1), Round::new(1), value(1))),
            Output::Timeout(_)
        ));
    }
}
