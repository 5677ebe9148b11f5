/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The [`Oracle`] trait, through which the algorithm asks questions about the aggregate message
//! pool, and [`QuorumOracle`], the implementation backed by a [`MessageStore`].
//!
//! Every decision point in the algorithm's upon-rules is phrased as one of the six predicates
//! below. Keeping the algorithm behind this narrow seam is what allows it to be unit tested against
//! a mock oracle, with no store involved.

use crate::messages::ConsensusMessage;
use crate::store::MessageStore;
use crate::types::basic::{Height, Round, ValueHash};

/// Answers the questions the algorithm may have about its height, such as "have I reached the
/// prevote quorum threshold for the value with this hash?".
///
/// The `value` argument of the threshold predicates selects what is counted: `Some(v)` counts
/// votes for exactly `v` (which may be [`ValueHash::NIL`]), `None` is a wildcard counting votes
/// for any value.
pub trait Oracle {
    /// Whether the value with the given hash has passed validation.
    fn valid(&self, value: &ValueHash) -> bool;

    /// The proposal for the given round and value hash, if one has been seen.
    fn matching_proposal(&self, round: Round, value: &ValueHash) -> Option<ConsensusMessage>;

    /// Whether a quorum of prevotes has been seen for the given round and value.
    fn prevote_qthresh(&self, round: Round, value: Option<&ValueHash>) -> bool;

    /// Whether a quorum of precommits has been seen for the given round and value.
    fn precommit_qthresh(&self, round: Round, value: Option<&ValueHash>) -> bool;

    /// Whether the nil votes seen for the given round exceed the failure threshold, i.e., whether
    /// at least one correct validator has given up on the round.
    fn f_thresh(&self, round: Round) -> bool;

    /// The height this oracle is bound to.
    fn height(&self) -> Height;
}

/// An [`Oracle`] over a fixed-size validator set of equally-weighted validators, backed by a
/// [`MessageStore`] that it owns.
///
/// With `n` validators the protocol tolerates `f = (n - 1) / 3` Byzantine validators; the quorum
/// threshold (`2f + 1` votes) is computed as `2n/3 + 1` and the failure threshold (`f + 1` votes)
/// as "more than `n/3`".
pub struct QuorumOracle {
    num_validators: usize,
    height: Height,
    store: MessageStore,
}

impl QuorumOracle {
    /// An oracle over an empty store for the given height.
    pub fn new(num_validators: usize, height: Height) -> QuorumOracle {
        QuorumOracle {
            num_validators,
            height,
            store: MessageStore::new(),
        }
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut MessageStore {
        &mut self.store
    }

    fn quorum(&self) -> usize {
        self.num_validators * 2 / 3 + 1
    }
}

impl Oracle for QuorumOracle {
    fn valid(&self, value: &ValueHash) -> bool {
        self.store.valid(value)
    }

    fn matching_proposal(&self, round: Round, value: &ValueHash) -> Option<ConsensusMessage> {
        self.store.matching_proposal(round, value).copied()
    }

    fn prevote_qthresh(&self, round: Round, value: Option<&ValueHash>) -> bool {
        self.store.count_prevotes(round, value) >= self.quorum()
    }

    fn precommit_qthresh(&self, round: Round, value: Option<&ValueHash>) -> bool {
        self.store.count_precommits(round, value) >= self.quorum()
    }

    fn f_thresh(&self, round: Round) -> bool {
        self.store.count_failures(round) > self.num_validators / 3
    }

    fn height(&self) -> Height {
        self.height
    }
}
