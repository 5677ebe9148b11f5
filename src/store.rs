/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The per-height collection of consensus messages backing the
//! [quorum oracle](crate::algorithm::oracle::QuorumOracle).
//!
//! The store deduplicates messages by the [digest](MessageDigest) of their wire encoding, so
//! network-level duplicates are silently dropped, and then enforces the per-slot rules of the
//! protocol: at most one proposal per round, and at most one prevote and one precommit per round
//! and sender. A message that violates a slot rule is [equivocation](Equivocation) evidence; the
//! first-seen message stays authoritative and the conflict is reported to the caller, who may use
//! it for slashing.
//!
//! Indexing votes by `(round, sender)` makes equivocation detection O(1) per insertion and quorum
//! counting O(validators) per query.
//!
//! A store lives exactly as long as its height: it is created empty when the height starts and is
//! dropped when the height decides.

use std::collections::{HashMap, HashSet};
use std::fmt::{self, Display, Formatter};
use std::io;

use crate::messages::{ConsensusMessage, MessageDigest, Step};
use crate::types::basic::{NodeId, Round, ValueHash};

/// The prevote and precommit slots of one sender in one round.
#[derive(Default)]
struct VoteSlot {
    prevote: Option<ConsensusMessage>,
    precommit: Option<ConsensusMessage>,
}

/// All consensus messages seen for one height, indexed for the queries the algorithm's upon-rules
/// ask, plus the set of value digests that have passed the embedder's validation.
#[derive(Default)]
pub struct MessageStore {
    proposals: HashMap<Round, ConsensusMessage>,
    votes: HashMap<Round, HashMap<NodeId, VoteSlot>>,
    digests: HashSet<MessageDigest>,
    raw: HashMap<MessageDigest, Vec<u8>>,
    valid: HashSet<ValueHash>,
}

impl MessageStore {
    pub fn new() -> MessageStore {
        MessageStore::default()
    }

    /// Encodes the message, then [inserts](MessageStore::insert) it under the digest of its
    /// encoding.
    pub fn add_message(&mut self, msg: &ConsensusMessage) -> Result<(), AddMessageError> {
        let raw = msg.encode().map_err(AddMessageError::Encode)?;
        let digest = MessageDigest::of(&raw);
        self.insert(msg, raw, digest)
            .map_err(AddMessageError::Equivocation)
    }

    /// Adds a message whose wire encoding and digest are already known (e.g., because the bytes
    /// just came off the network).
    ///
    /// A message whose digest has been seen before is a no-op. A new message that targets an
    /// occupied slot is equivocation: the store is left unchanged and the two conflicting messages
    /// are returned.
    pub fn insert(
        &mut self,
        msg: &ConsensusMessage,
        raw: Vec<u8>,
        digest: MessageDigest,
    ) -> Result<(), Equivocation> {
        if self.digests.contains(&digest) {
            return Ok(());
        }

        match msg.msg_type {
            Step::Propose => {
                if let Some(existing) = self.proposals.get(&msg.round) {
                    return Err(Equivocation {
                        existing: *existing,
                        conflicting: *msg,
                    });
                }
                self.proposals.insert(msg.round, *msg);
            }
            Step::Prevote | Step::Precommit => {
                let slot = self
                    .votes
                    .entry(msg.round)
                    .or_default()
                    .entry(msg.sender)
                    .or_default();
                let slot = if msg.msg_type == Step::Prevote {
                    &mut slot.prevote
                } else {
                    &mut slot.precommit
                };
                if let Some(existing) = slot {
                    return Err(Equivocation {
                        existing: *existing,
                        conflicting: *msg,
                    });
                }
                *slot = Some(*msg);
            }
        }

        self.digests.insert(digest);
        self.raw.insert(digest, raw);
        Ok(())
    }

    /// Whether a message with the given digest has been accepted into the store.
    pub fn contains(&self, digest: &MessageDigest) -> bool {
        self.digests.contains(digest)
    }

    /// The wire encoding of an accepted message, for regossiping or evidence.
    pub fn raw_bytes(&self, digest: &MessageDigest) -> Option<&[u8]> {
        self.raw.get(digest).map(Vec::as_slice)
    }

    /// Marks the given value as having passed validation.
    pub fn set_valid(&mut self, value: ValueHash) {
        self.valid.insert(value);
    }

    /// Whether the given value has been marked valid.
    pub fn valid(&self, value: &ValueHash) -> bool {
        self.valid.contains(value)
    }

    /// The proposal for the given round, if one exists and proposes the given value.
    pub fn matching_proposal(&self, round: Round, value: &ValueHash) -> Option<&ConsensusMessage> {
        self.proposals.get(&round).filter(|p| p.value == *value)
    }

    /// Counts the distinct senders that prevoted in the given round. `Some(v)` counts prevotes for
    /// exactly `v` (which may be [`ValueHash::NIL`]); `None` is a wildcard counting every prevote.
    pub fn count_prevotes(&self, round: Round, value: Option<&ValueHash>) -> usize {
        self.votes.get(&round).map_or(0, |senders| {
            senders
                .values()
                .filter_map(|slot| slot.prevote.as_ref())
                .filter(|vote| value.map_or(true, |v| vote.value == *v))
                .count()
        })
    }

    /// Counts the distinct senders that precommitted in the given round, with the same value
    /// semantics as [`count_prevotes`](MessageStore::count_prevotes).
    pub fn count_precommits(&self, round: Round, value: Option<&ValueHash>) -> usize {
        self.votes.get(&round).map_or(0, |senders| {
            senders
                .values()
                .filter_map(|slot| slot.precommit.as_ref())
                .filter(|vote| value.map_or(true, |v| vote.value == *v))
                .count()
        })
    }

    /// Counts the nil prevotes plus nil precommits in the given round. Backs the failure-threshold
    /// predicate: more than a third of the validators voting nil guarantees that at least one
    /// correct validator is among them.
    pub fn count_failures(&self, round: Round) -> usize {
        self.votes.get(&round).map_or(0, |senders| {
            senders
                .values()
                .flat_map(|slot| [slot.prevote, slot.precommit])
                .flatten()
                .filter(|vote| vote.value.is_nil())
                .count()
        })
    }
}

/// Two distinct messages from the same sender targeting the same slot: a second proposal for an
/// already-proposed round, or a second prevote or precommit from a sender that already voted in
/// the round. Evidence of Byzantine behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equivocation {
    /// The first-seen message, which the store keeps authoritative.
    pub existing: ConsensusMessage,
    /// The later conflicting message, which the store rejected.
    pub conflicting: ConsensusMessage,
}

impl Display for Equivocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} equivocated in round {}: kept [{}], rejected [{}]",
            self.conflicting.sender, self.conflicting.round, self.existing, self.conflicting
        )
    }
}

/// Why [`MessageStore::add_message`] did not accept a message.
#[derive(Debug)]
pub enum AddMessageError {
    /// The message could not be encoded, so no digest could be computed for it.
    Encode(io::Error),
    /// The message conflicts with an already-stored message for the same slot.
    Equivocation(Equivocation),
}

impl Display for AddMessageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AddMessageError::Encode(err) => write!(f, "could not encode message: {}", err),
            AddMessageError::Equivocation(equivocation) => Display::fmt(equivocation, f),
        }
    }
}
