/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Definitions for the structured messages that validators exchange, and their wire encoding.
//!
//! A [`ConsensusMessage`] is encoded with [borsh], and the SHA-256 digest of that encoding is the
//! [`MessageDigest`] used to deduplicate messages at the network boundary and to key raw message
//! bytes inside the [store](crate::store::MessageStore). The protocol's correctness does not depend
//! on the exact encoding, only on it being deterministic across nodes.

use borsh::{BorshDeserialize, BorshSerialize};
use sha2::{Digest, Sha256};
use std::fmt::{self, Display, Formatter};
use std::io;

use crate::types::basic::{Height, NodeId, Round, ValueHash};

/// The steps a validator moves through within a round, in order. Also serves as the type tag of a
/// [`ConsensusMessage`]: each step has exactly one kind of message associated with it.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, BorshDeserialize, BorshSerialize,
)]
pub enum Step {
    Propose,
    Prevote,
    Precommit,
}

impl Step {
    /// Compact two-letter tag, used in log lines.
    pub fn short_str(&self) -> &'static str {
        match self {
            Step::Propose => "pp",
            Step::Prevote => "pv",
            Step::Precommit => "pc",
        }
    }
}

impl Display for Step {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Step::Propose => f.write_str("Propose"),
            Step::Prevote => f.write_str("Prevote"),
            Step::Precommit => f.write_str("Precommit"),
        }
    }
}

/// A message in the consensus protocol: a proposal, a prevote, or a precommit.
///
/// `valid_round` only has meaning when `msg_type` is [`Step::Propose`]. Constructors of vote
/// messages must leave it at [`Round::NIL`], and the [`PartialEq`] implementation ignores it for
/// votes.
#[derive(Clone, Copy, Debug, BorshDeserialize, BorshSerialize)]
pub struct ConsensusMessage {
    pub sender: NodeId,
    pub msg_type: Step,
    pub height: Height,
    pub round: Round,
    pub value: ValueHash,
    pub valid_round: Round,
}

impl ConsensusMessage {
    /// The stable wire encoding of the message: the borsh serialization of its six fields.
    pub fn encode(&self) -> io::Result<Vec<u8>> {
        self.try_to_vec()
    }

    pub fn decode(bytes: &[u8]) -> io::Result<ConsensusMessage> {
        ConsensusMessage::deserialize(&mut &*bytes)
    }
}

impl PartialEq for ConsensusMessage {
    fn eq(&self, other: &Self) -> bool {
        self.sender == other.sender
            && self.msg_type == other.msg_type
            && self.height == other.height
            && self.round == other.round
            && self.value == other.value
            // valid_round only has meaning for proposals.
            && (self.msg_type != Step::Propose || self.valid_round == other.valid_round)
    }
}

impl Eq for ConsensusMessage {}

impl Display for ConsensusMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "s:{:<3} h:{:<3} r:{:<3} v:{:<7}",
            self.msg_type.short_str(),
            self.height,
            self.round,
            self.value
        )?;
        if self.msg_type == Step::Propose {
            write!(f, " vr:{:<3}", self.valid_round)?;
        }
        Ok(())
    }
}

/// The SHA-256 digest of a message's wire encoding. Identifies the message for network-level
/// deduplication and raw-byte lookup.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct MessageDigest([u8; 32]);

impl MessageDigest {
    pub fn of(bytes: &[u8]) -> MessageDigest {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        MessageDigest(hasher.finalize().into())
    }

    pub const fn bytes(&self) -> [u8; 32] {
        self.0
    }
}
