/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! "Inert" newtype wrappers that are sent around and inspected, but have no active behavior.
//!
//! The identifiers printed by the [`Display`] implementations in this module are shortened to the
//! first seven characters of their unpadded base64 encoding, which keeps log lines readable while
//! staying unambiguous in practice.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use borsh::{BorshDeserialize, BorshSerialize};
use std::fmt::{self, Debug, Display, Formatter};

/// The 32-byte digest that identifies a proposed value.
///
/// The all-zeroes digest is reserved as [`ValueHash::NIL`], representing "no value": the value a
/// validator votes for when it votes *against* making progress in a round.
#[derive(Clone, Copy, PartialEq, Eq, Hash, BorshDeserialize, BorshSerialize)]
pub struct ValueHash([u8; 32]);

impl ValueHash {
    /// The distinguished "no value" sentinel, 'nil' in the Tendermint whitepaper.
    pub const NIL: ValueHash = ValueHash([0u8; 32]);

    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn bytes(&self) -> [u8; 32] {
        self.0
    }

    pub fn is_nil(&self) -> bool {
        *self == Self::NIL
    }
}

impl Display for ValueHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&first_seven_base64_chars(&self.0))
    }
}

impl Debug for ValueHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ValueHash({})", first_seven_base64_chars(&self.0))
    }
}

/// The 20-byte identifier of a validator.
///
/// Not explicitly mentioned in the whitepaper, but a node needs a way to identify itself in the
/// messages it emits, and the identifier is also useful for logging.
#[derive(Clone, Copy, PartialEq, Eq, Hash, BorshDeserialize, BorshSerialize)]
pub struct NodeId([u8; 20]);

impl NodeId {
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub const fn bytes(&self) -> [u8; 20] {
        self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&first_seven_base64_chars(&self.0))
    }
}

impl Debug for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", first_seven_base64_chars(&self.0))
    }
}

/// A slot in the agreed-upon sequence of values. One consensus instance decides one height.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, BorshDeserialize, BorshSerialize,
)]
pub struct Height(u64);

impl Height {
    pub const fn new(int: u64) -> Self {
        Self(int)
    }

    pub const fn int(&self) -> u64 {
        self.0
    }
}

impl Display for Height {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// A numbered attempt at reaching a decision within a height.
///
/// [`Round::NIL`] (`-1`) is the shared sentinel for "no round": the round of an algorithm instance
/// before its first round has started, the locked round of a validator that has never locked, and
/// the valid round of a proposal that does not refer back to an earlier round.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, BorshDeserialize, BorshSerialize,
)]
pub struct Round(i32);

impl Round {
    /// The "no round" sentinel.
    pub const NIL: Round = Round(-1);

    pub const fn new(int: i32) -> Self {
        Self(int)
    }

    pub const fn int(&self) -> i32 {
        self.0
    }

    pub fn is_nil(&self) -> bool {
        *self == Self::NIL
    }

    pub fn next(&self) -> Round {
        Round(self.0 + 1)
    }
}

impl Display for Round {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

// Get a more readable representation of a byte sequence by base64-encoding it and taking the first
// 7 characters.
fn first_seven_base64_chars(bytes: &[u8]) -> String {
    let encoded = STANDARD_NO_PAD.encode(bytes);
    if encoded.len() > 7 {
        encoded[0..7].to_string()
    } else {
        encoded
    }
}
