/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Types that are used across multiple components of the crate.
//!
//! Types specific to a single component live next to that component, e.g.,
//! [`Timeout`](crate::algorithm::protocol::Timeout) next to the algorithm.

pub mod basic;

pub use basic::{Height, NodeId, Round, ValueHash};
