use rand::Rng;

use tendermint_core::{ConsensusMessage, Height, NodeId, Round, Step, ValueHash};

pub fn random_node_id() -> NodeId {
    let mut bytes = [0u8; 20];
    rand::thread_rng().fill(&mut bytes[..]);
    NodeId::new(bytes)
}

pub fn random_value() -> ValueHash {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill(&mut bytes[..]);
    ValueHash::new(bytes)
}

pub fn vote(
    sender: NodeId,
    msg_type: Step,
    height: Height,
    round: Round,
    value: ValueHash,
) -> ConsensusMessage {
    ConsensusMessage {
        sender,
        msg_type,
        height,
        round,
        value,
        valid_round: Round::NIL,
    }
}
