//! Utility modules

pub mod hash;

pub use hash::{label_hash, make_commitment, CommitmentHash, LabelHash, Secret};
