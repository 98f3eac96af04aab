//! Built-in permission models

pub mod capability;
pub mod rank;

pub use capability::{Capability, CapabilityModel, CapabilitySet};
pub use rank::{Rank, RankField, RankModel, RankPerm};

// vim: ts=4
