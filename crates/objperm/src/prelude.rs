pub use crate::objpath;
pub use objperm_core::config::{EngineConfig, EngineConfigBuilder};
pub use objperm_core::engine::PermEngine;
pub use objperm_core::model::{
	Capability, CapabilityModel, CapabilitySet, Rank, RankField, RankModel, RankPerm,
};
pub use objperm_types::prelude::*;

// vim: ts=4
