//! Permission resolution and the permissioned CRUD engine.
//!
//! The engine works on a caller-owned `serde_json::Value` holding the data tree,
//! the permission tree, and the user level registry side by side. Permission
//! semantics are supplied by a [`PermissionModel`](objperm_types::perm_model::PermissionModel);
//! two models ship with the crate in [`model`].

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod addressing;
pub mod config;
pub mod engine;
pub mod model;
pub mod perm_tree;
pub mod prelude;
pub mod resolve;
pub mod user_level;

// Re-export commonly used types
pub use config::{EngineConfig, EngineConfigBuilder};
pub use engine::PermEngine;
pub use model::{CapabilityModel, CapabilitySet, Rank, RankModel, RankPerm};

// vim: ts=4
