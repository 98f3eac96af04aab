//! Objperm guards a tree-shaped JSON state with per-path, per-user permissions.
//!
//! # Features
//!
//! - Permissions stored next to the data, mirroring its shape
//! - Inheritance from ancestors, with important entries that cannot be overridden
//! - Wildcard entries applying to every user
//! - Root users bypassing all checks
//! - Pluggable permission models
//!     - capability sets (create, read, update, delete, update-permissions)
//!     - ordered ranks (viewer, editor, owner)
//!
//! ```
//! use objperm::prelude::*;
//! use serde_json::json;
//!
//! let engine = PermEngine::new(CapabilityModel);
//! let mut state = json!({});
//! engine.bootstrap_root(&mut state, "admin")?;
//! engine.update_permission("admin", &mut state, &objpath![], "*", Operation::Create, true)?;
//! engine.create("alice", &mut state, &objpath![], "notes", json!([]))?;
//! assert_eq!(engine.resolve_permission(&state, &objpath!["notes"], "alice")?, CapabilitySet::ALL);
//! # Ok::<(), objperm::error::Error>(())
//! ```

// Re-export shared types from objperm-types
pub use objperm_types::error;
pub use objperm_types::path;
pub use objperm_types::perm_model;
pub use objperm_types::types;

// Re-export the objpath! macro so it resolves through this crate
pub use objperm_types::objpath;

// Engine re-exports
pub use objperm_core::addressing;
pub use objperm_core::config;
pub use objperm_core::engine;
pub use objperm_core::model;
pub use objperm_core::resolve;

pub use objperm_core::{EngineConfig, PermEngine};

pub mod prelude;

// vim: ts=4
