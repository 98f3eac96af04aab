//! Shared types, error kinds, and the permission model trait for objperm.
//!
//! This crate holds the pieces an application needs to plug a custom permission
//! model into the engine without depending on the engine itself.

#![forbid(unsafe_code)]

pub mod error;
pub mod path;
pub mod perm_model;
pub mod prelude;
pub mod types;

// vim: ts=4
