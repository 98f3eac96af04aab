//! Common test utilities and fixtures
//!
//! Shared users, seeded states, and log setup for the integration tests.

#![allow(dead_code)]

use objperm::prelude::*;
use serde_json::{Value, json};

pub const ROOT: &str = "ROOT";
pub const U1: &str = "U1";
pub const U2: &str = "U2";

/// Route engine logs to the test output. Set RUST_LOG to see them.
pub fn init_tracing() {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.with_test_writer()
		.try_init();
}

/// State with ROOT at level 0 and two regular users
pub fn registered_state() -> Value {
	json!({"__usr": {"ROOT": 0, "U1": 1, "U2": 1}})
}

/// Registered users, wildcard read everywhere and wildcard create under `entities`
pub fn entity_state(engine: &PermEngine<CapabilityModel>) -> Value {
	let mut state = registered_state();
	engine.update(ROOT, &mut state, &objpath![], json!({"entities": {}})).unwrap();
	engine.update_permission(ROOT, &mut state, &objpath![], "*", Operation::Read, true).unwrap();
	engine
		.update_permission(ROOT, &mut state, &objpath!["entities"], "*", Operation::Create, true)
		.unwrap();
	state
}

pub fn caps(ops: &[Capability]) -> CapabilitySet {
	ops.iter().fold(CapabilitySet::EMPTY, |set, op| set.with(*op, true))
}

// vim: ts=4
