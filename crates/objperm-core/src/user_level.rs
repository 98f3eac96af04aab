//! User level registry
//!
//! Maps user ids to privilege levels under `config.user_key` at the state root.
//! Users missing from the registry get `config.default_level`, so absence never
//! implies root.

use serde::Deserialize;
use serde_json::Value;

use crate::addressing;
use crate::config::EngineConfig;
use crate::prelude::*;

#[derive(Clone, Copy)]
pub struct UserLevels<'c> {
	config: &'c EngineConfig,
}

impl<'c> UserLevels<'c> {
	pub fn new(config: &'c EngineConfig) -> Self {
		Self { config }
	}

	pub fn read_level(&self, state: &Value, user: &str) -> ClResult<Level> {
		match state.get(&self.config.user_key).and_then(|registry| registry.get(user)) {
			None | Some(Value::Null) => Ok(self.config.default_level),
			Some(level) => Ok(Level::deserialize(level)?),
		}
	}

	pub fn is_root(&self, state: &Value, user: &str) -> ClResult<bool> {
		Ok(self.config.is_root(self.read_level(state, user)?))
	}

	/// Change a user's level; only root may do this
	pub fn set_level(&self, actor: &str, state: &mut Value, target: &str, level: Level) -> ClResult<()> {
		if !self.is_root(state, actor)? {
			warn!(actor = %actor, target = %target, level = %level, "non-root user attempted to change a user level");
			return Err(Error::PermissionDenied);
		}
		self.write_level(state, target, level)?;
		info!(actor = %actor, target = %target, level = %level, "user level changed");
		Ok(())
	}

	/// Register the first root user of a state.
	///
	/// Fails once any user holds a root level.
	pub fn bootstrap_root(&self, state: &mut Value, user: &str) -> ClResult<()> {
		if self.list_levels(state)?.iter().any(|(_, level)| self.config.is_root(*level)) {
			warn!(user = %user, "root bootstrap refused, a root user already exists");
			return Err(Error::PermissionDenied);
		}
		self.write_level(state, user, self.config.root_level)?;
		info!(user = %user, "root user bootstrapped");
		Ok(())
	}

	/// Registered users and their levels
	pub fn list_levels(&self, state: &Value) -> ClResult<Vec<(String, Level)>> {
		let Some(Value::Object(registry)) = state.get(&self.config.user_key) else {
			return Ok(Vec::new());
		};
		registry
			.iter()
			.filter(|(_, level)| !level.is_null())
			.map(|(user, level)| Ok::<_, Error>((user.clone(), Level::deserialize(level)?)))
			.collect()
	}

	fn write_level(&self, state: &mut Value, user: &str, level: Level) -> ClResult<()> {
		let path = [PathKey::from(&self.config.user_key), PathKey::from(user)];
		addressing::set(state, &path, serde_json::to_value(level)?)
	}
}


// vim: ts=4
