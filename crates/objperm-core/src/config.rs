//! Engine configuration
//!
//! Reserved namespace keys, the wildcard user, and user level defaults.
//! Loaded from JSON supplied by the embedding application or built in code.

use serde::{Deserialize, Serialize};

use crate::prelude::*;

pub const DEFAULT_PERM_KEY: &str = "__permissions";
pub const DEFAULT_USER_KEY: &str = "__usr";
pub const DEFAULT_WILDCARD: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
	/// Key of the permission tree at the state root, and of the entry mapping in each node
	pub perm_key: String,
	/// Key under which application data lives; `None` keeps data at the state root
	pub object_key: Option<String>,
	/// Key of the user level registry at the state root
	pub user_key: String,
	/// User id whose entries apply to every user
	pub wildcard: String,
	/// Users at or below this level bypass permission checks
	pub root_level: Level,
	/// Level of users missing from the registry
	pub default_level: Level,
	/// Expected permission model name, checked when the engine is built
	pub model: Option<String>,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			perm_key: DEFAULT_PERM_KEY.into(),
			object_key: None,
			user_key: DEFAULT_USER_KEY.into(),
			wildcard: DEFAULT_WILDCARD.into(),
			root_level: Level::ROOT,
			default_level: Level::UNREGISTERED,
			model: None,
		}
	}
}

impl EngineConfig {
	pub fn builder() -> EngineConfigBuilder {
		EngineConfigBuilder::new()
	}

	/// Load and validate a config object; missing fields take their defaults
	pub fn from_json(value: &serde_json::Value) -> ClResult<Self> {
		let config = Self::deserialize(value)
			.map_err(|e| Error::InvalidConfig(format!("cannot parse engine config: {}", e)))?;
		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> ClResult<()> {
		if self.perm_key.is_empty() {
			return Err(Error::InvalidConfig("permission key must not be empty".into()));
		}
		if self.user_key.is_empty() {
			return Err(Error::InvalidConfig("user key must not be empty".into()));
		}
		if self.wildcard.is_empty() {
			return Err(Error::InvalidConfig("wildcard user must not be empty".into()));
		}
		if self.perm_key == self.user_key {
			return Err(Error::InvalidConfig(format!(
				"permission key and user key are both '{}'",
				self.perm_key
			)));
		}
		if let Some(object_key) = &self.object_key {
			if object_key.is_empty() {
				return Err(Error::InvalidConfig("object key must not be empty".into()));
			}
			if *object_key == self.perm_key || *object_key == self.user_key {
				return Err(Error::InvalidConfig(format!(
					"object key '{}' collides with a reserved key",
					object_key
				)));
			}
		}
		if self.root_level >= self.default_level {
			return Err(Error::InvalidConfig(format!(
				"root level {} must be below default level {}",
				self.root_level, self.default_level
			)));
		}
		Ok(())
	}

	/// Check if a level bypasses permission checks
	pub fn is_root(&self, level: Level) -> bool {
		level <= self.root_level
	}
}

/// Builder for EngineConfig with fluent API
pub struct EngineConfigBuilder {
	config: EngineConfig,
}

impl EngineConfigBuilder {
	pub fn new() -> Self {
		Self { config: EngineConfig::default() }
	}

	pub fn perm_key(mut self, key: impl Into<String>) -> Self {
		self.config.perm_key = key.into();
		self
	}

	pub fn object_key(mut self, key: impl Into<String>) -> Self {
		self.config.object_key = Some(key.into());
		self
	}

	pub fn user_key(mut self, key: impl Into<String>) -> Self {
		self.config.user_key = key.into();
		self
	}

	pub fn wildcard(mut self, wildcard: impl Into<String>) -> Self {
		self.config.wildcard = wildcard.into();
		self
	}

	pub fn root_level(mut self, level: Level) -> Self {
		self.config.root_level = level;
		self
	}

	pub fn default_level(mut self, level: Level) -> Self {
		self.config.default_level = level;
		self
	}

	pub fn model(mut self, name: impl Into<String>) -> Self {
		self.config.model = Some(name.into());
		self
	}

	pub fn build(self) -> ClResult<EngineConfig> {
		self.config.validate()?;
		Ok(self.config)
	}
}

impl Default for EngineConfigBuilder {
	fn default() -> Self {
		Self::new()
	}
}


// vim: ts=4
