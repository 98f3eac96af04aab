//! Common types used throughout objperm.

use serde::{Deserialize, Serialize};

// Level //
//*******//
/// Privilege rank of a user in the user level registry. Lower is more privileged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(pub u64);

impl Level {
	pub const ROOT: Level = Level(0);
	pub const USER: Level = Level(1);
	/// Level of users with no registry entry
	pub const UNREGISTERED: Level = Level(u64::MAX);
}

impl Default for Level {
	fn default() -> Self {
		Level::UNREGISTERED
	}
}

impl std::fmt::Display for Level {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl Serialize for Level {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_u64(self.0)
	}
}

impl<'de> Deserialize<'de> for Level {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		Ok(Level(u64::deserialize(deserializer)?))
	}
}

// Operation //
//***********//
/// Operation kinds guarded by the permission model
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
	Create,
	Read,
	Update,
	Delete,
	UpdatePermissions,
}

impl Operation {
	pub const ALL: [Operation; 5] = [
		Operation::Create,
		Operation::Read,
		Operation::Update,
		Operation::Delete,
		Operation::UpdatePermissions,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			Operation::Create => "create",
			Operation::Read => "read",
			Operation::Update => "update",
			Operation::Delete => "delete",
			Operation::UpdatePermissions => "updatePermissions",
		}
	}
}

impl std::fmt::Display for Operation {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}


// vim: ts=4
