//! Level-rank permission model
//!
//! A permission is a single rank. Each operation has a minimum rank:
//! read needs viewer, update needs editor, everything else needs owner.

use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Ordered access rank, lowest first
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
	#[default]
	None,
	Viewer,
	Editor,
	Owner,
}

impl Rank {
	/// Minimum rank required for an operation
	pub fn threshold(op: Operation) -> Rank {
		match op {
			Operation::Read => Rank::Viewer,
			Operation::Update => Rank::Editor,
			Operation::Create | Operation::Delete | Operation::UpdatePermissions => Rank::Owner,
		}
	}
}

/// Stored rank entry, serialized as `{"lvl": "editor"}`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RankPerm {
	pub lvl: Rank,
}

impl From<Rank> for RankPerm {
	fn from(lvl: Rank) -> Self {
		Self { lvl }
	}
}

/// The only addressable part of a [`RankPerm`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RankField {
	Level,
}

/// Permission model over [`Rank`] values
#[derive(Clone, Copy, Debug, Default)]
pub struct RankModel;

impl PermissionModel for RankModel {
	type Perm = RankPerm;
	type Field = RankField;
	type FieldValue = Rank;

	fn name(&self) -> &'static str {
		"rank"
	}

	fn none(&self) -> RankPerm {
		Rank::None.into()
	}

	fn default_on_create(&self) -> RankPerm {
		Rank::Owner.into()
	}

	fn unset(&self) -> RankPerm {
		Rank::None.into()
	}

	fn overlay(&self, _outer: &RankPerm, inner: &RankPerm) -> RankPerm {
		*inner
	}

	fn permits(&self, perm: &RankPerm, op: Operation) -> bool {
		perm.lvl >= Rank::threshold(op)
	}

	fn set_field(&self, perm: &mut RankPerm, field: RankField, value: Rank) {
		match field {
			RankField::Level => perm.lvl = value,
		}
	}
}


// vim: ts=4
