//! Permission model contract.
//!
//! A permission model defines what a permission value is, how an outer (ancestor)
//! value combines with an inner (descendant) one, and which operations a value
//! authorizes. The engine is generic over this trait; objperm ships a
//! capability-set model and a level-rank model, and applications may supply
//! their own.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt::Debug;

use crate::error::{ClResult, Error};
use crate::types::Operation;

fn is_false(b: &bool) -> bool {
	!*b
}

/// A stored permission entry: a permission value plus its important marker.
///
/// Serialized as the model's value with an extra `"!": true` field when important.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant<P> {
	#[serde(flatten)]
	pub perm: P,
	/// Dominates every entry deeper in the path, and the user entry at the same node
	#[serde(rename = "!", default, skip_serializing_if = "is_false")]
	pub important: bool,
}

impl<P> Grant<P> {
	pub fn new(perm: P) -> Self {
		Self { perm, important: false }
	}

	pub fn important(perm: P) -> Self {
		Self { perm, important: true }
	}
}

impl<P> From<P> for Grant<P> {
	fn from(perm: P) -> Self {
		Self::new(perm)
	}
}

/// Permission semantics plugged into the engine
pub trait PermissionModel: Send + Sync {
	/// Permission value stored per (path, user)
	type Perm: Clone + Debug + PartialEq + Serialize + DeserializeOwned;
	/// Addressable part of a permission value, for single-field updates
	type Field: Copy + Debug;
	type FieldValue: Clone + Debug;

	/// Short identifier of the model (e.g. in config and logs)
	fn name(&self) -> &'static str;

	/// Value resolved when no entry applies
	fn none(&self) -> Self::Perm;

	/// Value granted to a user on what they create
	fn default_on_create(&self) -> Self::Perm;

	/// Starting value for single-field updates of a user with no stored entry
	fn unset(&self) -> Self::Perm;

	/// Combine a non-important outer value with a more specific inner value
	fn overlay(&self, outer: &Self::Perm, inner: &Self::Perm) -> Self::Perm;

	/// Check if a value authorizes an operation
	fn permits(&self, perm: &Self::Perm, op: Operation) -> bool;

	fn set_field(&self, perm: &mut Self::Perm, field: Self::Field, value: Self::FieldValue);

	/// Combine an outer entry with an optional inner one.
	///
	/// An important outer entry wins outright, a missing inner entry leaves the
	/// outer one in place, otherwise the inner entry is overlaid on the outer one.
	fn combine(
		&self,
		outer: &Grant<Self::Perm>,
		inner: Option<&Grant<Self::Perm>>,
	) -> Grant<Self::Perm> {
		match inner {
			Some(inner) if !outer.important => Grant {
				perm: self.overlay(&outer.perm, &inner.perm),
				important: inner.important,
			},
			_ => outer.clone(),
		}
	}

	fn require(&self, perm: &Self::Perm, op: Operation) -> ClResult<()> {
		if self.permits(perm, op) {
			Ok(())
		} else {
			Err(Error::PermissionDenied)
		}
	}

	fn require_create(&self, perm: &Self::Perm) -> ClResult<()> {
		self.require(perm, Operation::Create)
	}

	fn require_read(&self, perm: &Self::Perm) -> ClResult<()> {
		self.require(perm, Operation::Read)
	}

	fn require_update(&self, perm: &Self::Perm) -> ClResult<()> {
		self.require(perm, Operation::Update)
	}

	fn require_delete(&self, perm: &Self::Perm) -> ClResult<()> {
		self.require(perm, Operation::Delete)
	}

	/// The actor must manage permissions, and the target must not.
	///
	/// Users who already manage permissions at a path can only be changed by root.
	fn require_update_permissions(&self, actor: &Self::Perm, target: &Self::Perm) -> ClResult<()> {
		self.require(actor, Operation::UpdatePermissions)?;
		if self.permits(target, Operation::UpdatePermissions) {
			return Err(Error::PermissionDenied);
		}
		Ok(())
	}
}


// vim: ts=4
