//! Capability-set permission model
//!
//! A permission is a record of one tri-state flag per operation. Unspecified
//! flags inherit from the ancestor entry when combined, and count as not
//! granted when checked.

use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Alias used where an operation is meant as a grantable right
pub type Capability = Operation;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilitySet {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub create: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub read: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub update: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub delete: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub update_permissions: Option<bool>,
}

impl CapabilitySet {
	/// Every capability granted
	pub const ALL: Self = Self::uniform(true);
	/// Every capability explicitly denied
	pub const NONE: Self = Self::uniform(false);
	/// Nothing specified
	pub const EMPTY: Self = Self {
		create: None,
		read: None,
		update: None,
		delete: None,
		update_permissions: None,
	};

	const fn uniform(granted: bool) -> Self {
		Self {
			create: Some(granted),
			read: Some(granted),
			update: Some(granted),
			delete: Some(granted),
			update_permissions: Some(granted),
		}
	}

	pub fn get(&self, cap: Capability) -> Option<bool> {
		match cap {
			Operation::Create => self.create,
			Operation::Read => self.read,
			Operation::Update => self.update,
			Operation::Delete => self.delete,
			Operation::UpdatePermissions => self.update_permissions,
		}
	}

	fn slot_mut(&mut self, cap: Capability) -> &mut Option<bool> {
		match cap {
			Operation::Create => &mut self.create,
			Operation::Read => &mut self.read,
			Operation::Update => &mut self.update,
			Operation::Delete => &mut self.delete,
			Operation::UpdatePermissions => &mut self.update_permissions,
		}
	}

	pub fn set(&mut self, cap: Capability, granted: bool) {
		*self.slot_mut(cap) = Some(granted);
	}

	/// Remove the flag so it is inherited again
	pub fn clear(&mut self, cap: Capability) {
		*self.slot_mut(cap) = None;
	}

	pub fn with(mut self, cap: Capability, granted: bool) -> Self {
		self.set(cap, granted);
		self
	}

	pub fn allows(&self, cap: Capability) -> bool {
		self.get(cap).unwrap_or(false)
	}

	/// Field-wise overlay: flags set in `inner` win, the rest come from `self`
	pub fn overlay(&self, inner: &Self) -> Self {
		Self {
			create: inner.create.or(self.create),
			read: inner.read.or(self.read),
			update: inner.update.or(self.update),
			delete: inner.delete.or(self.delete),
			update_permissions: inner.update_permissions.or(self.update_permissions),
		}
	}
}

/// Permission model over [`CapabilitySet`] values
#[derive(Clone, Copy, Debug, Default)]
pub struct CapabilityModel;

impl PermissionModel for CapabilityModel {
	type Perm = CapabilitySet;
	type Field = Capability;
	type FieldValue = bool;

	fn name(&self) -> &'static str {
		"capability"
	}

	fn none(&self) -> CapabilitySet {
		CapabilitySet::NONE
	}

	fn default_on_create(&self) -> CapabilitySet {
		CapabilitySet::ALL
	}

	fn unset(&self) -> CapabilitySet {
		CapabilitySet::EMPTY
	}

	fn overlay(&self, outer: &CapabilitySet, inner: &CapabilitySet) -> CapabilitySet {
		outer.overlay(inner)
	}

	fn permits(&self, perm: &CapabilitySet, op: Operation) -> bool {
		perm.allows(op)
	}

	fn set_field(&self, perm: &mut CapabilitySet, field: Capability, value: bool) {
		perm.set(field, value);
	}
}


// vim: ts=4
