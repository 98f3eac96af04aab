//! Permissioned CRUD engine
//!
//! Every operation takes the acting user and the caller-owned state. Non-root
//! actors are checked against the permission resolved at the path before
//! anything is written; root actors skip the check. Failures never leave a
//! partial write behind.

use std::borrow::Cow;

use serde_json::Value;

use crate::addressing::{self, Removed};
use crate::config::EngineConfig;
use crate::perm_tree::PermTree;
use crate::prelude::*;
use crate::resolve::Resolver;
use crate::user_level::UserLevels;

pub struct PermEngine<M: PermissionModel> {
	config: EngineConfig,
	model: M,
}

impl<M: PermissionModel> PermEngine<M> {
	/// Engine with the default configuration
	pub fn new(model: M) -> Self {
		Self { config: EngineConfig::default(), model }
	}

	pub fn with_config(model: M, config: EngineConfig) -> ClResult<Self> {
		config.validate()?;
		if let Some(expected) = config.model.as_deref() {
			if expected != model.name() {
				return Err(Error::InvalidConfig(format!(
					"config expects permission model '{}', got '{}'",
					expected,
					model.name()
				)));
			}
		}
		Ok(Self { config, model })
	}

	pub fn config(&self) -> &EngineConfig {
		&self.config
	}

	pub fn model(&self) -> &M {
		&self.model
	}

	fn tree(&self) -> PermTree<'_> {
		PermTree::new(&self.config)
	}

	fn levels(&self) -> UserLevels<'_> {
		UserLevels::new(&self.config)
	}

	fn resolver(&self) -> Resolver<'_, M> {
		Resolver::new(&self.model, &self.config)
	}

	/// Location of a data path inside the state
	fn data_path<'p>(&self, path: &'p [PathKey]) -> Cow<'p, [PathKey]> {
		match &self.config.object_key {
			Some(key) => {
				Cow::Owned(std::iter::once(PathKey::from(key)).chain(path.iter().cloned()).collect())
			}
			None => Cow::Borrowed(path),
		}
	}

	/// Root-level keys that hold metadata when data shares the state root
	fn is_reserved_root_key(&self, key: &str) -> bool {
		self.config.object_key.is_none()
			&& (key == self.config.perm_key || key == self.config.user_key)
	}

	fn authorize(&self, actor: &str, state: &Value, path: &[PathKey], op: Operation) -> ClResult<()> {
		self.tree().check_path(path)?;
		if self.levels().is_root(state, actor)? {
			trace!(actor = %actor, op = %op, path = %DisplayPath(path), "root bypass");
			return Ok(());
		}
		let perm = self.resolver().resolve(state, path, actor)?;
		let res = match op {
			Operation::Create => self.model.require_create(&perm),
			Operation::Read => self.model.require_read(&perm),
			Operation::Update => self.model.require_update(&perm),
			Operation::Delete => self.model.require_delete(&perm),
			Operation::UpdatePermissions => self.model.require(&perm, op),
		};
		res.inspect_err(|_| {
			warn!(actor = %actor, op = %op, path = %DisplayPath(path), perm = ?perm, "permission denied");
		})
	}

	fn authorize_permission_change(
		&self,
		actor: &str,
		state: &Value,
		path: &[PathKey],
		target: &str,
	) -> ClResult<()> {
		self.tree().check_path(path)?;
		if self.levels().is_root(state, actor)? {
			trace!(actor = %actor, target = %target, path = %DisplayPath(path), "root bypass");
			return Ok(());
		}
		let resolver = self.resolver();
		let actor_perm = resolver.resolve(state, path, actor)?;
		let target_perm = resolver.resolve(state, path, target)?;
		self.model.require_update_permissions(&actor_perm, &target_perm).inspect_err(|_| {
			warn!(
				actor = %actor,
				target = %target,
				path = %DisplayPath(path),
				actor_perm = ?actor_perm,
				target_perm = ?target_perm,
				"permission change denied"
			);
		})
	}

	// User levels
	//*************

	pub fn read_level(&self, state: &Value, user: &str) -> ClResult<Level> {
		self.levels().read_level(state, user)
	}

	pub fn list_levels(&self, state: &Value) -> ClResult<Vec<(String, Level)>> {
		self.levels().list_levels(state)
	}

	pub fn set_user_level(
		&self,
		actor: &str,
		state: &mut Value,
		target: &str,
		level: Level,
	) -> ClResult<()> {
		self.levels().set_level(actor, state, target, level)
	}

	/// Register the first root user of an empty registry
	pub fn bootstrap_root(&self, state: &mut Value, user: &str) -> ClResult<()> {
		self.levels().bootstrap_root(state, user)
	}

	// Permissions
	//*************

	/// Effective permission of `user` at `path`
	pub fn resolve_permission(
		&self,
		state: &Value,
		path: &[PathKey],
		user: &str,
	) -> ClResult<M::Perm> {
		self.resolver().resolve(state, path, user)
	}

	/// Replace the entry of `target` at `path`
	pub fn update_permissions(
		&self,
		actor: &str,
		state: &mut Value,
		path: &[PathKey],
		target: &str,
		grant: impl Into<Grant<M::Perm>>,
	) -> ClResult<()> {
		self.authorize_permission_change(actor, state, path, target)?;
		let grant = grant.into();
		self.tree().write_entry(state, path, target, &grant)?;
		info!(actor = %actor, target = %target, path = %DisplayPath(path), grant = ?grant, "permissions updated");
		Ok(())
	}

	/// Change one field of the entry stored for `target` at `path`.
	///
	/// Fields not touched stay as stored (or unset), and the important marker is kept.
	pub fn update_permission(
		&self,
		actor: &str,
		state: &mut Value,
		path: &[PathKey],
		target: &str,
		field: M::Field,
		value: M::FieldValue,
	) -> ClResult<()> {
		self.authorize_permission_change(actor, state, path, target)?;
		let mut grant = self
			.tree()
			.stored_entry(state, path, target)?
			.unwrap_or_else(|| Grant::new(self.model.unset()));
		self.model.set_field(&mut grant.perm, field, value.clone());
		self.tree().write_entry(state, path, target, &grant)?;
		info!(
			actor = %actor,
			target = %target,
			path = %DisplayPath(path),
			field = ?field,
			value = ?value,
			"permission updated"
		);
		Ok(())
	}

	// Data
	//******

	/// Create `name` under `path` and give the actor the model's creator permission on it
	pub fn create(
		&self,
		actor: &str,
		state: &mut Value,
		path: &[PathKey],
		name: impl Into<PathKey>,
		value: Value,
	) -> ClResult<()> {
		let target = ObjPath::from(path).child(name);
		self.tree().check_path(&target)?;
		self.authorize(actor, state, path, Operation::Create)?;

		let data_path = self.data_path(&target);
		if addressing::exists(state, &data_path) {
			warn!(actor = %actor, path = %target, "create on an existing object");
			return Err(Error::AlreadyExists);
		}

		// Validate both writes before the first one; data and permission tree never overlap
		let tree = self.tree();
		addressing::check_set(state, &data_path)?;
		tree.check_entry(state, &target, actor)?;
		let entry = serde_json::to_value(Grant::new(self.model.default_on_create()))?;

		addressing::set(state, &data_path, value)?;
		tree.put_entry(state, &target, actor, entry)?;
		debug!(actor = %actor, path = %target, "object created");
		Ok(())
	}

	/// Read a copy of the value at `path`.
	///
	/// Reading the state root never returns the reserved metadata keys.
	pub fn read(&self, actor: &str, state: &Value, path: &[PathKey]) -> ClResult<Value> {
		self.authorize(actor, state, path, Operation::Read)?;
		let value = addressing::require(state, &self.data_path(path))?;
		match value {
			Value::Object(map) if path.is_empty() && self.config.object_key.is_none() => Ok(
				Value::Object(
					map.iter()
						.filter(|(key, _)| !self.is_reserved_root_key(key))
						.map(|(key, val)| (key.clone(), val.clone()))
						.collect(),
				),
			),
			_ => Ok(value.clone()),
		}
	}

	/// Overwrite the existing value at `path`
	pub fn update(
		&self,
		actor: &str,
		state: &mut Value,
		path: &[PathKey],
		value: Value,
	) -> ClResult<()> {
		self.authorize(actor, state, path, Operation::Update)?;
		if path.is_empty() && self.config.object_key.is_none() {
			return self.replace_root_data(state, value);
		}
		let slot = addressing::get_mut(state, &self.data_path(path)).ok_or(Error::NotFound)?;
		*slot = value;
		debug!(actor = %actor, path = %DisplayPath(path), "object updated");
		Ok(())
	}

	/// Replace all data fields at the state root, keeping the metadata keys
	fn replace_root_data(&self, state: &mut Value, value: Value) -> ClResult<()> {
		let Value::Object(mut data) = value else {
			return Err(Error::InvalidPath("data at the state root must be an object".into()));
		};
		if data.keys().any(|key| self.is_reserved_root_key(key)) {
			return Err(Error::IllegalAccess);
		}
		match state {
			Value::Object(map) => {
				map.retain(|key, _| self.is_reserved_root_key(key));
				map.append(&mut data);
			}
			other => *other = Value::Object(data),
		}
		debug!("root data replaced");
		Ok(())
	}

	/// Remove the subtree at `path` together with its permission entries
	pub fn delete(&self, actor: &str, state: &mut Value, path: &[PathKey]) -> ClResult<Value> {
		if path.is_empty() {
			return Err(Error::InvalidPath("cannot delete the root".into()));
		}
		self.authorize(actor, state, path, Operation::Delete)?;
		let removed = addressing::delete(state, &self.data_path(path))?;
		let index = match &removed {
			Removed::Element { index, .. } => Some(*index),
			Removed::Field(_) => None,
		};
		self.tree().remove_subtree(state, path, index);
		debug!(actor = %actor, path = %DisplayPath(path), "object deleted");
		Ok(removed.into_value())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::{CapabilityModel, CapabilitySet, Rank, RankField, RankModel, RankPerm};
	use objperm_types::objpath;
	use serde_json::json;

	const ROOT: &str = "ROOT";
	const U1: &str = "U1";
	const U2: &str = "U2";

	fn engine() -> PermEngine<CapabilityModel> {
		PermEngine::new(CapabilityModel)
	}

	/// Root user registered, wildcard may read and create everywhere
	fn open_state() -> Value {
		json!({
			"__usr": {"ROOT": 0, "U1": 1, "U2": 1},
			"__permissions": {"__permissions": {"*": {"read": true, "create": true}}},
			"entities": {}
		})
	}

	#[test]
	fn test_root_bypasses_checks() {
		let engine = engine();
		let mut state = json!({"__usr": {"ROOT": 0}, "secret": {"a": 1}});
		assert_eq!(engine.read(ROOT, &state, &objpath!["secret", "a"]), Ok(json!(1)));
		assert_eq!(engine.update(ROOT, &mut state, &objpath!["secret", "a"], json!(2)), Ok(()));
		assert_eq!(engine.create(ROOT, &mut state, &objpath!["secret"], "b", json!(3)), Ok(()));
		assert_eq!(engine.delete(ROOT, &mut state, &objpath!["secret", "a"]), Ok(json!(2)));
		assert_eq!(
			engine.update_permissions(ROOT, &mut state, &objpath!["secret"], ROOT, CapabilitySet::NONE),
			Ok(())
		);
		assert_eq!(engine.read(ROOT, &state, &objpath!["secret"]), Ok(json!({"b": 3})));
	}

	#[test]
	fn test_default_deny() {
		let engine = engine();
		let mut state = json!({"data": {"x": 1}});
		assert_eq!(engine.resolve_permission(&state, &objpath!["data"], U1), Ok(CapabilitySet::NONE));
		assert_eq!(engine.read(U1, &state, &objpath!["data"]), Err(Error::PermissionDenied));
		assert_eq!(
			engine.update(U1, &mut state, &objpath!["data", "x"], json!(2)),
			Err(Error::PermissionDenied)
		);
		assert_eq!(
			engine.create(U1, &mut state, &objpath!["data"], "y", json!(2)),
			Err(Error::PermissionDenied)
		);
		assert_eq!(engine.delete(U1, &mut state, &objpath!["data"]), Err(Error::PermissionDenied));
		assert_eq!(state, json!({"data": {"x": 1}}));
	}

	#[test]
	fn test_creator_gets_full_control() {
		let engine = engine();
		let mut state = open_state();
		assert_eq!(engine.create(U1, &mut state, &objpath!["entities"], "e1", json!({"speed": 1})), Ok(()));
		assert_eq!(
			engine.resolve_permission(&state, &objpath!["entities", "e1"], U1),
			Ok(CapabilitySet::ALL)
		);
		assert_eq!(
			state["__permissions"]["entities"]["e1"]["__permissions"][U1],
			serde_json::to_value(CapabilitySet::ALL).unwrap_or_default()
		);
		assert_eq!(engine.update(U1, &mut state, &objpath!["entities", "e1", "speed"], json!(5)), Ok(()));
		assert_eq!(engine.read(U2, &state, &objpath!["entities", "e1", "speed"]), Ok(json!(5)));
		assert_eq!(
			engine.update(U2, &mut state, &objpath!["entities", "e1", "speed"], json!(6)),
			Err(Error::PermissionDenied)
		);
	}

	#[test]
	fn test_create_never_overwrites() {
		let engine = engine();
		let mut state = open_state();
		assert_eq!(engine.create(U1, &mut state, &objpath!["entities"], "e1", json!(1)), Ok(()));
		let before = state.clone();
		assert_eq!(
			engine.create(U2, &mut state, &objpath!["entities"], "e1", json!(2)),
			Err(Error::AlreadyExists)
		);
		assert_eq!(
			engine.create(ROOT, &mut state, &objpath!["entities"], "e1", json!(3)),
			Err(Error::AlreadyExists)
		);
		assert_eq!(state, before);
	}

	#[test]
	fn test_create_rejects_reserved_name() {
		let engine = engine();
		let mut state = open_state();
		assert_eq!(
			engine.create(ROOT, &mut state, &objpath![], "__permissions", json!({})),
			Err(Error::IllegalAccess)
		);
		assert_eq!(
			engine.create(U1, &mut state, &objpath![], "__usr", json!({"U1": 0})),
			Err(Error::IllegalAccess)
		);
		assert_eq!(engine.read(ROOT, &state, &objpath!["__usr"]), Err(Error::IllegalAccess));
		assert_eq!(state, open_state());
	}

	#[test]
	fn test_create_failed_write_leaves_state() {
		let engine = engine();
		let mut state = open_state();
		state["entities"] = json!("scalar");
		let before = state.clone();
		let res = engine.create(U1, &mut state, &objpath!["entities", "x"], "y", json!(1));
		assert!(matches!(res, Err(Error::InvalidPath(_))));
		assert_eq!(state, before);
	}

	#[test]
	fn test_create_blocked_permission_tree_leaves_state() {
		let engine = engine();
		let mut state = json!({"__usr": {"ROOT": 0}, "__permissions": {"a": 5}});
		let before = state.clone();
		let res = engine.create(ROOT, &mut state, &objpath!["a", "b"], "c", json!(1));
		assert!(matches!(res, Err(Error::InvalidPath(_))));
		assert_eq!(state, before);
	}

	#[test]
	fn test_create_past_array_end() {
		let engine = engine();
		let mut state = json!({"__usr": {"ROOT": 0}, "l": []});
		let before = state.clone();
		for idx in [1, 1 << 40, usize::MAX] {
			let res = engine.create(ROOT, &mut state, &objpath!["l"], idx, json!(1));
			assert!(matches!(res, Err(Error::InvalidPath(_))), "index {}", idx);
		}
		assert_eq!(state, before);
		assert_eq!(engine.create(ROOT, &mut state, &objpath!["l"], 0_usize, json!(1)), Ok(()));
		assert_eq!(state["l"], json!([1]));
	}

	#[test]
	fn test_read_and_update_missing() {
		let engine = engine();
		let mut state = open_state();
		assert_eq!(engine.read(U1, &state, &objpath!["entities", "nope"]), Err(Error::NotFound));
		assert_eq!(
			engine.update(ROOT, &mut state, &objpath!["entities", "nope"], json!(1)),
			Err(Error::NotFound)
		);
		assert_eq!(engine.delete(ROOT, &mut state, &objpath!["entities", "nope"]), Err(Error::NotFound));
	}

	#[test]
	fn test_read_root_hides_metadata() {
		let engine = engine();
		let state = open_state();
		assert_eq!(engine.read(U1, &state, &objpath![]), Ok(json!({"entities": {}})));
	}

	#[test]
	fn test_update_root_keeps_metadata() {
		let engine = engine();
		let mut state = open_state();
		let res = engine.update(ROOT, &mut state, &objpath![], json!({"serverTime": 100}));
		assert_eq!(res, Ok(()));
		assert_eq!(state["serverTime"], json!(100));
		assert_eq!(state.get("entities"), None);
		assert_eq!(state["__usr"], open_state()["__usr"]);
		assert_eq!(
			engine.update(ROOT, &mut state, &objpath![], json!({"__usr": {}})),
			Err(Error::IllegalAccess)
		);
		assert!(matches!(
			engine.update(ROOT, &mut state, &objpath![], json!(5)),
			Err(Error::InvalidPath(_))
		));
	}

	#[test]
	fn test_delete_prunes_permissions() {
		let engine = engine();
		let mut state = open_state();
		assert_eq!(engine.create(U1, &mut state, &objpath!["entities"], "e1", json!({"a": 1})), Ok(()));
		assert_eq!(engine.delete(U1, &mut state, &objpath!["entities", "e1"]), Ok(json!({"a": 1})));
		assert_eq!(state["__permissions"]["entities"], json!({}));

		// A new owner of the same name does not inherit the old creator's rights
		assert_eq!(engine.create(U2, &mut state, &objpath!["entities"], "e1", json!(2)), Ok(()));
		assert_eq!(
			engine.update(U1, &mut state, &objpath!["entities", "e1"], json!(3)),
			Err(Error::PermissionDenied)
		);
	}

	#[test]
	fn test_delete_array_element_realigns_permissions() {
		let engine = engine();
		let mut state = open_state();
		assert_eq!(engine.create(U1, &mut state, &objpath!["entities"], "list", json!([])), Ok(()));
		for (idx, user) in [U1, U2, U1].into_iter().enumerate() {
			assert_eq!(
				engine.create(user, &mut state, &objpath!["entities", "list"], idx, json!(idx)),
				Ok(())
			);
		}
		assert_eq!(engine.delete(U1, &mut state, &objpath!["entities", "list", 0]), Ok(json!(0)));
		assert_eq!(state["entities"]["list"], json!([1, 2]));
		// Element 0 is now U2's
		let perm = engine.resolve_permission(&state, &objpath!["entities", "list", 0], U2);
		assert_eq!(perm, Ok(CapabilitySet::ALL));
		let perm = engine.resolve_permission(&state, &objpath!["entities", "list", 1], U1);
		assert_eq!(perm, Ok(CapabilitySet::ALL));
	}

	#[test]
	fn test_delete_root_rejected() {
		let engine = engine();
		let mut state = open_state();
		assert!(matches!(engine.delete(ROOT, &mut state, &objpath![]), Err(Error::InvalidPath(_))));
	}

	#[test]
	fn test_escalation_guard() {
		let engine = engine();
		let mut state = open_state();
		assert_eq!(engine.create(U1, &mut state, &objpath!["entities"], "e1", json!(1)), Ok(()));
		assert_eq!(
			engine.update_permissions(ROOT, &mut state, &objpath!["entities", "e1"], U2, CapabilitySet::ALL),
			Ok(())
		);
		// Both manage permissions at e1, neither can touch the other
		assert_eq!(
			engine.update_permissions(U1, &mut state, &objpath!["entities", "e1"], U2, CapabilitySet::NONE),
			Err(Error::PermissionDenied)
		);
		assert_eq!(
			engine.update_permission(
				U2,
				&mut state,
				&objpath!["entities", "e1"],
				U1,
				Operation::Read,
				false
			),
			Err(Error::PermissionDenied)
		);
		// Root can
		assert_eq!(
			engine.update_permissions(ROOT, &mut state, &objpath!["entities", "e1"], U2, CapabilitySet::NONE),
			Ok(())
		);
	}

	#[test]
	fn test_update_permission_requires_right() {
		let engine = engine();
		let mut state = open_state();
		let res = engine.update_permission(U1, &mut state, &objpath!["entities"], U2, Operation::Read, false);
		assert_eq!(res, Err(Error::PermissionDenied));
		assert_eq!(state, open_state());
	}

	#[test]
	fn test_update_permission_keeps_other_fields() {
		let engine = engine();
		let mut state = open_state();
		let path = objpath!["entities"];
		let grant = Grant::important(CapabilitySet::EMPTY.with(Operation::Update, true));
		assert_eq!(engine.update_permissions(ROOT, &mut state, &path, U2, grant), Ok(()));
		assert_eq!(engine.update_permission(ROOT, &mut state, &path, U2, Operation::Read, false), Ok(()));
		assert_eq!(
			state["__permissions"]["entities"]["__permissions"][U2],
			json!({"read": false, "update": true, "!": true})
		);
		// Unset fields stay unset so the wildcard still supplies them
		assert_eq!(engine.update_permission(ROOT, &mut state, &path, U1, Operation::Delete, true), Ok(()));
		assert_eq!(
			engine.resolve_permission(&state, &path, U1),
			Ok(CapabilitySet::EMPTY
				.with(Operation::Read, true)
				.with(Operation::Create, true)
				.with(Operation::Delete, true))
		);
	}

	#[test]
	fn test_set_user_level() {
		let engine = engine();
		let mut state = open_state();
		assert_eq!(engine.set_user_level(U1, &mut state, U2, Level::ROOT), Err(Error::PermissionDenied));
		assert_eq!(engine.set_user_level(ROOT, &mut state, U2, Level::ROOT), Ok(()));
		assert_eq!(engine.read_level(&state, U2), Ok(Level::ROOT));
		assert_eq!(engine.delete(U2, &mut state, &objpath!["entities"]), Ok(json!({})));
	}

	#[test]
	fn test_object_namespace() -> ClResult<()> {
		let config = EngineConfig::builder().object_key("obj").build()?;
		let engine = PermEngine::with_config(CapabilityModel, config)?;
		let mut state = json!({"__usr": {"ROOT": 0}});
		assert_eq!(engine.create(ROOT, &mut state, &objpath![], "__usr", json!(1)), Ok(()));
		assert_eq!(engine.create(ROOT, &mut state, &objpath![], "doc", json!({"t": "x"})), Ok(()));
		assert_eq!(state["obj"], json!({"__usr": 1, "doc": {"t": "x"}}));
		assert_eq!(state["__usr"], json!({"ROOT": 0}));
		assert_eq!(engine.read(ROOT, &state, &objpath![]), Ok(json!({"__usr": 1, "doc": {"t": "x"}})));
		assert_eq!(engine.resolve_permission(&state, &objpath!["doc"], ROOT), Ok(CapabilitySet::ALL));
		Ok(())
	}

	#[test]
	fn test_model_mismatch() {
		let config = EngineConfig { model: Some("rank".into()), ..EngineConfig::default() };
		assert!(matches!(
			PermEngine::with_config(CapabilityModel, config.clone()),
			Err(Error::InvalidConfig(_))
		));
		assert!(PermEngine::with_config(RankModel, config).is_ok());
	}

	#[test]
	fn test_rank_engine() {
		let engine = PermEngine::new(RankModel);
		let mut state = json!({
			"__usr": {"ROOT": 0},
			"__permissions": {"__permissions": {"*": {"lvl": "owner"}}}
		});
		assert_eq!(engine.create(U1, &mut state, &objpath![], "doc", json!("v1")), Ok(()));
		assert_eq!(
			engine.update_permissions(U1, &mut state, &objpath!["doc"], "*", RankPerm::from(Rank::Viewer)),
			Err(Error::PermissionDenied)
		);
		assert_eq!(
			engine.update_permission(ROOT, &mut state, &objpath!["doc"], U2, RankField::Level, Rank::Editor),
			Ok(())
		);
		assert_eq!(engine.update(U2, &mut state, &objpath!["doc"], json!("v2")), Ok(()));
		assert_eq!(engine.delete(U2, &mut state, &objpath!["doc"]), Err(Error::PermissionDenied));
		assert_eq!(engine.delete(U1, &mut state, &objpath!["doc"]), Ok(json!("v2")));
	}
}

// vim: ts=4
