//! Permission tree storage
//!
//! The permission tree lives in the state under `config.perm_key` and mirrors the
//! data tree's shape with string keys only. Each node may hold an entry mapping
//! under the same `perm_key`, from user id (or the wildcard) to a serialized
//! [`Grant`]:
//!
//! ```text
//! { "__permissions": {
//!     "__permissions": { "*": { "read": true } },
//!     "entities": { "e1": { "__permissions": { "U1": { ...ALL } } } }
//! } }
//! ```

use itertools::Itertools;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::addressing;
use crate::config::EngineConfig;
use crate::prelude::*;

/// View of the permission tree inside a state value
#[derive(Clone, Copy)]
pub struct PermTree<'c> {
	config: &'c EngineConfig,
}

impl<'c> PermTree<'c> {
	pub fn new(config: &'c EngineConfig) -> Self {
		Self { config }
	}

	/// Reject paths that would reach into reserved namespaces.
	///
	/// A segment equal to the permission key would collide with a node's entry
	/// mapping; a leading user key would address the level registry when data
	/// shares the state root.
	pub fn check_path(&self, path: &[PathKey]) -> ClResult<()> {
		if path.iter().any(|key| key.is_key(&self.config.perm_key)) {
			return Err(Error::IllegalAccess);
		}
		if self.config.object_key.is_none()
			&& path.first().is_some_and(|key| key.is_key(&self.config.user_key))
		{
			return Err(Error::IllegalAccess);
		}
		Ok(())
	}

	/// Permission tree root node, if any entry was ever written
	pub fn root<'s>(&self, state: &'s Value) -> Option<&'s Value> {
		state.get(&self.config.perm_key)
	}

	fn node_path(&self, path: &[PathKey]) -> Vec<PathKey> {
		std::iter::once(PathKey::from(&self.config.perm_key))
			.chain(path.iter().map(|key| PathKey::Key(key.as_key().into_owned())))
			.collect()
	}

	fn entry_path(&self, path: &[PathKey], user: &str) -> Vec<PathKey> {
		let mut keys = self.node_path(path);
		keys.push(PathKey::from(&self.config.perm_key));
		keys.push(PathKey::from(user));
		keys
	}

	/// Child node of a tree node for the next path segment
	pub fn child<'s>(&self, node: &'s Value, key: &PathKey) -> Option<&'s Value> {
		node.get(key.as_key().as_ref())
	}

	/// Entry stored for `user` in a tree node
	pub fn read_entry<P: DeserializeOwned>(
		&self,
		node: &Value,
		user: &str,
	) -> ClResult<Option<Grant<P>>> {
		node.get(&self.config.perm_key)
			.and_then(|entries| entries.get(user))
			.map(|entry| Grant::deserialize(entry).map_err(Error::from))
			.transpose()
	}

	/// Entry stored for `user` exactly at `path` (no inheritance)
	pub fn stored_entry<P: DeserializeOwned>(
		&self,
		state: &Value,
		path: &[PathKey],
		user: &str,
	) -> ClResult<Option<Grant<P>>> {
		match addressing::get(state, &self.node_path(path)) {
			Some(node) => self.read_entry(node, user),
			None => Ok(None),
		}
	}

	pub fn write_entry<P: Serialize>(
		&self,
		state: &mut Value,
		path: &[PathKey],
		user: &str,
		grant: &Grant<P>,
	) -> ClResult<()> {
		self.put_entry(state, path, user, serde_json::to_value(grant)?)
	}

	/// Store an already serialized entry
	pub fn put_entry(&self, state: &mut Value, path: &[PathKey], user: &str, entry: Value) -> ClResult<()> {
		addressing::set(state, &self.entry_path(path, user), entry)
	}

	/// Check that an entry for `user` at `path` can be stored
	pub fn check_entry(&self, state: &Value, path: &[PathKey], user: &str) -> ClResult<()> {
		addressing::check_set(state, &self.entry_path(path, user))
	}

	/// Drop the tree node at `path` after its data node was deleted.
	///
	/// When the data node was an array element at `index`, nodes of later
	/// siblings are renumbered to follow the shift.
	pub fn remove_subtree(&self, state: &mut Value, path: &[PathKey], index: Option<usize>) {
		let Some((last, parents)) = path.split_last() else {
			return;
		};
		let Some(Value::Object(parent)) = addressing::get_mut(state, &self.node_path(parents))
		else {
			return;
		};
		parent.remove(last.as_key().as_ref());

		let Some(index) = index else {
			return;
		};
		let shifted: Vec<usize> = parent
			.keys()
			.filter(|key| **key != self.config.perm_key)
			.filter_map(|key| PathKey::from(key).as_index())
			.filter(|idx| *idx > index)
			.sorted_unstable()
			.collect();
		for idx in shifted {
			if let Some(node) = parent.remove(&idx.to_string()) {
				parent.insert((idx - 1).to_string(), node);
			}
		}
	}
}


// vim: ts=4
