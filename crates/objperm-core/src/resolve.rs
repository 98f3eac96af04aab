//! Effective permission resolution
//!
//! Walks the permission tree from the root along a path, one node per segment:
//! 1. At each node the wildcard entry and the user's own entry are combined
//!    (the user's entry wins unless the wildcard entry is important)
//! 2. The node's result is combined with the result resolved for the rest of
//!    the path (the node wins only if important, otherwise the deeper result
//!    is overlaid on it)
//! 3. A missing tree node ends the walk; the permission inherited so far applies
//!
//! Nothing found anywhere resolves to the model's `none()` value.

use serde_json::Value;

use crate::config::EngineConfig;
use crate::perm_tree::PermTree;
use crate::prelude::*;

/// Resolver bound to a model and a config
pub struct Resolver<'a, M: PermissionModel> {
	model: &'a M,
	config: &'a EngineConfig,
	tree: PermTree<'a>,
}

impl<'a, M: PermissionModel> Resolver<'a, M> {
	pub fn new(model: &'a M, config: &'a EngineConfig) -> Self {
		Self { model, config, tree: PermTree::new(config) }
	}

	/// Effective permission of `user` at `path`
	pub fn resolve(&self, state: &Value, path: &[PathKey], user: &str) -> ClResult<M::Perm> {
		Ok(self.resolve_grant(state, path, user)?.map_or_else(|| self.model.none(), |g| g.perm))
	}

	/// Effective entry of `user` at `path`, `None` if no entry applies
	pub fn resolve_grant(
		&self,
		state: &Value,
		path: &[PathKey],
		user: &str,
	) -> ClResult<Option<Grant<M::Perm>>> {
		self.tree.check_path(path)?;
		let Some(root) = self.tree.root(state) else {
			trace!(user = %user, path = %DisplayPath(path), "no permission tree");
			return Ok(None);
		};
		self.resolve_node(root, path, user, 0)
	}

	fn resolve_node(
		&self,
		node: &Value,
		path: &[PathKey],
		user: &str,
		depth: usize,
	) -> ClResult<Option<Grant<M::Perm>>> {
		let local = self.local_grant(node, user)?;
		trace!(user = %user, depth = depth, local = ?local, "resolve level");

		let Some((head, rest)) = path.split_first() else {
			return Ok(local);
		};
		let Some(child) = self.tree.child(node, head) else {
			return Ok(local);
		};
		let deeper = self.resolve_node(child, rest, user, depth + 1)?;
		Ok(self.combine(local, deeper))
	}

	/// Wildcard entry combined with the user's own entry at one node
	fn local_grant(&self, node: &Value, user: &str) -> ClResult<Option<Grant<M::Perm>>> {
		let wildcard = self.tree.read_entry(node, &self.config.wildcard)?;
		let own = if user == self.config.wildcard { None } else { self.tree.read_entry(node, user)? };
		Ok(self.combine(wildcard, own))
	}

	fn combine(
		&self,
		outer: Option<Grant<M::Perm>>,
		inner: Option<Grant<M::Perm>>,
	) -> Option<Grant<M::Perm>> {
		match outer {
			Some(outer) => Some(self.model.combine(&outer, inner.as_ref())),
			None => inner,
		}
	}
}


// vim: ts=4
