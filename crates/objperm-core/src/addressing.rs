//! Path addressing over JSON trees
//!
//! Structural get/set/delete by key sequence. No permission checks happen here.
//! - String keys address object fields, index keys address array elements
//! - An index key on an object uses its decimal form as field name
//! - A digit-only string key on an array is accepted as an index
//! - `set` materializes missing intermediate nodes as objects (`null` counts as missing)

use serde_json::{Map, Value};

use crate::prelude::*;

/// What `delete` removed
#[derive(Debug, Clone, PartialEq)]
pub enum Removed {
	/// Object field
	Field(Value),
	/// Array element; later elements shifted down by one
	Element { index: usize, value: Value },
}

impl Removed {
	pub fn into_value(self) -> Value {
		match self {
			Removed::Field(value) | Removed::Element { value, .. } => value,
		}
	}
}

fn child<'a>(node: &'a Value, key: &PathKey) -> Option<&'a Value> {
	match node {
		Value::Object(map) => map.get(key.as_key().as_ref()),
		Value::Array(arr) => key.as_index().and_then(|idx| arr.get(idx)),
		_ => None,
	}
}

fn child_mut<'a>(node: &'a mut Value, key: &PathKey) -> Option<&'a mut Value> {
	match node {
		Value::Object(map) => map.get_mut(key.as_key().as_ref()),
		Value::Array(arr) => key.as_index().and_then(|idx| arr.get_mut(idx)),
		_ => None,
	}
}

pub fn get<'a>(root: &'a Value, path: &[PathKey]) -> Option<&'a Value> {
	path.iter().try_fold(root, child)
}

pub fn get_mut<'a>(root: &'a mut Value, path: &[PathKey]) -> Option<&'a mut Value> {
	path.iter().try_fold(root, child_mut)
}

pub fn exists(root: &Value, path: &[PathKey]) -> bool {
	get(root, path).is_some()
}

/// Like [`get`], failing with `NotFound`
pub fn require<'a>(root: &'a Value, path: &[PathKey]) -> ClResult<&'a Value> {
	get(root, path).ok_or(Error::NotFound)
}

fn array_index(key: &PathKey, path: &[PathKey]) -> ClResult<usize> {
	key.as_index().ok_or_else(|| {
		Error::InvalidPath(format!("'{}': key '{}' addresses an array", DisplayPath(path), key))
	})
}

fn scalar_error(path: &[PathKey]) -> Error {
	Error::InvalidPath(format!("'{}' traverses a scalar value", DisplayPath(path)))
}

fn out_of_range(path: &[PathKey], idx: usize, len: usize) -> Error {
	Error::InvalidPath(format!("'{}': index {} is past the end of an array of {}", DisplayPath(path), idx, len))
}

/// Check that [`set`] at `path` would succeed, without changing anything
pub fn check_set(root: &Value, path: &[PathKey]) -> ClResult<()> {
	let mut node = root;
	for key in path {
		let next = match node {
			// Materialized as objects from here on
			Value::Null => return Ok(()),
			Value::Object(map) => map.get(key.as_key().as_ref()),
			Value::Array(arr) => {
				let idx = array_index(key, path)?;
				if idx > arr.len() {
					return Err(out_of_range(path, idx, arr.len()));
				}
				arr.get(idx)
			}
			_ => return Err(scalar_error(path)),
		};
		match next {
			Some(next) => node = next,
			None => return Ok(()),
		}
	}
	Ok(())
}

fn child_or_insert<'a>(
	node: &'a mut Value,
	key: &PathKey,
	path: &[PathKey],
) -> ClResult<&'a mut Value> {
	if node.is_null() {
		*node = Value::Object(Map::new());
	}
	let slot = match node {
		Value::Object(map) => map.entry(key.as_key().into_owned()).or_insert(Value::Null),
		Value::Array(arr) => {
			let idx = array_index(key, path)?;
			let len = arr.len();
			if idx == len {
				arr.push(Value::Null);
			}
			arr.get_mut(idx).ok_or_else(|| out_of_range(path, idx, len))?
		}
		_ => return Err(scalar_error(path)),
	};
	if slot.is_null() {
		*slot = Value::Object(Map::new());
	}
	Ok(slot)
}

/// Set the value at `path`, creating intermediate objects as needed.
///
/// An empty path replaces the root. Writing to an array at index `len` appends;
/// any index past that fails with `InvalidPath`. Nothing is changed on failure.
pub fn set(root: &mut Value, path: &[PathKey], value: Value) -> ClResult<()> {
	let Some((last, parents)) = path.split_last() else {
		*root = value;
		return Ok(());
	};
	check_set(root, path)?;

	let mut node = root;
	for key in parents {
		node = child_or_insert(node, key, path)?;
	}

	if node.is_null() {
		*node = Value::Object(Map::new());
	}
	match node {
		Value::Object(map) => {
			map.insert(last.as_key().into_owned(), value);
			Ok(())
		}
		Value::Array(arr) => {
			let idx = array_index(last, path)?;
			let len = arr.len();
			if idx == len {
				arr.push(value);
			} else {
				*arr.get_mut(idx).ok_or_else(|| out_of_range(path, idx, len))? = value;
			}
			Ok(())
		}
		_ => Err(scalar_error(path)),
	}
}

/// Remove the node at `path`.
///
/// Fails with `NotFound` if absent and with `InvalidPath` for the root path.
pub fn delete(root: &mut Value, path: &[PathKey]) -> ClResult<Removed> {
	let Some((last, parents)) = path.split_last() else {
		return Err(Error::InvalidPath("cannot delete the root".into()));
	};
	match get_mut(root, parents) {
		Some(Value::Object(map)) => {
			map.remove(last.as_key().as_ref()).map(Removed::Field).ok_or(Error::NotFound)
		}
		Some(Value::Array(arr)) => match last.as_index() {
			Some(index) if index < arr.len() => {
				Ok(Removed::Element { index, value: arr.remove(index) })
			}
			_ => Err(Error::NotFound),
		},
		_ => Err(Error::NotFound),
	}
}


// vim: ts=4
