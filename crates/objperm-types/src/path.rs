//! Path keys and owned paths into a state tree.
//!
//! A path is an ordered sequence of keys. String keys address mapping fields,
//! index keys address sequence elements. The textual form joins keys with `/`
//! (e.g. `entities/abc/0`); all-digit segments parse as indices.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use crate::error::{ClResult, Error};

/// A single path segment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathKey {
	Index(usize),
	Key(String),
}

impl PathKey {
	/// Sequence index addressed by this key, if any.
	///
	/// String keys consisting only of digits are accepted as indices.
	pub fn as_index(&self) -> Option<usize> {
		match self {
			PathKey::Index(idx) => Some(*idx),
			PathKey::Key(key) => parse_index(key),
		}
	}

	/// Mapping key addressed by this key (indices use their decimal form)
	pub fn as_key(&self) -> std::borrow::Cow<'_, str> {
		match self {
			PathKey::Index(idx) => std::borrow::Cow::Owned(idx.to_string()),
			PathKey::Key(key) => std::borrow::Cow::Borrowed(key),
		}
	}

	/// Check if this key equals the given mapping key
	pub fn is_key(&self, key: &str) -> bool {
		matches!(self, PathKey::Key(k) if k == key)
	}
}

fn parse_index(key: &str) -> Option<usize> {
	if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
		return None;
	}
	key.parse().ok()
}

impl fmt::Display for PathKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PathKey::Index(idx) => write!(f, "{}", idx),
			PathKey::Key(key) => write!(f, "{}", key),
		}
	}
}

impl From<&str> for PathKey {
	fn from(key: &str) -> Self {
		PathKey::Key(key.to_string())
	}
}

impl From<String> for PathKey {
	fn from(key: String) -> Self {
		PathKey::Key(key)
	}
}

impl From<&String> for PathKey {
	fn from(key: &String) -> Self {
		PathKey::Key(key.clone())
	}
}

impl From<usize> for PathKey {
	fn from(idx: usize) -> Self {
		PathKey::Index(idx)
	}
}

// Integer literals default to i32
impl From<i32> for PathKey {
	fn from(idx: i32) -> Self {
		usize::try_from(idx).map_or_else(|_| PathKey::Key(idx.to_string()), PathKey::Index)
	}
}

/// Owned path into a state tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjPath(Vec<PathKey>);

impl ObjPath {
	/// The empty path, addressing the tree root
	pub fn root() -> Self {
		Self(Vec::new())
	}

	/// New path with `key` appended
	pub fn child(&self, key: impl Into<PathKey>) -> Self {
		let mut keys = Vec::with_capacity(self.0.len() + 1);
		keys.extend_from_slice(&self.0);
		keys.push(key.into());
		Self(keys)
	}

	/// New path with all keys of `other` appended
	pub fn join(&self, other: &[PathKey]) -> Self {
		self.0.iter().chain(other).cloned().collect()
	}

	pub fn parent(&self) -> Option<ObjPath> {
		self.split_last().map(|(parent, _)| parent)
	}

	/// Parent path and last key, or None for the root path
	pub fn split_last(&self) -> Option<(ObjPath, &PathKey)> {
		self.0.split_last().map(|(last, init)| (ObjPath(init.to_vec()), last))
	}
}

impl Deref for ObjPath {
	type Target = [PathKey];

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl AsRef<[PathKey]> for ObjPath {
	fn as_ref(&self) -> &[PathKey] {
		&self.0
	}
}

impl From<Vec<PathKey>> for ObjPath {
	fn from(keys: Vec<PathKey>) -> Self {
		Self(keys)
	}
}

impl From<&[PathKey]> for ObjPath {
	fn from(keys: &[PathKey]) -> Self {
		Self(keys.to_vec())
	}
}

impl FromIterator<PathKey> for ObjPath {
	fn from_iter<I: IntoIterator<Item = PathKey>>(iter: I) -> Self {
		Self(iter.into_iter().collect())
	}
}

impl<'a> IntoIterator for &'a ObjPath {
	type Item = &'a PathKey;
	type IntoIter = std::slice::Iter<'a, PathKey>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}

impl fmt::Display for ObjPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt_path(&self.0, f)
	}
}

/// `Display` adapter for borrowed paths
pub struct DisplayPath<'a>(pub &'a [PathKey]);

impl fmt::Display for DisplayPath<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt_path(self.0, f)
	}
}

fn fmt_path(keys: &[PathKey], f: &mut fmt::Formatter<'_>) -> fmt::Result {
	for (i, key) in keys.iter().enumerate() {
		if i > 0 {
			f.write_str("/")?;
		}
		write!(f, "{}", key)?;
	}
	Ok(())
}

impl FromStr for ObjPath {
	type Err = Error;

	fn from_str(s: &str) -> ClResult<Self> {
		let trimmed = s.trim_matches('/');
		if trimmed.is_empty() {
			return Ok(Self::root());
		}
		trimmed
			.split('/')
			.map(|seg| {
				if seg.is_empty() {
					return Err(Error::InvalidPath(format!("empty segment in '{}'", s)));
				}
				Ok(parse_index(seg).map_or_else(|| PathKey::Key(seg.to_string()), PathKey::Index))
			})
			.collect::<ClResult<Vec<_>>>()
			.map(ObjPath)
	}
}

/// Build an [`ObjPath`] from string and integer keys
///
/// ```
/// use objperm_types::objpath;
/// let path = objpath!["entities", "abc", 0];
/// assert_eq!(path.to_string(), "entities/abc/0");
/// ```
#[macro_export]
macro_rules! objpath {
	() => {
		$crate::path::ObjPath::root()
	};
	($($key:expr),+ $(,)?) => {
		$crate::path::ObjPath::from(vec![$($crate::path::PathKey::from($key)),+])
	};
}


// vim: ts=4
