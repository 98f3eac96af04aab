//! Error types shared by every objperm crate.

pub type ClResult<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
	/// Resolved permission is insufficient, the escalation guard tripped,
	/// or a non-root user attempted a root-only operation
	PermissionDenied,
	/// Create on an occupied path
	AlreadyExists,
	/// Read, update or delete on an absent path
	NotFound,
	/// A normal path reached into the permission or user namespace
	IllegalAccess,
	/// Structural addressing failure (e.g. traversing through a scalar)
	InvalidPath(String),
	InvalidConfig(String),
	/// Stored permission metadata failed to (de)serialize
	Json(String),
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Error::PermissionDenied => write!(f, "permission denied"),
			Error::AlreadyExists => write!(f, "object already exists"),
			Error::NotFound => write!(f, "not found"),
			Error::IllegalAccess => write!(f, "illegal access to reserved namespace"),
			Error::InvalidPath(msg) => write!(f, "invalid path: {}", msg),
			Error::InvalidConfig(msg) => write!(f, "invalid config: {}", msg),
			Error::Json(msg) => write!(f, "json error: {}", msg),
		}
	}
}

impl std::error::Error for Error {}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Self::Json(err.to_string())
	}
}


// vim: ts=4
