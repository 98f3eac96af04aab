pub use crate::error::{ClResult, Error};
pub use crate::path::{DisplayPath, ObjPath, PathKey};
pub use crate::perm_model::{Grant, PermissionModel};
pub use crate::types::{Level, Operation};

pub use tracing::{debug, error, info, trace, warn};

// vim: ts=4
