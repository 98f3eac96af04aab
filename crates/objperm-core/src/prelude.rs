pub use objperm_types::prelude::*;

// vim: ts=4
