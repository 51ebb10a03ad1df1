pub use codex_types::prelude::*;

// vim: ts=4
