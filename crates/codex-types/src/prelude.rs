pub use crate::error::{CxResult, Error};
pub use crate::types::{ContentId, OverrideId, Timestamp, UserId, UserIdentity};

pub use tracing::{debug, error, info, warn};

// vim: ts=4
