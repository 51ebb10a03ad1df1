//! Logging setup

use tracing_subscriber::EnvFilter;

use crate::prelude::*;

/// Install the global tracing subscriber. `RUST_LOG` overrides `default_filter`.
pub fn init_logging(default_filter: &str) -> CxResult<()> {
	let filter = match EnvFilter::try_from_default_env() {
		Ok(filter) => filter,
		Err(_) => EnvFilter::try_new(default_filter)
			.map_err(|err| Error::ConfigError(format!("invalid log filter {}: {}", default_filter, err)))?,
	};

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(false)
		.try_init()
		.map_err(|err| Error::Internal(format!("cannot install logger: {}", err)))
}

// vim: ts=4
