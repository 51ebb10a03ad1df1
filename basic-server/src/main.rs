use std::sync::Arc;

use codex::logging::init_logging;
use codex::prelude::*;
use codex::{AppBuilder, Config};
use codex_perm_adapter_sqlite::PermAdapterSqlite;

async fn run() -> CxResult<()> {
	let config = Config::from_env().await?;
	init_logging(&config.log_filter)?;

	let perm_adapter = PermAdapterSqlite::new(config.db_path()).await?;

	let mut builder = AppBuilder::new();
	builder
		.config(config)
		.perm_adapter(Arc::new(perm_adapter))
		.plugins(codex_plugins::builtin_plugins());
	let app = builder.build().await?;

	for role in app.engine.roles().roles() {
		let user = UserIdentity::new(0, role.name);
		let perms = app.engine.effective_permissions(&user, None).await?;
		info!(role = role.name, count = perms.len(), "effective permissions: {:?}", perms);
	}
	for plugin in app.plugins.list().await? {
		info!(plugin = %plugin.name, enabled = plugin.enabled, loaded = plugin.loaded, "plugin");
	}

	info!("ready, press Ctrl-C to stop");
	tokio::signal::ctrl_c().await?;
	app.shutdown().await;
	Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> std::process::ExitCode {
	match run().await {
		Ok(()) => std::process::ExitCode::SUCCESS,
		Err(err) => {
			eprintln!("codex: {}", err);
			std::process::ExitCode::FAILURE
		}
	}
}

// vim: ts=4
