//! Device Selection Shell
//!
//! Runs the device selector with the built-in selector log until Ctrl-C.

use dev_shell::{PluginRegistry, SelectorLog, ShellApp, ShellError, ShellSettings, DEFAULT_LOG_FILTER};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), ShellError> {
    let settings = ShellSettings::load();

    let default_filter = settings
        .log_filter
        .clone()
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting devshell");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let mut registry = PluginRegistry::new();
    registry.register(Box::new(SelectorLog::new()));

    runtime.block_on(ShellApp::new(settings, registry).run(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Unable to listen for Ctrl-C: {}", e);
        }
    }))
}
