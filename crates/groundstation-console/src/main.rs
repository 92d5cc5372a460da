mod bootstrap;

use anyhow::{Context, Result};
use console_core::settings::Settings;
use console_runtime::session::SessionOptions;
use console_runtime::simulator::{SimProfile, TelemetrySimulator};
use console_ui::app::{restore_terminal, App};
use console_ui::pages::Page;

#[tokio::main]
async fn main() -> Result<()> {
    // Logging comes up first so warnings about last-used params are kept.
    let cli = Settings::parse_cli();
    bootstrap::ensure_directories()?;
    let log_path = bootstrap::setup_logging(&cli.log_level, cli.log_file.as_ref())?;

    let settings = Settings::load_with_last_used();

    tracing::info!("Ground Station Console v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        log = %log_path.display(),
        theme = %settings.theme,
        page = %settings.page,
        reconnect = %settings.reconnect,
        "settings loaded"
    );

    // The simulator binds an ephemeral port, so it decides the endpoint.
    let simulator = if settings.simulate {
        let sim = TelemetrySimulator::bind(
            "127.0.0.1:0",
            settings.sim_interval(),
            SimProfile::from_name(&settings.sim_profile),
        )
        .await
        .context("failed to start telemetry simulator")?;
        let endpoint = sim.endpoint().context("simulator has no local address")?;
        Some((endpoint, sim.spawn()))
    } else {
        None
    };

    let endpoint = match &simulator {
        Some((endpoint, _)) => endpoint.clone(),
        None => settings.endpoint_url()?,
    };
    tracing::info!(endpoint = %endpoint, simulated = settings.simulate, "telemetry endpoint");

    let options = SessionOptions {
        reconnect: settings.reconnect_policy(),
        channel_capacity: settings.channel_capacity as usize,
    };
    let app = App::new(
        &settings.theme,
        Page::from_slug(&settings.page),
        endpoint,
        options,
    );

    // The loop exits on 'q' / Ctrl+C inside the TUI. The OS-level signal
    // covers the window before raw mode is enabled.
    let outcome = tokio::select! {
        result = app.run() => result.context("terminal UI failed"),
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received; shutting down");
            restore_terminal().context("failed to restore terminal")
        }
    };

    if let Some((_, handle)) = simulator {
        handle.abort();
    }
    tracing::info!("Ground Station Console stopped");
    outcome
}
