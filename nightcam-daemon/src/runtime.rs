use std::sync::Arc;

use tokio::net::TcpListener;

use nightcam_core::{LogFormat, Settings};
use nightcam_switch::{DriftSignal, Orchestrator, Systemctl};

use crate::api::{router, ApiState};
use crate::error::{io_err, DaemonError};

/// Initialise tracing, start a tokio runtime and block until the server exits.
pub fn start_blocking(settings: Settings) -> Result<(), DaemonError> {
    init_tracing(settings.log_format);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(settings))
}

/// Bind the listen address and serve the control API with the real service manager.
pub async fn run(settings: Settings) -> Result<(), DaemonError> {
    let controller = Arc::new(Systemctl::new(settings.use_sudo, settings.restart_timeout()));
    let orchestrator = Arc::new(Orchestrator::from_settings(&settings, controller)?);
    report_drift(&orchestrator);

    let addr = settings.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| io_err(&addr, e))?;
    tracing::info!(
        %addr,
        config = %settings.config_path.display(),
        service = %settings.service,
        "control API listening",
    );

    serve(listener, ApiState::new(orchestrator, &settings)).await
}

/// Serve on an already-bound listener until ctrl-c or SIGTERM.
pub async fn serve(listener: TcpListener, state: ApiState) -> Result<(), DaemonError> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| DaemonError::Server(e.to_string()))?;
    tracing::info!("control API stopped");
    Ok(())
}

/// The advertised mode always starts at day; warn when the file says otherwise.
fn report_drift(orchestrator: &Orchestrator) {
    match orchestrator.drift() {
        Ok(DriftSignal::Current) => {}
        Ok(DriftSignal::Missing) => tracing::info!(
            path = %orchestrator.store().path().display(),
            "no config on disk yet; it will be written on the first mode change",
        ),
        Ok(DriftSignal::Drifted { expected, actual }) => tracing::warn!(
            path = %orchestrator.store().path().display(),
            mode = %orchestrator.mode(),
            %expected,
            %actual,
            "config on disk does not match the advertised mode",
        ),
        Err(err) => tracing::warn!(error = %err, "drift check failed"),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "ctrl-c handler failed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "SIGTERM handler failed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl-c, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the default `info` filter.
pub fn init_tracing(format: LogFormat) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter).with_target(false);
    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
