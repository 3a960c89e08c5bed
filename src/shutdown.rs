use crate::components::ComponentManager;
use crate::error::CalendarResult;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

/// Block until the process is asked to stop, tear the calendar down, then
/// release the main task
pub async fn handle_signals(
    shutdown_send: oneshot::Sender<()>,
    component_manager: Arc<ComponentManager>,
) {
    if let Err(e) = wait_for_signal().await {
        warn!("Signal handlers unavailable ({:?}), falling back to Ctrl+C", e);
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Unable to listen for Ctrl+C: {:?}", e);
        }
    }

    match component_manager.shutdown_all().await {
        Ok(()) => info!("Calendar torn down"),
        Err(e) => error!("Error tearing down components: {:?}", e),
    }

    let _ = shutdown_send.send(());
}

#[cfg(unix)]
async fn wait_for_signal() -> CalendarResult<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    let mut interrupt = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = terminate.recv() => info!("SIGTERM received, stopping calendar"),
        _ = interrupt.recv() => info!("SIGINT received, stopping calendar"),
    }
    Ok(())
}

#[cfg(windows)]
async fn wait_for_signal() -> CalendarResult<()> {
    use tokio::signal::windows::{ctrl_break, ctrl_c};

    let mut ctrlc = ctrl_c()?;
    let mut ctrlbreak = ctrl_break()?;

    tokio::select! {
        _ = ctrlc.recv() => info!("Ctrl+C received, stopping calendar"),
        _ = ctrlbreak.recv() => info!("Ctrl+Break received, stopping calendar"),
    }
    Ok(())
}
