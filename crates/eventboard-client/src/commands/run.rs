//! `eventboard run`: the publish loop, in the foreground.

use std::future::Future;

use eventboard_server::{FtpPublisher, Runner, RunnerConfig, ShutdownSignal, SignalHandler};
use tracing::info;

use crate::error::ClientResult;

/// Authenticates, then publishes every interval until SIGINT or SIGTERM.
///
/// Authentication happens once, before the first cycle. Consent waits for the
/// browser redirect with no timeout; an interrupt during that wait ends the
/// command cleanly.
pub async fn run(config: &RunnerConfig) -> ClientResult<()> {
    let signals = SignalHandler::new();
    signals.spawn_listener()?;

    let Some(session) = until_shutdown(signals.shutdown(), super::open_session(config)).await
    else {
        info!("interrupted before authentication completed");
        return Ok(());
    };
    let session = session?;

    let publisher = FtpPublisher::new(&config.ftp_credentials_path, &config.remote_filename);
    info!(
        ftp_credentials = %publisher.credentials_path().display(),
        remote_file = publisher.remote_filename(),
        "publishing"
    );

    Runner::new(session, publisher, config)
        .run(signals.shutdown())
        .await?;
    Ok(())
}

/// Drives `work` to completion unless shutdown fires first.
///
/// On shutdown `work` is dropped and `None` is returned.
async fn until_shutdown<F: Future>(shutdown: ShutdownSignal, work: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = shutdown.wait() => None,
        output = work => Some(output),
    }
}
