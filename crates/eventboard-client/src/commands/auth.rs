//! `eventboard auth`: obtain or refresh the stored credential.

use eventboard_server::RunnerConfig;
use tracing::info;

use crate::error::ClientResult;

/// Makes sure the token file holds a valid credential.
///
/// With `force`, the stored credential is discarded first so consent always
/// runs.
pub async fn run(config: &RunnerConfig, force: bool) -> ClientResult<()> {
    let (authenticator, _) = super::authenticator(config)?;

    if force {
        authenticator.storage().clear()?;
    } else if authenticator.storage().load().is_none() {
        println!("No stored credential; a browser window will open for you to authorize access.");
    }

    let token = authenticator.credential().await?;

    info!(path = %authenticator.storage().path().display(), "credential ready");
    println!("Credential saved to {}", authenticator.storage().path().display());
    if let Some(expires_at) = token.expires_at {
        println!("Access token valid until {}", expires_at.to_rfc3339());
    }
    Ok(())
}
