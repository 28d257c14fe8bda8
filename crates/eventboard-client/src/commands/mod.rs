//! Subcommand implementations.

pub mod auth;
pub mod events;
pub mod render;
pub mod run;

use std::sync::Arc;

use eventboard_providers::google::{
    Authenticator, CalendarSession, GoogleCalendarClient, GoogleConfig, OAuthClient,
    OAuthCredentials, TokenStorage,
};
use eventboard_server::RunnerConfig;
use tracing::debug;

use crate::error::{ClientError, ClientResult};

/// Loads the client secrets and builds the Google configuration.
fn google_config(config: &RunnerConfig) -> ClientResult<GoogleConfig> {
    let path = &config.client_secrets_path;
    let credentials = OAuthCredentials::from_file(path).map_err(|e| {
        ClientError::Config(format!(
            "{}; download the OAuth client JSON from the Google Cloud Console to {}",
            e,
            path.display()
        ))
    })?;

    let google = GoogleConfig::new(credentials);
    google
        .validate()
        .map_err(|e| ClientError::Config(format!("invalid client secrets: {}", e)))?;
    debug!(path = %path.display(), "loaded client secrets");
    Ok(google)
}

/// Builds the authenticator over the configured token file.
pub(crate) fn authenticator(config: &RunnerConfig) -> ClientResult<(Authenticator, GoogleConfig)> {
    let google = google_config(config)?;
    let flow = Arc::new(OAuthClient::new(&google)?);
    let authenticator = Authenticator::new(TokenStorage::new(&config.token_path), flow)
        .with_scopes(google.scopes.clone());
    Ok((authenticator, google))
}

/// Resolves the stored credential, asking for consent if needed.
pub(crate) async fn open_session(config: &RunnerConfig) -> ClientResult<CalendarSession> {
    let (authenticator, google) = authenticator(config)?;
    let client = GoogleCalendarClient::new(&google)?;
    Ok(authenticator.authenticate(client).await?)
}
