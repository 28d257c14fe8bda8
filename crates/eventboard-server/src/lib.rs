//! Publish loop: poll the calendar, render, upload over FTP.
//!
//! A [`Runner`] pairs an [`EventSource`](eventboard_providers::EventSource)
//! with a [`Publisher`] and repeats fetch, render and publish on a fixed
//! interval until a [`ShutdownSignal`] fires.
//!
//! # Example
//!
//! ```rust,no_run
//! use eventboard_providers::google::{
//!     Authenticator, GoogleCalendarClient, GoogleConfig, OAuthClient, OAuthCredentials,
//!     TokenStorage,
//! };
//! use eventboard_server::{FtpPublisher, Runner, RunnerConfig, SignalHandler};
//! use std::sync::Arc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RunnerConfig::default();
//!     let google = GoogleConfig::new(OAuthCredentials::from_file(&config.client_secrets_path)?);
//!     let flow = Arc::new(OAuthClient::new(&google)?);
//!     let session = Authenticator::new(TokenStorage::new(&config.token_path), flow)
//!         .authenticate(GoogleCalendarClient::new(&google)?)
//!         .await?;
//!
//!     let publisher = FtpPublisher::new(&config.ftp_credentials_path, &config.remote_filename);
//!     let signals = SignalHandler::new();
//!     signals.spawn_listener()?;
//!
//!     Runner::new(session, publisher, &config).run(signals.shutdown()).await?;
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod publisher;
mod runner;
mod signals;

pub use config::{
    DEFAULT_CALENDAR_ID, DEFAULT_CLIENT_SECRETS_PATH, DEFAULT_FTP_CREDENTIALS_PATH,
    DEFAULT_POLL_INTERVAL, DEFAULT_REMOTE_FILENAME, DEFAULT_TOKEN_PATH, RunnerConfig,
};
pub use error::{ServerError, ServerResult};
pub use publisher::{DEFAULT_FTP_PORT, FtpPublisher, FtpTarget, PublishError, Publisher};
pub use runner::{CycleReport, Runner};
pub use signals::{ShutdownHandle, ShutdownSignal, SignalHandler};
