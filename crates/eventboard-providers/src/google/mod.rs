//! Google Calendar access.
//!
//! # Authentication Flow
//!
//! 1. The client secrets file provides the OAuth client id and secret
//! 2. [`Authenticator`] loads `token.json` and decides between reuse,
//!    refresh and consent
//! 3. Consent ([`OAuthClient`]) opens the browser with a PKCE challenge and
//!    waits on a loopback listener for the redirect
//! 4. The resulting credential is saved and bound to a [`CalendarSession`]
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use eventboard_providers::google::{
//!     Authenticator, GoogleCalendarClient, GoogleConfig, OAuthClient, OAuthCredentials, TokenStorage,
//! };
//!
//! let config = GoogleConfig::new(OAuthCredentials::from_file("credentials.json")?);
//! let flow = Arc::new(OAuthClient::new(&config)?);
//! let session = Authenticator::new(TokenStorage::new("token.json"), flow)
//!     .authenticate(GoogleCalendarClient::new(&config)?)
//!     .await?;
//!
//! let events = session.upcoming("primary").collect_all().await?;
//! ```

mod auth;
mod client;
mod config;
mod oauth;
mod tokens;

pub use auth::{AuthFlow, Authenticator, CalendarSession};
pub use client::GoogleCalendarClient;
pub use config::{
    CALENDAR_API_BASE, CALENDAR_READONLY_SCOPE, GOOGLE_AUTH_URL, GOOGLE_TOKEN_URL, GoogleConfig,
    OAuthCredentials,
};
pub use oauth::{OAuthClient, PkceFlow};
pub use tokens::{TokenInfo, TokenStorage};
