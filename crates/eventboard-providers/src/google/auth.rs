//! Credential resolution and the authenticated calendar session.
//!
//! [`Authenticator::authenticate`] turns whatever is in the token file into a
//! usable credential, running consent or a refresh as needed, and binds it to
//! a [`CalendarSession`]. The session keeps the credential fresh for the rest
//! of the process.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{ProviderError, ProviderResult};
use crate::pager::EventPager;
use crate::provider::{BoxFuture, EventPage, EventSource, PageRequest};

use super::client::GoogleCalendarClient;
use super::config::CALENDAR_READONLY_SCOPE;
use super::tokens::{TokenInfo, TokenStorage};

/// How new credentials are obtained.
///
/// [`OAuthClient`](super::OAuthClient) is the browser-based implementation.
pub trait AuthFlow: Send + Sync {
    /// Runs interactive consent for `scopes`.
    fn consent<'a>(&'a self, scopes: &'a [String]) -> BoxFuture<'a, ProviderResult<TokenInfo>>;

    /// Exchanges the refresh token in `token` for a new access token.
    fn refresh<'a>(&'a self, token: &'a TokenInfo) -> BoxFuture<'a, ProviderResult<TokenInfo>>;
}

/// Resolves the stored credential into a valid one.
pub struct Authenticator {
    storage: TokenStorage,
    flow: Arc<dyn AuthFlow>,
    scopes: Vec<String>,
}

impl Authenticator {
    /// Creates an authenticator requiring the read-only calendar scope.
    pub fn new(storage: TokenStorage, flow: Arc<dyn AuthFlow>) -> Self {
        Self {
            storage,
            flow,
            scopes: vec![CALENDAR_READONLY_SCOPE.to_string()],
        }
    }

    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    pub fn storage(&self) -> &TokenStorage {
        &self.storage
    }

    /// Returns a valid credential, persisting it if it changed.
    ///
    /// Consent runs when nothing is stored, when the stored credential lacks a
    /// required scope, or when it is expired without a refresh token. An
    /// expired credential with a refresh token is refreshed instead.
    ///
    /// # Errors
    ///
    /// Consent, refresh and save failures propagate unchanged.
    pub async fn credential(&self) -> ProviderResult<TokenInfo> {
        let stored = self.storage.load();

        let token = match stored {
            Some(token) if !token.has_scopes(&self.scopes) => {
                warn!(
                    granted = ?token.scopes,
                    required = ?self.scopes,
                    "stored credential is missing a required scope, asking for consent again"
                );
                self.flow.consent(&self.scopes).await?
            }
            Some(token) if !token.is_expired() => {
                debug!("stored credential is still valid");
                return Ok(token);
            }
            Some(token) if token.is_refreshable() => {
                info!("stored credential expired, refreshing");
                self.flow.refresh(&token).await?
            }
            Some(_) => {
                info!("stored credential expired and cannot be refreshed, asking for consent");
                self.flow.consent(&self.scopes).await?
            }
            None => {
                info!("no stored credential, asking for consent");
                self.flow.consent(&self.scopes).await?
            }
        };

        self.storage.save(&token)?;
        Ok(token)
    }

    /// Resolves the credential and binds it to a calendar session.
    pub async fn authenticate(self, client: GoogleCalendarClient) -> ProviderResult<CalendarSession> {
        let token = self.credential().await?;
        Ok(CalendarSession {
            client,
            flow: self.flow,
            storage: self.storage,
            token: Mutex::new(token),
        })
    }
}

/// An authenticated handle to the Calendar API.
///
/// Expired access tokens are refreshed before the next request and the new
/// credential is written back to the token file.
pub struct CalendarSession {
    client: GoogleCalendarClient,
    flow: Arc<dyn AuthFlow>,
    storage: TokenStorage,
    token: Mutex<TokenInfo>,
}

impl CalendarSession {
    /// Starts a sweep over events that end after the current instant.
    pub fn upcoming(&self, calendar_id: &str) -> EventPager<'_> {
        EventPager::new(self, calendar_id, Utc::now())
    }

    /// Returns a copy of the credential in use.
    pub async fn credential(&self) -> TokenInfo {
        self.token.lock().await.clone()
    }

    async fn access_token(&self) -> ProviderResult<String> {
        let mut token = self.token.lock().await;
        if token.is_expired() {
            if !token.is_refreshable() {
                return Err(ProviderError::authentication(
                    "access token expired and no refresh token is stored; run `eventboard auth`",
                )
                .with_provider("google"));
            }
            info!("access token expired, refreshing");
            let refreshed = self.flow.refresh(&token).await?;
            self.storage.save(&refreshed)?;
            *token = refreshed;
        }
        Ok(token.access_token.clone())
    }
}

impl EventSource for CalendarSession {
    fn name(&self) -> &str {
        "google"
    }

    fn fetch_page(&self, request: PageRequest) -> BoxFuture<'_, ProviderResult<EventPage>> {
        Box::pin(async move {
            let access_token = self.access_token().await?;
            self.client.list_events_page(&access_token, &request).await
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Duration;
    use mockito::Matcher;

    use super::*;
    use crate::google::config::{GoogleConfig, OAuthCredentials};

    /// Hands out canned credentials and counts how often it was asked.
    struct CannedFlow {
        consents: AtomicUsize,
        refreshes: AtomicUsize,
        fail_refresh: bool,
    }

    impl CannedFlow {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                consents: AtomicUsize::new(0),
                refreshes: AtomicUsize::new(0),
                fail_refresh: false,
            })
        }

        fn failing_refresh() -> Arc<Self> {
            Arc::new(Self {
                consents: AtomicUsize::new(0),
                refreshes: AtomicUsize::new(0),
                fail_refresh: true,
            })
        }

        fn counts(&self) -> (usize, usize) {
            (
                self.consents.load(Ordering::SeqCst),
                self.refreshes.load(Ordering::SeqCst),
            )
        }
    }

    impl AuthFlow for CannedFlow {
        fn consent<'a>(&'a self, scopes: &'a [String]) -> BoxFuture<'a, ProviderResult<TokenInfo>> {
            self.consents.fetch_add(1, Ordering::SeqCst);
            let token = TokenInfo::new(
                "consented",
                Some("refresh-1".to_string()),
                Some(3600),
                scopes.to_vec(),
            );
            Box::pin(async move { Ok(token) })
        }

        fn refresh<'a>(&'a self, token: &'a TokenInfo) -> BoxFuture<'a, ProviderResult<TokenInfo>> {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            let result = if self.fail_refresh {
                Err(ProviderError::authentication("invalid_grant"))
            } else {
                Ok(token.refreshed("refreshed", Some(3600), None))
            };
            Box::pin(async move { result })
        }
    }

    fn scope() -> Vec<String> {
        vec![CALENDAR_READONLY_SCOPE.to_string()]
    }

    fn expired(refresh_token: Option<&str>) -> TokenInfo {
        let mut token = TokenInfo::new("stale", refresh_token.map(String::from), None, scope());
        token.expires_at = Some(Utc::now() - Duration::hours(1));
        token
    }

    fn storage_in(dir: &tempfile::TempDir) -> TokenStorage {
        TokenStorage::new(dir.path().join("token.json"))
    }

    #[tokio::test]
    async fn missing_credential_runs_consent_and_saves() {
        let dir = tempfile::tempdir().unwrap();
        let flow = CannedFlow::new();
        let auth = Authenticator::new(storage_in(&dir), flow.clone());

        let token = auth.credential().await.unwrap();
        assert_eq!(token.access_token, "consented");
        assert_eq!(flow.counts(), (1, 0));
        assert_eq!(auth.storage().load().unwrap(), token);
    }

    #[tokio::test]
    async fn valid_credential_is_reused_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir);
        let stored = TokenInfo::new("still-good", None, Some(3600), scope());
        storage.save(&stored).unwrap();

        let flow = CannedFlow::new();
        let token = Authenticator::new(storage, flow.clone())
            .credential()
            .await
            .unwrap();

        assert_eq!(token, stored);
        assert_eq!(flow.counts(), (0, 0));
    }

    #[tokio::test]
    async fn expired_credential_is_refreshed_and_saved() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir);
        storage.save(&expired(Some("refresh-0"))).unwrap();

        let flow = CannedFlow::new();
        let auth = Authenticator::new(storage, flow.clone());
        let token = auth.credential().await.unwrap();

        assert_eq!(token.access_token, "refreshed");
        assert_eq!(token.refresh_token.as_deref(), Some("refresh-0"));
        assert_eq!(flow.counts(), (0, 1));
        assert_eq!(auth.storage().load().unwrap().access_token, "refreshed");
    }

    #[tokio::test]
    async fn expired_without_refresh_token_runs_consent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir);
        storage.save(&expired(None)).unwrap();

        let flow = CannedFlow::new();
        let token = Authenticator::new(storage, flow.clone())
            .credential()
            .await
            .unwrap();

        assert_eq!(token.access_token, "consented");
        assert_eq!(flow.counts(), (1, 0));
    }

    #[tokio::test]
    async fn scope_mismatch_runs_consent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir);
        let narrow = TokenInfo::new("narrow", None, Some(3600), vec!["openid".to_string()]);
        storage.save(&narrow).unwrap();

        let flow = CannedFlow::new();
        let token = Authenticator::new(storage, flow.clone())
            .credential()
            .await
            .unwrap();

        assert_eq!(token.access_token, "consented");
        assert_eq!(token.scopes, scope());
        assert_eq!(flow.counts(), (1, 0));
    }

    #[tokio::test]
    async fn corrupt_token_file_runs_consent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir);
        std::fs::write(storage.path(), "garbage").unwrap();

        let flow = CannedFlow::new();
        let token = Authenticator::new(storage.clone(), flow.clone())
            .credential()
            .await
            .unwrap();

        assert_eq!(token.access_token, "consented");
        assert_eq!(storage.load().unwrap().access_token, "consented");
    }

    #[tokio::test]
    async fn refresh_failure_propagates_and_keeps_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir);
        storage.save(&expired(Some("revoked"))).unwrap();

        let err = Authenticator::new(storage.clone(), CannedFlow::failing_refresh())
            .credential()
            .await
            .unwrap_err();

        assert!(err.code().needs_consent());
        assert_eq!(storage.load().unwrap().access_token, "stale");
    }

    fn client_for(server: &mockito::ServerGuard) -> GoogleCalendarClient {
        let config = GoogleConfig::new(OAuthCredentials::new("t.apps.googleusercontent.com", "s"))
            .with_api_base(server.url());
        GoogleCalendarClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn session_refreshes_expired_token_before_fetching() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/calendars/primary/events")
            .match_query(Matcher::Any)
            .match_header("authorization", "Bearer refreshed")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"items": []}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir);
        storage.save(&TokenInfo::new("fresh", Some("r".to_string()), Some(3600), scope())).unwrap();

        let flow = CannedFlow::new();
        let session = Authenticator::new(storage.clone(), flow.clone())
            .authenticate(client_for(&server))
            .await
            .unwrap();

        // Expire the in-memory credential as if an hour had passed
        session.token.lock().await.expires_at = Some(Utc::now() - Duration::minutes(1));

        let events = session.upcoming("primary").collect_all().await.unwrap();
        assert!(events.is_empty());
        mock.assert_async().await;

        assert_eq!(flow.counts(), (0, 1));
        assert_eq!(session.credential().await.access_token, "refreshed");
        assert_eq!(storage.load().unwrap().access_token, "refreshed");
    }

    #[tokio::test]
    async fn session_without_refresh_token_fails_once_expired() {
        let server = mockito::Server::new_async().await;
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir);
        storage.save(&TokenInfo::new("fresh", None, Some(3600), scope())).unwrap();

        let session = Authenticator::new(storage, CannedFlow::new())
            .authenticate(client_for(&server))
            .await
            .unwrap();
        session.token.lock().await.expires_at = Some(Utc::now() - Duration::minutes(1));

        let err = session.upcoming("primary").collect_all().await.unwrap_err();
        assert_eq!(err.code(), crate::error::ProviderErrorCode::AuthenticationFailed);
        assert_eq!(err.provider(), Some("google"));
    }
}
