//! OAuth 2.0 PKCE flow for Google APIs.
//!
//! Authorization code flow with PKCE and a loopback redirect:
//!
//! 1. Generate a code verifier and its SHA-256 challenge
//! 2. Bind a listener on `127.0.0.1` with an OS-assigned port
//! 3. Open the browser on the consent page
//! 4. Wait for `GET /callback?code=...&state=...`
//! 5. Exchange the code (with the verifier) for tokens
//!
//! The wait in step 4 has no timeout. It is an ordinary future on the
//! runtime, so dropping it (on shutdown, say) closes the listener.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng as _;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

use crate::error::{ProviderError, ProviderResult};
use crate::provider::BoxFuture;

use super::auth::AuthFlow;
use super::config::{GoogleConfig, OAuthCredentials};
use super::tokens::TokenInfo;

/// The PKCE code verifier length (in bytes, before base64 encoding).
const CODE_VERIFIER_LENGTH: usize = 32;

const SUCCESS_PAGE: &str = "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n\
    <html><body><h1>Authorization Successful</h1>\
    <p>You can close this window and return to the terminal.</p></body></html>";

const FAILURE_PAGE: &str = "HTTP/1.1 400 Bad Request\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n\
    <html><body><h1>Authorization Failed</h1>\
    <p>You can close this window.</p></body></html>";

const NOT_FOUND: &str = "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";

/// Browser-based [`AuthFlow`] against Google's OAuth endpoints.
#[derive(Debug)]
pub struct OAuthClient {
    credentials: OAuthCredentials,
    http_client: reqwest::Client,
    auth_url: String,
    token_url: String,
}

impl OAuthClient {
    pub fn new(config: &GoogleConfig) -> ProviderResult<Self> {
        Ok(Self {
            credentials: config.credentials.clone(),
            http_client: config.http_client()?,
            auth_url: config.auth_url.clone(),
            token_url: config.token_url.clone(),
        })
    }

    /// Runs the consent flow and returns the obtained tokens.
    ///
    /// # Errors
    ///
    /// Fails if the listener cannot be bound, the user denies access, the
    /// callback state does not match, or the code exchange is rejected.
    pub async fn authorize(&self, scopes: &[String]) -> ProviderResult<TokenInfo> {
        let pkce = PkceFlow::new();

        let (listener, port) = bind_loopback().await?;
        let redirect_uri = format!("http://127.0.0.1:{}/callback", port);
        let auth_url = pkce.build_auth_url(
            &self.auth_url,
            &self.credentials.client_id,
            &redirect_uri,
            scopes,
        );

        info!(port, "waiting for OAuth consent in the browser");
        debug!(url = %auth_url, "authorization URL");

        if let Err(e) = open::that(&auth_url) {
            warn!(error = %e, "failed to open browser");
            eprintln!("\nPlease open this URL in your browser:\n\n{}\n", auth_url);
        }

        let callback = wait_for_callback(listener).await?;

        if callback.state != pkce.state {
            return Err(ProviderError::authentication(
                "OAuth state mismatch - possible CSRF attack",
            ));
        }

        info!("received authorization code, exchanging for tokens");
        self.exchange_code(&callback.code, &pkce.verifier, &redirect_uri, scopes)
            .await
    }

    /// Exchanges the refresh token in `token` for a new access token.
    pub async fn refresh_token(&self, token: &TokenInfo) -> ProviderResult<TokenInfo> {
        let refresh_token = token
            .refresh_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ProviderError::authentication("no refresh token stored"))?;

        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let response = self.post_token_form(&params, "token refresh").await?;
        info!("refreshed access token");
        Ok(token.refreshed(
            response.access_token,
            response.expires_in,
            response.refresh_token,
        ))
    }

    async fn exchange_code(
        &self,
        code: &str,
        verifier: &str,
        redirect_uri: &str,
        scopes: &[String],
    ) -> ProviderResult<TokenInfo> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("code", code),
            ("code_verifier", verifier),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri),
        ];

        let response = self.post_token_form(&params, "token exchange").await?;
        let granted = match response.scope.as_deref() {
            Some(scope) => scope.split_whitespace().map(String::from).collect(),
            None => scopes.to_vec(),
        };

        info!("obtained tokens");
        Ok(TokenInfo::new(
            response.access_token,
            response.refresh_token,
            response.expires_in,
            granted,
        ))
    }

    async fn post_token_form(
        &self,
        params: &[(&str, &str)],
        operation: &str,
    ) -> ProviderResult<TokenResponse> {
        let response = self
            .http_client
            .post(&self.token_url)
            .form(params)
            .send()
            .await
            .map_err(|e| {
                ProviderError::network(format!("{} request failed", operation)).with_source(e)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ProviderError::network("failed to read token response").with_source(e)
        })?;

        if status.is_server_error() {
            return Err(ProviderError::server(format!(
                "{} failed ({}): {}",
                operation, status, body
            ))
            .with_provider("google"));
        }
        if !status.is_success() {
            return Err(ProviderError::authentication(format!(
                "{} failed ({}): {}",
                operation, status, body
            ))
            .with_provider("google"));
        }

        serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response("invalid token response").with_source(e)
        })
    }
}

impl AuthFlow for OAuthClient {
    fn consent<'a>(&'a self, scopes: &'a [String]) -> BoxFuture<'a, ProviderResult<TokenInfo>> {
        Box::pin(self.authorize(scopes))
    }

    fn refresh<'a>(&'a self, token: &'a TokenInfo) -> BoxFuture<'a, ProviderResult<TokenInfo>> {
        Box::pin(self.refresh_token(token))
    }
}

/// Binds the callback listener on an OS-assigned loopback port.
async fn bind_loopback() -> ProviderResult<(TcpListener, u16)> {
    let listener = TcpListener::bind("127.0.0.1:0").await.map_err(|e| {
        ProviderError::configuration("failed to bind OAuth callback listener").with_source(e)
    })?;
    let port = listener
        .local_addr()
        .map_err(|e| ProviderError::internal("failed to read listener address").with_source(e))?
        .port();
    debug!(port, "bound loopback listener");
    Ok((listener, port))
}

/// Authorization code and state from a successful callback.
#[derive(Debug, PartialEq, Eq)]
struct Callback {
    code: String,
    state: String,
}

/// Waits until a request to `/callback` arrives.
///
/// Requests for other paths (the browser's favicon request, for one) get a
/// 404 and are otherwise ignored.
async fn wait_for_callback(listener: TcpListener) -> ProviderResult<Callback> {
    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                if let Some(result) = handle_connection(stream).await {
                    return result;
                }
            }
            Err(e) => error!(error = %e, "failed to accept OAuth callback connection"),
        }
    }
}

async fn handle_connection(mut stream: TcpStream) -> Option<ProviderResult<Callback>> {
    let mut request_line = String::new();
    if BufReader::new(&mut stream)
        .read_line(&mut request_line)
        .await
        .is_err()
    {
        return None;
    }

    let outcome = parse_callback(&request_line);
    let page = match &outcome {
        None => NOT_FOUND,
        Some(Ok(_)) => SUCCESS_PAGE,
        Some(Err(_)) => FAILURE_PAGE,
    };
    let _ = stream.write_all(page.as_bytes()).await;
    let _ = stream.shutdown().await;
    outcome
}

/// Parses `GET /callback?code=...&state=... HTTP/1.1`.
///
/// Returns `None` for requests that are not the callback.
fn parse_callback(request_line: &str) -> Option<ProviderResult<Callback>> {
    let mut parts = request_line.split_whitespace();
    if parts.next() != Some("GET") {
        return None;
    }
    let target = parts.next()?;
    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    if path != "/callback" {
        return None;
    }

    let mut code = None;
    let mut state = None;
    let mut denied = None;
    for (key, value) in query.split('&').filter_map(|p| p.split_once('=')) {
        let value = urlencoding::decode(&value.replace('+', " "))
            .map(|v| v.into_owned())
            .unwrap_or_default();
        match key {
            "code" => code = Some(value),
            "state" => state = Some(value),
            "error" => denied = Some(value),
            _ => {}
        }
    }

    if let Some(reason) = denied {
        return Some(Err(ProviderError::authentication(format!(
            "authorization denied: {}",
            reason
        ))));
    }

    Some(match code {
        Some(code) if !code.is_empty() => Ok(Callback {
            code,
            state: state.unwrap_or_default(),
        }),
        _ => Err(ProviderError::authentication(
            "missing authorization code in callback",
        )),
    })
}

/// PKCE verifier, challenge and CSRF state (RFC 7636).
#[derive(Debug)]
pub struct PkceFlow {
    pub verifier: String,
    pub challenge: String,
    pub state: String,
}

impl PkceFlow {
    pub fn new() -> Self {
        let verifier = random_token(CODE_VERIFIER_LENGTH);
        let challenge = Self::compute_challenge(&verifier);
        Self {
            verifier,
            challenge,
            state: random_token(16),
        }
    }

    fn compute_challenge(verifier: &str) -> String {
        URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
    }

    /// Builds the consent page URL.
    ///
    /// Requests offline access with a forced consent prompt so Google always
    /// returns a refresh token.
    pub fn build_auth_url(
        &self,
        auth_endpoint: &str,
        client_id: &str,
        redirect_uri: &str,
        scopes: &[String],
    ) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&\
            code_challenge={}&code_challenge_method=S256&state={}&\
            access_type=offline&prompt=consent",
            auth_endpoint,
            urlencoding::encode(client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&scopes.join(" ")),
            urlencoding::encode(&self.challenge),
            urlencoding::encode(&self.state),
        )
    }
}

impl Default for PkceFlow {
    fn default() -> Self {
        Self::new()
    }
}

fn random_token(len: usize) -> String {
    let mut rng = rand::rng();
    let bytes: Vec<u8> = (0..len).map(|_| rng.random()).collect();
    URL_SAFE_NO_PAD.encode(&bytes)
}

/// Response from Google's token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    /// Space-separated granted scopes.
    #[serde(default)]
    scope: Option<String>,
}
