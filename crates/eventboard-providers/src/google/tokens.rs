//! OAuth credential persistence.
//!
//! The token file holds a single JSON [`TokenInfo`]. It is read once at
//! startup and rewritten whenever the credential changes.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ProviderError, ProviderResult};

/// Access tokens are treated as expired this long before their real expiry.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Information about an OAuth token set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// The access token for API requests.
    pub access_token: String,

    /// The refresh token for obtaining new access tokens.
    pub refresh_token: Option<String>,

    /// When the access token expires.
    pub expires_at: Option<DateTime<Utc>>,

    /// The OAuth scopes that were granted.
    #[serde(default)]
    pub scopes: Vec<String>,

    /// When the tokens were last refreshed.
    pub last_refresh: DateTime<Utc>,
}

impl TokenInfo {
    /// Creates a new token info from OAuth response data.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in_secs: Option<i64>,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            expires_at: expires_in_secs.map(expiry_from_now),
            scopes,
            last_refresh: Utc::now(),
        }
    }

    /// Returns true if the access token is expired or about to expire.
    ///
    /// Tokens without an expiry never expire.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Utc::now() >= at)
    }

    /// Returns true if a refresh token is available.
    pub fn is_refreshable(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Returns true if the token has the required scopes.
    pub fn has_scopes(&self, required: &[String]) -> bool {
        required.iter().all(|scope| self.scopes.contains(scope))
    }

    /// Returns the credential after a refresh-token exchange.
    ///
    /// The refresh token is kept unless the token endpoint rotated it.
    #[must_use]
    pub fn refreshed(
        &self,
        access_token: impl Into<String>,
        expires_in_secs: Option<i64>,
        rotated_refresh_token: Option<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: rotated_refresh_token.or_else(|| self.refresh_token.clone()),
            expires_at: expires_in_secs.map(expiry_from_now),
            scopes: self.scopes.clone(),
            last_refresh: Utc::now(),
        }
    }
}

fn expiry_from_now(secs: i64) -> DateTime<Utc> {
    Utc::now() + Duration::seconds(secs) - Duration::seconds(EXPIRY_MARGIN_SECS)
}

/// File-backed credential store.
///
/// Holds no state besides the path; every call goes to disk.
#[derive(Debug, Clone)]
pub struct TokenStorage {
    path: PathBuf,
}

impl TokenStorage {
    /// Default token file name, relative to the working directory.
    pub const DEFAULT_PATH: &'static str = "token.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads the stored credential.
    ///
    /// A missing file and a file that fails to parse both yield `None`; the
    /// latter is logged, and the next consent overwrites the file.
    pub fn load(&self) -> Option<TokenInfo> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no token file");
                return None;
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read token file");
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(tokens) => {
                debug!(path = %self.path.display(), "loaded tokens");
                Some(tokens)
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unparseable token file");
                None
            }
        }
    }

    /// Overwrites the token file with `tokens`.
    ///
    /// Writes a sibling temp file and renames it into place, so a crash never
    /// leaves a truncated file behind.
    pub fn save(&self, tokens: &TokenInfo) -> ProviderResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                ProviderError::configuration(format!(
                    "failed to create token directory {}",
                    parent.display()
                ))
                .with_source(e)
            })?;
        }

        let content = serde_json::to_string_pretty(tokens).map_err(|e| {
            ProviderError::internal("failed to serialize tokens").with_source(e)
        })?;

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, &content).map_err(|e| {
            ProviderError::configuration(format!(
                "failed to write token file {}",
                temp_path.display()
            ))
            .with_source(e)
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = fs::set_permissions(&temp_path, fs::Permissions::from_mode(0o600));
        }

        fs::rename(&temp_path, &self.path).map_err(|e| {
            ProviderError::configuration(format!(
                "failed to move token file into place at {}",
                self.path.display()
            ))
            .with_source(e)
        })?;

        debug!(path = %self.path.display(), "saved tokens");
        Ok(())
    }

    /// Removes the token file if present.
    pub fn clear(&self) -> ProviderResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "cleared stored tokens");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ProviderError::configuration(format!(
                "failed to remove token file {}",
                self.path.display()
            ))
            .with_source(e)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for TokenStorage {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";

    fn sample() -> TokenInfo {
        TokenInfo::new(
            "access-token",
            Some("refresh-token".to_string()),
            Some(3600),
            vec![SCOPE.to_string()],
        )
    }

    #[test]
    fn fresh_token_is_valid() {
        let token = sample();
        assert!(!token.is_expired());
        assert!(token.is_refreshable());
        assert!(token.has_scopes(&[SCOPE.to_string()]));
    }

    #[test]
    fn expiry_in_the_past() {
        let mut token = sample();
        token.expires_at = Some(Utc::now() - Duration::hours(1));
        assert!(token.is_expired());

        token.expires_at = None;
        assert!(!token.is_expired());
    }

    #[test]
    fn expiry_margin_applies() {
        // Expires in 30s of real time, which is inside the margin
        let token = TokenInfo::new("a", None, Some(30), vec![]);
        assert!(token.is_expired());
    }

    #[test]
    fn empty_refresh_token_is_not_refreshable() {
        let token = TokenInfo::new("a", Some(String::new()), None, vec![]);
        assert!(!token.is_refreshable());
        assert!(!TokenInfo::new("a", None, None, vec![]).is_refreshable());
    }

    #[test]
    fn scope_check() {
        let token = sample();
        assert!(token.has_scopes(&[]));
        assert!(!token.has_scopes(&["https://www.googleapis.com/auth/calendar".to_string()]));
    }

    #[test]
    fn refreshed_keeps_refresh_token_unless_rotated() {
        let mut old = sample();
        old.expires_at = Some(Utc::now() - Duration::hours(1));

        let new = old.refreshed("new-access", Some(3600), None);
        assert_eq!(new.access_token, "new-access");
        assert_eq!(new.refresh_token.as_deref(), Some("refresh-token"));
        assert_eq!(new.scopes, old.scopes);
        assert!(!new.is_expired());

        let rotated = old.refreshed("x", None, Some("rotated".to_string()));
        assert_eq!(rotated.refresh_token.as_deref(), Some("rotated"));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let storage = TokenStorage::new(dir.path().join("token.json"));

        let original = sample();
        storage.save(&original).unwrap();
        assert!(!dir.path().join("token.json.tmp").exists());

        let loaded = storage.load().unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let storage = TokenStorage::new(dir.path().join("token.json"));

        storage.save(&sample()).unwrap();
        let second = TokenInfo::new("second", None, None, vec![]);
        storage.save(&second).unwrap();

        assert_eq!(storage.load().unwrap().access_token, "second");
    }

    #[test]
    fn save_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let storage = TokenStorage::new(dir.path().join("nested").join("token.json"));
        storage.save(&sample()).unwrap();
        assert!(storage.load().is_some());
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let storage = TokenStorage::new(dir.path().join("token.json"));
        storage.save(&sample()).unwrap();

        let mode = fs::metadata(storage.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = TokenStorage::new(dir.path().join("absent.json"));
        assert!(storage.load().is_none());
    }

    #[test]
    fn corrupt_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        fs::write(&path, "{not json").unwrap();

        assert!(TokenStorage::new(&path).load().is_none());
    }

    #[test]
    fn clear_removes_file_and_tolerates_absence() {
        let dir = tempfile::tempdir().unwrap();
        let storage = TokenStorage::new(dir.path().join("token.json"));
        storage.save(&sample()).unwrap();

        storage.clear().unwrap();
        assert!(!storage.path().exists());
        storage.clear().unwrap();
    }

    #[test]
    fn default_path() {
        assert_eq!(TokenStorage::default().path(), Path::new("token.json"));
    }
}
