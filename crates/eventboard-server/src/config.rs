//! Runtime configuration for the publish loop.

use std::path::PathBuf;
use std::time::Duration;

/// Calendar read when none is configured.
///
/// `primary` is the calendar of the account that granted consent, so a fresh
/// deployment works without knowing any calendar address. Set
/// `--calendar-id` (or `EVENTBOARD_CALENDAR_ID`) to a shared calendar's
/// address to publish that one instead.
pub const DEFAULT_CALENDAR_ID: &str = "primary";

/// File name the page is stored under on the FTP host.
pub const DEFAULT_REMOTE_FILENAME: &str = "calendar.html";

/// Delay between the end of one cycle and the start of the next.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);

/// OAuth credential cache.
pub const DEFAULT_TOKEN_PATH: &str = "token.json";

/// OAuth client secrets downloaded from the Google Cloud Console.
pub const DEFAULT_CLIENT_SECRETS_PATH: &str = "credentials.json";

/// Four-line FTP credentials file: host, user, password, remote directory.
pub const DEFAULT_FTP_CREDENTIALS_PATH: &str = "credentials";

/// Settings for one `eventboard run`.
///
/// Relative paths resolve against the working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    pub calendar_id: String,
    pub remote_filename: String,
    pub poll_interval: Duration,
    pub token_path: PathBuf,
    pub client_secrets_path: PathBuf,
    pub ftp_credentials_path: PathBuf,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            calendar_id: DEFAULT_CALENDAR_ID.to_string(),
            remote_filename: DEFAULT_REMOTE_FILENAME.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            token_path: PathBuf::from(DEFAULT_TOKEN_PATH),
            client_secrets_path: PathBuf::from(DEFAULT_CLIENT_SECRETS_PATH),
            ftp_credentials_path: PathBuf::from(DEFAULT_FTP_CREDENTIALS_PATH),
        }
    }
}

impl RunnerConfig {
    /// Builder: set the calendar id.
    pub fn with_calendar_id(mut self, id: impl Into<String>) -> Self {
        self.calendar_id = id.into();
        self
    }

    /// Builder: set the remote file name.
    pub fn with_remote_filename(mut self, name: impl Into<String>) -> Self {
        self.remote_filename = name.into();
        self
    }

    /// Builder: set the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_path = path.into();
        self
    }

    pub fn with_client_secrets_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.client_secrets_path = path.into();
        self
    }

    pub fn with_ftp_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ftp_credentials_path = path.into();
        self
    }
}
