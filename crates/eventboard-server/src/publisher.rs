//! Page publishing.
//!
//! The FTP target is read from a plaintext credentials file on every publish:
//!
//! ```text
//! ftp.example.org:2121
//! username
//! password
//! public_html/events
//! ```
//!
//! The port is optional and defaults to 21. An empty fourth line keeps the
//! login directory.

use std::fmt;
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use eventboard_core::RenderedPage;
use eventboard_providers::BoxFuture;
use suppaftp::FtpStream;
use suppaftp::types::FileType;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

/// Control port used when the host line carries none.
pub const DEFAULT_FTP_PORT: u16 = 21;

/// Why a publish attempt failed.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to read FTP credentials from {path}: {source}")]
    CredentialsUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed FTP credentials: {reason}")]
    MalformedCredentials { reason: String },

    #[error("failed to stage page for upload: {0}")]
    Staging(#[from] io::Error),

    #[error("FTP transfer failed: {0}")]
    Ftp(#[from] suppaftp::FtpError),

    #[error("upload task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl PublishError {
    fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedCredentials {
            reason: reason.into(),
        }
    }
}

/// Destination for rendered pages.
pub trait Publisher: Send + Sync {
    /// Stores `page` on the target, replacing any previous version.
    fn publish<'a>(&'a self, page: &'a RenderedPage) -> BoxFuture<'a, Result<(), PublishError>>;
}

/// Where and as whom to upload.
#[derive(Clone, PartialEq, Eq)]
pub struct FtpTarget {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub remote_dir: String,
}

impl fmt::Debug for FtpTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FtpTarget")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("remote_dir", &self.remote_dir)
            .finish()
    }
}

impl FtpTarget {
    /// Reads the four-line credentials file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PublishError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|source| PublishError::CredentialsUnreadable {
                path: path.to_path_buf(),
                source,
            })?;
        Self::parse(&content)
    }

    /// Parses credentials file content.
    ///
    /// Lines are host, username, password and remote directory. The password
    /// is taken verbatim apart from the line break; the other lines are
    /// trimmed. Anything after the fourth line is ignored.
    pub fn parse(content: &str) -> Result<Self, PublishError> {
        // lines() also drops the '\r' of CRLF endings
        let mut lines = content.lines();
        let mut next = |what: &str| {
            lines
                .next()
                .ok_or_else(|| PublishError::malformed(format!("missing {what} line")))
        };

        let host_line = next("host")?.trim();
        let username = next("username")?.trim().to_string();
        let password = next("password")?.to_string();
        let remote_dir = next("remote directory")?.trim().to_string();

        let (host, port) = split_host_port(host_line)?;
        if username.is_empty() {
            return Err(PublishError::malformed("username is empty"));
        }

        Ok(Self {
            host,
            port,
            username,
            password,
            remote_dir,
        })
    }

    /// `host:port` for connecting, with IPv6 hosts in brackets.
    pub fn address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

/// Splits `host`, `host:port`, `[v6]`, `[v6]:port` or a bare IPv6 address.
fn split_host_port(line: &str) -> Result<(String, u16), PublishError> {
    let parse_port = |port: &str| {
        port.parse::<u16>()
            .map_err(|_| PublishError::malformed(format!("invalid port in '{line}'")))
    };

    let (host, port) = if let Some(bracketed) = line.strip_prefix('[') {
        let (host, rest) = bracketed
            .split_once(']')
            .ok_or_else(|| PublishError::malformed(format!("unclosed '[' in '{line}'")))?;
        let port = match rest {
            "" => DEFAULT_FTP_PORT,
            _ => match rest.strip_prefix(':') {
                Some(port) => parse_port(port)?,
                None => return Err(PublishError::malformed(format!("invalid host '{line}'"))),
            },
        };
        (host, port)
    } else if line.matches(':').count() > 1 {
        (line, DEFAULT_FTP_PORT)
    } else {
        match line.split_once(':') {
            Some((host, port)) => (host, parse_port(port)?),
            None => (line, DEFAULT_FTP_PORT),
        }
    };

    if host.is_empty() {
        return Err(PublishError::malformed("host is empty"));
    }
    Ok((host.to_string(), port))
}

/// Uploads pages over plain FTP in binary mode.
///
/// Each publish opens a fresh session and closes it afterwards.
#[derive(Debug, Clone)]
pub struct FtpPublisher {
    credentials_path: PathBuf,
    remote_filename: String,
}

impl FtpPublisher {
    pub fn new(credentials_path: impl Into<PathBuf>, remote_filename: impl Into<String>) -> Self {
        Self {
            credentials_path: credentials_path.into(),
            remote_filename: remote_filename.into(),
        }
    }

    pub fn credentials_path(&self) -> &Path {
        &self.credentials_path
    }

    pub fn remote_filename(&self) -> &str {
        &self.remote_filename
    }
}

impl Publisher for FtpPublisher {
    fn publish<'a>(&'a self, page: &'a RenderedPage) -> BoxFuture<'a, Result<(), PublishError>> {
        let credentials_path = self.credentials_path.clone();
        let remote_filename = self.remote_filename.clone();
        let bytes = page.as_bytes().to_vec();

        Box::pin(async move {
            tokio::task::spawn_blocking(move || {
                let target = FtpTarget::from_file(&credentials_path)?;
                let staged = stage(&bytes)?;
                upload(&target, &remote_filename, staged)
            })
            .await?
        })
    }
}

/// Writes the page to a local temporary file, rewound for reading.
fn stage(bytes: &[u8]) -> Result<NamedTempFile, PublishError> {
    let mut staged = NamedTempFile::new()?;
    staged.write_all(bytes)?;
    staged.flush()?;
    staged.as_file_mut().seek(SeekFrom::Start(0))?;
    Ok(staged)
}

/// Sends the staged file. The temp file is removed on every path.
fn upload(
    target: &FtpTarget,
    remote_filename: &str,
    mut staged: NamedTempFile,
) -> Result<(), PublishError> {
    debug!(host = %target.host, port = target.port, "connecting to FTP server");
    let mut ftp = FtpStream::connect(target.address())?;
    ftp.login(&target.username, &target.password)?;
    if !target.remote_dir.is_empty() {
        ftp.cwd(&target.remote_dir)?;
    }
    ftp.transfer_type(FileType::Binary)?;

    let sent = ftp.put_file(remote_filename, staged.as_file_mut())?;
    // QUIT failures after a completed transfer are ignored
    let _ = ftp.quit();
    staged.close()?;

    info!(
        host = %target.host,
        remote_dir = %target.remote_dir,
        file = remote_filename,
        bytes = sent,
        "page uploaded"
    );
    Ok(())
}
