//! Client error types.

use std::fmt;

use eventboard_core::TracingError;
use eventboard_providers::ProviderError;
use eventboard_server::ServerError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration error.
    Config(String),
    /// Authentication or calendar access failed.
    Provider(ProviderError),
    /// The publish loop stopped with an error.
    Server(ServerError),
    /// Logging could not be set up.
    Tracing(TracingError),
    /// IO error.
    Io(std::io::Error),
    /// Output could not be produced.
    Output(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Provider(err) => write!(f, "{}", err),
            Self::Server(err) => write!(f, "{}", err),
            Self::Tracing(err) => write!(f, "logging setup failed: {}", err),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::Output(msg) => write!(f, "output error: {}", msg),
        }
    }
}

impl ClientError {
    /// The provider error behind this failure, if any.
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            Self::Provider(err) | Self::Server(ServerError::Provider(err)) => Some(err),
            _ => None,
        }
    }

    /// A follow-up suggestion for the user, chosen from the provider error code.
    pub fn hint(&self) -> Option<&'static str> {
        let err = self.provider_error()?;
        if err.code().needs_consent() {
            Some("run `eventboard auth --force` to grant calendar access again")
        } else if err.is_retryable() {
            Some("the calendar service may be temporarily unavailable; try again later")
        } else {
            None
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Provider(err) => Some(err),
            Self::Server(err) => Some(err),
            Self::Tracing(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ProviderError> for ClientError {
    fn from(err: ProviderError) -> Self {
        Self::Provider(err)
    }
}

impl From<ServerError> for ClientError {
    fn from(err: ServerError) -> Self {
        Self::Server(err)
    }
}

impl From<TracingError> for ClientError {
    fn from(err: TracingError) -> Self {
        Self::Tracing(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_errors_keep_their_message() {
        let err: ClientError = ProviderError::authentication("run `eventboard auth`")
            .with_provider("google")
            .into();
        assert_eq!(
            err.to_string(),
            "[google] authentication_failed: run `eventboard auth`"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn rejected_credentials_suggest_reauthorizing() {
        let err: ClientError = ProviderError::authorization("calendar not shared").into();
        assert_eq!(
            err.hint(),
            Some("run `eventboard auth --force` to grant calendar access again")
        );

        let wrapped: ClientError =
            ServerError::from(ProviderError::authentication("token revoked")).into();
        assert!(wrapped.hint().unwrap().contains("auth --force"));
    }

    #[test]
    fn transient_failures_suggest_retrying() {
        let err: ClientError = ProviderError::rate_limited("slow down").into();
        assert!(err.hint().unwrap().contains("try again later"));
    }

    #[test]
    fn other_errors_have_no_hint() {
        assert_eq!(ClientError::Config("x".into()).hint(), None);
        let err: ClientError = ProviderError::invalid_response("bad json").into();
        assert_eq!(err.hint(), None);
    }

    #[test]
    fn config_error_display() {
        let err = ClientError::Config("missing client secrets".into());
        assert_eq!(err.to_string(), "configuration error: missing client secrets");
    }
}
