//! Command-line interface definition.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use eventboard_core::{TracingConfig, TracingOutputFormat};
use eventboard_server::{
    DEFAULT_CALENDAR_ID, DEFAULT_CLIENT_SECRETS_PATH, DEFAULT_FTP_CREDENTIALS_PATH,
    DEFAULT_REMOTE_FILENAME, DEFAULT_TOKEN_PATH, RunnerConfig,
};
use tracing::Level;

/// eventboard - publish upcoming calendar events as a web page
#[derive(Debug, Parser)]
#[command(name = "eventboard")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// Only log warnings and errors
    #[arg(long, short = 'q', global = true, conflicts_with = "debug")]
    pub quiet: bool,

    /// Log filter directives, e.g. `eventboard_server=debug,reqwest=info`
    ///
    /// Takes precedence over RUST_LOG, --debug and --quiet.
    #[arg(long, env = "EVENTBOARD_LOG", global = true)]
    pub log_filter: Option<String>,

    /// Log line format: compact, pretty or json
    #[arg(long, env = "EVENTBOARD_LOG_FORMAT", default_value = "compact", global = true)]
    pub log_format: TracingOutputFormat,

    #[command(flatten)]
    pub settings: Settings,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Paths and names shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// Calendar to read
    #[arg(long, env = "EVENTBOARD_CALENDAR_ID", default_value = DEFAULT_CALENDAR_ID, global = true)]
    pub calendar_id: String,

    /// Seconds to wait between publish cycles
    #[arg(
        long,
        env = "EVENTBOARD_INTERVAL",
        default_value_t = 15,
        value_parser = clap::value_parser!(u64).range(1..),
        global = true
    )]
    pub interval: u64,

    /// OAuth credential cache
    #[arg(long, env = "EVENTBOARD_TOKEN_PATH", default_value = DEFAULT_TOKEN_PATH, global = true)]
    pub token_path: PathBuf,

    /// OAuth client secrets JSON from the Google Cloud Console
    #[arg(long, env = "EVENTBOARD_CLIENT_SECRETS", default_value = DEFAULT_CLIENT_SECRETS_PATH, global = true)]
    pub client_secrets: PathBuf,

    /// FTP credentials file (host, user, password, remote directory)
    #[arg(long, env = "EVENTBOARD_FTP_CREDENTIALS", default_value = DEFAULT_FTP_CREDENTIALS_PATH, global = true)]
    pub ftp_credentials: PathBuf,

    /// File name of the page on the FTP host
    #[arg(long, env = "EVENTBOARD_REMOTE_FILENAME", default_value = DEFAULT_REMOTE_FILENAME, global = true)]
    pub remote_filename: String,
}

impl Settings {
    /// Builds the publish loop configuration.
    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig::default()
            .with_calendar_id(&self.calendar_id)
            .with_poll_interval(Duration::from_secs(self.interval))
            .with_token_path(&self.token_path)
            .with_client_secrets_path(&self.client_secrets)
            .with_ftp_credentials_path(&self.ftp_credentials)
            .with_remote_filename(&self.remote_filename)
    }
}

/// Available commands. Without one, `run` is assumed.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Publish the events page every interval until interrupted
    Run,

    /// Obtain or refresh the stored Google credential
    Auth {
        /// Discard the stored credential and ask for consent again
        #[arg(long, short)]
        force: bool,
    },

    /// Render the page once without publishing it
    Render {
        /// Write the page here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Print upcoming events as JSON
    Events,
}

impl Cli {
    /// Logging setup selected by the flags.
    pub fn tracing_config(&self) -> TracingConfig {
        let mut config = if self.debug {
            TracingConfig::cli_debug()
        } else {
            TracingConfig::service()
        };
        if self.quiet {
            config = config.with_level(Level::WARN);
        }
        if let Some(filter) = &self.log_filter {
            config = config.with_env_filter(filter);
        }
        config.with_format(self.log_format)
    }

    /// The subcommand to run, defaulting to `run`.
    pub fn subcommand(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_run() {
        let cli = Cli::try_parse_from(["eventboard"]).unwrap();
        assert!(matches!(cli.subcommand(), Command::Run));
        assert!(!cli.debug);
        assert_eq!(cli.log_format, TracingOutputFormat::Compact);
    }

    #[test]
    fn defaults_produce_default_config() {
        let cli = Cli::try_parse_from(["eventboard", "run"]).unwrap();
        assert_eq!(cli.settings.runner_config(), RunnerConfig::default());
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "eventboard",
            "--calendar-id",
            "club@example.com",
            "--interval",
            "60",
            "--remote-filename",
            "events.html",
            "run",
            "--ftp-credentials",
            "/etc/eventboard/ftp",
        ])
        .unwrap();

        let config = cli.settings.runner_config();
        assert_eq!(config.calendar_id, "club@example.com");
        assert_eq!(config.poll_interval, Duration::from_secs(60));
        assert_eq!(config.remote_filename, "events.html");
        assert_eq!(config.ftp_credentials_path, PathBuf::from("/etc/eventboard/ftp"));
    }

    #[test]
    fn zero_interval_is_rejected() {
        assert!(Cli::try_parse_from(["eventboard", "--interval", "0"]).is_err());
    }

    #[test]
    fn log_format_parses() {
        let cli = Cli::try_parse_from(["eventboard", "--log-format", "json", "events"]).unwrap();
        assert_eq!(cli.log_format, TracingOutputFormat::Json);
        assert!(matches!(cli.subcommand(), Command::Events));

        assert!(Cli::try_parse_from(["eventboard", "--log-format", "xml"]).is_err());
    }

    #[test]
    fn logging_flags_shape_tracing_config() {
        let cli = Cli::try_parse_from(["eventboard"]).unwrap();
        let config = cli.tracing_config();
        assert_eq!(config.default_level, Level::INFO);
        assert!(config.env_filter.is_none());

        let cli = Cli::try_parse_from(["eventboard", "-q", "--log-format", "json"]).unwrap();
        let config = cli.tracing_config();
        assert_eq!(config.default_level, Level::WARN);
        assert_eq!(config.output_format, TracingOutputFormat::Json);

        let cli = Cli::try_parse_from(["eventboard", "--debug"]).unwrap();
        assert_eq!(cli.tracing_config().default_level, Level::DEBUG);

        let cli =
            Cli::try_parse_from(["eventboard", "--log-filter", "eventboard_server=trace"]).unwrap();
        assert_eq!(
            cli.tracing_config().env_filter.as_deref(),
            Some("eventboard_server=trace")
        );
    }

    #[test]
    fn quiet_and_debug_conflict() {
        assert!(Cli::try_parse_from(["eventboard", "--debug", "--quiet"]).is_err());
    }

    #[test]
    fn subcommand_options() {
        let cli = Cli::try_parse_from(["eventboard", "auth", "--force"]).unwrap();
        assert!(matches!(cli.subcommand(), Command::Auth { force: true }));

        let cli = Cli::try_parse_from(["eventboard", "render", "-o", "page.html"]).unwrap();
        match cli.subcommand() {
            Command::Render { output } => assert_eq!(output, Some(PathBuf::from("page.html"))),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
