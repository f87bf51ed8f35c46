use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use jennyio_client::ChannelMultiplexer;
use jennyio_transport::EventReceiver;
use url::Url;

use crate::exit::{CliError, CliResult, TIMEOUT, TRANSPORT_ERROR, USAGE};
use crate::output::OutputFormat;

pub mod endpoint;
pub mod listen;
pub mod send;
pub mod version;

/// Fallback for the page URL argument.
pub const PAGE_URL_ENV: &str = "JENNYIO_PAGE_URL";

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Subscribe to channels and print what arrives.
    Listen(ListenArgs),
    /// Publish one message on a channel.
    Send(SendArgs),
    /// Print the socket endpoint derived from a page URL.
    Endpoint(EndpointArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub async fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Listen(args) => listen::run(args, format).await,
        Command::Send(args) => send::run(args, format).await,
        Command::Endpoint(args) => endpoint::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// URL of the console page the socket belongs to.
    #[arg(env = PAGE_URL_ENV)]
    pub page: String,
    /// Channels to subscribe to (comma-separated).
    #[arg(long, short = 'c', value_delimiter = ',', required = true)]
    pub channels: Vec<String>,
    /// Exit after receiving N messages.
    #[arg(long)]
    pub count: Option<usize>,
    /// Maximum time to wait for the connection to open (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// URL of the console page the socket belongs to.
    #[arg(env = PAGE_URL_ENV)]
    pub page: String,
    /// Channel to publish on.
    #[arg(long, short = 'c')]
    pub channel: String,
    /// JSON payload.
    #[arg(long, conflicts_with_all = ["data", "file"])]
    pub json: Option<String>,
    /// String payload, sent as a JSON string.
    #[arg(long, conflicts_with_all = ["json", "file"])]
    pub data: Option<String>,
    /// Read a JSON payload from file.
    #[arg(long, conflicts_with_all = ["json", "data"])]
    pub file: Option<PathBuf>,
    /// Subscribe to the channel first and print the first reply.
    #[arg(long)]
    pub wait: bool,
    /// Maximum time to wait for the connection, and for the reply when
    /// --wait is set (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct EndpointArgs {
    /// URL of the console page.
    #[arg(env = PAGE_URL_ENV)]
    pub page: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub(crate) fn parse_page_url(input: &str) -> CliResult<Url> {
    Url::parse(input.trim())
        .map_err(|err| CliError::new(USAGE, format!("invalid page url '{input}': {err}")))
}

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;
    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

/// Pump events until the connection opens, closes, or `timeout` passes.
pub(crate) async fn wait_for_open(
    io: &ChannelMultiplexer,
    events: &mut EventReceiver,
    timeout: Duration,
) -> CliResult<()> {
    let opened = tokio::time::timeout(timeout, async {
        while let Some(event) = events.recv().await {
            io.handle_event(event);
            if io.is_ready() {
                return true;
            }
            if io.state().is_closed() {
                return false;
            }
        }
        false
    })
    .await;

    match opened {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::new(
            TRANSPORT_ERROR,
            "connection closed before it opened",
        )),
        Err(_) => Err(CliError::new(
            TIMEOUT,
            format!("connection not open after {timeout:?}"),
        )),
    }
}

/// Close the connection and give the socket task a moment to say goodbye.
pub(crate) async fn shutdown(io: &ChannelMultiplexer, events: &mut EventReceiver) {
    io.close();
    let _ = tokio::time::timeout(Duration::from_secs(1), io.run(events)).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("  ").is_err());
    }

    #[test]
    fn parse_page_url_reports_usage() {
        let err = parse_page_url("not a url").unwrap_err();
        assert_eq!(err.code, USAGE);
        assert!(parse_page_url(" https://console.example/ ").is_ok());
    }
}
