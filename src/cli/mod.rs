// CLI module - User-facing command-line interface

mod opts;
pub mod output;
mod selector;

pub use opts::LogsVars;
pub use selector::{DeploySelector, DeployedService, WorkspaceSelector};

use crate::config::{WorkspaceConfig, DEFAULT_CONFIG_PATH};
use crate::error::{Result, SvcLogsError};
use crate::logs::time::parse_duration;
use crate::logs::{
    FileLogSource, LogEventSource, LogPoller, OutputFormat, PollTarget, Renderer,
};
use chrono::{TimeDelta, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// svclogs - Read and follow the logs of deployed services
#[derive(Parser)]
#[command(name = "svclogs")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the workspace config file (.toml or .json)
    #[arg(long, global = true, env = "SVCLOGS_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display logs of a deployed service
    Logs(LogsArgs),
}

#[derive(Args)]
struct LogsArgs {
    /// Name of the application
    #[arg(short, long)]
    app: Option<String>,

    /// Name of the environment
    #[arg(short, long)]
    env: Option<String>,

    /// Name of the service
    #[arg(short, long)]
    name: Option<String>,

    /// Maximum number of log events returned (1-10000)
    #[arg(long, allow_negative_numbers = true)]
    limit: Option<i64>,

    /// Follow the logs as new events arrive
    #[arg(long)]
    follow: bool,

    /// Only show events at or after this RFC 3339 time
    #[arg(long)]
    start_time: Option<String>,

    /// Only show events at or before this RFC 3339 time
    #[arg(long)]
    end_time: Option<String>,

    /// Only show events newer than a relative duration like 5s, 2m or 3h
    #[arg(long, value_parser = parse_duration, allow_hyphen_values = true)]
    since: Option<TimeDelta>,

    /// Output each event as a JSON object
    #[arg(long)]
    json: bool,
}

impl LogsArgs {
    fn into_vars(self, default_limit: i64) -> LogsVars {
        LogsVars {
            app_name: self.app,
            env_name: self.env,
            svc_name: self.name,
            limit: self.limit.unwrap_or(default_limit),
            follow: self.follow,
            human_start_time: self.start_time,
            human_end_time: self.end_time,
            since: self.since,
            json: self.json,
        }
    }
}

impl Cli {
    /// Run the CLI application
    pub async fn run() -> Result<()> {
        let cli = Cli::parse();
        cli.execute().await
    }

    /// Execute the parsed command
    async fn execute(self) -> Result<()> {
        let Cli { config, command } = self;
        match command {
            Commands::Logs(args) => run_logs(&config, args).await,
        }
    }
}

/// Validate flags, pick the deployed service and print its logs to stdout
async fn run_logs(config_path: &Path, args: LogsArgs) -> Result<()> {
    let config = WorkspaceConfig::from_file(config_path)?;
    let vars = args.into_vars(config.default_limit);

    let params = vars.validate(&config)?;
    let target = vars.ask(&WorkspaceSelector::new(&config))?;

    let cancel = CancellationToken::new();
    if params.follow {
        let handler_cancel = cancel.clone();
        ctrlc::set_handler(move || handler_cancel.cancel()).map_err(|e| {
            SvcLogsError::Other(format!("install interrupt handler: {}", e))
        })?;
    }

    let color = params.output_format == OutputFormat::Human && output::stdout_is_terminal();
    let renderer = Renderer::new(params.output_format).with_color(color);
    let poller = LogPoller::new(params.query_options(Utc::now()), params.follow, renderer)
        .with_poll_interval(config.poll_interval())
        .with_cancellation(cancel);

    let source: Arc<dyn LogEventSource> = Arc::new(FileLogSource::new(&config.log_dir));
    tracing::info!(log_group = %target.log_group_name, follow = params.follow, "reading logs");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    poller.run(&[PollTarget::new(target, source)], &mut out).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_logs_args() {
        let cli = Cli::try_parse_from([
            "svclogs", "--config", "ws.json", "logs", "-a", "my-app", "-e", "test", "-n", "web",
            "--limit", "-1", "--since", "-1m", "--json",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("ws.json"));
        let Commands::Logs(args) = cli.command;
        let vars = args.into_vars(10);
        assert_eq!(vars.app_name.as_deref(), Some("my-app"));
        assert_eq!(vars.env_name.as_deref(), Some("test"));
        assert_eq!(vars.svc_name.as_deref(), Some("web"));
        assert_eq!(vars.limit, -1);
        assert_eq!(vars.since, Some(TimeDelta::minutes(-1)));
        assert!(vars.json);
        assert!(!vars.follow);
    }

    #[test]
    fn test_default_limit_comes_from_config() {
        let cli = Cli::try_parse_from(["svclogs", "logs", "--follow"]).unwrap();
        let Commands::Logs(args) = cli.command;
        let vars = args.into_vars(25);
        assert_eq!(vars.limit, 25);
        assert!(vars.follow);
    }

    #[test]
    fn test_rejects_bad_since() {
        assert!(Cli::try_parse_from(["svclogs", "logs", "--since", "soon"]).is_err());
    }
}
