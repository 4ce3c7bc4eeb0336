//! Command-line probe over the QA record core.
//!
//! Reads configuration from the environment (see `qarecord_core::config`)
//! and prints query results as JSON.

use clap::{Parser, Subcommand};
use log::error;
use qarecord_core::db::open_db;
use qarecord_core::{
    init_logging, CoreConfig, HttpMonitorClient, MonitorClient, PagingRequest, SonarRepository,
    SqliteSonarRepository, SqliteTpRecordRepository, TpRecordRepository,
};
use serde::Serialize;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "qarecord",
    version = qarecord_core::core_version(),
    about = "Query QA test records and scans"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Test-point records.
    #[command(subcommand)]
    Tp(TpCommand),
    /// Code-quality scan records.
    #[command(subcommand)]
    Sonar(SonarCommand),
    /// Monitoring service resources.
    #[command(subcommand)]
    Monitor(MonitorCommand),
}

#[derive(Debug, Subcommand)]
enum TpCommand {
    /// Show one record by id.
    Get { id: i64 },
    /// Show the newest record for a commit.
    ByCommit { commit_id: String },
    /// List record summaries of an application, newest first.
    List {
        #[arg(long)]
        app: i64,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        size: u32,
    },
}

#[derive(Debug, Subcommand)]
enum SonarCommand {
    /// Show the latest scan of an application.
    Latest {
        #[arg(long)]
        app: i64,
    },
}

#[derive(Debug, Subcommand)]
enum MonitorCommand {
    /// Show one alert by id.
    Alert { id: i64 },
    /// Show the first alert configured for a scope.
    AlertByScope { scope: String, scope_id: String },
    /// Show one custom alert by id.
    CustomAlert { id: i64 },
    /// Show the first custom alert configured for a scope.
    CustomAlertByScope { scope: String, scope_id: String },
    /// Show one report task by id.
    ReportTask { id: i64 },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match CoreConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("qarecord: {err}");
            return ExitCode::from(2);
        }
    };
    if let Err(err) = init_logging(&config.log_level, config.log_dir.as_deref()) {
        eprintln!("qarecord: {err}");
        return ExitCode::from(2);
    }

    match run(&config, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=cli_command module=cli status=error error={message}");
            eprintln!("qarecord: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &CoreConfig, command: Command) -> Result<(), String> {
    match command {
        Command::Tp(command) => {
            let mut conn = open_db(&config.db_path).map_err(|err| err.to_string())?;
            let repo = SqliteTpRecordRepository::try_new(&mut conn).map_err(|err| err.to_string())?;
            match command {
                TpCommand::Get { id } => {
                    print_json(&repo.find_by_id(id).map_err(|err| err.to_string())?)
                }
                TpCommand::ByCommit { commit_id } => print_json(
                    &repo
                        .find_by_commit_id(&commit_id)
                        .map_err(|err| err.to_string())?,
                ),
                TpCommand::List { app, page, size } => print_json(
                    &repo
                        .list_by_app_id(&PagingRequest::new(app, page, size))
                        .map_err(|err| err.to_string())?,
                ),
            }
        }
        Command::Sonar(SonarCommand::Latest { app }) => {
            let conn = open_db(&config.db_path).map_err(|err| err.to_string())?;
            let repo = SqliteSonarRepository::try_new(&conn).map_err(|err| err.to_string())?;
            // An application without scans prints `null`.
            print_json(&repo.find_latest_by_app_id(app).map_err(|err| err.to_string())?)
        }
        Command::Monitor(command) => {
            let base_url = config
                .monitor_url
                .as_deref()
                .ok_or_else(|| "QARECORD_MONITOR_URL is not set".to_string())?;
            let client = HttpMonitorClient::new(base_url, config.monitor_timeout);
            match command {
                MonitorCommand::Alert { id } => {
                    print_json(&client.get_alert_by_id(id).map_err(|err| err.to_string())?)
                }
                MonitorCommand::AlertByScope { scope, scope_id } => print_json(
                    &client
                        .get_alert_by_scope(&scope, &scope_id)
                        .map_err(|err| err.to_string())?,
                ),
                MonitorCommand::CustomAlert { id } => print_json(
                    &client
                        .get_custom_alert_by_id(id)
                        .map_err(|err| err.to_string())?,
                ),
                MonitorCommand::CustomAlertByScope { scope, scope_id } => print_json(
                    &client
                        .get_custom_alert_by_scope(&scope, &scope_id)
                        .map_err(|err| err.to_string())?,
                ),
                MonitorCommand::ReportTask { id } => print_json(
                    &client
                        .get_report_task_by_id(id)
                        .map_err(|err| err.to_string())?,
                ),
            }
        }
    }
}

fn print_json(value: &impl Serialize) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value).map_err(|err| err.to_string())?;
    println!("{text}");
    Ok(())
}
