//! `healthnote` command-line front end for the journal backend.

use anyhow::{bail, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use healthnote_backend::config::{self, AppConfig};
use healthnote_backend::domain::commands::logs::AddLogCommand;
use healthnote_backend::domain::commands::profile::UpdateProfileCommand;
use healthnote_backend::domain::models::{JournalState, Session};
use healthnote_backend::io::RemoteOutcome;
use healthnote_backend::{initialize_backend, AppState};
use shared::{LogCategory, ThemeOption};

#[derive(Debug, Parser)]
#[command(name = "healthnote", version, about = "Local-first health journal")]
struct Cli {
    /// Data directory (defaults to the platform data directory)
    #[arg(long, env = "HEALTHNOTE_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Authenticated user id issued by the identity provider
    #[arg(long, env = "HEALTHNOTE_SESSION_SUBJECT", global = true)]
    session_subject: Option<String>,

    /// Access token for the remote backend
    #[arg(long, env = "HEALTHNOTE_ACCESS_TOKEN", global = true, hide_env_values = true)]
    access_token: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show identity, session and what is stored locally
    Status,

    /// Create the profile
    Onboard {
        #[arg(long)]
        name: String,
        /// Birth date (YYYY-MM-DD)
        #[arg(long)]
        birth_date: NaiveDate,
        /// Child mode; defaults to on for anyone under 18
        #[arg(long)]
        child_mode: Option<bool>,
    },

    /// Edit profile settings
    Profile {
        #[arg(long)]
        name: Option<String>,
        /// light, dark or system
        #[arg(long)]
        theme: Option<ThemeOption>,
        #[arg(long)]
        child_mode: Option<bool>,
        /// Height in cm
        #[arg(long)]
        height: Option<f64>,
        /// Weight in kg
        #[arg(long)]
        weight: Option<f64>,
    },

    /// Record a journal entry
    Log {
        /// sleep, mental, exercise, food, mood, stress or body
        category: LogCategory,
        /// Score on the category's scale (ignored for body)
        value: Option<f64>,
        /// Entry date (YYYY-MM-DD), today when omitted
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        note: Option<String>,
        /// Height in cm (body entries)
        #[arg(long)]
        height: Option<f64>,
        /// Weight in kg (body entries)
        #[arg(long)]
        weight: Option<f64>,
        /// Use this id instead of generating one
        #[arg(long)]
        id: Option<String>,
    },

    /// BMI, growth deviation and the weekly trend
    Summary,

    /// Write a JSON backup bundle
    Export {
        /// Target directory (defaults to the documents directory)
        #[arg(long)]
        dir: Option<String>,
    },

    /// Export the logs as CSV
    ExportCsv {
        /// Output file; prints to stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Restore from a JSON backup bundle
    Import { path: PathBuf },

    /// Delete the profile and all logs, locally and remotely
    Clear {
        #[arg(long)]
        yes: bool,
    },

    /// Forget the session and the local copy of its data
    SignOut,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusReport<'a> {
    identity: &'a str,
    identity_kind: String,
    session_active: bool,
    remote_configured: bool,
    needs_onboarding: bool,
    log_count: usize,
    data_dir: String,
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn session_from(cli: &Cli) -> Option<Session> {
    match (cli.session_subject.as_deref(), cli.access_token.as_deref()) {
        (Some(subject), Some(token)) if !subject.trim().is_empty() && !token.trim().is_empty() => {
            Some(Session::new(subject.trim(), token.trim()))
        }
        (None, None) => None,
        _ => {
            warn!("Session needs both a subject and an access token; continuing without one");
            None
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let data_dir = match cli.data_dir.clone() {
        Some(dir) => dir,
        None => config::resolve_data_directory()?,
    };
    let app_config = AppConfig::load_with_env(&data_dir)?;
    let app = initialize_backend(&data_dir, &app_config)?;

    let mut state = app.journal_service.bootstrap(session_from(&cli)).await?;
    let result = run(&cli, &app, &mut state, &data_dir, app_config.remote.is_configured()).await;

    for outcome in app.journal_service.flush_remote().await {
        match outcome {
            RemoteOutcome::Ok | RemoteOutcome::Skipped => {}
            other => warn!("Remote mirror not updated: {:?}", other),
        }
    }

    result
}

async fn run(cli: &Cli, app: &AppState, state: &mut JournalState, data_dir: &Path, remote: bool) -> Result<()> {
    let today = Local::now().date_naive();
    let journal = &app.journal_service;

    match &cli.command {
        Command::Status => {
            let report = StatusReport {
                identity: &state.identity.id,
                identity_kind: format!("{:?}", state.identity.kind).to_lowercase(),
                session_active: state.session_active(),
                remote_configured: remote,
                needs_onboarding: state.needs_onboarding(),
                log_count: state.logs.len(),
                data_dir: data_dir.display().to_string(),
            };
            if cli.json {
                print_json(&report)?;
            } else {
                println!("Identity:   {} ({})", report.identity, report.identity_kind);
                println!("Session:    {}", if report.session_active { "active" } else { "none" });
                println!("Remote:     {}", if remote { "configured" } else { "local only" });
                println!("Profile:    {}", if report.needs_onboarding { "missing, run onboard" } else { "present" });
                println!("Logs:       {}", report.log_count);
                println!("Data dir:   {}", report.data_dir);
            }
        }

        Command::Onboard {
            name,
            birth_date,
            child_mode,
        } => {
            let profile = journal
                .complete_onboarding(state, name, *birth_date, *child_mode, today)
                .await?;
            if cli.json {
                print_json(&profile)?;
            } else {
                println!(
                    "Welcome, {}! Child mode is {}.",
                    profile.name,
                    if profile.is_child_mode { "on" } else { "off" }
                );
            }
        }

        Command::Profile {
            name,
            theme,
            child_mode,
            height,
            weight,
        } => {
            let command = UpdateProfileCommand {
                name: name.clone(),
                theme: *theme,
                is_child_mode: *child_mode,
                height: *height,
                weight: *weight,
            };
            let profile = journal.update_profile(state, command).await?;
            if cli.json {
                print_json(&profile)?;
            } else {
                println!("Profile saved for {}", profile.name);
                if app.metrics_service.child_mode_mismatch(&profile, today) {
                    println!("Note: child mode is on but {} is 18 or older.", profile.name);
                }
            }
        }

        Command::Log {
            category,
            value,
            date,
            note,
            height,
            weight,
            id,
        } => {
            let date = date.unwrap_or(today);
            let mut command = if *category == LogCategory::Body {
                AddLogCommand::body(date, *height, *weight)
            } else {
                let Some(value) = value else {
                    bail!("A {} entry needs a value", category);
                };
                AddLogCommand::score(date, *category, *value)
            };
            if let Some(note) = note {
                command = command.with_note(note.clone());
            }
            if let Some(id) = id {
                command = command.with_id(id.clone());
            }

            let logs = journal.add_log(state, command).await?;
            if cli.json {
                print_json(&logs)?;
            } else {
                println!("Saved {} entry for {} ({} entries total)", category, date, logs.len());
            }
        }

        Command::Summary => {
            let Some(profile) = state.profile.as_ref() else {
                bail!("No profile yet; run `healthnote onboard` first");
            };
            let metrics = &app.metrics_service;
            let summary = metrics.dashboard_summary(profile, &state.logs, today);

            if cli.json {
                print_json(&summary)?;
            } else {
                if summary.is_birthday {
                    println!("Happy birthday, {}!", profile.name);
                }
                println!("Age:    {}", summary.age_years);
                println!("BMI:    {} ({})", metrics.bmi_display(&summary.bmi), summary.bmi.category);
                if let Some(growth) = &summary.growth {
                    println!(
                        "Growth: {} ({:+.1}% vs {} cm at {} months, approximate)",
                        growth.label, growth.percent_difference, growth.reference.height_cm, growth.reference.age_months
                    );
                }
                if summary.child_mode_mismatch {
                    println!("Note: child mode is on for an adult profile.");
                }
                println!("Week:");
                for point in &summary.weekly_trend {
                    let show = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string());
                    println!("  {}  mood {:>3}  stress {:>4}", point.date, show(point.mood), show(point.stress));
                }
            }
        }

        Command::Export { dir } => {
            let response = app.export_service.export_to_path(dir.clone())?;
            if cli.json {
                print_json(&response)?;
            } else {
                println!("{}", response.message);
            }
            if !response.success {
                bail!("Export failed");
            }
        }

        Command::ExportCsv { output } => {
            let response = app.export_service.export_logs_csv()?;
            match output {
                Some(path) => {
                    std::fs::write(path, &response.csv_content)?;
                    info!("Wrote {} logs to {:?}", response.log_count, path);
                    println!("Wrote {} entries to {}", response.log_count, path.display());
                }
                None => print!("{}", response.csv_content),
            }
        }

        Command::Import { path } => {
            let response = app.export_service.import_from_path(path)?;
            if response.success {
                journal.reload(state)?;
            }
            if cli.json {
                print_json(&response)?;
            } else {
                println!("{}", response.message);
            }
            if !response.success {
                bail!("Import failed");
            }
        }

        Command::Clear { yes } => {
            if !yes {
                bail!("This deletes the profile and every entry; pass --yes to confirm");
            }
            journal.clear_data(state).await?;
            println!("All journal data deleted.");
        }

        Command::SignOut => {
            if !state.session_active() {
                println!("Not signed in.");
                return Ok(());
            }
            journal.sign_out(state).await?;
            println!("Signed out. Local data for the session was removed.");
        }
    }

    Ok(())
}
