//! HealthLog command line interface.

use anyhow::{bail, Context, Result};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use healthlog::goals::{GoalFilter, GoalManager};
use healthlog::health::{IncidentQuery, LogStatus};
use healthlog::integrations::sync::{
    sync_activities, ActivityQuery, StravaClient, StravaCredentials,
};
use healthlog::migration::{MigrationEngine, MigrationError, MigrationOptions, MigrationOutcome};
use healthlog::storage::{config, AppConfig, Database};
use healthlog::workouts::units::{format_distance, DistanceUnit};

#[derive(Parser)]
#[command(name = "healthlog")]
#[command(about = "Personal health tracking: incidents, lab results and fitness goals")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Move flat health logs into incidents with linked logs
    Migrate {
        /// Run the pre-check only
        #[arg(long)]
        check: bool,

        /// Show what would be written without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// List incidents grouped from health logs
    Incidents {
        /// Only entries with this status (active, improving, resolved)
        #[arg(short, long)]
        status: Option<String>,

        /// Only entries with this issue type
        #[arg(short, long)]
        issue_type: Option<String>,

        /// Maximum number of incidents
        #[arg(short, long)]
        limit: Option<usize>,

        /// List migrated incidents instead
        #[arg(long)]
        migrated: bool,
    },

    /// Show lab results with flags
    Labs {
        /// Only results of this test type
        #[arg(short, long)]
        test_type: Option<String>,
    },

    /// Show fitness goals with progress
    Goals,

    /// Pull activities from Strava
    Sync {
        /// Authorization code from the Strava consent redirect
        #[arg(long)]
        code: Option<String>,

        /// Page number
        #[arg(long, default_value = "1")]
        page: u32,

        /// Activities per page (defaults to the configured value)
        #[arg(long)]
        per_page: Option<u32>,
    },

    /// Print the configuration
    Config {
        /// Write the configuration file with current values
        #[arg(long)]
        save: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = config::load_config().context("Failed to load configuration")?;
    tracing::debug!("Using database {}", config.database_path().display());

    match cli.command {
        Commands::Migrate { check, dry_run } => cmd_migrate(&config, check, dry_run),
        Commands::Incidents {
            status,
            issue_type,
            limit,
            migrated,
        } => cmd_incidents(&config, status, issue_type, limit, migrated),
        Commands::Labs { test_type } => cmd_labs(&config, test_type),
        Commands::Goals => cmd_goals(&config),
        Commands::Sync {
            code,
            page,
            per_page,
        } => cmd_sync(&config, code, page, per_page),
        Commands::Config { save } => cmd_config(&config, save),
    }
}

fn open_database(config: &AppConfig) -> Result<Database> {
    let path = config.database_path();
    Database::open(&path).with_context(|| format!("Failed to open {}", path.display()))
}

fn cmd_migrate(config: &AppConfig, check_only: bool, dry_run: bool) -> Result<()> {
    let mut db = open_database(config)?;
    let options = MigrationOptions {
        dry_run,
        check_only,
    };

    let report = match MigrationEngine::new(&mut db, options).run() {
        Ok(report) => report,
        Err(MigrationError::Validation(check)) => {
            println!("{}", check);
            bail!("Migration aborted: {} invalid records", check.invalid_count());
        }
        Err(e) => return Err(e.into()),
    };

    match report.outcome {
        MigrationOutcome::Checked => {
            println!("{}", report.check);
            if !report.check.passed() {
                bail!("Pre-check failed");
            }
        }
        MigrationOutcome::NothingToMigrate => println!("No legacy health logs to migrate"),
        MigrationOutcome::DryRun => {
            println!("{}", report.check);
            println!(
                "Dry run: would back up {} logs, create {} incidents, replace {} logs with {}",
                report.backed_up,
                report.incidents_created,
                report.logs_deleted,
                report.logs_created
            );
        }
        MigrationOutcome::Completed => {
            println!(
                "Migrated: {} logs backed up, {} incidents created, {} logs deleted, {} logs created",
                report.backed_up,
                report.incidents_created,
                report.logs_deleted,
                report.logs_created
            );
        }
    }

    Ok(())
}

fn cmd_incidents(
    config: &AppConfig,
    status: Option<String>,
    issue_type: Option<String>,
    limit: Option<usize>,
    migrated: bool,
) -> Result<()> {
    let db = open_database(config)?;

    if migrated {
        let incidents = db.list_incidents()?;
        for incident in incidents.iter().take(limit.unwrap_or(config.incidents.default_limit)) {
            let logs = db.list_incident_logs(Some(&incident.id))?;
            println!(
                "{}  {}  pain {}  {} log(s)  {}",
                incident.date_started.format("%Y-%m-%d"),
                incident.pain_locations.join(", "),
                incident.pain_intensity,
                logs.len(),
                incident.description
            );
        }
        return Ok(());
    }

    let status = match status.as_deref() {
        Some(s) => Some(LogStatus::parse(s).with_context(|| format!("Unknown status: {}", s))?),
        None => None,
    };
    let query = IncidentQuery {
        issue_type,
        status,
        limit: limit.unwrap_or(config.incidents.default_limit),
        ..Default::default()
    };

    let outcome = query.run(&db.list_legacy_logs()?);
    for incident in &outcome.incidents {
        println!(
            "{}  {}  {} log(s) over {:.1}h  max pain {}  avg {:.1}  {}",
            incident.incident_key,
            incident.issue_type,
            incident.log_count,
            incident.duration_hours,
            incident.max_pain_level,
            incident.avg_pain_level,
            incident.status
        );
    }
    for warning in &outcome.warnings {
        eprintln!("warning: {}", warning);
    }

    Ok(())
}

fn cmd_labs(config: &AppConfig, test_type: Option<String>) -> Result<()> {
    let db = open_database(config)?;

    for result in db.list_lab_results(test_type.as_deref())? {
        println!(
            "{} {} ({} abnormal)",
            result.test_date,
            result.test_type,
            result.abnormal_count()
        );
        for (name, m) in result.lipid_measurements() {
            println!("  {:<18} {:>7.1} {:<6} {}", name, m.value, m.unit, m.flag());
        }
        for custom in &result.custom_results {
            let flag = custom.flag().map(|f| f.to_string()).unwrap_or_default();
            println!("  {:<18} {:?} {}", custom.test_name, custom.value, flag);
        }
    }

    Ok(())
}

fn cmd_goals(config: &AppConfig) -> Result<()> {
    let db = open_database(config)?;
    let workouts = db.list_workouts(None, None)?;
    let manager = GoalManager::new(db.connection());

    let goals = manager.list_with_progress(&GoalFilter::default(), &workouts, Utc::now())?;
    if goals.is_empty() {
        println!("No goals");
    }
    for entry in goals {
        println!(
            "{} ({}, {})  {:.1} / {:.1} {}  {:.0}%",
            entry.goal.goal_type,
            entry.goal.time_period.as_str(),
            entry.goal.status,
            entry.progress.current_value,
            entry.goal.target_value,
            entry.goal.unit,
            entry.progress.percentage
        );
    }

    Ok(())
}

fn cmd_sync(
    config: &AppConfig,
    code: Option<String>,
    page: u32,
    per_page: Option<u32>,
) -> Result<()> {
    let Some((client_id, client_secret)) = config.strava.client_credentials() else {
        bail!(
            "Strava client credentials are not configured (set {} and {})",
            config::ENV_CLIENT_ID,
            config::ENV_CLIENT_SECRET
        );
    };

    let db = open_database(config)?;
    let client = StravaClient::new(client_id, client_secret)?;
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    runtime.block_on(async {
        let mut credentials = match code {
            Some(code) => {
                let tokens = client.exchange_code(&code).await?;
                let credentials = StravaCredentials::from_token_response(tokens, 0)?;
                db.save_strava_credentials(&credentials)?;
                tracing::info!("Connected Strava athlete {}", credentials.athlete_id);
                credentials
            }
            None => match db.latest_strava_credentials()? {
                Some(credentials) => credentials,
                None => bail!(
                    "Not connected to Strava; authorize at {} and rerun with --code",
                    config.strava.redirect_uri
                ),
            },
        };

        let query = ActivityQuery {
            page,
            per_page: per_page.unwrap_or(config.sync.per_page),
            ..Default::default()
        };
        let margin = Duration::seconds(config.sync.refresh_margin_secs);

        let summary = sync_activities(&client, &mut credentials, &db, &query, margin).await?;
        println!(
            "Fetched {} activities: {} new, {} updated",
            summary.fetched, summary.new, summary.updated
        );

        let workouts = db.list_workouts(Some(Utc::now() - Duration::days(7)), None)?;
        let distance: f64 = workouts.iter().map(|w| w.distance).sum();
        println!(
            "Last 7 days: {} workouts, {}",
            workouts.len(),
            format_distance(distance, DistanceUnit::Kilometers)
        );

        Ok(())
    })
}

fn cmd_config(config: &AppConfig, save: bool) -> Result<()> {
    let text = toml::to_string_pretty(&config.redacted())
        .context("Failed to serialize configuration")?;
    println!("# {}", config::get_config_path().display());
    if config.strava.has_env_overrides() {
        println!(
            "# Strava credentials from {} / {} are not shown or saved",
            config::ENV_CLIENT_ID,
            config::ENV_CLIENT_SECRET
        );
    }
    println!("{}", text);

    if save {
        config::save_config(config)?;
        tracing::info!("Configuration saved");
    }

    Ok(())
}
