use anyhow::{anyhow, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process;

use dispatch_board::config::Config;
use dispatch_board::display::{render_activities, render_carriers, render_profiles};
use dispatch_board::utils::{format_minutes, is_blank, parse_count, parse_date, validate_quantity};
use dispatch_board::{
    logging, ActivityFilter, ActivityStatus, ClockTime, DestinationWindow, DurationEngine,
    PlanRequest,
};

#[derive(Parser)]
#[command(name = "dispatch")]
#[command(about = "Carrier dispatch board: plan, finish and review warehouse activities", long_about = None)]
struct Cli {
    /// Configuration file (default: platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Board snapshot file, overrides the configuration
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Activity profile table (JSON), overrides the configuration
    #[arg(long, global = true)]
    profiles: Option<PathBuf>,

    /// Service date (YYYY-MM-DD, YYYY.MM.DD or YYYY/MM/DD, default: today)
    #[arg(long, global = true)]
    date: Option<String>,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Register or list carriers
    Carrier {
        #[command(subcommand)]
        action: CarrierCommand,
    },
    /// Start an activity for a carrier
    Plan {
        /// Carrier ID
        #[arg(short = 'c', long)]
        carrier: u64,

        /// Operator doing the work
        #[arg(short = 'o', long)]
        operator: String,

        /// Activity type, e.g. "Carregamento - Fracionado"
        #[arg(short = 't', long = "type")]
        activity_type: String,

        /// Pallets (units for "Picking - Área de Saída")
        #[arg(short = 'q', long, allow_hyphen_values = true)]
        quantity: String,

        /// Start time HH:MM (default: now)
        #[arg(short = 's', long)]
        start: Option<String>,
    },
    /// Finish a planned activity
    Finish {
        /// Activity ID
        id: u64,

        /// Completion time HH:MM (default: now)
        #[arg(short = 'a', long)]
        at: Option<String>,

        /// Delay reason, required when finishing late
        #[arg(short = 'r', long)]
        reason: Option<String>,
    },
    /// Approve a completed activity
    Approve {
        /// Activity ID
        id: u64,
    },
    /// Reject a completed activity
    Reject {
        /// Activity ID
        id: u64,
    },
    /// List activities for the service date
    List {
        /// Only this carrier
        #[arg(short = 'c', long)]
        carrier: Option<u64>,

        /// Only this status (planned, completed, approved, rejected)
        #[arg(short = 'S', long)]
        status: Option<String>,

        /// Include every service date
        #[arg(long)]
        all_days: bool,
    },
    /// Show unfinished activities past their planned completion
    Overdue {
        /// Clock reading to compare against HH:MM (default: now)
        #[arg(short = 'n', long)]
        now: Option<String>,
    },
    /// Show review totals and completed activities waiting for approval
    Review,
    /// Estimate the planned completion without recording anything
    Estimate {
        /// Activity type
        #[arg(short = 't', long = "type")]
        activity_type: String,

        /// Pallets or units
        #[arg(short = 'q', long, allow_hyphen_values = true)]
        quantity: String,

        /// Start time HH:MM (default: now)
        #[arg(short = 's', long)]
        start: Option<String>,
    },
    /// List the activity types and their durations
    Types,
}

#[derive(Subcommand)]
enum CarrierCommand {
    /// Register a carrier departure
    Add {
        /// Carrier name
        #[arg(short = 'n', long)]
        name: String,

        /// Departure time HH:MM
        #[arg(short = 'd', long)]
        departure: String,

        /// Load for: today, tomorrow or "3 days"
        #[arg(short = 'w', long, default_value = "today")]
        window: String,
    },
    /// List registered carriers
    List,
}

fn main() {
    let cli = Cli::parse();

    match run(cli) {
        Ok(_) => (),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(data) = cli.data.clone() {
        config.data_file = Some(data);
    }
    if let Some(profiles) = cli.profiles.clone() {
        config.profiles_file = Some(profiles);
    }

    let store = config.board_store()?;
    match &config.log_file {
        Some(log_file) => {
            let log_dir = store
                .path()
                .parent()
                .map(|dir| dir.join("logs"))
                .unwrap_or_else(|| PathBuf::from("logs"));
            logging::init_with_file(&log_dir, log_file, cli.verbose)
                .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;
        }
        None => logging::init(cli.verbose),
    }

    let engine = DurationEngine::new(config.profile_table()?);
    let today = match &cli.date {
        Some(date) => parse_date(date)?,
        None => Local::now().date_naive(),
    };
    tracing::debug!(
        snapshot = %store.path().display(),
        profiles = engine.profiles().len(),
        %today,
        "Starting"
    );

    let mut board = store.load()?;

    match cli.command {
        Some(Commands::Carrier { action }) => match action {
            CarrierCommand::Add {
                name,
                departure,
                window,
            } => {
                let departure: ClockTime = departure.parse()?;
                let window: DestinationWindow = window.parse()?;
                let carrier = board.register_carrier(&name, departure, window, today)?;
                println!(
                    "✅ Registered carrier #{}: {} departing {} (load for {})",
                    carrier.id, carrier.name, carrier.departure_time, carrier.destination_window
                );
                store.save(&board)?;
            }
            CarrierCommand::List => {
                println!("{}", render_carriers(board.carriers()));
            }
        },
        Some(Commands::Plan {
            carrier,
            operator,
            activity_type,
            quantity,
            start,
        }) => {
            let request = PlanRequest {
                carrier_id: carrier,
                operator,
                type_name: activity_type,
                quantity: validate_quantity(&quantity)?,
                start_time: clock_or_now(start.as_deref())?,
            };
            let id = board.plan_activity(&engine, request, today)?.id;
            store.save(&board)?;

            let activity = board.activity(id)?;
            let carrier = board.carrier(activity.carrier_id)?;
            let unit = engine
                .profiles()
                .get(&activity.type_name)
                .map(|p| p.unit)
                .unwrap_or_default();
            println!(
                "✅ Activity #{} planned: {} for {} ({} {}, operator {})",
                activity.id,
                activity.type_name,
                carrier.name,
                activity.quantity,
                unit.label(activity.quantity),
                activity.operator
            );
            println!(
                "   Start {}, planned completion {} ({})",
                activity.start_time,
                activity.planned_completion_time,
                format_minutes(
                    activity
                        .planned_completion_time
                        .minutes_since(activity.start_time)
                )
            );
            if !engine.profiles().contains(&activity.type_name) {
                println!("   ⚠️  Unknown activity type, planned at 1 min per unit");
            }
        }
        Some(Commands::Finish { id, at, reason }) => {
            let at = clock_or_now(at.as_deref())?;
            let preview = board.preview_finish(id, at, today)?;
            let status = board.activity(id)?.status();

            let reason = match reason {
                Some(reason) => Some(reason),
                None if !preview.on_time
                    && status == ActivityStatus::Planned
                    && io::stdin().is_terminal() =>
                {
                    prompt_for_delay_reason(preview.minutes_late)?
                }
                None => None,
            };

            let evaluation = board.finish_activity(id, at, reason, today)?;
            store.save(&board)?;

            let activity = board.activity(id)?;
            let elapsed = evaluation
                .elapsed_minutes
                .map(format_minutes)
                .unwrap_or_else(|| "-".to_string());
            if evaluation.on_time {
                println!(
                    "✅ Activity #{} finished on time at {} (planned {}, took {})",
                    id,
                    activity
                        .actual_completion_time
                        .map(|t| t.to_string())
                        .unwrap_or_default(),
                    activity.planned_completion_time,
                    elapsed
                );
            } else {
                println!(
                    "⏰ Activity #{} finished late at {}: {} past planned {} (took {})",
                    id,
                    activity
                        .actual_completion_time
                        .map(|t| t.to_string())
                        .unwrap_or_default(),
                    format_minutes(evaluation.minutes_late),
                    activity.planned_completion_time,
                    elapsed
                );
                if let Some(reason) = &activity.delay_reason {
                    println!("   Reason: {}", reason);
                }
            }
        }
        Some(Commands::Approve { id }) => {
            board.approve(id)?;
            store.save(&board)?;
            println!("✅ Activity #{} approved", id);
        }
        Some(Commands::Reject { id }) => {
            board.reject(id)?;
            store.save(&board)?;
            println!("❌ Activity #{} rejected", id);
        }
        Some(Commands::List {
            carrier,
            status,
            all_days,
        }) => {
            let filter = ActivityFilter {
                carrier_id: carrier,
                status: status.as_deref().map(str::parse::<ActivityStatus>).transpose()?,
                service_date: (!all_days).then_some(today),
            };
            let activities = board.activities(&filter);
            if cli.verbose {
                println!("{} activities match {:?}", activities.len(), filter);
            }
            println!("{}", render_activities(&board, engine.profiles(), &activities));
        }
        Some(Commands::Overdue { now }) => {
            let now = clock_or_now(now.as_deref())?;
            let overdue = board.overdue(now, today);
            if overdue.is_empty() {
                println!("✅ No overdue activities at {}", now);
            } else {
                println!("⏰ {} overdue activities at {}", overdue.len(), now);
                println!("{}", render_activities(&board, engine.profiles(), &overdue));
            }
        }
        Some(Commands::Review) => {
            let queue = board.review_queue();
            println!("{}", board.review_summary());
            println!("{} activities awaiting review", queue.len());
            if !queue.is_empty() {
                println!("{}", render_activities(&board, engine.profiles(), &queue));
            }
        }
        Some(Commands::Estimate {
            activity_type,
            quantity,
            start,
        }) => {
            let quantity = parse_count(&quantity)?;
            let start = clock_or_now(start.as_deref())?;
            let completion = engine.planned_completion(start, &activity_type, quantity);
            println!(
                "{} x {}: {} from {} -> planned completion {}",
                activity_type,
                quantity,
                format_minutes(completion.minutes_since(start)),
                start,
                completion
            );
            if !engine.profiles().contains(&activity_type) {
                println!("⚠️  Unknown activity type, using 1 min per unit");
            }
        }
        Some(Commands::Types) => {
            println!("{}", render_profiles(engine.profiles()));
        }
        None => {
            println!("No command specified. Use --help for available commands.");
        }
    }

    Ok(())
}

fn clock_or_now(value: Option<&str>) -> Result<ClockTime> {
    match value {
        Some(value) => Ok(value.parse()?),
        None => Ok(ClockTime::now()),
    }
}

fn prompt_for_delay_reason(minutes_late: f64) -> Result<Option<String>> {
    println!(
        "This activity is {} past its planned completion.",
        format_minutes(minutes_late)
    );
    print!("Delay reason: ");
    io::stdout().flush()?;

    let mut reason = String::new();
    io::stdin().read_line(&mut reason)?;
    if is_blank(&reason) {
        Ok(None)
    } else {
        Ok(Some(reason.trim().to_string()))
    }
}
