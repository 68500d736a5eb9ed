mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use reptrack_core::Config;

use commands::goal::GoalAction;

#[derive(Parser)]
#[command(name = "reptrack")]
#[command(about = "Camera-assisted workout tracking", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log a finished workout by hand
    Log {
        /// Exercise type, e.g. Push-ups
        #[arg(short, long)]
        exercise: String,
        /// Repetitions completed
        #[arg(short, long)]
        reps: u32,
        /// Duration in seconds
        #[arg(short, long, default_value_t = 0)]
        duration: u64,
        /// Form score, 0-100
        #[arg(short, long, default_value_t = 100, value_parser = clap::value_parser!(u32).range(0..=100))]
        form: u32,
    },
    /// List recorded workouts, most recent first
    History {
        /// Maximum number of workouts to show
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    /// Chart reps per day
    Stats {
        /// Number of most recent active days to chart
        #[arg(short, long, default_value_t = 7)]
        days: usize,
    },
    /// Today's totals and goal progress
    Today,
    /// Totals over the last seven active days
    Week,
    /// Daily goal management
    Goal {
        #[command(subcommand)]
        action: GoalAction,
    },
    /// Record a workout from a directory of JPEG frames
    Track {
        /// Exercise type, e.g. Squats
        #[arg(short, long)]
        exercise: String,
        /// Directory of .jpg frames, submitted in file-name order
        #[arg(short, long)]
        frames: PathBuf,
        /// Submit to a running reptrack server instead of running the detector locally
        #[arg(short, long)]
        server: Option<String>,
        /// Milliseconds between frames (defaults to recorder.frame_interval_ms)
        #[arg(short, long)]
        interval_ms: Option<u64>,
    },
    /// Run the frame server
    Serve {
        /// Address to listen on (defaults to server.addr)
        #[arg(short, long)]
        addr: Option<String>,
    },
    /// Export workouts
    Export {
        /// Export format: json or csv
        #[arg(default_value = "json")]
        format: String,
        /// Output file (defaults to reptrack_export.<format>)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show a setting
    Get {
        /// Setting key, e.g. server.addr
        key: String,
    },
    /// Change a setting
    Set {
        /// Setting key, e.g. detector.program
        key: String,
        value: String,
    },
    /// Show all settings
    List,
    /// Print the config file location
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    match cli.command {
        Commands::Config { action } => run_config_command(action),
        command => run_command(command, Config::load()?).await,
    }
}

fn run_config_command(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Get { key } => commands::config::handle_config_get(&key),
        ConfigAction::Set { key, value } => commands::config::handle_config_set(&key, &value),
        ConfigAction::List => commands::config::handle_config_list(),
        ConfigAction::Path => commands::config::handle_config_path(),
    }
}

async fn run_command(command: Commands, mut config: Config) -> Result<()> {
    match command {
        Commands::Log {
            exercise,
            reps,
            duration,
            form,
        } => commands::workout::handle_log(&config, &exercise, reps, duration, form),
        Commands::History { limit } => commands::workout::handle_history(&config, limit),
        Commands::Stats { days } => commands::workout::handle_stats(&config, days),
        Commands::Today => commands::workout::handle_today(&config),
        Commands::Week => commands::workout::handle_week(&config),
        Commands::Goal { action } => commands::goal::handle_goal_command(&config, action),
        Commands::Track {
            exercise,
            frames,
            server,
            interval_ms,
        } => {
            commands::track::handle_track(
                &config,
                &exercise,
                &frames,
                server.as_deref(),
                interval_ms,
            )
            .await
        }
        Commands::Serve { addr } => {
            if let Some(addr) = addr {
                config.server.addr = addr;
            }
            reptrack_server::serve(&config).await
        }
        Commands::Export { format, output } => {
            commands::data::handle_data_export(&config, &format, output)
        }
        Commands::Config { action } => run_config_command(action),
    }
}
