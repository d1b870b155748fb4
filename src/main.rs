use std::fs;

use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tvrip::capture::dvbtee::DvbteeCapture;
use tvrip::capture::CaptureTool;
use tvrip::config::Config;
use tvrip::error::Error;
use tvrip::execution::Scheduler;
use tvrip::queue::ProcessingQueue;

#[derive(Parser)]
#[command(about = "Record a broadcast channel into one file per program")]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,

    /// Log as JSON lines.
    #[arg(long, env = "TVRIP_LOG_JSON", global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Record continuously, naming and stopping each file by the guide. The default.
    Record,
    /// Print the guide for the configured channel and exit.
    Guide {
        #[arg(long)]
        json: bool,
    },
}

pub fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if cli.log_json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config = cli.config;
    let capture = DvbteeCapture::new(&config.dvbtee);

    match cli.command.unwrap_or(Command::Record) {
        Command::Guide { json } => {
            let schedule = capture
                .fetch_guide(&config.channel)
                .context("fetching guide")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&schedule)?);
            } else {
                let now = Local::now().naive_local();
                let current = schedule.find_current(now);
                for program in &schedule {
                    let airing = current.is_some_and(|current| std::ptr::eq(current, program));
                    let marker = if airing { "*" } else { " " };
                    println!("{marker} {program}");
                }
            }

            Ok(())
        }
        Command::Record => {
            fs::create_dir_all(&config.workdir).map_err(|source| Error::Workdir {
                path: config.workdir.clone(),
                source,
            })?;

            // Nothing consumes finished recordings yet; hold the receiver so the
            // queue stays open.
            let (queue, _pending) = ProcessingQueue::channel();
            Scheduler::new(capture, config.channel.clone(), &config.workdir, queue)
                .with_retry_delay(config.retry_delay())
                .run()
        }
    }
}
