// src/bin/usage_limit_cli.rs

use futures::future::join_all;
use prettytable::{row, Table};
use std::process;
use std::time::Duration;
use structopt::StructOpt;
use tracing::{error, info, warn};
use uuid::Uuid;

use usage_limiter::config::LimiterConfig;
use usage_limiter::storage::{ConfiguredStorage, MemoryStorage, StorageBackend};
use usage_limiter::{
    Clock, ManualClock, QuotaDescriptor, SessionContext, SystemClock, UsageLimitError,
    UsageLimiter, UsageRequest,
};

/// Exit status used when a check is rejected
const EXIT_LIMIT_EXCEEDED: i32 = 2;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "usage_limit_cli",
    about = "Check, reset and simulate per-identifier usage limits"
)]
struct Opt {
    /// Verbosity level
    #[structopt(short, long, parse(from_occurrences), global = true)]
    verbose: usize,

    /// Disable logs
    #[structopt(long, global = true)]
    disable_logs: bool,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, StructOpt)]
struct Subject {
    /// User identity
    #[structopt(short, long)]
    user_id: String,

    /// Tracking method: workspace-user, app-user, app or conversation
    #[structopt(short, long)]
    tracking_method: Option<String>,

    /// App identity of the calling session
    #[structopt(long, default_value = "")]
    app_id: String,

    /// Conversation identity of the calling session
    #[structopt(long, default_value = "")]
    conversation_id: String,
}

impl Subject {
    fn session(&self) -> SessionContext {
        SessionContext::new(self.app_id.clone(), self.conversation_id.clone())
    }
}

#[derive(Debug, StructOpt)]
struct CheckArgs {
    #[structopt(flatten)]
    subject: Subject,

    /// Maximum events per window (integer literal)
    #[structopt(short, long)]
    limit: String,

    /// Window duration in seconds (integer literal)
    #[structopt(short, long)]
    duration_seconds: Option<String>,

    /// Window strategy: fixed or sliding
    #[structopt(short = "s", long)]
    limit_strategy: Option<String>,
}

#[derive(Debug, StructOpt)]
struct SimulateArgs {
    /// Window strategy: fixed or sliding
    #[structopt(short = "s", long, default_value = "sliding")]
    limit_strategy: String,

    /// Maximum events per window
    #[structopt(short, long, default_value = "10")]
    limit: String,

    /// Window duration in seconds
    #[structopt(short, long, default_value = "60")]
    duration_seconds: String,

    /// Number of simulated users
    #[structopt(short = "u", long, default_value = "3")]
    num_users: usize,

    /// Requests per user
    #[structopt(short = "n", long, default_value = "20")]
    num_requests: usize,

    /// Simulated seconds between rounds of requests
    #[structopt(short = "t", long, default_value = "5")]
    interval_seconds: u64,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Record one event and print the usage report
    Check(CheckArgs),

    /// Delete stored usage for a subject
    Reset(Subject),

    /// Run a burst of checks against in-memory storage with a simulated clock
    Simulate(SimulateArgs),
}

#[tokio::main]
async fn main() {
    let opt = Opt::from_args();

    let level = if opt.disable_logs {
        "error"
    } else {
        match opt.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    usage_limiter::logging::init_with_default(&format!(
        "usage_limit_cli={},usage_limiter={}",
        level, level
    ));

    if let Err(e) = run(opt.command).await {
        if let UsageLimitError::LimitExceeded(details) = &e {
            println!("{}", details);
            process::exit(EXIT_LIMIT_EXCEEDED);
        }
        error!(error = %e, "Command failed");
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

async fn run(command: Command) -> Result<(), UsageLimitError> {
    match command {
        Command::Check(args) => {
            let limiter = configured_limiter().await?;
            let request = UsageRequest {
                user_id: args.subject.user_id.clone(),
                tracking_method: args.subject.tracking_method.clone(),
                limit: args.limit,
                duration_seconds: args.duration_seconds,
                limit_strategy: args.limit_strategy,
            };
            let report = limiter.check(&request, &args.subject.session()).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Reset(subject) => {
            let limiter = configured_limiter().await?;
            let report = limiter
                .reset(
                    &subject.user_id,
                    subject.tracking_method.as_deref(),
                    &subject.session(),
                )
                .await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Simulate(args) => {
            let quota = QuotaDescriptor::parse(
                &args.limit,
                Some(&args.duration_seconds),
                Some(&args.limit_strategy),
            )?;
            simulate(quota, args.num_users, args.num_requests, args.interval_seconds).await?;
        }
    }

    Ok(())
}

async fn configured_limiter() -> Result<UsageLimiter<ConfiguredStorage>, UsageLimitError> {
    let config = LimiterConfig::from_env()?;
    info!(backend = ?config.backend, "Using storage backend");

    let storage = <ConfiguredStorage as StorageBackend>::new(config).await?;
    Ok(UsageLimiter::new(storage))
}

#[derive(Debug, Default)]
struct UserTally {
    allowed: usize,
    denied: usize,
    last_usage: u64,
    last_reset_seconds: u64,
}

// Each round every user issues one request concurrently, then the clock moves on
async fn simulate(
    quota: QuotaDescriptor,
    num_users: usize,
    num_requests: usize,
    interval_seconds: u64,
) -> Result<(), UsageLimitError> {
    let clock = ManualClock::new(SystemClock.now_secs());
    let limiter = UsageLimiter::with_clock(MemoryStorage::default(), clock.clone());
    let users: Vec<String> = (0..num_users).map(|_| Uuid::new_v4().to_string()).collect();
    let mut tallies: Vec<UserTally> = users.iter().map(|_| UserTally::default()).collect();

    info!(
        strategy = %quota.strategy,
        limit = quota.limit,
        duration_seconds = quota.duration_seconds,
        num_users,
        num_requests,
        "Starting simulation"
    );

    for round in 0..num_requests {
        let checks = users
            .iter()
            .map(|user| limiter.check_identifier(user, &quota));
        let results = join_all(checks).await;

        for (tally, result) in tallies.iter_mut().zip(results) {
            match result {
                Ok(report) => {
                    tally.allowed += 1;
                    tally.last_usage = report.current_usage;
                    tally.last_reset_seconds = report.reset_seconds;
                }
                Err(UsageLimitError::LimitExceeded(details)) => {
                    tally.denied += 1;
                    tally.last_usage = details.current_usage;
                }
                Err(e) => return Err(e),
            }
        }

        if round + 1 < num_requests {
            clock.advance(Duration::from_secs(interval_seconds));
        }
    }

    let mut table = Table::new();
    table.add_row(row!["User", "Allowed", "Denied", "Usage", "Reset (s)"]);
    for (user, tally) in users.iter().zip(&tallies) {
        table.add_row(row![
            user,
            tally.allowed,
            tally.denied,
            tally.last_usage,
            tally.last_reset_seconds
        ]);
    }

    println!(
        "\n{} window, limit {} per {}s, {} requests every {}s:",
        quota.strategy, quota.limit, quota.duration_seconds, num_requests, interval_seconds
    );
    table.printstd();

    let denied: usize = tallies.iter().map(|t| t.denied).sum();
    if denied > 0 {
        warn!(denied, "Some simulated requests were rejected");
    }

    Ok(())
}
