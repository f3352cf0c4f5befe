//! Round scheduler entry point
//!
//! Run with:
//! ```bash
//! cargo run -p matchpool-scheduler              # tick until Ctrl-C
//! cargo run -p matchpool-scheduler -- trigger 42  # run pool 42 once now
//! ```
//!
//! Configuration is loaded from environment variables or a `.env` file.

use matchpool_common::{try_init_tracing, AppConfig, AppError, AppResult, TracingConfig};
use matchpool_core::Snowflake;
use matchpool_scheduler::server;
use tracing::{error, info};

enum Command {
    Run,
    Trigger(Snowflake),
}

fn parse_command(args: &[String]) -> Result<Command, AppError> {
    match args {
        [] => Ok(Command::Run),
        [cmd, id] if cmd == "trigger" => Snowflake::parse(id)
            .map(Command::Trigger)
            .map_err(|e| AppError::Validation(format!("invalid pool id {id:?}: {e}"))),
        _ => Err(AppError::Validation(
            "usage: matchpool-scheduler [trigger <pool_id>]".to_string(),
        )),
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = %e, "Scheduler failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_command(&args)?;

    let config = AppConfig::from_env()?;

    if let Err(e) = try_init_tracing(&TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        env = ?config.app.env,
        workers = config.scheduler.workers,
        recency_days = config.matching.recency_days,
        "Configuration loaded"
    );

    match command {
        Command::Run => server::run(config).await,
        Command::Trigger(pool_id) => {
            let state = server::create_app_state(config).await?;
            let outcome = server::trigger(&state, pool_id).await?;
            let json = serde_json::to_string_pretty(&outcome)
                .map_err(|e| AppError::Internal(e.into()))?;
            println!("{json}");
            Ok(())
        }
    }
}
