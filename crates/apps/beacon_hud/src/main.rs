mod command;
mod driver;
mod render;

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use bounty::{App, BountyConfig, Submission};
use clap::Parser;
use foundation::ids::LocationId;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::command::{Command, HELP, parse_line};
use crate::driver::{DriverOptions, Input};

/// Terminal HUD for the beacon bounty map.
#[derive(Debug, Parser)]
#[command(name = "beacon_hud", version, about)]
struct Args {
    /// JSON config file (falls back to $BEACON_CONFIG, then built-in defaults).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Milliseconds between verification clock ticks.
    #[arg(long, default_value_t = 100)]
    tick_ms: u64,

    /// Emit one JSON view model per frame instead of the text HUD.
    #[arg(long)]
    json: bool,

    /// Run the demo bounty on the first stale beacon and exit when it settles.
    #[arg(long)]
    script: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = match BountyConfig::resolve(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };
    let app = match App::new(&config) {
        Ok(app) => app,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };
    info!(
        locations = config.locations.len(),
        balance = %config.starting_balance,
        "beacon hud starting"
    );

    let (tx, rx) = mpsc::channel(32);
    if args.script {
        let Some(target) = app.registry().stale().next().map(|l| l.id) else {
            error!("no stale beacon to demo");
            return ExitCode::FAILURE;
        };
        spawn_script(tx, target);
    } else {
        if !args.json {
            println!("{HELP}\n");
        }
        spawn_stdin_reader(tx);
    }

    let opts = DriverOptions {
        tick: Duration::from_millis(args.tick_ms.max(1)),
        json: args.json,
    };
    let mut stdout = io::stdout().lock();
    match driver::run(app, rx, &mut stdout, opts).await {
        Ok(app) => {
            info!(balance = %app.balance(), "beacon hud finished");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("output failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn spawn_script(tx: mpsc::Sender<Input>, target: LocationId) {
    tokio::spawn(async move {
        let steps = [
            Command::Select(target),
            Command::Submit(
                Submission::with_image("storefront.jpg").note("hours on the door changed"),
            ),
        ];
        for step in steps {
            if tx.send(Input::Command(step)).await.is_err() {
                break;
            }
        }
    });
}

// Blocking reader on a detached thread: it must not hold the runtime open at exit.
fn spawn_stdin_reader(tx: mpsc::Sender<Input>) {
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    warn!(%err, "stdin read failed");
                    break;
                }
            };
            let input = match parse_line(&line) {
                Ok(Some(cmd)) => Input::Command(cmd),
                Ok(None) => continue,
                Err(err) => Input::Invalid(err.to_string()),
            };
            if tx.blocking_send(input).is_err() {
                break;
            }
        }
    });
}
