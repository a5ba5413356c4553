use std::io::{self, Write};
use std::time::Duration;

use bounty::{App, Rejected};
use foundation::time::Time;
use scene::picking::PickOptions;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::command::{Command, HELP};
use crate::render::{render_json, render_locations, render_text};

#[derive(Debug, Clone, Copy)]
pub struct DriverOptions {
    /// How often pending verification steps are checked.
    pub tick: Duration,
    pub json: bool,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(100),
            json: false,
        }
    }
}

/// Input to the driver loop: a parsed command or a line that failed to parse.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Command(Command),
    Invalid(String),
}

/// Runs the HUD until `quit`, or until input ends and no verification is
/// left pending.
///
/// Application time is the tokio clock measured from the moment the loop
/// starts, so tests can drive it with a paused runtime.
pub async fn run<W: Write>(
    mut app: App,
    mut inputs: mpsc::Receiver<Input>,
    out: &mut W,
    opts: DriverOptions,
) -> io::Result<App> {
    let start = Instant::now();
    let elapsed = || Time(start.elapsed().as_secs_f64());
    let mut ticker = tokio::time::interval(opts.tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut input_closed = false;

    draw(out, &app, opts)?;
    loop {
        if input_closed && app.pending_timers() == 0 {
            debug!("input closed and nothing pending");
            break;
        }
        tokio::select! {
            input = inputs.recv(), if !input_closed => {
                // Steps that fell due while waiting for input still need a frame.
                let advanced = !app.advance_to(elapsed()).is_empty();
                let changed = match input {
                    None => {
                        input_closed = true;
                        false
                    }
                    Some(Input::Command(Command::Quit)) => break,
                    Some(Input::Command(cmd)) => handle(&mut app, cmd, out)?,
                    Some(Input::Invalid(msg)) => {
                        writeln!(out, "! {msg}")?;
                        false
                    }
                };
                if advanced || changed {
                    draw(out, &app, opts)?;
                }
            }
            _ = ticker.tick() => {
                if !app.advance_to(elapsed()).is_empty() {
                    draw(out, &app, opts)?;
                }
            }
        }
    }
    out.flush()?;
    Ok(app)
}

fn draw<W: Write>(out: &mut W, app: &App, opts: DriverOptions) -> io::Result<()> {
    let view = app.view();
    if opts.json {
        render_json(out, &view)
    } else {
        render_text(out, &view)
    }?;
    out.flush()
}

fn render_status<W: Write>(out: &mut W, app: &App) -> io::Result<()> {
    let snap = app.metrics().snapshot();
    writeln!(out, "-- status --")?;
    writeln!(out, "  phase: {}", app.phase().label())?;
    for (name, value) in snap.counters {
        writeln!(out, "  {name}: {value}")?;
    }
    for (name, value) in snap.gauges {
        writeln!(out, "  {name}: {value}")?;
    }
    for (name, s) in snap.summaries {
        let mean = s.mean().unwrap_or(0.0);
        writeln!(
            out,
            "  {name}: n={} min={} max={} mean={mean:.0}",
            s.count, s.min, s.max
        )?;
    }
    Ok(())
}

/// Applies one command. Returns whether the HUD needs a redraw.
fn handle<W: Write>(app: &mut App, cmd: Command, out: &mut W) -> io::Result<bool> {
    let result: Result<bool, Rejected> = match cmd {
        Command::Select(id) => app.select_beacon(id).map(|_| true),
        Command::Pick(ray) => app.pick_beacon(ray, PickOptions::default()).map(|_| true),
        Command::Submit(submission) => app.submit_bounty(submission).map(|id| {
            info!(session = %id, "verification started");
            true
        }),
        Command::Close => {
            app.close_panel();
            Ok(true)
        }
        Command::List { limit, offset } => {
            let page = app.page(limit, offset);
            let title = if page.is_empty() || page.len() == app.locations().len() {
                "beacons".to_string()
            } else {
                let total = app.locations().len();
                format!("beacons {}-{} of {total}", offset + 1, offset + page.len())
            };
            render_locations(out, &title, page)?;
            Ok(false)
        }
        Command::Search(query) => match app.search(&query) {
            Ok(found) => {
                render_locations(out, &format!("search '{query}'"), found)?;
                Ok(false)
            }
            Err(err) => Err(err),
        },
        Command::Category(category) => {
            render_locations(out, category.as_str(), app.by_category(category))?;
            Ok(false)
        }
        Command::Categories => {
            let names: Vec<&str> = app.categories().iter().map(|c| c.as_str()).collect();
            writeln!(out, "-- categories --")?;
            writeln!(out, "  {}", names.join(", "))?;
            Ok(false)
        }
        Command::Status => {
            render_status(out, app)?;
            Ok(false)
        }
        Command::Help => {
            writeln!(out, "{HELP}")?;
            Ok(false)
        }
        Command::Quit => Ok(false),
    };
    match result {
        Ok(redraw) => Ok(redraw),
        Err(rejected) => {
            writeln!(out, "! {rejected}")?;
            Ok(false)
        }
    }
}
