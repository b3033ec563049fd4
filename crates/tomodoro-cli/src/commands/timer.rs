//! Interactive timer session.
//!
//! Reads one command per line from stdin and prints the timer every time it
//! changes. State lives only as long as the process.

use std::sync::Arc;

use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tomodoro_core::{
    format_clock, Chime, Config, Event, PomodoroState, PomodoroStore, SettingsBounds, SettingsPatch,
    Silent, TerminalBell, TimerDriver, TimerHandle, TimerStatus,
};

const HELP: &str = "commands: s|start  p|pause  t|toggle  r|reset  c|complete  \
                    set <work|short|long|interval> <n>  status  h|help  q|quit";

#[derive(Args)]
pub struct RunArgs {
    /// Work phase length in minutes
    #[arg(long)]
    work: Option<u32>,
    /// Short break length in minutes
    #[arg(long)]
    short_break: Option<u32>,
    /// Long break length in minutes
    #[arg(long)]
    long_break: Option<u32>,
    /// Work sessions between long breaks
    #[arg(long)]
    interval: Option<u32>,
    /// Do not ring when a phase ends
    #[arg(long)]
    no_sound: bool,
    /// Print one JSON state per line instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Start,
    Pause,
    Toggle,
    Reset,
    Complete,
    Set(SettingsPatch),
    Status,
    Help,
    Quit,
}

fn parse_input(line: &str, bounds: &SettingsBounds) -> Result<Option<Input>, String> {
    let mut words = line.split_whitespace();
    let Some(cmd) = words.next() else {
        return Ok(None);
    };
    let input = match cmd.to_ascii_lowercase().as_str() {
        "s" | "start" => Input::Start,
        "p" | "pause" => Input::Pause,
        "t" | "toggle" => Input::Toggle,
        "r" | "reset" => Input::Reset,
        "c" | "complete" | "skip" => Input::Complete,
        "status" => Input::Status,
        "h" | "help" | "?" => Input::Help,
        "q" | "quit" | "exit" => Input::Quit,
        "set" => {
            let (Some(key), Some(value)) = (words.next(), words.next()) else {
                return Err("usage: set <work|short|long|interval> <n>".to_string());
            };
            let n: u32 = value
                .parse()
                .map_err(|_| format!("not a whole number: {value}"))?;
            let patch = match key {
                "work" => SettingsPatch::from_minutes(Some(n), None, None, None),
                "short" => SettingsPatch::from_minutes(None, Some(n), None, None),
                "long" => SettingsPatch::from_minutes(None, None, Some(n), None),
                "interval" => SettingsPatch::from_minutes(None, None, None, Some(n)),
                other => return Err(format!("unknown setting: {other}")),
            };
            Input::Set(patch.clamped(bounds))
        }
        other => return Err(format!("unknown command: {other} ({HELP})")),
    };
    Ok(Some(input))
}

fn status_label(status: TimerStatus) -> &'static str {
    match status {
        TimerStatus::Idle => "idle",
        TimerStatus::Running => "running",
        TimerStatus::Paused => "paused",
    }
}

fn render_line(state: &PomodoroState) -> String {
    format!(
        "{:<11}  {}  {:<7}  {:>3.0}%  {} pts",
        state.mode.title(),
        format_clock(state.time_remaining),
        status_label(state.status),
        state.progress() * 100.0,
        state.points()
    )
}

struct Printer {
    json: bool,
    last: Option<PomodoroState>,
}

impl Printer {
    fn print(&mut self, state: PomodoroState, force: bool) -> Result<(), serde_json::Error> {
        if !force && self.last == Some(state) {
            return Ok(());
        }
        if self.json {
            println!("{}", serde_json::to_string(&state)?);
        } else {
            println!("{}", render_line(&state));
        }
        self.last = Some(state);
        Ok(())
    }

    /// Full snapshot on request, including progress and points.
    fn status(&self, state: &PomodoroState) -> Result<(), serde_json::Error> {
        if self.json {
            println!("{}", serde_json::to_string(&Event::snapshot(state))?);
        } else {
            println!("{}", render_line(state));
        }
        Ok(())
    }
}

async fn apply(
    handle: &TimerHandle,
    printer: &Printer,
    input: Input,
) -> Result<PomodoroState, Box<dyn std::error::Error>> {
    let state = match input {
        Input::Start => handle.start_timer().await?,
        Input::Pause => handle.pause_timer().await?,
        Input::Toggle => handle.toggle_timer().await?,
        Input::Reset => handle.reset_timer().await?,
        Input::Complete => handle.complete_session().await?,
        Input::Set(patch) => handle.update_settings(patch).await?,
        Input::Help | Input::Quit => handle.state()?,
        Input::Status => {
            let state = handle.state()?;
            printer.status(&state)?;
            state
        }
    };
    Ok(state)
}

async fn session(
    store: PomodoroStore,
    chime: Arc<dyn Chime>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let bounds = SettingsBounds::default();
    let handle = TimerDriver::new(store).with_chime(chime).spawn();
    let mut states = handle.watch();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut printer = Printer { json, last: None };

    let initial = *states.borrow_and_update();
    printer.print(initial, true)?;

    loop {
        tokio::select! {
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *states.borrow_and_update();
                printer.print(state, false)?;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match parse_input(&line, &bounds) {
                    Ok(None) => {}
                    Ok(Some(Input::Quit)) => break,
                    Ok(Some(Input::Help)) => eprintln!("{HELP}"),
                    Ok(Some(input)) => {
                        let applied = apply(&handle, &printer, input).await;
                        match applied {
                            Ok(state) => printer.print(state, false)?,
                            Err(e) => eprintln!("error: {e}"),
                        }
                    }
                    Err(msg) => eprintln!("{msg}"),
                }
            }
        }
    }

    handle.shutdown().await?;
    Ok(())
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let bounds = SettingsBounds::default();
    let overrides =
        SettingsPatch::from_minutes(args.work, args.short_break, args.long_break, args.interval)
            .clamped(&bounds);
    if !overrides.is_empty() {
        tracing::debug!(?overrides, "command-line settings override config");
    }
    let settings = config.settings(&bounds).merged(&overrides);
    let store = PomodoroStore::with_settings(settings)?;

    let chime: Arc<dyn Chime> = if args.no_sound || !config.notifications.enabled {
        Arc::new(Silent)
    } else {
        Arc::new(TerminalBell)
    };

    tracing::debug!(?settings, "starting session");
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(session(store, chime, args.json));
    // A pending stdin read would otherwise hold shutdown until the next line.
    runtime.shutdown_background();
    result
}
