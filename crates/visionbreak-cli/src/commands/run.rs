//! Terminal host for the break controller.
//!
//! Displays are simulated: each one is a line prefix on stdout, and the
//! status indicator is a single line rewritten in place. User actions arrive
//! as commands on stdin.

use std::io::Write;

use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use visionbreak_core::{
    channel, Broadcast, Controller, ControllerHandle, DisplayId, DisplaySurfaceSet,
    FileSettingsStore, Signal, StatusIndicator, SurfaceError, SystemClock, WindowAction,
};

const HELP: &str = "\
commands:
  break            start a break now
  end | esc        end the current break
  snooze           snooze the current break for 5 minutes
  pause            pause or resume the countdown
  show             bring the main window back
  attach <n>       attach display n
  detach <n>       detach display n
  get              print current settings
  set <key> <val>  change a setting (e.g. set workInterval 25)
  help             show this help
  quit             hide everything and exit";

#[derive(Args)]
pub struct RunArgs {
    /// Number of displays to attach at startup
    #[arg(long, default_value_t = 1)]
    displays: u32,
}

/// Overlays rendered as tagged lines on stdout.
struct TerminalSurfaces {
    displays: u32,
}

impl DisplaySurfaceSet for TerminalSurfaces {
    fn displays(&self) -> Vec<DisplayId> {
        (0..self.displays).map(DisplayId).collect()
    }

    fn appear(&mut self, display: DisplayId) -> Result<(), SurfaceError> {
        println!("\n[{display}] ===== look away: break overlay shown =====");
        Ok(())
    }

    fn disappear(&mut self, display: DisplayId) -> Result<(), SurfaceError> {
        println!("\n[{display}] overlay hidden");
        Ok(())
    }

    fn broadcast(&mut self, display: DisplayId, message: &Broadcast) -> Result<(), SurfaceError> {
        match message {
            Broadcast::StartBreak { settings } => println!(
                "[{display}] rest your eyes for {}s (dark mode: {})",
                settings.break_interval, settings.dark_mode
            ),
            Broadcast::BreakEnded => println!("[{display}] break over"),
            Broadcast::BreakSnoozed => println!("[{display}] break snoozed"),
            Broadcast::TogglePause { paused } => {
                println!("[{display}] {}", if *paused { "paused" } else { "resumed" })
            }
        }
        Ok(())
    }

    fn window(&mut self, action: WindowAction) -> Result<(), SurfaceError> {
        info!(?action, "no main window in terminal mode");
        Ok(())
    }
}

/// Single-line indicator rewritten with a carriage return.
struct TerminalIndicator {
    paused: bool,
}

impl StatusIndicator for TerminalIndicator {
    fn set_label(&mut self, label: Option<&str>) -> Result<(), SurfaceError> {
        let marker = if self.paused { "||" } else { ">>" };
        let mut out = std::io::stdout().lock();
        write!(out, "\r{marker} {:<20}", label.unwrap_or(""))
            .and_then(|()| out.flush())
            .map_err(|e| SurfaceError::Backend(e.to_string()))
    }

    fn set_paused(&mut self, paused: bool) -> Result<(), SurfaceError> {
        self.paused = paused;
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Send(Signal),
    Get,
    Set { key: String, value: String },
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let display = |arg: Option<&str>| -> Result<DisplayId, String> {
        arg.ok_or_else(|| format!("usage: {verb} <n>"))?
            .parse::<u32>()
            .map(DisplayId)
            .map_err(|e| format!("bad display number: {e}"))
    };

    let command = match verb {
        "break" => Command::Send(Signal::StartBreak),
        "end" | "esc" => Command::Send(Signal::BreakEnded),
        "snooze" => Command::Send(Signal::BreakSnoozed),
        "pause" => Command::Send(Signal::TogglePause),
        "show" => Command::Send(Signal::ShowWindow),
        "attach" => Command::Send(Signal::DisplayAttached {
            display: display(words.next())?,
        }),
        "detach" => Command::Send(Signal::DisplayDetached {
            display: display(words.next())?,
        }),
        "get" => Command::Get,
        "set" => {
            let (Some(key), Some(value)) = (words.next(), words.next()) else {
                return Err("usage: set <key> <value>".into());
            };
            Command::Set {
                key: key.to_string(),
                value: value.to_string(),
            }
        }
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command '{other}', try 'help'")),
    };
    Ok(Some(command))
}

async fn execute(
    handle: &ControllerHandle,
    command: Command,
) -> Result<bool, Box<dyn std::error::Error>> {
    match command {
        Command::Send(signal) => handle.send(signal)?,
        Command::Get => {
            let settings = handle.get_settings().await?;
            println!("\n{}", serde_json::to_string_pretty(&settings)?);
        }
        Command::Set { key, value } => match handle.set_setting(&key, &value).await {
            Ok(settings) => println!(
                "\n{key} = {}",
                settings.get_key(&key).unwrap_or_default()
            ),
            Err(e) => println!("\nerror: {e}"),
        },
        Command::Help => println!("\n{HELP}"),
        Command::Quit => return Ok(false),
    }
    Ok(true)
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileSettingsStore::open_default()?;
    info!(path = %store.path().display(), "settings loaded");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let controller = Controller::new(
            SystemClock,
            store,
            TerminalSurfaces {
                displays: args.displays,
            },
            TerminalIndicator { paused: false },
        );
        let (handle, inbox) = channel();
        let task = tokio::spawn(controller.run(inbox));

        println!("visionbreak running, type 'help' for commands");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            match parse_command(&line) {
                Ok(Some(command)) => {
                    if !execute(&handle, command).await? {
                        break;
                    }
                }
                Ok(None) => {}
                Err(message) => println!("\n{message}"),
            }
        }

        handle.send(Signal::Shutdown)?;
        let controller = task.await?;
        let stats = controller.coordinator().stats();
        println!("\nbreaks taken: {}", stats.breaks_taken);
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}
