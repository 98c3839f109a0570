use std::str::FromStr;

use chrono::{DateTime, Utc};
use clap::Args;
use visionbreak_core::simulation::{RecordEntry, ScriptedSignal, MAX_ADVANCE_SECS};
use visionbreak_core::{FileSettingsStore, Settings, SettingsPatch, SettingsStore, Signal, Simulation};

#[derive(Args)]
pub struct SimulateArgs {
    /// Simulated seconds to run (at most one week)
    #[arg(
        long,
        default_value_t = 1500,
        value_parser = clap::value_parser!(i64).range(0..=MAX_ADVANCE_SECS)
    )]
    seconds: i64,
    /// Number of attached displays
    #[arg(long, default_value_t = 1)]
    displays: u32,
    /// Override workInterval (minutes)
    #[arg(long)]
    work_interval: Option<u32>,
    /// Override breakInterval (seconds)
    #[arg(long)]
    break_interval: Option<u32>,
    /// End each break once its countdown elapses
    #[arg(long)]
    auto_end_break: bool,
    /// Start from the saved settings instead of defaults
    #[arg(long)]
    from_config: bool,
    /// Scripted signal as SECS=NAME, e.g. 1210=break-ended (repeatable)
    #[arg(long = "signal", value_name = "SECS=NAME")]
    signals: Vec<ScriptArg>,
    /// Simulated start instant (RFC 3339), defaults to now
    #[arg(long)]
    start: Option<DateTime<Utc>>,
    /// Print events only, without directives
    #[arg(long)]
    events_only: bool,
}

/// `SECS=NAME` pair from the command line.
#[derive(Debug, Clone)]
pub struct ScriptArg(ScriptedSignal);

impl FromStr for ScriptArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (at, name) = s
            .split_once('=')
            .ok_or_else(|| format!("expected SECS=NAME, got '{s}'"))?;
        let at_secs = at
            .trim()
            .parse::<i64>()
            .map_err(|e| format!("bad offset '{at}': {e}"))?;
        if !(0..=MAX_ADVANCE_SECS).contains(&at_secs) {
            return Err(format!(
                "offset {at_secs} out of range 0..={MAX_ADVANCE_SECS}"
            ));
        }
        let signal = match name.trim() {
            "start-break" => Signal::StartBreak,
            "break-ended" | "esc" => Signal::BreakEnded,
            "break-snoozed" => Signal::BreakSnoozed,
            "toggle-pause" => Signal::TogglePause,
            other => return Err(format!("unknown signal '{other}'")),
        };
        Ok(Self(ScriptedSignal { at_secs, signal }))
    }
}

pub fn run(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = if args.from_config {
        FileSettingsStore::open_default()?.get()
    } else {
        Settings::default()
    };
    settings.merge(SettingsPatch {
        work_interval: args.work_interval,
        break_interval: args.break_interval,
        auto_end_break: args.auto_end_break.then_some(true),
        ..SettingsPatch::default()
    })?;

    let start = args.start.unwrap_or_else(Utc::now);
    let mut sim = Simulation::new(settings, args.displays, start);
    for ScriptArg(scripted) in args.signals {
        sim.schedule(scripted.at_secs, scripted.signal);
    }
    sim.advance(args.seconds);

    for record in sim.into_log() {
        if args.events_only && matches!(record.entry, RecordEntry::Directive { .. }) {
            continue;
        }
        println!("{}", serde_json::to_string(&record)?);
    }
    Ok(())
}
