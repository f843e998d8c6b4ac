//! Simulate command: run the sync engine against a virtual clock

use std::path::Path;

use anyhow::{bail, Result};

use readalong::render::format_duration;
use readalong::text::segment_lengths;
use readalong::{
    Config, HighlightChange, Resource, SimulatedEngine, SyncEngine, SyncObserver, SyncState,
    TransportCommand,
};

use super::{check_duration, open_store, preview, read_paragraphs, resource_key};

const PREVIEW_CHARS: usize = 60;

/// Positions this close to `--stop-at` count as reached.
const STOP_TOLERANCE: f64 = 1e-6;

/// Options for a simulation run.
pub struct SimulateArgs {
    pub duration: f64,
    pub key: Option<String>,
    pub rate: Option<f64>,
    pub step: f64,
    pub stop_at: Option<f64>,
    pub ephemeral: bool,
}

/// Prints each highlight change with the elapsed time it happened at.
struct PrintObserver {
    paragraphs: Vec<String>,
    elapsed: String,
}

impl SyncObserver for PrintObserver {
    fn on_highlight_change(&mut self, change: HighlightChange) {
        let text = self
            .paragraphs
            .get(change.current)
            .map(|p| preview(p, PREVIEW_CHARS))
            .unwrap_or_default();
        println!(
            "[{}] paragraph {}/{}: {}",
            self.elapsed,
            change.current + 1,
            self.paragraphs.len(),
            text
        );
    }

    fn on_time_display_change(&mut self, elapsed: &str, _total: &str) {
        self.elapsed = elapsed.to_string();
    }
}

/// Run a simulated listening session.
pub fn handle(file: &Path, args: SimulateArgs, store: Option<&Path>) -> Result<()> {
    check_duration(args.duration)?;
    if !args.step.is_finite() || args.step <= 0.0 {
        bail!("Step must be a positive number of seconds, got {}", args.step);
    }

    let config = Config::load()?;
    let paragraphs = read_paragraphs(file)?;
    let key = resource_key(file, args.key);
    let store = open_store(store, &config, args.ephemeral)?;

    let resource = Resource::new(key.clone(), segment_lengths(&paragraphs));
    let observer = PrintObserver {
        paragraphs,
        elapsed: format_duration(0.0),
    };
    let mut sync = SyncEngine::new(SimulatedEngine::new(), observer, store, config.sync_options());

    sync.load(resource);
    sync.transport_mut().engine_mut().load(args.duration);
    sync.pump();

    let start = sync.transport().snapshot().current_time;
    if start > 0.0 {
        println!("Resuming {} at {}", key, format_duration(start));
    }

    if let Some(requested) = args.rate {
        let applied = sync.set_rate(requested);
        if applied != requested {
            eprintln!(
                "Rate {}x is not allowed (allowed: {}), keeping {}x",
                requested,
                format_rates(sync.rates().allowed().as_slice()),
                applied
            );
        }
    }
    println!("Rate: {}x", sync.rates().current());

    sync.execute(TransportCommand::Play);
    sync.pump();

    loop {
        let snapshot = sync.transport().snapshot();
        let mut elapsed = args.step;

        if let Some(stop_at) = args.stop_at {
            let remaining = stop_at - snapshot.current_time;
            if remaining <= STOP_TOLERANCE {
                sync.execute(TransportCommand::Pause);
                sync.pump();
                println!(
                    "Paused at {}",
                    format_duration(sync.transport().snapshot().current_time)
                );
                break;
            }
            elapsed = elapsed.min(remaining / snapshot.rate);
        }

        sync.transport_mut().engine_mut().advance(elapsed);
        sync.pump();

        if sync.state() == SyncState::Ended {
            println!("Finished at {}", format_duration(args.duration));
            break;
        }
    }

    sync.flush_position();
    Ok(())
}

fn format_rates(rates: &[f64]) -> String {
    rates
        .iter()
        .map(|r| format!("{}x", r))
        .collect::<Vec<_>>()
        .join(", ")
}
