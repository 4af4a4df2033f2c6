mod grid;
mod simulate;
mod trace;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use isogrid_core::config::DEBOUNCE_DURATION_MS;
use isogrid_core::{Layout, NoteKind};
use std::fs;

#[derive(Parser)]
#[command(name = "isogrid-cli")]
#[command(about = "Host tools for the isogrid MIDI controller")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a raw key-state trace through the debouncer and print the notes
    Simulate {
        /// Trace file with `<time_ms> <hex bitmap>` lines
        trace: String,
        /// Debounce duration in milliseconds (1-63)
        #[arg(long, default_value_t = DEBOUNCE_DURATION_MS)]
        debounce: u8,
    },
    /// Show the key to note mapping
    Layout {
        /// Write an HTML/SVG rendering to this path instead of printing text
        #[arg(long)]
        html: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Simulate { trace, debounce } => {
            if !(1..64).contains(&debounce) {
                bail!("debounce duration must be between 1 and 63 ms, got {}", debounce);
            }

            let contents =
                fs::read_to_string(&trace).with_context(|| format!("reading {}", trace))?;
            let samples = trace::parse_trace(&contents).context("parsing trace")?;
            if samples.is_empty() {
                bail!("no samples in {}", trace);
            }

            let emitted = simulate::simulate(&samples, debounce);
            for e in &emitted {
                let kind = match e.event.kind {
                    NoteKind::On => "Note On ",
                    NoteKind::Off => "Note Off",
                };
                println!(
                    "{:>8} ms  {}  {:>3} {:<4} vel {}",
                    e.time,
                    kind,
                    e.event.note,
                    grid::note_name(e.event.note),
                    e.event.velocity
                );
            }
            eprintln!("{} samples, {} note events", samples.len(), emitted.len());
        }
        Command::Layout { html } => match html {
            Some(path) => {
                fs::write(&path, grid::generate_html(&Layout::ISOMORPHIC))
                    .with_context(|| format!("writing {}", path))?;
                println!("Layout written to {}", path);
            }
            None => print!("{}", grid::render_text(&Layout::ISOMORPHIC)),
        },
    }

    Ok(())
}
