use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use ringbuf::traits::Consumer;

use midia::midi::MidiDeviceManager;
use midia::sequencer::{DEFAULT_PROJECT_NAME, PERCUSSION_CHANNEL, pitch_name};
use midia::{
    EngineConfig, EngineEvent, JsonReader, JsonWriter, MidiMessage, MidirSequencer,
    PercussiveInstrument, SequencerBackend, Timeline, VirtualSequencer, create_event_channel,
    logging,
};

#[derive(Parser)]
#[command(name = "midia", version, about = "MIDI composition engine")]
struct Cli {
    /// Log debug output (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a summary of a project
    Info {
        project: PathBuf,
    },
    /// Print the MIDI event stream a project plays
    Events {
        project: PathBuf,
    },
    /// Play a project until it ends
    Play {
        project: PathBuf,
        /// Use the software sequencer instead of a MIDI output port
        #[arg(long = "virtual")]
        use_virtual: bool,
        /// MIDI output port name (defaults to the configured port, then the first one)
        #[arg(short, long)]
        port: Option<String>,
        /// Restart from the beginning when the end is reached
        #[arg(short, long = "loop")]
        looping: bool,
    },
    /// Write an empty project
    New {
        path: PathBuf,
        /// Project name
        #[arg(short, long, default_value = DEFAULT_PROJECT_NAME)]
        name: String,
    },
    /// List MIDI output ports
    Ports,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    });

    let config = EngineConfig::load_or_default();
    let result = match cli.command {
        Commands::Info { project } => show_info(&project, &config),
        Commands::Events { project } => show_events(&project, &config),
        Commands::Play {
            project,
            use_virtual,
            port,
            looping,
        } => play(&project, &config, use_virtual, port, looping),
        Commands::New { path, name } => new_project(&path, &name, &config),
        Commands::Ports => list_ports(),
    };

    logging::shutdown();
    result
}

fn load(path: &Path, backend: Box<dyn SequencerBackend>, config: &EngineConfig) -> Result<Timeline> {
    JsonReader::new(path)
        .read_with_config(backend, config)
        .with_context(|| format!("Failed to load project {}", path.display()))
}

fn show_info(path: &Path, config: &EngineConfig) -> Result<()> {
    let timeline = load(path, Box::new(VirtualSequencer::new()), config)?;
    let player = timeline.player();

    println!("=== {} ===", timeline.project_name());
    println!("Tempo:       {}", player.tempo());
    println!(
        "Grid:        {} beats per measure, {} divisions per beat",
        timeline.beats_per_measure(),
        timeline.beat_division()
    );
    println!(
        "Length:      {} ticks ({:.2} s, {:.2} beats)",
        timeline.length_ticks(),
        timeline.length_ms() / 1000.0,
        timeline.length_beats()
    );
    println!("Position:    tick {}", player.tick_position());
    println!("Free channels: {:?}", player.channels().channels());

    println!("\nTracks:");
    for (index, track) in timeline.tracks().iter().enumerate() {
        let state = if track.is_muted() { " (muted)" } else { "" };
        println!("  [{}] {}{}, volume {}", index, track.info(), state, track.volume());
    }
    Ok(())
}

fn show_events(path: &Path, config: &EngineConfig) -> Result<()> {
    let timeline = load(path, Box::new(VirtualSequencer::new()), config)?;
    let sequence = timeline
        .build_sequence()
        .context("Failed to build the event stream")?;

    println!(
        "{} events, resolution {}, length {} ticks",
        sequence.event_count(),
        sequence.resolution(),
        sequence.length_ticks()
    );
    for event in sequence.events_in_time_order() {
        let bytes: Vec<String> = event
            .message
            .to_bytes()
            .iter()
            .map(|byte| format!("{:02X}", byte))
            .collect();
        println!(
            "{:>8}  {:<8}  {:?}{}",
            event.tick,
            bytes.join(" "),
            event.message,
            describe_note(&event.message)
        );
    }
    Ok(())
}

/// Pitch name, or the drum played on the percussion channel
fn describe_note(message: &MidiMessage) -> String {
    let (MidiMessage::NoteOn { channel, note, .. } | MidiMessage::NoteOff { channel, note, .. }) =
        *message
    else {
        return String::new();
    };
    if channel == PERCUSSION_CHANNEL {
        if let Some(drum) = PercussiveInstrument::from_program(note) {
            return format!("  {}", drum);
        }
    }
    format!("  {}", pitch_name(note))
}

fn play(
    path: &Path,
    config: &EngineConfig,
    use_virtual: bool,
    port: Option<String>,
    looping: bool,
) -> Result<()> {
    let backend: Box<dyn SequencerBackend> = if use_virtual {
        Box::new(VirtualSequencer::new())
    } else {
        Box::new(MidirSequencer::new(port.or_else(|| config.output_port.clone())))
    };

    let mut timeline = load(path, backend, config)?;
    let (producer, mut consumer) = create_event_channel(config.event_channel_capacity);
    timeline.attach_events(producer);

    println!(
        "Playing {} through the {} sequencer ({:.2} s)",
        timeline.project_name(),
        timeline.player().backend().name(),
        timeline.length_ms() / 1000.0
    );
    if looping {
        timeline.set_looping(true)?;
    } else {
        timeline.play()?;
    }

    let interval = Duration::from_millis(config.poll_interval_ms);
    while timeline.player().is_polling() {
        thread::sleep(interval);
        timeline.poll()?;

        while let Some(event) = consumer.try_pop() {
            // Position updates arrive every poll
            if event.is_transport() && !matches!(event, EngineEvent::PositionChanged { .. }) {
                println!("{:?}", event);
            }
        }
    }

    timeline.close();
    Ok(())
}

fn new_project(path: &Path, name: &str, config: &EngineConfig) -> Result<()> {
    let timeline = Timeline::with_config(name, Box::new(VirtualSequencer::new()), config)?;
    JsonWriter::new(path)
        .write(&timeline)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Created project {} at {}", name, path.display());
    Ok(())
}

fn list_ports() -> Result<()> {
    let ports = MidiDeviceManager::new().list_output_ports();
    if ports.is_empty() {
        println!("No MIDI output ports found");
    }
    for port in ports {
        let marker = if port.is_default { " (default)" } else { "" };
        println!("  [{}] {}{}", port.id, port.name, marker);
    }
    Ok(())
}
