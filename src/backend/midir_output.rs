// Midir sequencer - Plays a sequence on a MIDI output port
// A dispatch thread walks the time-ordered events; transport state is shared via atomics

use crate::backend::{BackendError, SequencerBackend};
use crate::midi::device::MidiDeviceManager;
use crate::midi::event::{CC_ALL_NOTES_OFF, MidiMessage};
use crate::midi::sequence::{Sequence, TimedEvent};
use crate::sequencer::tempo::{DEFAULT_BPM, PULSES_PER_QUARTER_NOTE};
use midir::MidiOutputConnection;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

const CLIENT_NAME: &str = "midia";
const DISPATCH_INTERVAL: Duration = Duration::from_millis(1);

/// Transport state shared with the dispatch thread
#[derive(Debug)]
struct SharedPlayback {
    running: AtomicBool,
    tick: AtomicU64,
    /// f64 bits
    bpm: AtomicU64,
    end_reached: AtomicBool,
}

impl SharedPlayback {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            running: AtomicBool::new(false),
            tick: AtomicU64::new(0),
            bpm: AtomicU64::new(DEFAULT_BPM.to_bits()),
            end_reached: AtomicBool::new(false),
        })
    }

    fn bpm(&self) -> f64 {
        f64::from_bits(self.bpm.load(Ordering::Relaxed))
    }
}

type SharedConnection = Arc<Mutex<MidiOutputConnection>>;

/// Sequencer backend sending to a real (or virtual) MIDI output port
pub struct MidirSequencer {
    /// Port to connect to; the first available port when `None`
    port_name: Option<String>,
    connection: Option<SharedConnection>,
    sequence: Option<Sequence>,
    shared: Arc<SharedPlayback>,
    dispatcher: Option<JoinHandle<()>>,
}

impl MidirSequencer {
    pub fn new(port_name: Option<String>) -> Self {
        Self {
            port_name,
            connection: None,
            sequence: None,
            shared: SharedPlayback::new(),
            dispatcher: None,
        }
    }

    fn join_dispatcher(&mut self) {
        self.shared.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.dispatcher.take() {
            if handle.join().is_err() {
                log::error!("MIDI dispatch thread panicked");
            }
        }
    }

    /// Silence every channel used by the loaded sequence
    fn all_notes_off(&self) {
        let (Some(connection), Some(sequence)) = (&self.connection, &self.sequence) else {
            return;
        };
        let Ok(mut connection) = connection.lock() else {
            return;
        };
        for channel in sequence.channels() {
            let message = MidiMessage::ControlChange {
                channel,
                controller: CC_ALL_NOTES_OFF,
                value: 0,
            };
            if let Err(e) = connection.send(&message.to_bytes()) {
                log::warn!("Failed to send all notes off on channel {}: {}", channel, e);
            }
        }
    }
}

impl SequencerBackend for MidirSequencer {
    fn name(&self) -> &str {
        self.port_name.as_deref().unwrap_or("default MIDI output")
    }

    fn open(&mut self) -> Result<(), BackendError> {
        if self.connection.is_some() {
            return Ok(());
        }

        let manager = MidiDeviceManager::new();
        let found = match &self.port_name {
            Some(name) => manager.output_port_by_name(CLIENT_NAME, name),
            None => manager.default_output_port(CLIENT_NAME),
        };
        let (midi_out, port) = found.ok_or_else(|| {
            BackendError::Unavailable(format!("no MIDI output port matching {}", self.name()))
        })?;

        let connection = midi_out
            .connect(&port, "midia-out")
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;

        log::info!("Connected to MIDI output {}", self.name());
        self.connection = Some(Arc::new(Mutex::new(connection)));
        Ok(())
    }

    fn close(&mut self) {
        self.stop();
        if self.connection.take().is_some() {
            log::info!("Closed MIDI output {}", self.name());
        }
    }

    fn is_open(&self) -> bool {
        self.connection.is_some()
    }

    fn load_sequence(&mut self, sequence: Sequence) -> Result<(), BackendError> {
        if self.connection.is_none() {
            return Err(BackendError::NotOpen);
        }
        let was_running = self.is_running();
        if was_running {
            self.join_dispatcher();
        }
        self.sequence = Some(sequence);
        self.shared.end_reached.store(false, Ordering::Relaxed);
        if was_running {
            self.start()?;
        }
        Ok(())
    }

    fn loaded_sequence(&self) -> Option<&Sequence> {
        self.sequence.as_ref()
    }

    fn clear(&mut self) {
        self.stop();
        self.sequence = None;
    }

    fn set_tempo_bpm(&mut self, bpm: f64) {
        // Picked up live by the dispatch thread
        self.shared.bpm.store(bpm.to_bits(), Ordering::Relaxed);
    }

    fn tempo_bpm(&self) -> f64 {
        self.shared.bpm()
    }

    fn set_tick_position(&mut self, tick: u64) {
        let was_running = self.is_running();
        if was_running {
            self.join_dispatcher();
            self.all_notes_off();
        }
        self.shared.tick.store(tick, Ordering::Relaxed);
        self.shared.end_reached.store(false, Ordering::Relaxed);
        if was_running {
            if let Err(e) = self.start() {
                log::error!("Failed to resume after seek: {}", e);
            }
        }
    }

    fn tick_position(&self) -> u64 {
        self.shared.tick.load(Ordering::Relaxed)
    }

    fn start(&mut self) -> Result<(), BackendError> {
        if self.dispatcher.is_some() {
            self.join_dispatcher();
        }
        let connection = self.connection.clone().ok_or(BackendError::NotOpen)?;
        let sequence = self.sequence.as_ref().ok_or(BackendError::NoSequence)?;

        let events = sequence.events_in_time_order();
        let length = sequence.length_ticks();
        let shared = Arc::clone(&self.shared);
        shared.end_reached.store(false, Ordering::Relaxed);
        shared.running.store(true, Ordering::Relaxed);

        let handle = std::thread::Builder::new()
            .name("midia-dispatch".into())
            .spawn(move || dispatch(events, length, connection, shared))
            .map_err(|e| BackendError::Send(e.to_string()))?;
        self.dispatcher = Some(handle);
        Ok(())
    }

    fn stop(&mut self) {
        if self.dispatcher.is_some() {
            self.join_dispatcher();
            self.all_notes_off();
        }
    }

    fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Relaxed)
    }

    fn take_end_of_track(&mut self) -> bool {
        let reached = self.shared.end_reached.swap(false, Ordering::Relaxed);
        if reached {
            self.join_dispatcher();
        }
        reached
    }
}

impl Drop for MidirSequencer {
    fn drop(&mut self) {
        self.close();
    }
}

/// Dispatch loop: sends every event whose tick has been reached
fn dispatch(
    events: Vec<TimedEvent>,
    length: u64,
    connection: SharedConnection,
    shared: Arc<SharedPlayback>,
) {
    let start_tick = shared.tick.load(Ordering::Relaxed);
    let mut position = start_tick as f64;
    let mut next = events.partition_point(|event| event.tick < start_tick);
    for message in chased_messages(&events[..next]) {
        if let Err(e) = send(&connection, &message) {
            log::warn!("Failed to restore controller state: {}", e);
        }
    }
    let mut last = Instant::now();

    while shared.running.load(Ordering::Relaxed) {
        let now = Instant::now();
        let elapsed_ms = now.duration_since(last).as_secs_f64() * 1000.0;
        last = now;

        // Ticks per ms at the current tempo
        position += elapsed_ms * shared.bpm() * PULSES_PER_QUARTER_NOTE as f64 / 60_000.0;
        let tick = (position as u64).min(length);

        while let Some(event) = events.get(next).filter(|event| event.tick <= tick) {
            if let Err(e) = send(&connection, &event.message) {
                log::warn!("Dropped MIDI event at tick {}: {}", event.tick, e);
            }
            next += 1;
        }
        shared.tick.store(tick, Ordering::Relaxed);

        if tick >= length {
            shared.running.store(false, Ordering::Relaxed);
            shared.end_reached.store(true, Ordering::Relaxed);
            break;
        }

        std::thread::sleep(DISPATCH_INTERVAL);
    }
}

/// Program and controller changes that precede the start tick
///
/// Starting mid-sequence would otherwise leave each channel on whatever
/// program and volume the device last had.
fn chased_messages(skipped: &[TimedEvent]) -> Vec<MidiMessage> {
    skipped
        .iter()
        .map(|event| event.message)
        .filter(|message| {
            matches!(
                message,
                MidiMessage::ProgramChange { .. } | MidiMessage::ControlChange { .. }
            )
        })
        .collect()
}

fn send(connection: &SharedConnection, message: &MidiMessage) -> Result<(), BackendError> {
    let mut connection = connection
        .lock()
        .map_err(|_| BackendError::Send("connection lock poisoned".into()))?;
    connection
        .send(&message.to_bytes())
        .map_err(|e| BackendError::Send(e.to_string()))
}
