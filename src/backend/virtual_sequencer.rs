// Virtual sequencer - Software transport without any MIDI device
// Position is derived from elapsed time at the current tempo

use crate::backend::{BackendError, SequencerBackend};
use crate::midi::sequence::Sequence;
use crate::sequencer::tempo::{DEFAULT_BPM, Tempo};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Externally driven clock, shared between the test and the sequencer
///
/// Cloning yields a handle to the same clock.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    micros: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance_ms(&self, ms: u64) {
        self.micros.fetch_add(ms * 1000, Ordering::Relaxed);
    }

    pub fn advance_micros(&self, micros: u64) {
        self.micros.fetch_add(micros, Ordering::Relaxed);
    }

    pub fn now_micros(&self) -> u64 {
        self.micros.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone)]
enum Clock {
    System(Instant),
    Manual(ManualClock),
}

impl Clock {
    fn now_micros(&self) -> u64 {
        match self {
            Clock::System(origin) => origin.elapsed().as_micros() as u64,
            Clock::Manual(clock) => clock.now_micros(),
        }
    }
}

/// Sequencer backend that only keeps time
#[derive(Debug)]
pub struct VirtualSequencer {
    clock: Clock,
    open: bool,
    sequence: Option<Sequence>,
    tempo: Tempo,
    running: bool,
    /// Tick at `anchor_micros`
    anchor_tick: u64,
    anchor_micros: u64,
    /// Set when the end has been reached and not yet reported
    end_pending: bool,
}

impl VirtualSequencer {
    /// Sequencer following the system clock
    pub fn new() -> Self {
        Self::with_clock(Clock::System(Instant::now()))
    }

    /// Sequencer following a manually advanced clock
    pub fn with_manual_clock(clock: ManualClock) -> Self {
        Self::with_clock(Clock::Manual(clock))
    }

    fn with_clock(clock: Clock) -> Self {
        Self {
            clock,
            open: false,
            sequence: None,
            tempo: Tempo::new(DEFAULT_BPM),
            running: false,
            anchor_tick: 0,
            anchor_micros: 0,
            end_pending: false,
        }
    }

    fn length_ticks(&self) -> u64 {
        self.sequence.as_ref().map_or(0, Sequence::length_ticks)
    }

    /// Unclamped position at the current time
    fn raw_tick(&self) -> u64 {
        if !self.running {
            return self.anchor_tick;
        }
        let elapsed_ms = self
            .clock
            .now_micros()
            .saturating_sub(self.anchor_micros) as f64
            / 1000.0;
        self.anchor_tick + self.tempo.ms_to_ticks(elapsed_ms)
    }

    fn reached_end(&self) -> bool {
        self.running && self.raw_tick() >= self.length_ticks()
    }

    fn reanchor(&mut self, tick: u64) {
        self.anchor_tick = tick;
        self.anchor_micros = self.clock.now_micros();
    }
}

impl Default for VirtualSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl SequencerBackend for VirtualSequencer {
    fn name(&self) -> &str {
        "virtual"
    }

    fn open(&mut self) -> Result<(), BackendError> {
        self.open = true;
        Ok(())
    }

    fn close(&mut self) {
        self.stop();
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn load_sequence(&mut self, sequence: Sequence) -> Result<(), BackendError> {
        if !self.open {
            return Err(BackendError::NotOpen);
        }
        log::debug!(
            "Virtual sequencer loaded {} events over {} ticks",
            sequence.event_count(),
            sequence.length_ticks()
        );
        self.sequence = Some(sequence);
        self.end_pending = false;
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
        let tick = self.tick_position();
        self.tempo.set_bpm(bpm);
        self.reanchor(tick);
    }

    fn tempo_bpm(&self) -> f64 {
        self.tempo.bpm()
    }

    fn set_tick_position(&mut self, tick: u64) {
        self.end_pending = false;
        self.reanchor(tick);
    }

    fn tick_position(&self) -> u64 {
        if self.running {
            self.raw_tick().min(self.length_ticks())
        } else {
            self.anchor_tick
        }
    }

    fn start(&mut self) -> Result<(), BackendError> {
        if !self.open {
            return Err(BackendError::NotOpen);
        }
        if self.sequence.is_none() {
            return Err(BackendError::NoSequence);
        }
        let tick = self.anchor_tick;
        self.running = true;
        self.end_pending = false;
        self.reanchor(tick);
        Ok(())
    }

    fn stop(&mut self) {
        if self.running {
            let tick = self.tick_position();
            self.running = false;
            self.reanchor(tick);
        }
    }

    fn is_running(&self) -> bool {
        self.running && !self.reached_end()
    }

    fn take_end_of_track(&mut self) -> bool {
        if self.reached_end() {
            let end = self.length_ticks();
            self.running = false;
            self.reanchor(end);
            self.end_pending = true;
        }
        std::mem::take(&mut self.end_pending)
    }
}
