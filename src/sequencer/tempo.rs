// Tempo - Conversion between ticks, beats and real time
// Resolution is fixed: one quarter note (beat) = 960 ticks

use std::fmt;

/// Ticks per quarter note
pub const PULSES_PER_QUARTER_NOTE: u64 = 960;

/// Tempo of a fresh timeline
pub const DEFAULT_BPM: f64 = 120.0;

const MS_PER_MINUTE: f64 = 60_000.0;

/// Tempo in BPM (Beats Per Minute)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tempo {
    bpm: f64,
}

impl Tempo {
    /// Creates a new tempo
    /// BPM must be at least 1
    pub fn new(bpm: f64) -> Self {
        assert!(bpm >= 1.0, "BPM must be at least 1");
        Self { bpm }
    }

    /// Get BPM value
    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Set BPM value, returning the previous one
    pub fn set_bpm(&mut self, bpm: f64) -> f64 {
        assert!(bpm >= 1.0, "BPM must be at least 1");
        std::mem::replace(&mut self.bpm, bpm)
    }

    pub fn ticks_to_ms(&self, ticks: u64) -> f64 {
        ticks_to_beats(ticks) / self.bpm * MS_PER_MINUTE
    }

    /// Rounded to the nearest tick
    pub fn ms_to_ticks(&self, ms: f64) -> u64 {
        beats_to_ticks(ms / MS_PER_MINUTE * self.bpm)
    }

    /// Rounded to the nearest millisecond
    pub fn beats_to_ms(&self, beats: f64) -> u64 {
        (beats / self.bpm * MS_PER_MINUTE).round().max(0.0) as u64
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self::new(DEFAULT_BPM)
    }
}

impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} BPM", self.bpm)
    }
}

/// Tempo independent: a beat is always one quarter note
pub fn ticks_to_beats(ticks: u64) -> f64 {
    ticks as f64 / PULSES_PER_QUARTER_NOTE as f64
}

/// Rounded to the nearest tick, negative values clamp to 0
pub fn beats_to_ticks(beats: f64) -> u64 {
    (beats * PULSES_PER_QUARTER_NOTE as f64).round().max(0.0) as u64
}

/// 1-based beat position (tick 0 is on beat 1)
pub fn ticks_to_on_beat(ticks: u64) -> f64 {
    ticks_to_beats(ticks) + 1.0
}
