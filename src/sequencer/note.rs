// Note representation for the sequencer
// A note is pitch + velocity positioned in ticks, relative to its owning block

/// A musical note inside a [`Block`](crate::sequencer::block::Block)
///
/// Tick timings are kept relative to the block that owns the note. The block
/// converts them to absolute timeline ticks when the sequence is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    /// MIDI note number (0-127, where 60 = C4)
    /// Ignored for percussive tracks, which play the instrument key instead
    pitch: u8,

    /// MIDI velocity (0-127, where 127 = maximum)
    velocity: u8,

    /// Start position in ticks, relative to the owning block
    start_tick: u64,

    /// Duration in ticks
    duration_ticks: u64,
}

impl Note {
    /// Creates a new note
    pub fn new(pitch: u8, velocity: u8, start_tick: u64, duration_ticks: u64) -> Self {
        assert!(pitch <= 127, "MIDI pitch must be 0-127");
        assert!(velocity <= 127, "MIDI velocity must be 0-127");

        Self {
            pitch,
            velocity,
            start_tick,
            duration_ticks,
        }
    }

    pub fn pitch(&self) -> u8 {
        self.pitch
    }

    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    pub fn start_tick(&self) -> u64 {
        self.start_tick
    }

    pub fn duration_ticks(&self) -> u64 {
        self.duration_ticks
    }

    pub fn set_pitch(&mut self, pitch: u8) {
        assert!(pitch <= 127, "MIDI pitch must be 0-127");
        self.pitch = pitch;
    }

    pub fn set_velocity(&mut self, velocity: u8) {
        assert!(velocity <= 127, "MIDI velocity must be 0-127");
        self.velocity = velocity;
    }

    pub fn set_start_tick(&mut self, start_tick: u64) {
        self.start_tick = start_tick;
    }

    pub fn set_duration_ticks(&mut self, duration_ticks: u64) {
        self.duration_ticks = duration_ticks;
    }

    /// Tick at which this note ends (start + duration), saturating at `u64::MAX`
    pub fn end_tick(&self) -> u64 {
        self.start_tick.saturating_add(self.duration_ticks)
    }

    /// Exact end tick, `None` when it does not fit in a `u64`
    pub fn checked_end_tick(&self) -> Option<u64> {
        self.start_tick.checked_add(self.duration_ticks)
    }

    /// Get the note name (e.g., "C4", "A#5")
    pub fn note_name(&self) -> String {
        pitch_name(self.pitch)
    }
}

/// Name of a MIDI note number, with middle C (60) as "C4"
pub fn pitch_name(pitch: u8) -> String {
    const NOTE_NAMES: [&str; 12] = [
        "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
    ];

    let octave = (pitch / 12) as i32 - 1;
    let note_index = (pitch % 12) as usize;

    format!("{}{}", NOTE_NAMES[note_index], octave)
}
