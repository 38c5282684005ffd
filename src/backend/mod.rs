// Playback backends
// A backend receives a built sequence and runs the transport over it

pub mod midir_output;
pub mod virtual_sequencer;

pub use midir_output::MidirSequencer;
pub use virtual_sequencer::{ManualClock, VirtualSequencer};

use crate::midi::sequence::Sequence;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("MIDI device unavailable: {0}")]
    Unavailable(String),

    #[error("sequencer is not open")]
    NotOpen,

    #[error("no sequence loaded")]
    NoSequence,

    #[error("failed to send MIDI message: {0}")]
    Send(String),
}

/// Transport over a tick-stamped sequence
///
/// Positions are in ticks at the sequence resolution. `take_end_of_track`
/// reports, once per pass, that playback reached the end-of-track marker.
pub trait SequencerBackend: Send {
    /// Human readable backend name, for logs
    fn name(&self) -> &str;

    fn open(&mut self) -> Result<(), BackendError>;

    /// Stop transport and release the device
    fn close(&mut self);

    fn is_open(&self) -> bool;

    /// Replace the loaded sequence, keeping the transport stopped or running
    fn load_sequence(&mut self, sequence: Sequence) -> Result<(), BackendError>;

    fn loaded_sequence(&self) -> Option<&Sequence>;

    /// Drop the loaded sequence
    fn clear(&mut self);

    fn set_tempo_bpm(&mut self, bpm: f64);

    fn tempo_bpm(&self) -> f64;

    fn set_tick_position(&mut self, tick: u64);

    fn tick_position(&self) -> u64;

    fn start(&mut self) -> Result<(), BackendError>;

    fn stop(&mut self);

    fn is_running(&self) -> bool;

    /// True once each time playback reaches the end of the sequence
    fn take_end_of_track(&mut self) -> bool;
}
