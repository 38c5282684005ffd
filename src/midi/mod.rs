// MIDI module - Short messages, tick-stamped sequences and output ports

pub mod device;
pub mod event;
pub mod sequence;

pub use device::{MidiDeviceInfo, MidiDeviceManager};
pub use event::{MidiDataError, MidiMessage};
pub use sequence::{Sequence, SequenceTrack, TimedEvent};
