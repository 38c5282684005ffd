// midia - MIDI composition engine
// Library exports for the binary, tests and benchmarks

pub mod backend;
pub mod config;
pub mod editing;
pub mod logging;
pub mod messaging;
pub mod midi;
pub mod project;
pub mod sequencer;

// Re-export commonly used types for convenience
pub use backend::{BackendError, ManualClock, MidirSequencer, SequencerBackend, VirtualSequencer};
pub use config::{ConfigError, EngineConfig};
pub use editing::{Clipboard, ClipboardItem, Pastable};
pub use messaging::{EngineEvent, EventConsumer, EventProducer, create_event_channel};
pub use midi::{MidiMessage, Sequence};
pub use project::{JsonReader, JsonWriter, ProjectError, read_timeline, write_timeline};
pub use sequencer::{
    Block, BlockPreview, Instrument, MidiTrack, Note, PercussiveInstrument, PlaybackError, Player,
    Session, Tempo, Timeline, TonalInstrument,
};
