// Sequencer module - Composition model, time base and playback
// Tracks hold blocks, blocks hold notes; the player turns them into MIDI

pub mod block;
pub mod builder;
pub mod channels;
pub mod instrument;
pub mod note;
pub mod player;
pub mod preview;
pub mod session;
pub mod tempo;
pub mod timeline;
pub mod track;

pub use block::{Block, NoteOutOfBounds};
pub use builder::{build_block_sequence, build_timeline_sequence};
pub use channels::{ChannelPool, PERCUSSION_CHANNEL};
pub use instrument::{Instrument, InstrumentKind, PercussiveInstrument, TonalInstrument};
pub use note::{Note, pitch_name};
pub use player::{PlaybackError, PlaybackSubject, Player};
pub use preview::{BlockPreview, BlockSubject};
pub use session::Session;
pub use tempo::{PULSES_PER_QUARTER_NOTE, Tempo};
pub use timeline::{DEFAULT_PROJECT_NAME, Timeline, TimelineSubject};
pub use track::{MidiTrack, TrackError};
