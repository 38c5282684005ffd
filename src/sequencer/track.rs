// MidiTrack - A single layer of the project bound to one channel and instrument

use crate::sequencer::block::Block;
use crate::sequencer::channels::{CHANNEL_COUNT, PERCUSSION_CHANNEL};
use crate::sequencer::instrument::{Instrument, InstrumentKind};
use std::fmt;

/// Default track volume (0-127 scale)
pub const DEFAULT_VOLUME: u8 = 100;

/// Factor between the 0-127 MIDI volume and the 0-100 user scale
const VOLUME_SCALE: f64 = 1.27;

/// Errors raised when a track and its instrument/channel disagree
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrackError {
    #[error("channel {0} is out of range (0-15)")]
    InvalidChannel(u8),

    #[error("{instrument} instrument cannot be used on channel {channel}")]
    InstrumentMismatch {
        instrument: InstrumentKind,
        channel: u8,
    },
}

/// A named, channel-bound container of blocks
///
/// The channel is fixed at construction. Channel 9 means the track is
/// percussive and must carry a percussion instrument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiTrack {
    name: String,
    channel: u8,
    instrument: Instrument,
    /// 0 to 127 inclusive
    volume: u8,
    muted: bool,
    blocks: Vec<Block>,
}

impl MidiTrack {
    /// Create an unmuted, empty track at the default volume
    pub fn new(
        name: impl Into<String>,
        instrument: Instrument,
        channel: u8,
    ) -> Result<Self, TrackError> {
        if channel >= CHANNEL_COUNT {
            return Err(TrackError::InvalidChannel(channel));
        }
        check_instrument(instrument, channel)?;

        Ok(Self {
            name: name.into(),
            channel,
            instrument,
            volume: DEFAULT_VOLUME,
            muted: false,
            blocks: Vec::new(),
        })
    }

    /// Add a block, returning its index
    pub fn add_block(&mut self, block: Block) -> usize {
        log::debug!(
            "Added block with {} notes to track {}",
            block.note_count(),
            self.name
        );
        self.blocks.push(block);
        self.blocks.len() - 1
    }

    /// Remove the block at `index`
    pub fn remove_block(&mut self, index: usize) -> Option<Block> {
        if index >= self.blocks.len() {
            return None;
        }
        let block = self.blocks.remove(index);
        log::debug!(
            "Removed block with {} notes from track {}",
            block.note_count(),
            self.name
        );
        Some(block)
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn block_mut(&mut self, index: usize) -> Option<&mut Block> {
        self.blocks.get_mut(index)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn is_percussive(&self) -> bool {
        self.channel == PERCUSSION_CHANNEL
    }

    pub fn instrument(&self) -> Instrument {
        self.instrument
    }

    /// Change the instrument; its catalog must match the track's channel
    pub fn set_instrument(&mut self, instrument: Instrument) -> Result<(), TrackError> {
        check_instrument(instrument, self.channel)?;
        self.instrument = instrument;
        Ok(())
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: u8) {
        assert!(volume <= 127, "Track volume must be 0-127");
        self.volume = volume;
    }

    /// Volume on the 0-100 user scale
    pub fn volume_scaled(&self) -> u8 {
        (self.volume as f64 / VOLUME_SCALE).round() as u8
    }

    /// Set the volume from the 0-100 user scale
    pub fn set_volume_scaled(&mut self, volume: u8) {
        assert!(volume <= 100, "Scaled volume must be 0-100");
        self.volume = (volume as f64 * VOLUME_SCALE).round() as u8;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Whether this track contributes events to a timeline sequence
    pub fn is_audible(&self) -> bool {
        !self.muted && self.volume > 0
    }

    /// One line summary for listings
    pub fn info(&self) -> String {
        format!(
            "name: {}, channel: {}, instrument: {}, block count: {}",
            self.name,
            self.channel,
            self.instrument,
            self.blocks.len()
        )
    }

    pub(crate) fn push_block(&mut self, block: Block) {
        self.blocks.push(block);
    }
}

impl fmt::Display for MidiTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

fn check_instrument(instrument: Instrument, channel: u8) -> Result<(), TrackError> {
    if instrument.is_percussive() != (channel == PERCUSSION_CHANNEL) {
        return Err(TrackError::InstrumentMismatch {
            instrument: instrument.kind(),
            channel,
        });
    }
    Ok(())
}
