// Block preview - Plays a single block in isolation, optionally looping
// Uses the parent track's channel and instrument with its own volume

use crate::backend::{BackendError, SequencerBackend};
use crate::config::EngineConfig;
use crate::midi::event::MidiDataError;
use crate::midi::sequence::Sequence;
use crate::sequencer::block::Block;
use crate::sequencer::builder::build_block_sequence;
use crate::sequencer::player::{PlaybackError, PlaybackSubject, Player};
use crate::sequencer::track::MidiTrack;

/// One block played with its parent track's settings
#[derive(Debug, Clone, Copy)]
pub struct BlockSubject<'a> {
    block: &'a Block,
    track: &'a MidiTrack,
    volume: u8,
}

impl<'a> BlockSubject<'a> {
    pub fn new(block: &'a Block, track: &'a MidiTrack, volume: u8) -> Self {
        Self {
            block,
            track,
            volume,
        }
    }
}

impl PlaybackSubject for BlockSubject<'_> {
    fn length_ticks(&self) -> u64 {
        self.block.duration_ticks()
    }

    fn build_sequence(&self) -> Result<Sequence, MidiDataError> {
        build_block_sequence(self.block, self.track, self.volume)
    }

    fn describe(&self) -> String {
        format!(
            "block preview on track {} ({})",
            self.track.name(),
            self.track.instrument()
        )
    }
}

/// Audition player for one block
///
/// Has its own player and so its own backend. The block and its track are
/// passed to every transport call; positions are block-relative.
#[derive(Debug)]
pub struct BlockPreview {
    player: Player,
    volume: u8,
}

impl BlockPreview {
    /// Preview at the parent track's volume and the given tempo
    pub fn new(
        track: &MidiTrack,
        backend: Box<dyn SequencerBackend>,
        bpm: f64,
        config: &EngineConfig,
    ) -> Result<Self, BackendError> {
        let mut player = Player::new(backend, config)?;
        player.set_bpm(bpm);

        Ok(Self {
            player,
            volume: track.volume(),
        })
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Override the preview volume without touching the track
    pub fn set_volume(&mut self, volume: u8) {
        assert!(volume <= 127, "Preview volume must be 0-127");
        self.volume = volume;
    }

    pub fn play(&mut self, block: &Block, track: &MidiTrack) -> Result<(), PlaybackError> {
        let subject = BlockSubject::new(block, track, self.volume);
        self.player.play(&subject)
    }

    pub fn pause(&mut self) {
        self.player.pause();
    }

    pub fn poll(&mut self, block: &Block, track: &MidiTrack) -> Result<(), PlaybackError> {
        let subject = BlockSubject::new(block, track, self.volume);
        self.player.poll(&subject)
    }

    pub fn is_playing(&self) -> bool {
        self.player.is_playing()
    }

    pub fn is_looping(&self) -> bool {
        self.player.is_looping()
    }

    pub fn set_looping(
        &mut self,
        looping: bool,
        block: &Block,
        track: &MidiTrack,
    ) -> Result<(), PlaybackError> {
        let subject = BlockSubject::new(block, track, self.volume);
        self.player.set_looping(looping, &subject)
    }

    pub fn toggle_loop(&mut self, block: &Block, track: &MidiTrack) -> Result<(), PlaybackError> {
        let subject = BlockSubject::new(block, track, self.volume);
        self.player.toggle_loop(&subject)
    }

    pub fn length_ticks(&self, block: &Block) -> u64 {
        block.duration_ticks()
    }

    pub fn length_ms(&self, block: &Block) -> f64 {
        self.player.ticks_to_ms(block.duration_ticks())
    }

    pub fn length_beats(&self, block: &Block) -> f64 {
        self.player.ticks_to_beats(block.duration_ticks())
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn close(&mut self) {
        self.player.close();
    }
}
