// Timeline - Aggregate root of a project
// Owns the tracks and the player; allocates channels to new tracks

use crate::backend::{BackendError, SequencerBackend};
use crate::config::EngineConfig;
use crate::messaging::{EngineEvent, EventProducer};
use crate::midi::event::MidiDataError;
use crate::midi::sequence::Sequence;
use crate::sequencer::builder::build_timeline_sequence;
use crate::sequencer::channels::PERCUSSION_CHANNEL;
use crate::sequencer::instrument::Instrument;
use crate::sequencer::player::{PlaybackError, PlaybackSubject, Player};
use crate::sequencer::track::MidiTrack;

pub const DEFAULT_PROJECT_NAME: &str = "New Project";

/// Whole-timeline playback material
#[derive(Debug, Clone, Copy)]
pub struct TimelineSubject<'a> {
    project_name: &'a str,
    tracks: &'a [MidiTrack],
}

impl<'a> TimelineSubject<'a> {
    pub fn new(project_name: &'a str, tracks: &'a [MidiTrack]) -> Self {
        Self {
            project_name,
            tracks,
        }
    }
}

impl PlaybackSubject for TimelineSubject<'_> {
    fn length_ticks(&self) -> u64 {
        length_ticks(self.tracks)
    }

    fn build_sequence(&self) -> Result<Sequence, MidiDataError> {
        build_timeline_sequence(self.tracks)
    }

    fn describe(&self) -> String {
        format!("timeline {}", self.project_name)
    }
}

/// A project: named list of tracks played through one player
#[derive(Debug)]
pub struct Timeline {
    project_name: String,
    /// Zoom of the horizontal (time) axis, 1.0 = unscaled
    horizontal_scale_factor: f64,
    tracks: Vec<MidiTrack>,
    player: Player,
    /// Volume given to newly created tracks
    default_volume: u8,
}

impl Timeline {
    /// Create an empty timeline with default settings
    ///
    /// Fails when the backend cannot be opened.
    pub fn new(
        project_name: impl Into<String>,
        backend: Box<dyn SequencerBackend>,
    ) -> Result<Self, BackendError> {
        Self::with_config(project_name, backend, &EngineConfig::default())
    }

    pub fn with_config(
        project_name: impl Into<String>,
        backend: Box<dyn SequencerBackend>,
        config: &EngineConfig,
    ) -> Result<Self, BackendError> {
        let project_name = project_name.into();
        let player = Player::new(backend, config)?;
        log::debug!("Created timeline {}", project_name);

        Ok(Self {
            project_name,
            horizontal_scale_factor: 1.0,
            tracks: Vec::new(),
            player,
            default_volume: config.default_volume.min(127),
        })
    }

    // ---- Project settings ----

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn set_project_name(&mut self, project_name: impl Into<String>) {
        self.project_name = project_name.into();
    }

    pub fn horizontal_scale_factor(&self) -> f64 {
        self.horizontal_scale_factor
    }

    pub fn set_horizontal_scale_factor(&mut self, factor: f64) {
        assert!(factor > 0.0, "Scale factor must be positive");
        self.horizontal_scale_factor = factor;
    }

    pub fn beat_division(&self) -> u32 {
        self.player.beat_division()
    }

    pub fn set_beat_division(&mut self, beat_division: u32) -> u32 {
        self.player.set_beat_division(beat_division)
    }

    pub fn beats_per_measure(&self) -> u32 {
        self.player.beats_per_measure()
    }

    pub fn set_beats_per_measure(&mut self, beats_per_measure: u32) -> u32 {
        self.player.set_beats_per_measure(beats_per_measure)
    }

    // ---- Tracks ----

    /// Create a track and append it
    ///
    /// Percussive instruments always go to channel 9 and never use the pool.
    /// Tonal tracks take the lowest free channel; `None` when all 15 are in
    /// use.
    pub fn create_midi_track(
        &mut self,
        name: impl Into<String>,
        instrument: Instrument,
    ) -> Option<&mut MidiTrack> {
        let name = name.into();
        let channel = if instrument.is_percussive() {
            PERCUSSION_CHANNEL
        } else {
            match self.player.channels_mut().take_lowest() {
                Some(channel) => channel,
                None => {
                    log::warn!("No channel left for track {}", name);
                    return None;
                }
            }
        };

        let mut track = match MidiTrack::new(name, instrument, channel) {
            Ok(track) => track,
            Err(e) => {
                log::error!("Failed to create track: {}", e);
                if channel != PERCUSSION_CHANNEL {
                    self.player.channels_mut().release(channel);
                }
                return None;
            }
        };
        track.set_volume(self.default_volume);

        let index = self.tracks.len();
        self.player.emit(EngineEvent::TrackAdded {
            index,
            name: track.name().to_string(),
            channel,
        });
        log::debug!("Created track {} on channel {}", track.name(), channel);

        self.tracks.push(track);
        self.tracks.last_mut()
    }

    /// Append an existing track without touching the channel pool
    pub fn add_midi_track(&mut self, track: MidiTrack) -> usize {
        let index = self.tracks.len();
        self.player.emit(EngineEvent::TrackAdded {
            index,
            name: track.name().to_string(),
            channel: track.channel(),
        });
        self.tracks.push(track);
        index
    }

    /// Remove a track; a tonal track's channel becomes available again
    pub fn remove_midi_track(&mut self, index: usize) -> Option<MidiTrack> {
        if index >= self.tracks.len() {
            return None;
        }
        let track = self.tracks.remove(index);
        if !track.is_percussive() {
            self.player.channels_mut().release(track.channel());
        }

        log::debug!("Removed track {} from channel {}", track.name(), track.channel());
        self.player.emit(EngineEvent::TrackRemoved {
            index,
            name: track.name().to_string(),
            channel: track.channel(),
        });
        Some(track)
    }

    pub fn track(&self, index: usize) -> Option<&MidiTrack> {
        self.tracks.get(index)
    }

    pub fn track_mut(&mut self, index: usize) -> Option<&mut MidiTrack> {
        self.tracks.get_mut(index)
    }

    pub fn tracks(&self) -> &[MidiTrack] {
        &self.tracks
    }

    pub fn tracks_mut(&mut self) -> &mut [MidiTrack] {
        &mut self.tracks
    }

    // ---- Length ----

    /// Tick at which the last note ends, over every track (muted ones included)
    pub fn length_ticks(&self) -> u64 {
        length_ticks(&self.tracks)
    }

    pub fn length_ms(&self) -> f64 {
        self.player.ticks_to_ms(self.length_ticks())
    }

    pub fn length_beats(&self) -> f64 {
        self.player.ticks_to_beats(self.length_ticks())
    }

    // ---- Playback ----

    pub fn subject(&self) -> TimelineSubject<'_> {
        TimelineSubject::new(&self.project_name, &self.tracks)
    }

    /// Event stream for the current state of the tracks
    pub fn build_sequence(&self) -> Result<Sequence, MidiDataError> {
        build_timeline_sequence(&self.tracks)
    }

    pub fn play(&mut self) -> Result<(), PlaybackError> {
        let subject = TimelineSubject::new(&self.project_name, &self.tracks);
        self.player.play(&subject)
    }

    pub fn pause(&mut self) {
        self.player.pause();
    }

    pub fn poll(&mut self) -> Result<(), PlaybackError> {
        let subject = TimelineSubject::new(&self.project_name, &self.tracks);
        self.player.poll(&subject)
    }

    pub fn is_playing(&self) -> bool {
        self.player.is_playing()
    }

    pub fn start_ruler_drag(&mut self) {
        self.player.start_ruler_drag();
    }

    pub fn stop_ruler_drag(&mut self) -> Result<(), PlaybackError> {
        let subject = TimelineSubject::new(&self.project_name, &self.tracks);
        self.player.stop_ruler_drag(&subject)
    }

    pub fn set_looping(&mut self, looping: bool) -> Result<(), PlaybackError> {
        let subject = TimelineSubject::new(&self.project_name, &self.tracks);
        self.player.set_looping(looping, &subject)
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    /// Release the backend
    pub fn close(&mut self) {
        self.player.close();
    }

    pub fn reopen(&mut self) -> Result<(), BackendError> {
        self.player.reopen()
    }

    // ---- Events ----

    pub fn attach_events(&mut self, producer: EventProducer) {
        self.player.attach_events(producer);
    }

    pub fn detach_events(&mut self) -> Option<EventProducer> {
        self.player.detach_events()
    }
}

fn length_ticks(tracks: &[MidiTrack]) -> u64 {
    tracks
        .iter()
        .flat_map(|track| track.blocks())
        .flat_map(|block| block.notes_timeline())
        .map(|note| note.end_tick())
        .max()
        .unwrap_or(0)
}
