// Project file format - Serde mirror of the persisted JSON layout
// Integer fields are read wide and range-checked when converted to the model

use serde::{Deserialize, Serialize};

use crate::project::ProjectError;
use crate::sequencer::block::Block;
use crate::sequencer::note::Note;
use crate::sequencer::timeline::Timeline;
use crate::sequencer::track::MidiTrack;

/// Top-level project document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFile {
    pub project_name: String,
    pub beat_division: i64,
    pub beats_per_measure: i64,
    pub horizontal_scale_factor: f64,
    pub player: PlayerState,
    pub midi_tracks: Vec<TrackState>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub beats_per_minute: f64,
    pub tick_position: i64,
    /// Free channel pool, in pool order
    pub available_channels: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackState {
    pub name: String,
    pub channel: i64,
    pub volume: i64,
    pub instrument: InstrumentState,
    pub blocks: Vec<BlockState>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentState {
    /// Catalog key, e.g. "ACOUSTIC_GRAND_PIANO"
    pub name: String,
    /// "tonal" or "percussive"
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockState {
    pub start_tick: i64,
    pub duration_ticks: i64,
    pub notes: Vec<NoteState>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteState {
    pub pitch: i64,
    pub velocity: i64,
    pub start_tick: i64,
    pub duration_ticks: i64,
}

impl ProjectFile {
    /// Snapshot of a timeline as it would be written to disk
    ///
    /// Fails when a tick does not fit in a JSON long.
    pub fn from_timeline(timeline: &Timeline) -> Result<Self, ProjectError> {
        let player = timeline.player();

        Ok(Self {
            project_name: timeline.project_name().to_string(),
            beat_division: i64::from(timeline.beat_division()),
            beats_per_measure: i64::from(timeline.beats_per_measure()),
            horizontal_scale_factor: timeline.horizontal_scale_factor(),
            player: PlayerState {
                beats_per_minute: player.bpm(),
                tick_position: tick_to_i64(player.tick_position())?,
                available_channels: player
                    .channels()
                    .channels()
                    .iter()
                    .map(|channel| i64::from(*channel))
                    .collect(),
            },
            midi_tracks: timeline
                .tracks()
                .iter()
                .map(TrackState::try_from)
                .collect::<Result<_, _>>()?,
        })
    }
}

impl TryFrom<&MidiTrack> for TrackState {
    type Error = ProjectError;

    fn try_from(track: &MidiTrack) -> Result<Self, Self::Error> {
        let instrument = track.instrument();
        Ok(Self {
            name: track.name().to_string(),
            channel: i64::from(track.channel()),
            volume: i64::from(track.volume()),
            instrument: InstrumentState {
                name: instrument.key().to_string(),
                kind: instrument.kind().as_str().to_string(),
            },
            blocks: track
                .blocks()
                .iter()
                .map(BlockState::try_from)
                .collect::<Result<_, _>>()?,
        })
    }
}

impl TryFrom<&Block> for BlockState {
    type Error = ProjectError;

    fn try_from(block: &Block) -> Result<Self, Self::Error> {
        Ok(Self {
            start_tick: tick_to_i64(block.start_tick())?,
            duration_ticks: tick_to_i64(block.duration_ticks())?,
            notes: block
                .notes()
                .iter()
                .map(NoteState::try_from)
                .collect::<Result<_, _>>()?,
        })
    }
}

impl TryFrom<&Note> for NoteState {
    type Error = ProjectError;

    fn try_from(note: &Note) -> Result<Self, Self::Error> {
        Ok(Self {
            pitch: i64::from(note.pitch()),
            velocity: i64::from(note.velocity()),
            start_tick: tick_to_i64(note.start_tick())?,
            duration_ticks: tick_to_i64(note.duration_ticks())?,
        })
    }
}

/// Ticks are stored as JSON longs
fn tick_to_i64(tick: u64) -> Result<i64, ProjectError> {
    i64::try_from(tick)
        .map_err(|_| ProjectError::Serialize(format!("tick {} does not fit in a JSON long", tick)))
}
