// Project reader - Rebuilds a timeline from its JSON document
// Every value is checked before the backend is opened

use std::path::{Path, PathBuf};

use crate::backend::SequencerBackend;
use crate::config::EngineConfig;
use crate::project::ProjectError;
use crate::project::format::{BlockState, NoteState, ProjectFile, TrackState};
use crate::sequencer::block::Block;
use crate::sequencer::channels::{CHANNEL_COUNT, ChannelPool, PERCUSSION_CHANNEL};
use crate::sequencer::instrument::{Instrument, InstrumentKind};
use crate::sequencer::note::Note;
use crate::sequencer::player::{MAX_BEAT_DIVISION, MAX_BEATS_PER_MEASURE};
use crate::sequencer::timeline::Timeline;
use crate::sequencer::track::MidiTrack;

/// Parse a project document into a timeline playing through `backend`
pub fn read_timeline(
    json: &str,
    backend: Box<dyn SequencerBackend>,
) -> Result<Timeline, ProjectError> {
    read_timeline_with_config(json, backend, &EngineConfig::default())
}

pub fn read_timeline_with_config(
    json: &str,
    backend: Box<dyn SequencerBackend>,
    config: &EngineConfig,
) -> Result<Timeline, ProjectError> {
    let file: ProjectFile = serde_json::from_str(json)?;

    let beat_division = ranged(file.beat_division, 1, MAX_BEAT_DIVISION, "beatDivision")?;
    let beats_per_measure = ranged(
        file.beats_per_measure,
        1,
        MAX_BEATS_PER_MEASURE,
        "beatsPerMeasure",
    )?;

    let scale = file.horizontal_scale_factor;
    if !(scale.is_finite() && scale > 0.0) {
        return Err(format_error(format!(
            "horizontalScaleFactor must be positive, got {}",
            scale
        )));
    }

    let bpm = file.player.beats_per_minute;
    if !(bpm.is_finite() && bpm >= 1.0) {
        return Err(format_error(format!(
            "beatsPerMinute must be at least 1, got {}",
            bpm
        )));
    }

    let tick_position = tick(file.player.tick_position, "tickPosition")?;
    let channels = channel_pool(&file.player.available_channels)?;
    let tracks = file
        .midi_tracks
        .iter()
        .enumerate()
        .map(|(index, track)| midi_track(index, track))
        .collect::<Result<Vec<_>, _>>()?;

    let mut timeline = Timeline::with_config(file.project_name, backend, config)?;
    timeline.set_beat_division(beat_division);
    timeline.set_beats_per_measure(beats_per_measure);
    timeline.set_horizontal_scale_factor(scale);

    let player = timeline.player_mut();
    player.set_bpm(bpm);
    player.set_tick_position(tick_position);
    player.set_channels(channels);

    for track in tracks {
        timeline.add_midi_track(track);
    }

    log::info!(
        "Loaded project {} with {} tracks",
        timeline.project_name(),
        timeline.tracks().len()
    );
    Ok(timeline)
}

/// Reads a project from a file on disk
#[derive(Debug, Clone)]
pub struct JsonReader {
    path: PathBuf,
}

impl JsonReader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self, backend: Box<dyn SequencerBackend>) -> Result<Timeline, ProjectError> {
        self.read_with_config(backend, &EngineConfig::default())
    }

    pub fn read_with_config(
        &self,
        backend: Box<dyn SequencerBackend>,
        config: &EngineConfig,
    ) -> Result<Timeline, ProjectError> {
        log::debug!("Reading project from {}", self.path.display());
        let json = std::fs::read_to_string(&self.path)?;
        read_timeline_with_config(&json, backend, config)
    }
}

fn format_error(message: impl Into<String>) -> ProjectError {
    ProjectError::Format(message.into())
}

fn ranged(value: i64, min: u32, max: u32, field: &str) -> Result<u32, ProjectError> {
    u32::try_from(value)
        .ok()
        .filter(|value| (min..=max).contains(value))
        .ok_or_else(|| {
            format_error(format!(
                "{} must be between {} and {}, got {}",
                field, min, max, value
            ))
        })
}

fn tick(value: i64, field: &str) -> Result<u64, ProjectError> {
    u64::try_from(value)
        .map_err(|_| format_error(format!("{} must not be negative, got {}", field, value)))
}

fn data_byte(value: i64, field: &str) -> Result<u8, ProjectError> {
    u8::try_from(value)
        .ok()
        .filter(|value| *value <= 127)
        .ok_or_else(|| format_error(format!("{} must be 0-127, got {}", field, value)))
}

fn channel(value: i64) -> Result<u8, ProjectError> {
    u8::try_from(value)
        .ok()
        .filter(|channel| *channel < CHANNEL_COUNT)
        .ok_or_else(|| format_error(format!("channel must be 0-15, got {}", value)))
}

/// Pool restored as written, order included
fn channel_pool(values: &[i64]) -> Result<ChannelPool, ProjectError> {
    let mut channels = Vec::with_capacity(values.len());
    for value in values {
        let channel = channel(*value)?;
        if channel == PERCUSSION_CHANNEL {
            return Err(format_error("availableChannels must not contain channel 9"));
        }
        if channels.contains(&channel) {
            return Err(format_error(format!(
                "availableChannels lists channel {} twice",
                channel
            )));
        }
        channels.push(channel);
    }
    Ok(ChannelPool::from_channels(channels))
}

fn midi_track(index: usize, state: &TrackState) -> Result<MidiTrack, ProjectError> {
    let kind = InstrumentKind::parse(&state.instrument.kind).ok_or_else(|| {
        format_error(format!(
            "track {}: unknown instrument type {:?}",
            index, state.instrument.kind
        ))
    })?;
    let instrument = Instrument::from_key(kind, &state.instrument.name).ok_or_else(|| {
        format_error(format!(
            "track {}: unknown {} instrument {:?}",
            index, kind, state.instrument.name
        ))
    })?;

    let channel = channel(state.channel)?;
    let mut track = MidiTrack::new(state.name.clone(), instrument, channel)
        .map_err(|e| format_error(format!("track {}: {}", index, e)))?;
    track.set_volume(data_byte(state.volume, "volume")?);

    for block in &state.blocks {
        track.push_block(block_from_state(block)?);
    }
    Ok(track)
}

fn block_from_state(state: &BlockState) -> Result<Block, ProjectError> {
    let mut block = Block::new(
        tick(state.start_tick, "startTick")?,
        tick(state.duration_ticks, "durationTicks")?,
    );
    for note in &state.notes {
        block
            .add_note(note_from_state(note)?)
            .map_err(|e| format_error(e.to_string()))?;
    }
    Ok(block)
}

fn note_from_state(state: &NoteState) -> Result<Note, ProjectError> {
    Ok(Note::new(
        data_byte(state.pitch, "pitch")?,
        data_byte(state.velocity, "velocity")?,
        tick(state.start_tick, "startTick")?,
        tick(state.duration_ticks, "durationTicks")?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::VirtualSequencer;

    fn backend() -> Box<dyn SequencerBackend> {
        Box::new(VirtualSequencer::new())
    }

    const MINIMAL: &str = r#"{
        "projectName": "Minimal",
        "beatDivision": 8,
        "beatsPerMeasure": 3,
        "horizontalScaleFactor": 2.0,
        "player": { "beatsPerMinute": 90.0, "tickPosition": 480, "availableChannels": [5, 0, 3] },
        "midiTracks": [
            {
                "name": "Kit",
                "channel": 9,
                "volume": 110,
                "instrument": { "name": "ACOUSTIC_SNARE", "type": "percussive" },
                "blocks": [
                    { "startTick": 960, "durationTicks": 960,
                      "notes": [ { "pitch": 0, "velocity": 90, "startTick": 0, "durationTicks": 120 } ] }
                ]
            }
        ]
    }"#;

    #[test]
    fn test_read_minimal() {
        let timeline = read_timeline(MINIMAL, backend()).unwrap();

        assert_eq!(timeline.project_name(), "Minimal");
        assert_eq!(timeline.beat_division(), 8);
        assert_eq!(timeline.beats_per_measure(), 3);
        assert_eq!(timeline.horizontal_scale_factor(), 2.0);
        assert_eq!(timeline.player().bpm(), 90.0);
        assert_eq!(timeline.player().tick_position(), 480);
        assert_eq!(timeline.player().channels().channels(), &[5, 0, 3]);

        let track = timeline.track(0).unwrap();
        assert!(track.is_percussive());
        assert_eq!(track.volume(), 110);
        assert!(!track.is_muted());
        assert_eq!(track.blocks()[0].notes()[0].duration_ticks(), 120);
        assert_eq!(timeline.length_ticks(), 1080);
    }

    fn with(field: &str, value: &str) -> String {
        let mut json: serde_json::Value = serde_json::from_str(MINIMAL).unwrap();
        let patch: serde_json::Value = serde_json::from_str(value).unwrap();
        *json.pointer_mut(field).unwrap() = patch;
        json.to_string()
    }

    fn assert_format_error(json: &str) {
        match read_timeline(json, backend()) {
            Err(ProjectError::Format(_)) => {}
            other => panic!("expected format error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_malformed_json() {
        assert_format_error("{ not json");
        assert_format_error("[]");
    }

    #[test]
    fn test_out_of_range_values() {
        assert_format_error(&with("/beatDivision", "0"));
        assert_format_error(&with("/beatDivision", "961"));
        assert_format_error(&with("/beatsPerMeasure", "-1"));
        assert_format_error(&with("/horizontalScaleFactor", "0.0"));
        assert_format_error(&with("/player/beatsPerMinute", "0.5"));
        assert_format_error(&with("/player/tickPosition", "-5"));
        assert_format_error(&with("/player/availableChannels", "[1, 9]"));
        assert_format_error(&with("/player/availableChannels", "[1, 1]"));
        assert_format_error(&with("/player/availableChannels", "[16]"));
        assert_format_error(&with("/midiTracks/0/volume", "128"));
        assert_format_error(&with("/midiTracks/0/blocks/0/notes/0/pitch", "200"));
        assert_format_error(&with("/midiTracks/0/blocks/0/notes/0/velocity", "-1"));
    }

    #[test]
    fn test_instrument_checks() {
        assert_format_error(&with(
            "/midiTracks/0/instrument",
            r#"{ "name": "ACOUSTIC_SNARE", "type": "drums" }"#,
        ));
        assert_format_error(&with(
            "/midiTracks/0/instrument",
            r#"{ "name": "NOT_AN_INSTRUMENT", "type": "percussive" }"#,
        ));
        // Tonal instrument on the percussion channel
        assert_format_error(&with(
            "/midiTracks/0/instrument",
            r#"{ "name": "ACOUSTIC_GRAND_PIANO", "type": "tonal" }"#,
        ));
        assert_format_error(&with("/midiTracks/0/channel", "2"));
    }

    #[test]
    fn test_note_outside_block_rejected() {
        assert_format_error(&with(
            "/midiTracks/0/blocks/0/notes/0/durationTicks",
            "961",
        ));
    }

    #[test]
    fn test_reader_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let reader = JsonReader::new(dir.path().join("missing.json"));
        assert!(matches!(reader.read(backend()), Err(ProjectError::Io(_))));
    }
}
