// Project writer - Serializes a timeline to pretty-printed JSON

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::project::ProjectError;
use crate::project::format::ProjectFile;
use crate::sequencer::timeline::Timeline;

const INDENT: &[u8] = b"    ";

/// Render a timeline as a project document
pub fn write_timeline(timeline: &Timeline) -> Result<String, ProjectError> {
    let file = ProjectFile::from_timeline(timeline)?;

    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    file.serialize(&mut serializer)
        .map_err(|e| ProjectError::Serialize(e.to_string()))?;

    String::from_utf8(buffer).map_err(|e| ProjectError::Serialize(e.to_string()))
}

/// Writes a project to a file on disk, creating parent directories
#[derive(Debug, Clone)]
pub struct JsonWriter {
    path: PathBuf,
}

impl JsonWriter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, timeline: &Timeline) -> Result<(), ProjectError> {
        let json = write_timeline(timeline)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, json)?;

        log::info!(
            "Saved project {} to {}",
            timeline.project_name(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::VirtualSequencer;
    use crate::sequencer::instrument::TonalInstrument;

    #[test]
    fn test_four_space_indent() {
        let timeline = Timeline::new("Indent", Box::new(VirtualSequencer::new())).unwrap();
        let json = write_timeline(&timeline).unwrap();

        assert!(json.starts_with("{\n    \"projectName\": \"Indent\""));
        assert!(json.contains("\n        \"beatsPerMinute\": 120.0"));
    }

    #[test]
    fn test_instrument_written_as_key_and_type() {
        let mut timeline = Timeline::new("Keys", Box::new(VirtualSequencer::new())).unwrap();
        timeline.create_midi_track("horn", TonalInstrument::FrenchHorn.into());

        let value: serde_json::Value =
            serde_json::from_str(&write_timeline(&timeline).unwrap()).unwrap();
        let instrument = &value["midiTracks"][0]["instrument"];
        assert_eq!(instrument["name"], "FRENCH_HORN");
        assert_eq!(instrument["type"], "tonal");
        assert_eq!(value["player"]["availableChannels"][0], 1);
    }

    #[test]
    fn test_writer_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("songs").join("demo.json");
        let timeline = Timeline::new("Demo", Box::new(VirtualSequencer::new())).unwrap();

        JsonWriter::new(&path).write(&timeline).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, write_timeline(&timeline).unwrap());
    }

    #[test]
    fn test_tick_past_json_long_is_rejected() {
        let mut timeline = Timeline::new("Far", Box::new(VirtualSequencer::new())).unwrap();
        let track = timeline
            .create_midi_track("lead", TonalInstrument::Flute.into())
            .unwrap();
        track.add_block(crate::sequencer::block::Block::new(i64::MAX as u64 + 1, 10));

        assert!(matches!(
            write_timeline(&timeline),
            Err(ProjectError::Serialize(_))
        ));

        timeline.track_mut(0).unwrap().block_mut(0).unwrap().set_start_tick(i64::MAX as u64);
        assert!(write_timeline(&timeline).is_ok());
    }
}
