// Sequence builder - Converts tracks, blocks and notes into a tick-stamped event stream

use crate::midi::event::{CC_CHANNEL_VOLUME, MidiDataError, MidiMessage};
use crate::midi::sequence::{Sequence, SequenceTrack};
use crate::sequencer::block::Block;
use crate::sequencer::note::Note;
use crate::sequencer::track::MidiTrack;

/// Build the whole-timeline sequence
///
/// Muted tracks and tracks at volume 0 produce nothing. Every other track
/// gets its own sequence track, in track order.
pub fn build_timeline_sequence(tracks: &[MidiTrack]) -> Result<Sequence, MidiDataError> {
    let mut sequence = Sequence::new();

    for track in tracks.iter().filter(|track| track.is_audible()) {
        let mut events = track_header(track, track.volume())?;
        for block in track.blocks() {
            push_notes(&mut events, track, block.notes_timeline())?;
        }
        sequence.add_track(events);
    }

    Ok(sequence)
}

/// Build the sequence for a single block, in block-relative ticks
///
/// The track supplies channel and instrument; `volume` replaces the track
/// volume. The end-of-track marker is placed on the block's duration so
/// playback stops (or loops) exactly on the block boundary.
pub fn build_block_sequence(
    block: &Block,
    track: &MidiTrack,
    volume: u8,
) -> Result<Sequence, MidiDataError> {
    let mut events = track_header(track, volume)?;
    push_notes(&mut events, track, block.notes().iter().cloned())?;
    events.set_end_tick(block.duration_ticks());

    let mut sequence = Sequence::new();
    sequence.add_track(events);
    Ok(sequence)
}

/// Program change (tonal only) and channel volume at tick 0
fn track_header(track: &MidiTrack, volume: u8) -> Result<SequenceTrack, MidiDataError> {
    let mut events = SequenceTrack::new();
    let channel = track.channel();

    // Channel 9 ignores program changes
    if !track.is_percussive() {
        events.push(
            0,
            MidiMessage::program_change(channel, track.instrument().program())?,
        );
    }
    events.push(
        0,
        MidiMessage::control_change(channel, CC_CHANNEL_VOLUME, volume)?,
    );

    Ok(events)
}

fn push_notes(
    events: &mut SequenceTrack,
    track: &MidiTrack,
    notes: impl Iterator<Item = Note>,
) -> Result<(), MidiDataError> {
    let channel = track.channel();

    for note in notes {
        // Percussive tracks play the instrument key whatever the pitch
        let key = if track.is_percussive() {
            track.instrument().program()
        } else {
            note.pitch()
        };

        events.push(
            note.start_tick(),
            MidiMessage::note_on(channel, key, note.velocity())?,
        );
        events.push(note.end_tick(), MidiMessage::note_off(channel, key)?);
    }

    Ok(())
}
