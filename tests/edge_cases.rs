//! Edge case tests for the composition model
//!
//! Covers block bounds, time conversions, channel allocation, clipboard
//! offsets and the mute/volume rules of the sequence builder.

use midia::editing::{Clipboard, ClipboardItem};
use midia::sequencer::tempo::{beats_to_ticks, ticks_to_beats};
use midia::sequencer::{
    Block, Instrument, MidiTrack, Note, PERCUSSION_CHANNEL, PercussiveInstrument, Tempo, Timeline,
    TonalInstrument, build_timeline_sequence,
};
use midia::{SequencerBackend, VirtualSequencer};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

fn timeline() -> Timeline {
    let backend: Box<dyn SequencerBackend> = Box::new(VirtualSequencer::new());
    Timeline::new("edge cases", backend).unwrap()
}

fn piano() -> Instrument {
    TonalInstrument::AcousticGrandPiano.into()
}

#[test]
fn test_block_bounds_examples() {
    let mut block = Block::new(10, 1000);
    for start in [0, 100, 200] {
        block.add_note(Note::new(60, 100, start, 100)).unwrap();
    }

    assert_eq!(block.add_note(Note::new(65, 100, 0, 999)), Ok(3));
    assert!(block.add_note(Note::new(65, 100, 0, 1001)).is_err());
    assert!(block.add_note(Note::new(65, 100, 1, 1000)).is_err());
    // Rejection leaves the block unchanged
    assert_eq!(block.note_count(), 4);

    // Exactly filling the block is allowed
    assert_eq!(block.add_note(Note::new(65, 100, 0, 1000)), Ok(4));
    assert_eq!(block.add_note(Note::new(65, 100, 1000, 0)), Ok(5));
}

#[test]
fn test_block_bounds_randomized() {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..2000 {
        let duration = rng.gen_range(0..5000u64);
        let mut block = Block::new(rng.gen_range(0..100_000), duration);
        let start = rng.gen_range(0..6000u64);
        let length = rng.gen_range(0..6000u64);
        let before = block.note_count();

        let fits = start + length <= duration;
        let result = block.add_note(Note::new(rng.gen_range(0..128), 100, start, length));

        assert_eq!(result.is_ok(), fits, "start {} length {} in {}", start, length, duration);
        assert_eq!(block.note_count(), before + usize::from(fits));
        for note in block.notes() {
            assert!(note.end_tick() <= block.duration_ticks());
        }
    }
}

#[test]
fn test_conversion_examples() {
    let tempo = Tempo::new(120.0);
    assert_eq!(tempo.ticks_to_ms(960), 500.0);
    assert_eq!(tempo.ms_to_ticks(500.0), 960);
    assert_eq!(Tempo::new(240.0).ticks_to_ms(960), 250.0);

    assert_eq!(ticks_to_beats(1440), 1.5);
    assert_eq!(beats_to_ticks(1.5), 1440);
}

#[test]
fn test_conversion_round_trip_randomized() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..1000 {
        let tempo = Tempo::new(rng.gen_range(1.0..400.0));
        let ticks = rng.gen_range(0..10_000_000u64);
        assert_eq!(tempo.ms_to_ticks(tempo.ticks_to_ms(ticks)), ticks);
    }
}

#[test]
fn test_snapping() {
    let mut timeline = timeline();
    let player = timeline.player_mut();

    // Quarter of a beat
    assert_eq!(player.division_interval(), 240);
    assert_eq!(player.snap_tick_nearest(119), 0);
    assert_eq!(player.snap_tick_nearest(120), 240);
    assert_eq!(player.snap_tick_lower_division(479), 240);

    player.set_beat_division(3);
    assert_eq!(player.division_interval(), 320);
    assert_eq!(player.snap_tick_nearest(500), 640);
    assert_eq!(player.snap_tick_lower_division(500), 320);
}

#[test]
fn test_coordinate_transform() {
    let mut block = Block::new(10, 100);
    block.add_note(Note::new(60, 100, 0, 10)).unwrap();
    block.add_note(Note::new(62, 100, 50, 10)).unwrap();

    let starts: Vec<u64> = block.notes_timeline().map(|note| note.start_tick()).collect();
    assert_eq!(starts, vec![10, 60]);

    block.set_start_tick(4);
    let starts: Vec<u64> = block.notes_timeline().map(|note| note.start_tick()).collect();
    assert_eq!(starts, vec![4, 54]);

    // Stored notes keep block-relative ticks
    assert_eq!(block.notes()[0].start_tick(), 0);
    assert_eq!(block.notes()[1].start_tick(), 50);
}

#[test]
fn test_channel_allocation() {
    let mut timeline = timeline();
    let mut channels = Vec::new();
    for i in 0..15 {
        channels.push(timeline.create_midi_track(format!("t{}", i), piano()).unwrap().channel());
    }
    assert!(!channels.contains(&PERCUSSION_CHANNEL));
    assert!(timeline.create_midi_track("t15", piano()).is_none());

    // Percussion never needs the pool
    let snare: Instrument = PercussiveInstrument::AcousticSnare.into();
    assert_eq!(
        timeline.create_midi_track("snare", snare).unwrap().channel(),
        PERCUSSION_CHANNEL
    );

    let removed = timeline.remove_midi_track(6).unwrap();
    assert_eq!(timeline.player().channels().channels(), &[removed.channel()]);
    assert_eq!(
        timeline.create_midi_track("again", piano()).unwrap().channel(),
        removed.channel()
    );
}

#[test]
fn test_percussive_track_on_tonal_channel_rejected() {
    let snare: Instrument = PercussiveInstrument::AcousticSnare.into();
    assert!(MidiTrack::new("snare", snare, 3).is_err());
    assert!(MidiTrack::new("piano", piano(), PERCUSSION_CHANNEL).is_err());
}

#[test]
fn test_clipboard_paste_offset() {
    let mut clipboard = Clipboard::new();
    clipboard.copy(&[
        ClipboardItem::Block(Block::new(5, 10)),
        ClipboardItem::Block(Block::new(20, 10)),
    ]);

    let mut track = MidiTrack::new("t", piano(), 0).unwrap();
    assert_eq!(clipboard.paste_into(&mut track, 100), 2);

    let starts: Vec<u64> = track.blocks().iter().map(Block::start_tick).collect();
    assert_eq!(starts, vec![100, 115]);

    // Clipboard keeps its own copies
    track.block_mut(0).unwrap().set_start_tick(0);
    assert_eq!(clipboard.contents()[0], ClipboardItem::Block(Block::new(5, 10)));
}

#[test]
fn test_mute_and_volume_exclusion() {
    let mut track = MidiTrack::new("t", piano(), 0).unwrap();
    let mut block = Block::new(0, 960);
    block.add_note(Note::new(60, 100, 0, 480)).unwrap();
    track.add_block(block);

    let count = |track: &MidiTrack| {
        build_timeline_sequence(std::slice::from_ref(track))
            .unwrap()
            .event_count()
    };
    assert_eq!(count(&track), 4);

    track.set_muted(true);
    assert_eq!(count(&track), 0);
    track.set_muted(false);
    assert_eq!(count(&track), 4);

    track.set_volume(0);
    assert_eq!(count(&track), 0);
    track.set_volume(1);
    assert_eq!(count(&track), 4);
}

#[test]
fn test_volume_scales() {
    let mut track = MidiTrack::new("t", piano(), 0).unwrap();
    track.set_volume_scaled(50);
    assert_eq!(track.volume(), 64);
    assert_eq!(track.volume_scaled(), 50);

    track.set_volume(127);
    assert_eq!(track.volume_scaled(), 100);
}

#[test]
fn test_set_position_beat_clamps() {
    let mut timeline = timeline();
    let player = timeline.player_mut();

    player.set_position_beat(3.0);
    assert_eq!(player.tick_position(), 1920);
    player.set_position_beat(0.5);
    assert_eq!(player.tick_position(), 0);
}
