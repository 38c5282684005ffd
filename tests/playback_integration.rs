// Integration test for playback
// Drives timelines and previews through the software sequencer with a manual clock

use midia::backend::{BackendError, ManualClock, SequencerBackend, VirtualSequencer};
use midia::messaging::{EngineEvent, create_event_channel};
use midia::midi::Sequence;
use midia::sequencer::{
    Block, BlockPreview, Instrument, Note, PlaybackError, Session, Timeline, TonalInstrument,
};
use midia::EngineConfig;
use ringbuf::traits::Consumer;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Backend that can never be opened, like a missing MIDI device
struct UnavailableBackend;

impl SequencerBackend for UnavailableBackend {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn open(&mut self) -> Result<(), BackendError> {
        Err(BackendError::Unavailable("no device".to_string()))
    }

    fn close(&mut self) {}

    fn is_open(&self) -> bool {
        false
    }

    fn load_sequence(&mut self, _sequence: Sequence) -> Result<(), BackendError> {
        Err(BackendError::NotOpen)
    }

    fn loaded_sequence(&self) -> Option<&Sequence> {
        None
    }

    fn clear(&mut self) {}

    fn set_tempo_bpm(&mut self, _bpm: f64) {}

    fn tempo_bpm(&self) -> f64 {
        120.0
    }

    fn set_tick_position(&mut self, _tick: u64) {}

    fn tick_position(&self) -> u64 {
        0
    }

    fn start(&mut self) -> Result<(), BackendError> {
        Err(BackendError::NotOpen)
    }

    fn stop(&mut self) {}

    fn is_running(&self) -> bool {
        false
    }

    fn take_end_of_track(&mut self) -> bool {
        false
    }
}

/// Open backends, shared by every [`TrackedBackend`] of a test
#[derive(Debug, Default)]
struct OpenCount {
    current: AtomicUsize,
    max: AtomicUsize,
}

/// Virtual sequencer that records how many backends are open at once
struct TrackedBackend {
    inner: VirtualSequencer,
    count: Arc<OpenCount>,
}

impl TrackedBackend {
    fn new(clock: &ManualClock, count: &Arc<OpenCount>) -> Self {
        Self {
            inner: VirtualSequencer::with_manual_clock(clock.clone()),
            count: Arc::clone(count),
        }
    }
}

impl SequencerBackend for TrackedBackend {
    fn name(&self) -> &str {
        "tracked"
    }

    fn open(&mut self) -> Result<(), BackendError> {
        if !self.inner.is_open() {
            let open = self.count.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.count.max.fetch_max(open, Ordering::SeqCst);
        }
        self.inner.open()
    }

    fn close(&mut self) {
        if self.inner.is_open() {
            self.count.current.fetch_sub(1, Ordering::SeqCst);
        }
        self.inner.close();
    }

    fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    fn load_sequence(&mut self, sequence: Sequence) -> Result<(), BackendError> {
        self.inner.load_sequence(sequence)
    }

    fn loaded_sequence(&self) -> Option<&Sequence> {
        self.inner.loaded_sequence()
    }

    fn clear(&mut self) {
        self.inner.clear();
    }

    fn set_tempo_bpm(&mut self, bpm: f64) {
        self.inner.set_tempo_bpm(bpm);
    }

    fn tempo_bpm(&self) -> f64 {
        self.inner.tempo_bpm()
    }

    fn set_tick_position(&mut self, tick: u64) {
        self.inner.set_tick_position(tick);
    }

    fn tick_position(&self) -> u64 {
        self.inner.tick_position()
    }

    fn start(&mut self) -> Result<(), BackendError> {
        self.inner.start()
    }

    fn stop(&mut self) {
        self.inner.stop();
    }

    fn is_running(&self) -> bool {
        self.inner.is_running()
    }

    fn take_end_of_track(&mut self) -> bool {
        self.inner.take_end_of_track()
    }
}

fn piano() -> Instrument {
    TonalInstrument::AcousticGrandPiano.into()
}

/// Two beats of music: one note per beat
fn two_beat_timeline(clock: &ManualClock) -> Timeline {
    let backend = VirtualSequencer::with_manual_clock(clock.clone());
    let mut timeline = Timeline::new("Two beats", Box::new(backend)).unwrap();
    let track = timeline.create_midi_track("piano", piano()).unwrap();
    let mut block = Block::new(0, 1920);
    block.add_note(Note::new(60, 100, 0, 960)).unwrap();
    block.add_note(Note::new(67, 100, 960, 960)).unwrap();
    track.add_block(block);
    timeline
}

fn drain(consumer: &mut midia::EventConsumer) -> Vec<EngineEvent> {
    std::iter::from_fn(|| consumer.try_pop()).collect()
}

#[test]
fn test_backend_unavailable_is_fatal() {
    let result = Timeline::new("broken", Box::new(UnavailableBackend));
    assert!(matches!(result, Err(BackendError::Unavailable(_))));
}

#[test]
fn test_play_poll_until_end() {
    let clock = ManualClock::new();
    let mut timeline = two_beat_timeline(&clock);
    let (producer, mut consumer) = create_event_channel(64);
    timeline.attach_events(producer);

    timeline.play().unwrap();
    assert!(timeline.is_playing());

    clock.advance_ms(250);
    timeline.poll().unwrap();
    assert_eq!(timeline.player().tick_position(), 480);

    // Two beats at 120 BPM last one second
    clock.advance_ms(800);
    timeline.poll().unwrap();
    assert!(!timeline.is_playing());
    assert!(!timeline.player().is_polling());
    assert_eq!(timeline.player().tick_position(), 1920);

    let events = drain(&mut consumer);
    assert!(events.contains(&EngineEvent::PlaybackStarted { tick: 0 }));
    assert!(events.contains(&EngineEvent::PositionChanged { tick: 480 }));
    assert_eq!(events.last(), Some(&EngineEvent::PlaybackEnded { tick: 1920 }));
}

#[test]
fn test_pause_syncs_position_and_resumes() {
    let clock = ManualClock::new();
    let mut timeline = two_beat_timeline(&clock);

    timeline.play().unwrap();
    clock.advance_ms(500);
    timeline.pause();
    assert_eq!(timeline.player().tick_position(), 960);

    // Time passing while paused does not move the playhead
    clock.advance_ms(5000);
    timeline.poll().unwrap();
    assert_eq!(timeline.player().tick_position(), 960);

    timeline.play().unwrap();
    clock.advance_ms(250);
    timeline.poll().unwrap();
    assert_eq!(timeline.player().tick_position(), 1440);
}

#[test]
fn test_tempo_change_while_playing() {
    let clock = ManualClock::new();
    let mut timeline = two_beat_timeline(&clock);

    timeline.play().unwrap();
    clock.advance_ms(250);
    let previous = timeline.player_mut().set_bpm(240.0);
    assert_eq!(previous, 120.0);
    assert!(timeline.is_playing());
    assert_eq!(timeline.player().backend().tempo_bpm(), 240.0);

    // 250 ms at 240 BPM is another whole beat
    clock.advance_ms(250);
    timeline.poll().unwrap();
    assert_eq!(timeline.player().tick_position(), 480 + 960);
}

#[test]
fn test_ruler_drag_resumes_from_scrubbed_tick() {
    let clock = ManualClock::new();
    let mut timeline = two_beat_timeline(&clock);

    timeline.play().unwrap();
    clock.advance_ms(100);
    timeline.start_ruler_drag();
    assert!(!timeline.is_playing());

    timeline.player_mut().set_tick_position(1200);
    clock.advance_ms(1000);
    timeline.poll().unwrap();
    assert_eq!(timeline.player().tick_position(), 1200);

    timeline.stop_ruler_drag().unwrap();
    assert!(timeline.is_playing());
    clock.advance_ms(125);
    timeline.poll().unwrap();
    assert_eq!(timeline.player().tick_position(), 1440);
}

#[test]
fn test_ruler_drag_while_stopped_stays_stopped() {
    let clock = ManualClock::new();
    let mut timeline = two_beat_timeline(&clock);

    timeline.start_ruler_drag();
    timeline.player_mut().set_tick_position(300);
    timeline.stop_ruler_drag().unwrap();

    assert!(!timeline.is_playing());
    assert_eq!(timeline.player().tick_position(), 300);
}

#[test]
fn test_timeline_loop_restarts() {
    let clock = ManualClock::new();
    let mut timeline = two_beat_timeline(&clock);
    let (producer, mut consumer) = create_event_channel(64);
    timeline.attach_events(producer);

    timeline.set_looping(true).unwrap();
    clock.advance_ms(1100);
    timeline.poll().unwrap();

    assert!(timeline.is_playing());
    assert_eq!(timeline.player().tick_position(), 0);
    assert!(drain(&mut consumer).contains(&EngineEvent::LoopRestarted));

    timeline.set_looping(false).unwrap();
    assert!(!timeline.is_playing());
}

#[test]
fn test_play_rebuilds_from_current_tracks() {
    let clock = ManualClock::new();
    let mut timeline = two_beat_timeline(&clock);

    timeline.play().unwrap();
    timeline.pause();
    let before = timeline.player().backend().loaded_sequence().unwrap().event_count();

    timeline.track_mut(0).unwrap().set_muted(true);
    timeline.play().unwrap();
    let after = timeline.player().backend().loaded_sequence().unwrap();
    assert_eq!(before, 6);
    assert_eq!(after.event_count(), 0);
}

#[test]
fn test_block_preview_loops_on_block_boundary() {
    let clock = ManualClock::new();
    let timeline = two_beat_timeline(&clock);
    let track = timeline.track(0).unwrap();
    let block = track.block(0).unwrap();

    let mut preview = BlockPreview::new(
        track,
        Box::new(VirtualSequencer::with_manual_clock(clock.clone())),
        timeline.player().bpm(),
        &EngineConfig::default(),
    )
    .unwrap();

    preview.set_looping(true, block, track).unwrap();
    for _ in 0..3 {
        clock.advance_ms(1001);
        preview.poll(block, track).unwrap();
        assert!(preview.is_playing());
        assert_eq!(preview.player().tick_position(), 0);
    }

    preview.toggle_loop(block, track).unwrap();
    assert!(!preview.is_playing());
}

#[test]
fn test_session_replaces_timeline_without_overlap() {
    let clock = ManualClock::new();
    let count = Arc::new(OpenCount::default());

    let first = Timeline::new("first", Box::new(TrackedBackend::new(&clock, &count))).unwrap();
    let mut session = Session::new(first);
    session.play().unwrap();

    let json = midia::write_timeline(&two_beat_timeline(&clock)).unwrap();
    let old = session
        .replace_timeline(|| {
            // The old backend is already released here
            assert_eq!(count.current.load(Ordering::SeqCst), 0);
            midia::read_timeline(&json, Box::new(TrackedBackend::new(&clock, &count)))
        })
        .unwrap();

    assert!(!old.player().backend().is_open());
    assert!(session.timeline().player().backend().is_open());
    assert_eq!(session.timeline().project_name(), "Two beats");
    assert!(!session.is_running());
    assert_eq!(count.current.load(Ordering::SeqCst), 1);
    assert_eq!(count.max.load(Ordering::SeqCst), 1);

    session.play().unwrap();
    assert!(session.is_running());
}

#[test]
fn test_failed_play_keeps_model() {
    let clock = ManualClock::new();
    let mut timeline = two_beat_timeline(&clock);
    timeline.close();

    let tracks = timeline.tracks().to_vec();
    let result = timeline.play();
    assert!(matches!(
        result,
        Err(PlaybackError::Backend(BackendError::NotOpen))
    ));
    assert_eq!(timeline.tracks(), tracks.as_slice());
    assert_eq!(timeline.player().tick_position(), 0);
}
