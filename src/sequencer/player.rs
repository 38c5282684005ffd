// Player - Time base and transport over a playback backend
// Owns the tempo, the playhead, the beat grid and the channel pool of a timeline

use crate::backend::{BackendError, SequencerBackend};
use crate::config::EngineConfig;
use crate::messaging::{EngineEvent, EventProducer, EventSink};
use crate::midi::event::MidiDataError;
use crate::midi::sequence::Sequence;
use crate::sequencer::channels::ChannelPool;
use crate::sequencer::tempo::{self, PULSES_PER_QUARTER_NOTE, Tempo};

pub const DEFAULT_BEAT_DIVISION: u32 = 4;
pub const DEFAULT_BEATS_PER_MEASURE: u32 = 4;
pub const MAX_BEAT_DIVISION: u32 = PULSES_PER_QUARTER_NOTE as u32;
pub const MAX_BEATS_PER_MEASURE: u32 = PULSES_PER_QUARTER_NOTE as u32 * 4;

#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Invalid MIDI data: {0}")]
    MidiData(#[from] MidiDataError),
}

/// Something a player can turn into a sequence and play
pub trait PlaybackSubject {
    /// Length of the material in ticks
    fn length_ticks(&self) -> u64;

    /// Build the event stream for the current state of the material
    fn build_sequence(&self) -> Result<Sequence, MidiDataError>;

    /// Short description for logs
    fn describe(&self) -> String;
}

/// Time base of a timeline (or of a block preview)
///
/// The player is the only component talking to the backend. While playing,
/// the host calls [`Player::poll`] at a fixed interval so the playhead
/// mirrors the backend position.
pub struct Player {
    backend: Box<dyn SequencerBackend>,
    tempo: Tempo,
    tick_position: u64,
    beat_division: u32,
    beats_per_measure: u32,
    channels: ChannelPool,

    /// Position sync active (set by play, cleared by pause)
    polling: bool,
    dragging_ruler: bool,
    /// Transport was running when the current ruler drag started
    resume_after_drag: bool,
    looping: bool,

    events: EventSink,
}

impl Player {
    /// Open the backend and build a stopped player at tick 0
    ///
    /// An open failure is returned as is: there is no player without a
    /// backend.
    pub fn new(
        mut backend: Box<dyn SequencerBackend>,
        config: &EngineConfig,
    ) -> Result<Self, BackendError> {
        backend.open()?;
        log::info!("Opened {} sequencer", backend.name());

        Ok(Self {
            backend,
            tempo: Tempo::new(config.default_bpm),
            tick_position: 0,
            beat_division: config.beat_division.clamp(1, MAX_BEAT_DIVISION),
            beats_per_measure: config.beats_per_measure.clamp(1, MAX_BEATS_PER_MEASURE),
            channels: ChannelPool::new(),
            polling: false,
            dragging_ruler: false,
            resume_after_drag: false,
            looping: false,
            events: EventSink::new(),
        })
    }

    // ---- Events ----

    pub fn attach_events(&mut self, producer: EventProducer) {
        self.events.attach(producer);
    }

    pub fn detach_events(&mut self) -> Option<EventProducer> {
        self.events.detach()
    }

    pub(crate) fn emit(&mut self, event: EngineEvent) {
        self.events.emit(event);
    }

    // ---- Conversions ----

    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    pub fn ticks_to_ms(&self, ticks: u64) -> f64 {
        self.tempo.ticks_to_ms(ticks)
    }

    pub fn ms_to_ticks(&self, ms: f64) -> u64 {
        self.tempo.ms_to_ticks(ms)
    }

    pub fn ticks_to_beats(&self, ticks: u64) -> f64 {
        tempo::ticks_to_beats(ticks)
    }

    pub fn beats_to_ticks(&self, beats: f64) -> u64 {
        tempo::beats_to_ticks(beats)
    }

    pub fn beats_to_ms(&self, beats: f64) -> u64 {
        self.tempo.beats_to_ms(beats)
    }

    pub fn ticks_to_on_beat(&self, ticks: u64) -> f64 {
        tempo::ticks_to_on_beat(ticks)
    }

    /// Ticks between two grid lines at the current beat division
    pub fn division_interval(&self) -> u64 {
        PULSES_PER_QUARTER_NOTE / self.beat_division as u64
    }

    /// Round to the nearest grid line
    pub fn snap_tick_nearest(&self, tick: u64) -> u64 {
        let interval = self.division_interval();
        (tick as f64 / interval as f64).round() as u64 * interval
    }

    /// Floor to the grid line at or before `tick`
    pub fn snap_tick_lower_division(&self, tick: u64) -> u64 {
        let interval = self.division_interval();
        tick / interval * interval
    }

    // ---- Tempo ----

    pub fn bpm(&self) -> f64 {
        self.tempo.bpm()
    }

    /// Change the tempo, returning the previous one
    ///
    /// While playing, the backend picks up the new tempo without restarting.
    pub fn set_bpm(&mut self, bpm: f64) -> f64 {
        let previous = self.tempo.set_bpm(bpm);
        if self.is_playing() {
            self.backend.set_tempo_bpm(bpm);
        }
        self.emit(EngineEvent::TempoChanged { bpm });
        previous
    }

    // ---- Position ----

    pub fn tick_position(&self) -> u64 {
        self.tick_position
    }

    /// Move the playhead, returning the previous position
    pub fn set_tick_position(&mut self, tick: u64) -> u64 {
        let previous = std::mem::replace(&mut self.tick_position, tick);
        self.emit(EngineEvent::PositionChanged { tick });
        previous
    }

    pub fn set_position_ms(&mut self, ms: f64) -> u64 {
        let tick = self.ms_to_ticks(ms.max(0.0));
        self.set_tick_position(tick)
    }

    /// Move to a 1-based beat; anything before beat 1 lands on tick 0
    pub fn set_position_beat(&mut self, beat: f64) -> u64 {
        let tick = self.beats_to_ticks((beat - 1.0).max(0.0));
        self.set_tick_position(tick)
    }

    pub fn position_ms(&self) -> f64 {
        self.ticks_to_ms(self.tick_position)
    }

    pub fn position_beats(&self) -> f64 {
        self.ticks_to_beats(self.tick_position)
    }

    pub fn position_on_beat(&self) -> f64 {
        self.position_beats() + 1.0
    }

    // ---- Lengths ----

    pub fn length_ticks(&self, subject: &dyn PlaybackSubject) -> u64 {
        subject.length_ticks()
    }

    pub fn length_ms(&self, subject: &dyn PlaybackSubject) -> f64 {
        self.ticks_to_ms(subject.length_ticks())
    }

    pub fn length_beats(&self, subject: &dyn PlaybackSubject) -> f64 {
        self.ticks_to_beats(subject.length_ticks())
    }

    // ---- Beat grid ----

    pub fn beat_division(&self) -> u32 {
        self.beat_division
    }

    pub fn beats_per_measure(&self) -> u32 {
        self.beats_per_measure
    }

    /// Set the grid subdivision (clamped to 1-960), returning the previous one
    pub fn set_beat_division(&mut self, beat_division: u32) -> u32 {
        let previous = std::mem::replace(
            &mut self.beat_division,
            beat_division.clamp(1, MAX_BEAT_DIVISION),
        );
        self.emit_beat_grid();
        previous
    }

    /// Set the measure length (clamped to 1-3840), returning the previous one
    pub fn set_beats_per_measure(&mut self, beats_per_measure: u32) -> u32 {
        let previous = std::mem::replace(
            &mut self.beats_per_measure,
            beats_per_measure.clamp(1, MAX_BEATS_PER_MEASURE),
        );
        self.emit_beat_grid();
        previous
    }

    pub fn increment_beat_division(&mut self) {
        self.set_beat_division(self.beat_division + 1);
    }

    pub fn decrement_beat_division(&mut self) {
        self.set_beat_division(self.beat_division.saturating_sub(1));
    }

    pub fn increment_beats_per_measure(&mut self) {
        self.set_beats_per_measure(self.beats_per_measure + 1);
    }

    pub fn decrement_beats_per_measure(&mut self) {
        self.set_beats_per_measure(self.beats_per_measure.saturating_sub(1));
    }

    fn emit_beat_grid(&mut self) {
        self.emit(EngineEvent::BeatGridChanged {
            beat_division: self.beat_division,
            beats_per_measure: self.beats_per_measure,
        });
    }

    // ---- Channels ----

    pub fn channels(&self) -> &ChannelPool {
        &self.channels
    }

    pub fn channels_mut(&mut self) -> &mut ChannelPool {
        &mut self.channels
    }

    /// Replace the pool wholesale (project loading); not checked against tracks
    pub fn set_channels(&mut self, channels: ChannelPool) {
        self.channels = channels;
    }

    // ---- Transport ----

    /// Rebuild the sequence and start playing from the playhead
    ///
    /// On error nothing is started and the playhead is left untouched.
    pub fn play(&mut self, subject: &dyn PlaybackSubject) -> Result<(), PlaybackError> {
        let sequence = subject.build_sequence()?;
        let event_count = sequence.event_count();
        let length_ticks = sequence.length_ticks();

        self.backend.load_sequence(sequence)?;
        self.emit(EngineEvent::SequenceRebuilt {
            event_count,
            length_ticks,
        });

        self.backend.set_tick_position(self.tick_position);
        self.backend.set_tempo_bpm(self.tempo.bpm());
        self.backend.start()?;
        self.polling = true;

        log::info!(
            "Playback started for {}, sequence length: {} ticks",
            subject.describe(),
            length_ticks
        );
        self.emit(EngineEvent::PlaybackStarted {
            tick: self.tick_position,
        });
        Ok(())
    }

    /// Stop the transport and take the backend position as the playhead
    pub fn pause(&mut self) {
        self.backend.stop();
        self.polling = false;
        self.sync_to_backend_position();

        log::info!("Playback paused at tick {}", self.tick_position);
        self.emit(EngineEvent::PlaybackPaused {
            tick: self.tick_position,
        });
    }

    pub fn is_playing(&self) -> bool {
        self.backend.is_running()
    }

    pub fn is_polling(&self) -> bool {
        self.polling
    }

    /// Periodic sync, called by the host every poll interval
    ///
    /// Mirrors the backend position while playing (unless a ruler drag is in
    /// progress) and handles the end of the sequence: restart from tick 0 in
    /// loop mode, stop otherwise.
    pub fn poll(&mut self, subject: &dyn PlaybackSubject) -> Result<(), PlaybackError> {
        if self.backend.take_end_of_track() {
            if self.looping {
                self.set_tick_position(0);
                self.play(subject)?;
                log::debug!("Loop restarted for {}", subject.describe());
                self.emit(EngineEvent::LoopRestarted);
            } else {
                self.polling = false;
                self.sync_to_backend_position();
                log::info!("Playback ended at tick {}", self.tick_position);
                self.emit(EngineEvent::PlaybackEnded {
                    tick: self.tick_position,
                });
            }
            return Ok(());
        }

        if self.polling && !self.dragging_ruler {
            self.sync_to_backend_position();
        }
        Ok(())
    }

    /// Copy the backend position into the playhead
    pub fn sync_to_backend_position(&mut self) {
        let tick = self.backend.tick_position();
        if tick != self.tick_position {
            self.set_tick_position(tick);
        }
    }

    // ---- Ruler drag ----

    /// Suspend position sync while the user scrubs; pauses a running transport
    pub fn start_ruler_drag(&mut self) {
        if self.dragging_ruler {
            return;
        }
        self.resume_after_drag = self.is_playing();
        if self.resume_after_drag {
            self.pause();
        }
        self.dragging_ruler = true;
        self.emit(EngineEvent::RulerDrag { active: true });
    }

    /// End the scrub; playback resumes from the scrubbed tick if it was running
    pub fn stop_ruler_drag(&mut self, subject: &dyn PlaybackSubject) -> Result<(), PlaybackError> {
        if !self.dragging_ruler {
            return Ok(());
        }
        self.dragging_ruler = false;
        self.emit(EngineEvent::RulerDrag { active: false });

        if std::mem::take(&mut self.resume_after_drag) {
            self.play(subject)?;
        }
        Ok(())
    }

    pub fn is_dragging_ruler(&self) -> bool {
        self.dragging_ruler
    }

    // ---- Loop ----

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Turning loop on starts playback, turning it off pauses
    pub fn set_looping(
        &mut self,
        looping: bool,
        subject: &dyn PlaybackSubject,
    ) -> Result<(), PlaybackError> {
        self.looping = looping;
        if looping {
            self.play(subject)
        } else {
            self.pause();
            Ok(())
        }
    }

    pub fn toggle_loop(&mut self, subject: &dyn PlaybackSubject) -> Result<(), PlaybackError> {
        self.set_looping(!self.looping, subject)
    }

    // ---- Backend ----

    pub fn backend(&self) -> &dyn SequencerBackend {
        self.backend.as_ref()
    }

    /// Open the backend again after [`Player::close`]
    pub fn reopen(&mut self) -> Result<(), BackendError> {
        if !self.backend.is_open() {
            self.backend.open()?;
            log::info!("Reopened {} sequencer", self.backend.name());
        }
        Ok(())
    }

    /// Release the backend; the player cannot play until reopened
    pub fn close(&mut self) {
        self.polling = false;
        self.backend.close();
        log::info!("Closed {} sequencer", self.backend.name());
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("backend", &self.backend.name())
            .field("tempo", &self.tempo)
            .field("tick_position", &self.tick_position)
            .field("beat_division", &self.beat_division)
            .field("beats_per_measure", &self.beats_per_measure)
            .field("channels", &self.channels)
            .field("looping", &self.looping)
            .finish()
    }
}
