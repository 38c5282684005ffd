// Engine events - What changed in the timeline or the transport

/// Notification pushed to observers after a state change
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    TrackAdded {
        index: usize,
        name: String,
        channel: u8,
    },
    TrackRemoved {
        index: usize,
        name: String,
        channel: u8,
    },
    /// The event stream was rebuilt from the model
    SequenceRebuilt {
        event_count: usize,
        length_ticks: u64,
    },
    PositionChanged {
        tick: u64,
    },
    TempoChanged {
        bpm: f64,
    },
    BeatGridChanged {
        beat_division: u32,
        beats_per_measure: u32,
    },
    PlaybackStarted {
        tick: u64,
    },
    PlaybackPaused {
        tick: u64,
    },
    /// Transport reached the end of the sequence and was not looping
    PlaybackEnded {
        tick: u64,
    },
    LoopRestarted,
    /// Ruler drag started (`active`) or finished
    RulerDrag {
        active: bool,
    },
    TimelineReplaced {
        project_name: String,
    },
}

impl EngineEvent {
    /// Transport related events (start, pause, end, loop, position)
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            EngineEvent::PositionChanged { .. }
                | EngineEvent::PlaybackStarted { .. }
                | EngineEvent::PlaybackPaused { .. }
                | EngineEvent::PlaybackEnded { .. }
                | EngineEvent::LoopRestarted
        )
    }
}
