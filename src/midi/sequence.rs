// Sequence - Tick-stamped event stream handed to a playback backend

use crate::midi::event::MidiMessage;
use crate::sequencer::tempo::PULSES_PER_QUARTER_NOTE;

/// A message scheduled at an absolute tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedEvent {
    pub tick: u64,
    pub message: MidiMessage,
}

impl TimedEvent {
    pub fn new(tick: u64, message: MidiMessage) -> Self {
        Self { tick, message }
    }
}

/// One track of a sequence
///
/// Events are kept in emission order. `end_tick` overrides the position of
/// the end-of-track marker, which otherwise sits on the last event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceTrack {
    events: Vec<TimedEvent>,
    end_tick: Option<u64>,
}

impl SequenceTrack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tick: u64, message: MidiMessage) {
        self.events.push(TimedEvent::new(tick, message));
    }

    pub fn events(&self) -> &[TimedEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Move the end-of-track marker
    pub fn set_end_tick(&mut self, tick: u64) {
        self.end_tick = Some(tick);
    }

    /// Tick of the end-of-track marker
    pub fn end_of_track(&self) -> u64 {
        self.end_tick.unwrap_or_else(|| {
            self.events
                .iter()
                .map(|event| event.tick)
                .max()
                .unwrap_or(0)
        })
    }
}

/// Multi-track event stream at a fixed resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    resolution: u64,
    tracks: Vec<SequenceTrack>,
}

impl Sequence {
    /// Empty sequence at 960 ticks per quarter note
    pub fn new() -> Self {
        Self {
            resolution: PULSES_PER_QUARTER_NOTE,
            tracks: Vec::new(),
        }
    }

    pub fn resolution(&self) -> u64 {
        self.resolution
    }

    pub fn add_track(&mut self, track: SequenceTrack) {
        self.tracks.push(track);
    }

    pub fn tracks(&self) -> &[SequenceTrack] {
        &self.tracks
    }

    /// Position of the latest end-of-track marker
    pub fn length_ticks(&self) -> u64 {
        self.tracks
            .iter()
            .map(SequenceTrack::end_of_track)
            .max()
            .unwrap_or(0)
    }

    pub fn event_count(&self) -> usize {
        self.tracks.iter().map(SequenceTrack::len).sum()
    }

    /// All events merged across tracks, sorted by tick
    ///
    /// The sort is stable: events on the same tick keep track order, then
    /// emission order.
    pub fn events_in_time_order(&self) -> Vec<TimedEvent> {
        let mut events: Vec<TimedEvent> = self
            .tracks
            .iter()
            .flat_map(|track| track.events().iter().copied())
            .collect();
        events.sort_by_key(|event| event.tick);
        events
    }

    /// Channels referenced by any event, ascending
    pub fn channels(&self) -> Vec<u8> {
        let mut channels: Vec<u8> = self
            .tracks
            .iter()
            .flat_map(|track| track.events().iter().map(|e| e.message.channel()))
            .collect();
        channels.sort_unstable();
        channels.dedup();
        channels
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note_on(channel: u8, note: u8) -> MidiMessage {
        MidiMessage::note_on(channel, note, 100).unwrap()
    }

    #[test]
    fn test_empty_sequence() {
        let sequence = Sequence::new();
        assert_eq!(sequence.resolution(), 960);
        assert_eq!(sequence.length_ticks(), 0);
        assert_eq!(sequence.event_count(), 0);
        assert!(sequence.channels().is_empty());
    }

    #[test]
    fn test_end_of_track() {
        let mut track = SequenceTrack::new();
        track.push(0, note_on(0, 60));
        track.push(480, MidiMessage::note_off(0, 60).unwrap());
        assert_eq!(track.end_of_track(), 480);

        track.set_end_tick(960);
        assert_eq!(track.end_of_track(), 960);

        let mut sequence = Sequence::new();
        sequence.add_track(track);
        assert_eq!(sequence.length_ticks(), 960);
    }

    #[test]
    fn test_events_in_time_order_is_stable() {
        let mut first = SequenceTrack::new();
        first.push(100, note_on(0, 60));
        first.push(0, note_on(0, 62));

        let mut second = SequenceTrack::new();
        second.push(0, note_on(1, 64));
        second.push(100, note_on(1, 65));

        let mut sequence = Sequence::new();
        sequence.add_track(first);
        sequence.add_track(second);

        let ticks_and_notes: Vec<(u64, u8)> = sequence
            .events_in_time_order()
            .iter()
            .map(|e| (e.tick, e.message.data1()))
            .collect();
        assert_eq!(ticks_and_notes, vec![(0, 62), (0, 64), (100, 60), (100, 65)]);
        assert_eq!(sequence.event_count(), 4);
        assert_eq!(sequence.channels(), vec![0, 1]);
    }
}
