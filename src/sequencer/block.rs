// Block - Bounded collection of notes anchored on a track
// A block is like a "clip" in other DAWs: it can be moved by changing its start tick

use crate::sequencer::note::Note;

/// Returned when a note does not fit inside its block
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("note ending at tick {note_end} exceeds block duration of {block_duration} ticks")]
pub struct NoteOutOfBounds {
    pub note_end: u64,
    pub block_duration: u64,
}

/// A group of notes positioned on a track
///
/// Notes keep insertion order (this is also the order events are emitted in),
/// not time order. Every note satisfies `start + duration <= duration_ticks`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Absolute position of the block on the timeline
    start_tick: u64,

    /// Length of the block in ticks
    duration_ticks: u64,

    notes: Vec<Note>,
}

impl Block {
    /// Create an empty block
    pub fn new(start_tick: u64, duration_ticks: u64) -> Self {
        Self {
            start_tick,
            duration_ticks,
            notes: Vec::new(),
        }
    }

    /// Add a note, returning its index
    ///
    /// The note is rejected (and the block left untouched) when it would end
    /// after the block does.
    pub fn add_note(&mut self, note: Note) -> Result<usize, NoteOutOfBounds> {
        let fits = note
            .checked_end_tick()
            .is_some_and(|end| end <= self.duration_ticks);
        if !fits {
            log::debug!(
                "Rejected note ending at {} in block of {} ticks",
                note.end_tick(),
                self.duration_ticks
            );
            return Err(NoteOutOfBounds {
                note_end: note.end_tick(),
                block_duration: self.duration_ticks,
            });
        }

        self.notes.push(note);
        Ok(self.notes.len() - 1)
    }

    /// Remove the note at `index`
    pub fn remove_note(&mut self, index: usize) -> Option<Note> {
        if index < self.notes.len() {
            Some(self.notes.remove(index))
        } else {
            None
        }
    }

    /// Get all notes (block-relative ticks)
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn note(&self, index: usize) -> Option<&Note> {
        self.notes.get(index)
    }

    /// Notes with start ticks moved to timeline coordinates
    ///
    /// The iterator is lazy and can be cloned to restart it; stored notes are
    /// not modified.
    pub fn notes_timeline(&self) -> TimelineNotes<'_> {
        TimelineNotes {
            offset: self.start_tick,
            notes: self.notes.iter(),
        }
    }

    pub fn start_tick(&self) -> u64 {
        self.start_tick
    }

    pub fn set_start_tick(&mut self, start_tick: u64) {
        self.start_tick = start_tick;
    }

    pub fn duration_ticks(&self) -> u64 {
        self.duration_ticks
    }

    /// Change the block length
    ///
    /// Existing notes are kept as they are; callers shrinking a block are
    /// responsible for removing notes that no longer fit.
    pub fn set_duration_ticks(&mut self, duration_ticks: u64) {
        self.duration_ticks = duration_ticks;
    }

    /// Absolute tick at which the block ends, saturating at `u64::MAX`
    pub fn end_tick(&self) -> u64 {
        self.start_tick.saturating_add(self.duration_ticks)
    }

    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn clear(&mut self) {
        self.notes.clear();
    }

    /// One line summary for listings
    pub fn info(&self) -> String {
        format!(
            "Start tick: {}, duration: {}, current note count: {}",
            self.start_tick,
            self.duration_ticks,
            self.notes.len()
        )
    }
}

/// Iterator over a block's notes in timeline coordinates
#[derive(Debug, Clone)]
pub struct TimelineNotes<'a> {
    offset: u64,
    notes: std::slice::Iter<'a, Note>,
}

impl Iterator for TimelineNotes<'_> {
    type Item = Note;

    fn next(&mut self) -> Option<Self::Item> {
        self.notes.next().map(|note| {
            let mut adjusted = note.clone();
            adjusted.set_start_tick(self.offset.saturating_add(note.start_tick()));
            adjusted
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.notes.size_hint()
    }
}

impl ExactSizeIterator for TimelineNotes<'_> {}
