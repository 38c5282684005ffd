// Clipboard - Deep copies of blocks and notes, pasted at a tick position

use crate::sequencer::block::Block;
use crate::sequencer::note::Note;
use crate::sequencer::track::MidiTrack;

/// Something that can sit on the clipboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardItem {
    Block(Block),
    Note(Note),
}

impl ClipboardItem {
    /// Start tick of the item in its container's coordinates
    pub fn start_tick(&self) -> u64 {
        match self {
            ClipboardItem::Block(block) => block.start_tick(),
            ClipboardItem::Note(note) => note.start_tick(),
        }
    }
}

impl From<Block> for ClipboardItem {
    fn from(block: Block) -> Self {
        ClipboardItem::Block(block)
    }
}

impl From<Note> for ClipboardItem {
    fn from(note: Note) -> Self {
        ClipboardItem::Note(note)
    }
}

/// A container that clipboard items can be pasted into
pub trait Pastable {
    /// Paste the items this container accepts, moving the earliest one to
    /// `position` and keeping the spacing between them
    ///
    /// Items of another kind are skipped. Returns how many items were added.
    fn paste(&mut self, items: &[ClipboardItem], position: u64) -> usize;
}

/// Move every item so that the earliest lands on `position`
///
/// Items whose new start would not fit in a `u64` are dropped.
fn translate<T>(
    items: Vec<T>,
    position: u64,
    start: impl Fn(&T) -> u64,
    set_start: impl Fn(&mut T, u64),
) -> Vec<T> {
    let Some(min_start) = items.iter().map(&start).min() else {
        return items;
    };
    items
        .into_iter()
        .filter_map(|mut item| match (start(&item) - min_start).checked_add(position) {
            Some(moved) => {
                set_start(&mut item, moved);
                Some(item)
            }
            None => {
                log::warn!("Skipped pasted item: start tick past {}", u64::MAX);
                None
            }
        })
        .collect()
}

impl Pastable for Block {
    /// Notes only; a note that would not fit in the block is skipped
    fn paste(&mut self, items: &[ClipboardItem], position: u64) -> usize {
        let notes: Vec<Note> = items
            .iter()
            .filter_map(|item| match item {
                ClipboardItem::Note(note) => Some(note.clone()),
                ClipboardItem::Block(_) => None,
            })
            .collect();

        let notes = translate(notes, position, Note::start_tick, Note::set_start_tick);
        notes
            .into_iter()
            .filter(|note| match self.add_note(note.clone()) {
                Ok(_) => true,
                Err(e) => {
                    log::warn!("Skipped pasted note: {}", e);
                    false
                }
            })
            .count()
    }
}

impl Pastable for MidiTrack {
    /// Blocks only
    fn paste(&mut self, items: &[ClipboardItem], position: u64) -> usize {
        let blocks: Vec<Block> = items
            .iter()
            .filter_map(|item| match item {
                ClipboardItem::Block(block) => Some(block.clone()),
                ClipboardItem::Note(_) => None,
            })
            .collect();

        let blocks = translate(blocks, position, Block::start_tick, Block::set_start_tick);
        let count = blocks.len();
        for block in blocks {
            self.add_block(block);
        }
        count
    }
}

/// Holds independent copies of the last copied items
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    contents: Vec<ClipboardItem>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with copies of `items`
    pub fn copy(&mut self, items: &[ClipboardItem]) {
        self.contents = items.to_vec();
        log::debug!("Copied {} items to clipboard", self.contents.len());
    }

    /// Copies of the contents; editing them does not affect the clipboard
    pub fn contents(&self) -> Vec<ClipboardItem> {
        self.contents.clone()
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    pub fn clear(&mut self) {
        self.contents.clear();
    }

    /// Paste the contents into `target`, returning the number of pasted items
    pub fn paste_into(&self, target: &mut dyn Pastable, position: u64) -> usize {
        target.paste(&self.contents, position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::instrument::TonalInstrument;

    #[test]
    fn test_copy_replaces_contents() {
        let mut clipboard = Clipboard::new();
        assert!(clipboard.is_empty());

        clipboard.copy(&[Note::new(60, 100, 0, 10).into()]);
        clipboard.copy(&[Block::new(0, 10).into(), Block::new(5, 10).into()]);
        assert_eq!(clipboard.len(), 2);
        assert!(matches!(clipboard.contents()[0], ClipboardItem::Block(_)));

        clipboard.clear();
        assert!(clipboard.is_empty());
    }

    #[test]
    fn test_copies_are_independent() {
        let mut note = Note::new(60, 100, 0, 10);
        let mut clipboard = Clipboard::new();
        clipboard.copy(&[note.clone().into()]);

        note.set_pitch(20);
        let mut contents = clipboard.contents();
        if let ClipboardItem::Note(copied) = &mut contents[0] {
            copied.set_pitch(99);
        }

        assert_eq!(
            clipboard.contents()[0],
            ClipboardItem::Note(Note::new(60, 100, 0, 10))
        );
    }

    #[test]
    fn test_paste_notes_keeps_spacing() {
        let mut clipboard = Clipboard::new();
        clipboard.copy(&[
            Note::new(60, 100, 20, 10).into(),
            Note::new(62, 100, 5, 10).into(),
        ]);

        let mut block = Block::new(0, 1000);
        assert_eq!(clipboard.paste_into(&mut block, 100), 2);

        let starts: Vec<u64> = block.notes().iter().map(Note::start_tick).collect();
        assert_eq!(starts, vec![115, 100]);
    }

    #[test]
    fn test_paste_skips_other_kinds() {
        let items = vec![
            ClipboardItem::Block(Block::new(50, 10)),
            ClipboardItem::Note(Note::new(60, 100, 500, 10)),
        ];

        let mut block = Block::new(0, 1000);
        assert_eq!(block.paste(&items, 0), 1);
        assert_eq!(block.notes()[0].start_tick(), 0);

        let mut track = MidiTrack::new("t", TonalInstrument::Oboe.into(), 0).unwrap();
        assert_eq!(track.paste(&items, 960), 1);
        assert_eq!(track.blocks()[0].start_tick(), 960);
    }

    #[test]
    fn test_paste_out_of_bounds_notes_skipped() {
        let mut block = Block::new(0, 100);
        let items = vec![
            ClipboardItem::Note(Note::new(60, 100, 0, 10)),
            ClipboardItem::Note(Note::new(60, 100, 50, 10)),
        ];

        // Second note would end at 140
        assert_eq!(block.paste(&items, 80), 1);
        assert_eq!(block.notes(), &[Note::new(60, 100, 80, 10)]);
    }

    #[test]
    fn test_paste_blocks() {
        let mut first = Block::new(1000, 480);
        first.add_note(Note::new(60, 100, 0, 480)).unwrap();
        let second = Block::new(1960, 480);

        let mut clipboard = Clipboard::new();
        clipboard.copy(&[second.into(), first.clone().into()]);

        let mut track = MidiTrack::new("t", TonalInstrument::Oboe.into(), 0).unwrap();
        assert_eq!(clipboard.paste_into(&mut track, 0), 2);

        let starts: Vec<u64> = track.blocks().iter().map(Block::start_tick).collect();
        assert_eq!(starts, vec![960, 0]);
        assert_eq!(track.blocks()[1].notes(), first.notes());
    }

    #[test]
    fn test_paste_empty() {
        let mut block = Block::new(0, 100);
        assert_eq!(Clipboard::new().paste_into(&mut block, 10), 0);
        assert!(block.is_empty());
    }

    #[test]
    fn test_paste_near_end_of_tick_range() {
        let items = [Block::new(0, 10).into(), Block::new(20, 10).into()];
        let mut track = MidiTrack::new("t", TonalInstrument::Oboe.into(), 0).unwrap();

        // Only the first block still has a representable start
        assert_eq!(track.paste(&items, u64::MAX - 5), 1);
        assert_eq!(track.blocks().len(), 1);
        assert_eq!(track.blocks()[0].start_tick(), u64::MAX - 5);

        let notes = [Note::new(60, 100, 0, 1).into(), Note::new(62, 100, 10, 1).into()];
        let mut block = Block::new(0, u64::MAX);
        assert_eq!(block.paste(&notes, u64::MAX - 1), 1);
        assert_eq!(block.notes(), &[Note::new(60, 100, u64::MAX - 1, 1)]);
    }
}
