// Session - Holds the active timeline and the clipboard
// Replacing the timeline closes the old backend before the new one takes over

use crate::editing::{Clipboard, ClipboardItem};
use crate::messaging::EngineEvent;
use crate::sequencer::player::PlaybackError;
use crate::sequencer::timeline::Timeline;

#[derive(Debug)]
pub struct Session {
    timeline: Timeline,
    clipboard: Clipboard,
}

impl Session {
    pub fn new(timeline: Timeline) -> Self {
        Self {
            timeline,
            clipboard: Clipboard::new(),
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn timeline_mut(&mut self) -> &mut Timeline {
        &mut self.timeline
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn clipboard_mut(&mut self) -> &mut Clipboard {
        &mut self.clipboard
    }

    /// Close the active timeline, then open the next one and install it
    ///
    /// `open` runs only once the old backend is released, so the two
    /// backends are never open together. The event producer moves to the new
    /// timeline. Returns the old timeline, closed. When `open` fails the old
    /// timeline is reopened and stays active.
    pub fn replace_timeline<F, E>(&mut self, open: F) -> Result<Timeline, E>
    where
        F: FnOnce() -> Result<Timeline, E>,
    {
        if self.timeline.is_playing() {
            self.timeline.pause();
        }
        self.timeline.close();

        let mut timeline = match open() {
            Ok(timeline) => timeline,
            Err(e) => {
                if let Err(reopen) = self.timeline.reopen() {
                    log::error!(
                        "Failed to reopen timeline {}: {}",
                        self.timeline.project_name(),
                        reopen
                    );
                }
                return Err(e);
            }
        };
        if let Some(producer) = self.timeline.detach_events() {
            timeline.attach_events(producer);
        }

        let old = std::mem::replace(&mut self.timeline, timeline);
        log::info!(
            "Replaced timeline {} with {}",
            old.project_name(),
            self.timeline.project_name()
        );

        let project_name = self.timeline.project_name().to_string();
        self.timeline
            .player_mut()
            .emit(EngineEvent::TimelineReplaced { project_name });
        Ok(old)
    }

    /// Start playback from the current position
    ///
    /// Does nothing when the playhead sits past the end of the timeline.
    pub fn play(&mut self) -> Result<(), PlaybackError> {
        let position = self.timeline.player().tick_position();
        let length = self.timeline.length_ticks();
        if position > length {
            log::debug!("Playhead {} is past the end ({}), not playing", position, length);
            return Ok(());
        }
        self.timeline.play()
    }

    pub fn pause(&mut self) {
        self.timeline.pause();
    }

    pub fn toggle_playback(&mut self) -> Result<(), PlaybackError> {
        if self.is_running() {
            self.pause();
            Ok(())
        } else {
            self.play()
        }
    }

    pub fn poll(&mut self) -> Result<(), PlaybackError> {
        self.timeline.poll()
    }

    pub fn is_running(&self) -> bool {
        self.timeline.is_playing()
    }

    // ---- Clipboard ----

    /// Copy blocks of one track; indices that do not exist are ignored
    pub fn copy_blocks(&mut self, track: usize, blocks: &[usize]) -> usize {
        let Some(track) = self.timeline.track(track) else {
            return 0;
        };
        let items: Vec<ClipboardItem> = blocks
            .iter()
            .filter_map(|&index| track.block(index))
            .map(|block| ClipboardItem::Block(block.clone()))
            .collect();
        self.clipboard.copy(&items);
        items.len()
    }

    /// Copy notes of one block; indices that do not exist are ignored
    pub fn copy_notes(&mut self, track: usize, block: usize, notes: &[usize]) -> usize {
        let Some(block) = self.timeline.track(track).and_then(|track| track.block(block)) else {
            return 0;
        };
        let items: Vec<ClipboardItem> = notes
            .iter()
            .filter_map(|&index| block.note(index))
            .map(|note| ClipboardItem::Note(note.clone()))
            .collect();
        self.clipboard.copy(&items);
        items.len()
    }

    /// Paste the clipboard blocks into a track at a timeline tick
    pub fn paste_into_track(&mut self, track: usize, position: u64) -> Option<usize> {
        let track = self.timeline.track_mut(track)?;
        Some(self.clipboard.paste_into(track, position))
    }

    /// Paste the clipboard notes into a block at a block-relative tick
    pub fn paste_into_block(&mut self, track: usize, block: usize, position: u64) -> Option<usize> {
        let block = self.timeline.track_mut(track)?.block_mut(block)?;
        Some(self.clipboard.paste_into(block, position))
    }

    pub fn close(&mut self) {
        self.timeline.close();
    }
}
