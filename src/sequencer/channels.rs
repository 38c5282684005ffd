// Channel allocation for tonal tracks
// Channel 9 is reserved for percussion and never enters the pool

/// MIDI channel reserved for percussive tracks (channel 10 in 1-based numbering)
pub const PERCUSSION_CHANNEL: u8 = 9;

/// Number of addressable MIDI channels
pub const CHANNEL_COUNT: u8 = 16;

/// Pool of channels available to tonal tracks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelPool {
    available: Vec<u8>,
}

impl ChannelPool {
    /// Full pool: channels 0-15 except the percussion channel
    pub fn new() -> Self {
        Self {
            available: (0..CHANNEL_COUNT)
                .filter(|channel| *channel != PERCUSSION_CHANNEL)
                .collect(),
        }
    }

    /// Pool restored verbatim (order included), e.g. from a project file
    pub fn from_channels(channels: Vec<u8>) -> Self {
        Self {
            available: channels,
        }
    }

    /// Take the lowest-numbered free channel
    pub fn take_lowest(&mut self) -> Option<u8> {
        let (index, _) = self
            .available
            .iter()
            .enumerate()
            .min_by_key(|(_, channel)| **channel)?;
        Some(self.available.remove(index))
    }

    /// Return a channel to the pool
    ///
    /// The percussion channel and channels already in the pool are ignored.
    pub fn release(&mut self, channel: u8) {
        if channel == PERCUSSION_CHANNEL || self.available.contains(&channel) {
            log::warn!("Ignoring release of channel {}", channel);
            return;
        }
        self.available.push(channel);
    }

    pub fn contains(&self, channel: u8) -> bool {
        self.available.contains(&channel)
    }

    /// Free channels in pool order
    pub fn channels(&self) -> &[u8] {
        &self.available
    }

    pub fn len(&self) -> usize {
        self.available.len()
    }

    pub fn is_empty(&self) -> bool {
        self.available.is_empty()
    }
}

impl Default for ChannelPool {
    fn default() -> Self {
        Self::new()
    }
}
