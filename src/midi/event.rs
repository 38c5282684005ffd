// MIDI short messages
// Channel voice messages used by the sequence builder and the output backends

/// Controller number for channel volume
pub const CC_CHANNEL_VOLUME: u8 = 7;

/// Controller number for "all notes off"
pub const CC_ALL_NOTES_OFF: u8 = 123;

/// Raised when a message carries a value outside the MIDI range
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MidiDataError {
    #[error("invalid MIDI data byte {0} (must be 0-127)")]
    InvalidData(u8),

    #[error("invalid MIDI channel {0} (must be 0-15)")]
    InvalidChannel(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    ProgramChange { channel: u8, program: u8 },
}

impl MidiMessage {
    /// Build a message, checking channel and data ranges
    pub fn note_on(channel: u8, note: u8, velocity: u8) -> Result<Self, MidiDataError> {
        MidiMessage::NoteOn {
            channel,
            note,
            velocity,
        }
        .validated()
    }

    /// Note off messages always carry velocity 0
    pub fn note_off(channel: u8, note: u8) -> Result<Self, MidiDataError> {
        MidiMessage::NoteOff {
            channel,
            note,
            velocity: 0,
        }
        .validated()
    }

    pub fn control_change(channel: u8, controller: u8, value: u8) -> Result<Self, MidiDataError> {
        MidiMessage::ControlChange {
            channel,
            controller,
            value,
        }
        .validated()
    }

    pub fn program_change(channel: u8, program: u8) -> Result<Self, MidiDataError> {
        MidiMessage::ProgramChange { channel, program }.validated()
    }

    pub fn channel(&self) -> u8 {
        match *self {
            MidiMessage::NoteOn { channel, .. }
            | MidiMessage::NoteOff { channel, .. }
            | MidiMessage::ControlChange { channel, .. }
            | MidiMessage::ProgramChange { channel, .. } => channel,
        }
    }

    /// Status byte (message type | channel)
    pub fn status(&self) -> u8 {
        let kind = match self {
            MidiMessage::NoteOff { .. } => 0x80,
            MidiMessage::NoteOn { .. } => 0x90,
            MidiMessage::ControlChange { .. } => 0xB0,
            MidiMessage::ProgramChange { .. } => 0xC0,
        };
        kind | (self.channel() & 0x0F)
    }

    /// First data byte (note, controller or program)
    pub fn data1(&self) -> u8 {
        match *self {
            MidiMessage::NoteOn { note, .. } | MidiMessage::NoteOff { note, .. } => note,
            MidiMessage::ControlChange { controller, .. } => controller,
            MidiMessage::ProgramChange { program, .. } => program,
        }
    }

    /// Second data byte (0 for program change)
    pub fn data2(&self) -> u8 {
        match *self {
            MidiMessage::NoteOn { velocity, .. } | MidiMessage::NoteOff { velocity, .. } => {
                velocity
            }
            MidiMessage::ControlChange { value, .. } => value,
            MidiMessage::ProgramChange { .. } => 0,
        }
    }

    /// Wire encoding (2 bytes for program change, 3 otherwise)
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            MidiMessage::ProgramChange { .. } => vec![self.status(), self.data1()],
            _ => vec![self.status(), self.data1(), self.data2()],
        }
    }

    fn validated(self) -> Result<Self, MidiDataError> {
        if self.channel() > 15 {
            return Err(MidiDataError::InvalidChannel(self.channel()));
        }
        for byte in [self.data1(), self.data2()] {
            if byte > 127 {
                return Err(MidiDataError::InvalidData(byte));
            }
        }
        Ok(self)
    }
}
