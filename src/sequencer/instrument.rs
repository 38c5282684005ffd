// Instrument catalog - General MIDI program and percussion key tables
// Tonal programs occupy ids 0-127, percussion keys ids 35-81 (played on channel 9)

use std::fmt;

/// Declares a fixed instrument catalog: one enum variant per entry with its
/// program id, its persisted key and its display name.
macro_rules! instrument_catalog {
    (
        $(#[$meta:meta])*
        $catalog:ident {
            $($variant:ident = $program:literal, $key:literal, $display:literal;)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $catalog {
            $($variant,)+
        }

        impl $catalog {
            /// Every entry of the catalog, in program order
            pub const ALL: &'static [$catalog] = &[$($catalog::$variant,)+];

            /// MIDI program number (or percussion key) of this entry
            pub fn program(self) -> u8 {
                match self {
                    $($catalog::$variant => $program,)+
                }
            }

            /// Stable key used by the project file format
            pub fn key(self) -> &'static str {
                match self {
                    $($catalog::$variant => $key,)+
                }
            }

            /// Human readable name
            pub fn display_name(self) -> &'static str {
                match self {
                    $($catalog::$variant => $display,)+
                }
            }

            pub fn from_key(key: &str) -> Option<Self> {
                match key {
                    $($key => Some($catalog::$variant),)+
                    _ => None,
                }
            }

            pub fn from_program(program: u8) -> Option<Self> {
                Self::ALL.iter().copied().find(|entry| entry.program() == program)
            }
        }

        impl fmt::Display for $catalog {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.display_name())
            }
        }
    };
}

instrument_catalog! {
    /// General MIDI melodic programs
    /// Taken from https://en.wikipedia.org/wiki/General_MIDI
    TonalInstrument {
        AcousticGrandPiano = 0, "ACOUSTIC_GRAND_PIANO", "Acoustic Grand Piano";
        BrightAcousticPiano = 1, "BRIGHT_ACOUSTIC_PIANO", "Bright Acoustic Piano";
        ElectricGrandPiano = 2, "ELECTRIC_GRAND_PIANO", "Electric Grand Piano (Yamaha CP-70)";
        HonkyTonkPiano = 3, "HONKY_TONK_PIANO", "Honky-tonk Piano";
        ElectricPiano1 = 4, "ELECTRIC_PIANO_1", "Electric Piano 1 (Rhodes/Wurlitzer)";
        ElectricPiano2 = 5, "ELECTRIC_PIANO_2", "Electric Piano 2 (FM Piano)";
        Harpsichord = 6, "HARPSICHORD", "Harpsichord";
        Clavinet = 7, "CLAVINET", "Clavinet";
        Celesta = 8, "CELESTA", "Celesta";
        Glockenspiel = 9, "GLOCKENSPIEL", "Glockenspiel";
        MusicBox = 10, "MUSIC_BOX", "Music Box";
        Vibraphone = 11, "VIBRAPHONE", "Vibraphone";
        Marimba = 12, "MARIMBA", "Marimba";
        Xylophone = 13, "XYLOPHONE", "Xylophone";
        TubularBells = 14, "TUBULAR_BELLS", "Tubular Bells";
        Dulcimer = 15, "DULCIMER", "Dulcimer (Santoor)";
        DrawbarOrgan = 16, "DRAWBAR_ORGAN", "Drawbar Organ";
        PercussiveOrgan = 17, "PERCUSSIVE_ORGAN", "Percussive Organ";
        RockOrgan = 18, "ROCK_ORGAN", "Rock Organ";
        ChurchOrgan = 19, "CHURCH_ORGAN", "Church Organ";
        ReedOrgan = 20, "REED_ORGAN", "Reed Organ";
        Accordion = 21, "ACCORDION", "Accordion";
        Harmonica = 22, "HARMONICA", "Harmonica";
        Bandoneon = 23, "BANDONEON", "Bandoneon (Tango Accordion)";
        AcousticGuitarNylon = 24, "ACOUSTIC_GUITAR_NYLON", "Acoustic Guitar (Nylon)";
        AcousticGuitarSteel = 25, "ACOUSTIC_GUITAR_STEEL", "Acoustic Guitar (Steel)";
        ElectricGuitarJazz = 26, "ELECTRIC_GUITAR_JAZZ", "Electric Guitar (Jazz)";
        ElectricGuitarClean = 27, "ELECTRIC_GUITAR_CLEAN", "Electric Guitar (Clean)";
        ElectricGuitarMuted = 28, "ELECTRIC_GUITAR_MUTED", "Electric Guitar (Muted)";
        ElectricGuitarOverdrive = 29, "ELECTRIC_GUITAR_OVERDRIVE", "Electric Guitar (Overdrive)";
        ElectricGuitarDistortion = 30, "ELECTRIC_GUITAR_DISTORTION", "Electric Guitar (Distortion)";
        ElectricGuitarHarmonics = 31, "ELECTRIC_GUITAR_HARMONICS", "Electric Guitar (Harmonics)";
        AcousticBass = 32, "ACOUSTIC_BASS", "Acoustic Bass";
        ElectricBassFinger = 33, "ELECTRIC_BASS_FINGER", "Electric Bass (Finger)";
        ElectricBassPicked = 34, "ELECTRIC_BASS_PICKED", "Electric Bass (Picked)";
        ElectricBassFretless = 35, "ELECTRIC_BASS_FRETLESS", "Electric Bass (Fretless)";
        SlapBass1 = 36, "SLAP_BASS_1", "Slap Bass 1";
        SlapBass2 = 37, "SLAP_BASS_2", "Slap Bass 2";
        SynthBass1 = 38, "SYNTH_BASS_1", "Synth Bass 1";
        SynthBass2 = 39, "SYNTH_BASS_2", "Synth Bass 2";
        Violin = 40, "VIOLIN", "Violin";
        Viola = 41, "VIOLA", "Viola";
        Cello = 42, "CELLO", "Cello";
        Contrabass = 43, "CONTRABASS", "Contrabass";
        TremoloStrings = 44, "TREMOLO_STRINGS", "Tremolo Strings";
        PizzicatoStrings = 45, "PIZZICATO_STRINGS", "Pizzicato Strings";
        OrchestralHarp = 46, "ORCHESTRAL_HARP", "Orchestral Harp";
        Timpani = 47, "TIMPANI", "Timpani";
        StringEnsemble1 = 48, "STRING_ENSEMBLE_1", "String Ensemble 1";
        StringEnsemble2 = 49, "STRING_ENSEMBLE_2", "String Ensemble 2";
        SynthStrings1 = 50, "SYNTH_STRINGS_1", "Synth Strings 1";
        SynthStrings2 = 51, "SYNTH_STRINGS_2", "Synth Strings 2";
        ChoirAahs = 52, "CHOIR_AAHS", "Choir Aahs";
        VoiceOohs = 53, "VOICE_OOHS", "Voice Oohs";
        SynthVoice = 54, "SYNTH_VOICE", "Synth Voice";
        OrchestraHit = 55, "ORCHESTRA_HIT", "Orchestra Hit";
        Trumpet = 56, "TRUMPET", "Trumpet";
        Trombone = 57, "TROMBONE", "Trombone";
        Tuba = 58, "TUBA", "Tuba";
        MutedTrumpet = 59, "MUTED_TRUMPET", "Muted Trumpet";
        FrenchHorn = 60, "FRENCH_HORN", "French Horn";
        BrassSection = 61, "BRASS_SECTION", "Brass Section";
        SynthBrass1 = 62, "SYNTH_BRASS_1", "Synth Brass 1";
        SynthBrass2 = 63, "SYNTH_BRASS_2", "Synth Brass 2";
        SopranoSax = 64, "SOPRANO_SAX", "Soprano Sax";
        AltoSax = 65, "ALTO_SAX", "Alto Sax";
        TenorSax = 66, "TENOR_SAX", "Tenor Sax";
        BaritoneSax = 67, "BARITONE_SAX", "Baritone Sax";
        Oboe = 68, "OBOE", "Oboe";
        EnglishHorn = 69, "ENGLISH_HORN", "English Horn";
        Bassoon = 70, "BASSOON", "Bassoon";
        Clarinet = 71, "CLARINET", "Clarinet";
        Piccolo = 72, "PICCOLO", "Piccolo";
        Flute = 73, "FLUTE", "Flute";
        Recorder = 74, "RECORDER", "Recorder";
        PanFlute = 75, "PAN_FLUTE", "Pan Flute";
        BlownBottle = 76, "BLOWN_BOTTLE", "Blown Bottle";
        Shakuhachi = 77, "SHAKUHACHI", "Shakuhachi";
        Whistle = 78, "WHISTLE", "Whistle";
        Ocarina = 79, "OCARINA", "Ocarina";
        Lead1 = 80, "LEAD_1", "Lead 1 (Square)";
        Lead2 = 81, "LEAD_2", "Lead 2 (Sawtooth)";
        Lead3 = 82, "LEAD_3", "Lead 3 (Calliope)";
        Lead4 = 83, "LEAD_4", "Lead 4 (Chiff)";
        Lead5 = 84, "LEAD_5", "Lead 5 (Charang)";
        Lead6 = 85, "LEAD_6", "Lead 6 (Voice)";
        Lead7 = 86, "LEAD_7", "Lead 7 (Fifths)";
        Lead8 = 87, "LEAD_8", "Lead 8 (Bass and Lead)";
        Pad1 = 88, "PAD_1", "Pad 1 (New Age)";
        Pad2 = 89, "PAD_2", "Pad 2 (Warm)";
        Pad3 = 90, "PAD_3", "Pad 3 (Polysynth)";
        Pad4 = 91, "PAD_4", "Pad 4 (Choir)";
        Pad5 = 92, "PAD_5", "Pad 5 (Bowed Glass)";
        Pad6 = 93, "PAD_6", "Pad 6 (Metallic)";
        Pad7 = 94, "PAD_7", "Pad 7 (Halo)";
        Pad8 = 95, "PAD_8", "Pad 8 (Sweep)";
        Fx1 = 96, "FX_1", "FX 1 (Rain)";
        Fx2 = 97, "FX_2", "FX 2 (Soundtrack)";
        Fx3 = 98, "FX_3", "FX 3 (Crystal)";
        Fx4 = 99, "FX_4", "FX 4 (Atmosphere)";
        Fx5 = 100, "FX_5", "FX 5 (Brightness)";
        Fx6 = 101, "FX_6", "FX 6 (Goblins)";
        Fx7 = 102, "FX_7", "FX 7 (Echoes)";
        Fx8 = 103, "FX_8", "FX 8 (Sci-Fi)";
        Sitar = 104, "SITAR", "Sitar";
        Banjo = 105, "BANJO", "Banjo";
        Shamisen = 106, "SHAMISEN", "Shamisen";
        Koto = 107, "KOTO", "Koto";
        Kalimba = 108, "KALIMBA", "Kalimba";
        BagPipe = 109, "BAG_PIPE", "Bag Pipe";
        Fiddle = 110, "FIDDLE", "Fiddle";
        Shanai = 111, "SHANAI", "Shanai";
        TinkleBell = 112, "TINKLE_BELL", "Tinkle Bell";
        Agogo = 113, "AGOGO", "Agogo";
        SteelDrums = 114, "STEEL_DRUMS", "Steel Drums";
        Woodblock = 115, "WOODBLOCK", "Woodblock";
        TaikoDrum = 116, "TAIKO_DRUM", "Taiko Drum";
        MelodicTom = 117, "MELODIC_TOM", "Melodic Tom";
        SynthDrum = 118, "SYNTH_DRUM", "Synth Drum";
        ReverseCymbal = 119, "REVERSE_CYMBAL", "Reverse Cymbal";
        GuitarFretNoise = 120, "GUITAR_FRET_NOISE", "Guitar Fret Noise";
        BreathNoise = 121, "BREATH_NOISE", "Breath Noise";
        Seashore = 122, "SEASHORE", "Seashore";
        BirdTweet = 123, "BIRD_TWEET", "Bird Tweet";
        TelephoneRing = 124, "TELEPHONE_RING", "Telephone Ring";
        Helicopter = 125, "HELICOPTER", "Helicopter";
        Applause = 126, "APPLAUSE", "Applause";
        Gunshot = 127, "GUNSHOT", "Gunshot";
    }
}

instrument_catalog! {
    /// General MIDI percussion keys (channel 10, zero-based channel 9)
    PercussiveInstrument {
        AcousticBassDrum = 35, "ACOUSTIC_BASS_DRUM", "Acoustic Bass Drum";
        BassDrum1 = 36, "BASS_DRUM_1", "Bass Drum 1";
        SideStick = 37, "SIDE_STICK", "Side Stick";
        AcousticSnare = 38, "ACOUSTIC_SNARE", "Acoustic Snare";
        HandClap = 39, "HAND_CLAP", "Hand Clap";
        ElectricSnare = 40, "ELECTRIC_SNARE", "Electric Snare";
        LowFloorTom = 41, "LOW_FLOOR_TOM", "Low Floor Tom";
        ClosedHiHat = 42, "CLOSED_HI_HAT", "Closed Hi-Hat";
        HighFloorTom = 43, "HIGH_FLOOR_TOM", "High Floor Tom";
        PedalHiHat = 44, "PEDAL_HI_HAT", "Pedal Hi-Hat";
        LowTom = 45, "LOW_TOM", "Low Tom";
        OpenHiHat = 46, "OPEN_HI_HAT", "Open Hi-Hat";
        LowMidTom = 47, "LOW_MID_TOM", "Low-Mid Tom";
        HiMidTom = 48, "HI_MID_TOM", "Hi-Mid Tom";
        CrashCymbal1 = 49, "CRASH_CYMBAL_1", "Crash Cymbal 1";
        HighTom = 50, "HIGH_TOM", "High Tom";
        RideCymbal1 = 51, "RIDE_CYMBAL_1", "Ride Cymbal 1";
        ChineseCymbal = 52, "CHINESE_CYMBAL", "Chinese Cymbal";
        RideBell = 53, "RIDE_BELL", "Ride Bell";
        Tambourine = 54, "TAMBOURINE", "Tambourine";
        SplashCymbal = 55, "SPLASH_CYMBAL", "Splash Cymbal";
        Cowbell = 56, "COWBELL", "Cowbell";
        CrashCymbal2 = 57, "CRASH_CYMBAL_2", "Crash Cymbal 2";
        Vibraslap = 58, "VIBRASLAP", "Vibraslap";
        RideCymbal2 = 59, "RIDE_CYMBAL_2", "Ride Cymbal 2";
        HiBongo = 60, "HI_BONGO", "Hi Bongo";
        LowBongo = 61, "LOW_BONGO", "Low Bongo";
        MuteHiConga = 62, "MUTE_HI_CONGA", "Mute Hi Conga";
        OpenHiConga = 63, "OPEN_HI_CONGA", "Open Hi Conga";
        LowConga = 64, "LOW_CONGA", "Low Conga";
        HighTimbale = 65, "HIGH_TIMBALE", "High Timbale";
        LowTimbale = 66, "LOW_TIMBALE", "Low Timbale";
        HighAgogo = 67, "HIGH_AGOGO", "High Agogo";
        LowAgogo = 68, "LOW_AGOGO", "Low Agogo";
        Cabasa = 69, "CABASA", "Cabasa";
        Maracas = 70, "MARACAS", "Maracas";
        ShortWhistle = 71, "SHORT_WHISTLE", "Short Whistle";
        LongWhistle = 72, "LONG_WHISTLE", "Long Whistle";
        ShortGuiro = 73, "SHORT_GUIRO", "Short Guiro";
        LongGuiro = 74, "LONG_GUIRO", "Long Guiro";
        Claves = 75, "CLAVES", "Claves";
        HiWoodBlock = 76, "HI_WOOD_BLOCK", "Hi Wood Block";
        LowWoodBlock = 77, "LOW_WOOD_BLOCK", "Low Wood Block";
        MuteCuica = 78, "MUTE_CUICA", "Mute Cuica";
        OpenCuica = 79, "OPEN_CUICA", "Open Cuica";
        MuteTriangle = 80, "MUTE_TRIANGLE", "Mute Triangle";
        OpenTriangle = 81, "OPEN_TRIANGLE", "Open Triangle";
    }
}

/// Which catalog an instrument belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstrumentKind {
    Tonal,
    Percussive,
}

impl InstrumentKind {
    /// Name used by the project file format
    pub fn as_str(self) -> &'static str {
        match self {
            InstrumentKind::Tonal => "tonal",
            InstrumentKind::Percussive => "percussive",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "tonal" => Some(InstrumentKind::Tonal),
            "percussive" => Some(InstrumentKind::Percussive),
            _ => None,
        }
    }
}

impl fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entry from one of the two catalogs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instrument {
    Tonal(TonalInstrument),
    Percussive(PercussiveInstrument),
}

impl Instrument {
    pub fn program(self) -> u8 {
        match self {
            Instrument::Tonal(instrument) => instrument.program(),
            Instrument::Percussive(instrument) => instrument.program(),
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Instrument::Tonal(instrument) => instrument.key(),
            Instrument::Percussive(instrument) => instrument.key(),
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Instrument::Tonal(instrument) => instrument.display_name(),
            Instrument::Percussive(instrument) => instrument.display_name(),
        }
    }

    pub fn kind(self) -> InstrumentKind {
        match self {
            Instrument::Tonal(_) => InstrumentKind::Tonal,
            Instrument::Percussive(_) => InstrumentKind::Percussive,
        }
    }

    pub fn is_percussive(self) -> bool {
        self.kind() == InstrumentKind::Percussive
    }

    /// Look up an entry by catalog kind and persisted key
    pub fn from_key(kind: InstrumentKind, key: &str) -> Option<Self> {
        match kind {
            InstrumentKind::Tonal => TonalInstrument::from_key(key).map(Instrument::Tonal),
            InstrumentKind::Percussive => {
                PercussiveInstrument::from_key(key).map(Instrument::Percussive)
            }
        }
    }
}

impl Default for Instrument {
    fn default() -> Self {
        Instrument::Tonal(TonalInstrument::AcousticGrandPiano)
    }
}

impl From<TonalInstrument> for Instrument {
    fn from(value: TonalInstrument) -> Self {
        Instrument::Tonal(value)
    }
}

impl From<PercussiveInstrument> for Instrument {
    fn from(value: PercussiveInstrument) -> Self {
        Instrument::Percussive(value)
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
