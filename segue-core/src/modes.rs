use strum::{EnumIter, EnumString};

/// Repeat mode for queue playback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, EnumString, strum::Display)]
#[strum(ascii_case_insensitive)]
pub enum RepeatMode {
    #[default]
    #[strum(serialize = "off")]
    Off,
    #[strum(serialize = "one")]
    One,
    #[strum(serialize = "all")]
    All,
}

impl RepeatMode {
    /// Off -> One -> All -> Off
    pub fn toggled(self) -> RepeatMode {
        match self {
            RepeatMode::Off => RepeatMode::One,
            RepeatMode::One => RepeatMode::All,
            RepeatMode::All => RepeatMode::Off,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, EnumString, strum::Display)]
#[strum(ascii_case_insensitive)]
pub enum ShuffleMode {
    #[default]
    #[strum(serialize = "off")]
    Off,
    #[strum(serialize = "on")]
    On,
}

impl ShuffleMode {
    pub fn toggled(self) -> ShuffleMode {
        match self {
            ShuffleMode::Off => ShuffleMode::On,
            ShuffleMode::On => ShuffleMode::Off,
        }
    }

    pub fn is_on(self) -> bool {
        self == ShuffleMode::On
    }
}

/// Snapshot of both modes, returned by every mode setter so callers can
/// see the effect of the repeat-one / shuffle exclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RepeatAndShuffleModes {
    pub repeat: RepeatMode,
    pub shuffle: ShuffleMode,
}

impl std::fmt::Display for RepeatAndShuffleModes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "repeat: {}, shuffle: {}", self.repeat, self.shuffle)
    }
}
