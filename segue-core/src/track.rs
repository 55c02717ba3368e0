use std::fmt::Display;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelLayout {
    Mono,
    Stereo,
    Unsupported,
}

impl Display for ChannelLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ChannelLayout::Mono => "Mono",
            ChannelLayout::Stereo => "Stereo",
            ChannelLayout::Unsupported => "Unsupported",
        };
        write!(f, "{}", label)
    }
}

impl ChannelLayout {
    pub fn from_channels(num_channels: u16) -> ChannelLayout {
        match num_channels {
            1 => ChannelLayout::Mono,
            2 => ChannelLayout::Stereo,
            _ => ChannelLayout::Unsupported,
        }
    }
}

/// The decoded output format of a track. Two tracks can only be played
/// back-to-back without a gap when their formats are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackFormat {
    /// sample rate / sampling frequency (f_s)
    pub sample_rate: u32,
    /// number of audio channels
    pub num_channels: u16,
    pub channel_layout: ChannelLayout,
}

impl PlaybackFormat {
    pub fn new(sample_rate: u32, num_channels: u16) -> Self {
        Self {
            sample_rate,
            num_channels,
            channel_layout: ChannelLayout::from_channels(num_channels),
        }
    }
}

impl Display for PlaybackFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} Hz {}", self.sample_rate, self.channel_layout)
    }
}

/// Stable identity of a track: the file it was loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackKey(PathBuf);

impl TrackKey {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl Display for TrackKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl From<&str> for TrackKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<PathBuf> for TrackKey {
    fn from(value: PathBuf) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone)]
pub struct Track {
    pub key: TrackKey,
    pub title: Option<String>,
    /// Artist / Author
    pub artist: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>,
    /// Duration in seconds
    pub duration: f32,
    /// `None` until the file has been inspected
    pub format: Option<PlaybackFormat>,
}

impl Track {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            key: TrackKey::new(path),
            title: None,
            artist: None,
            album: None,
            genre: None,
            duration: 0.0,
            format: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_duration(mut self, seconds: f32) -> Self {
        self.duration = seconds;
        self
    }

    pub fn with_format(mut self, format: PlaybackFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Title if known, otherwise the file stem
    pub fn display_name(&self) -> String {
        if let Some(title) = &self.title {
            return title.clone();
        }

        self.key
            .path()
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| self.key.to_string())
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Track {}

impl Display for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.artist {
            Some(artist) => write!(f, "{} - {}", artist, self.display_name()),
            None => write!(f, "{}", self.display_name()),
        }
    }
}
