pub mod commands;
pub mod engine;
pub mod error;
pub mod modes;
pub mod persistence;
pub mod queue;
pub mod scope;
pub mod search;
pub mod sequencing;
pub mod shuffle;
pub mod track;
pub mod track_list;

pub use error::{QueueError, QueueResult};
pub use modes::{RepeatAndShuffleModes, RepeatMode, ShuffleMode};
pub use queue::PlaybackQueue;
pub use scope::{GroupId, GroupKind, Scope};
pub use search::{SearchQuery, SearchResult};
pub use track::{Track, TrackKey};
pub use track_list::TrackList;
