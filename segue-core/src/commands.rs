use crate::modes::{RepeatAndShuffleModes, RepeatMode, ShuffleMode};
use crate::queue::TrackSort;
use crate::scope::{GroupId, Scope};
use crate::search::{SearchQuery, SearchResult};
use crate::track::{Track, TrackKey};

/// Commands sent from the front end to the queue engine
#[derive(Debug, Clone)]
pub enum QueueCommand {
    /// Append tracks, skipping ones already queued
    Add(Vec<Track>),
    /// Insert tracks as a block at the given index
    Insert { tracks: Vec<Track>, at: usize },
    /// Remove tracks at the given indices
    Remove(Vec<usize>),
    /// Remove every track and stop
    Clear,
    MoveUp(Vec<usize>),
    MoveDown(Vec<usize>),
    MoveToTop(Vec<usize>),
    MoveToBottom(Vec<usize>),
    /// Drag the tracks at `indices` to the gap at `drop_index`
    Move { indices: Vec<usize>, drop_index: usize },
    /// Move queued tracks to just after the playing track
    MoveToPlayNext(Vec<usize>),
    /// Queue tracks to play right after the current one
    EnqueueNext(Vec<Track>),
    Sort(TrackSort),
    /// Begin a new sequence over the current scope
    Start,
    /// Stop and forget the playing position
    Stop,
    /// Play the track at this index
    Select(usize),
    /// Play the queued track with this key
    SelectTrack(TrackKey),
    /// Play a group from its first track
    SelectGroup(GroupId),
    SetScope(Scope),
    /// The playing track finished on its own
    Subsequent,
    /// Skip forward
    Next,
    /// Skip backward
    Previous,
    /// Ask what would play, without changing anything
    Peek,
    SetRepeatMode(RepeatMode),
    SetShuffleMode(ShuffleMode),
    ToggleRepeatMode,
    ToggleShuffleMode,
    /// Find queued tracks matching a query
    Search(SearchQuery),
    /// Validate formats and switch to sequential playback for gapless output
    PrepareGapless,
    /// Shutdown the queue engine
    Quit,
}

/// Responses sent from the queue engine to the front end
#[derive(Debug, Clone)]
pub enum QueueResponse {
    /// A new track is playing
    TrackChanged { index: usize, track: Track },
    /// Nothing is playing
    Stopped,
    /// Navigation had nowhere to go; the current track keeps playing
    Unchanged,
    /// Tracks were added, removed or moved
    QueueUpdated { size: usize, current_index: Option<usize> },
    ModesChanged(RepeatAndShuffleModes),
    /// Result of [`QueueCommand::Peek`]
    Peeked {
        subsequent: Option<Track>,
        next: Option<Track>,
        previous: Option<Track>,
    },
    /// Result of [`QueueCommand::Search`]
    SearchResults(Vec<SearchResult>),
    /// Queue is ready for gapless playback, with the modes it switched to
    GaplessReady(RepeatAndShuffleModes),
    /// An error occurred
    Error(String),
    /// Engine is shutting down
    Shutdown,
}
