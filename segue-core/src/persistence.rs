//! In-memory shapes the queue is saved to at shutdown and restored from at
//! startup. Mapping them to and from disk is left to the caller.

use std::collections::{HashMap, HashSet};

use crate::modes::{RepeatMode, ShuffleMode};
use crate::queue::PlaybackQueue;
use crate::track::{Track, TrackKey};

/// A shuffle round split at its cursor, as queue indices. The last played
/// index is the track that was playing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShuffleSequenceState {
    pub played: Vec<usize>,
    pub remaining: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayQueueState {
    /// Queue order at shutdown
    pub tracks: Vec<TrackKey>,
    pub repeat_mode: RepeatMode,
    pub shuffle_mode: ShuffleMode,
    /// Only present while a shuffle round was active
    pub shuffle: Option<ShuffleSequenceState>,
    /// Seconds into the playing track
    pub last_position: f32,
}

impl PlaybackQueue {
    pub fn persistent_state(&self, last_position: f32) -> PlayQueueState {
        let tracks = self.tracks.read();

        let shuffle = (self.shuffle_mode.is_on() && !self.shuffle.is_empty()).then(|| ShuffleSequenceState {
            played: self.shuffle.played_indices(&tracks),
            remaining: self.shuffle.remaining_indices(&tracks),
        });

        PlayQueueState {
            tracks: tracks.iter().map(|track| track.key.clone()).collect(),
            repeat_mode: self.repeat_mode,
            shuffle_mode: self.shuffle_mode,
            shuffle,
            last_position,
        }
    }

    /// Rebuild a stopped queue from loaded `tracks`, in the saved order.
    /// Tracks the saved order doesn't know about go last.
    pub fn from_state(tracks: impl IntoIterator<Item = Track>, state: &PlayQueueState) -> Self {
        let mut saved_order: HashMap<&TrackKey, usize> = HashMap::new();
        for (index, key) in state.tracks.iter().enumerate() {
            saved_order.entry(key).or_insert(index);
        }

        let mut tracks: Vec<Track> = tracks.into_iter().collect();
        tracks.sort_by_key(|track| saved_order.get(&track.key).copied().unwrap_or(usize::MAX));

        let mut queue = PlaybackQueue::new();
        let restored = queue.add_tracks(tracks);
        if restored.len() < state.tracks.len() {
            log::warn!(
                "{} saved queue entries could not be restored",
                state.tracks.len() - restored.len()
            );
        }

        queue.set_repeat_and_shuffle_modes(state.repeat_mode, state.shuffle_mode);
        log::info!("Restored queue of {} tracks ({})", restored.len(), queue.repeat_and_shuffle_modes());
        queue
    }

    /// Pick a saved shuffle round back up where it left off, selecting the
    /// track that was playing. Indices that no longer point into the scope
    /// are dropped and in-scope tracks the round never saw are scattered
    /// over the remaining part. Returns the resumed track.
    pub fn resume_shuffle_sequence(&mut self, state: &ShuffleSequenceState) -> Option<Track> {
        if !self.shuffle_mode.is_on() {
            log::debug!("Shuffle is off, not resuming shuffle sequence");
            return None;
        }

        let tracks = self.tracks.read();
        let view = self.scope.view(&tracks);

        let mut seen: HashSet<TrackKey> = HashSet::new();
        let mut to_keys = |indices: &[usize]| -> Vec<TrackKey> {
            indices
                .iter()
                .filter(|&&index| view.position_of(index).is_some())
                .filter_map(|&index| tracks.get(index))
                .filter(|track| seen.insert(track.key.clone()))
                .map(|track| track.key.clone())
                .collect()
        };
        let played = to_keys(&state.played);
        let remaining = to_keys(&state.remaining);

        let stale = state.played.len() + state.remaining.len() - played.len() - remaining.len();
        if stale > 0 {
            log::warn!("Dropped {} stale indices from the saved shuffle sequence", stale);
        }

        let last_played = played.last().cloned()?;
        let unseen: Vec<TrackKey> = view
            .keys(&tracks)
            .into_iter()
            .filter(|key| !seen.contains(key))
            .collect();

        self.shuffle.resume(played, remaining);
        self.shuffle.add_tracks(unseen);
        self.current_index = tracks.index_of(&last_played);

        log::info!(
            "Resumed shuffle sequence at {} ({} of {} played)",
            last_played,
            self.shuffle.cursor(),
            self.shuffle.len()
        );
        self.current_index.and_then(|index| tracks.get(index).cloned())
    }
}
