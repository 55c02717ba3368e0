use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt::Display;
use std::ops::Range;

use strum::{EnumIter, EnumString};

use crate::error::{QueueError, QueueResult};
use crate::modes::{RepeatMode, ShuffleMode};
use crate::scope::Scope;
use crate::search::{SearchQuery, SearchResult};
use crate::shuffle::ShuffleSequence;
use crate::track::{PlaybackFormat, Track, TrackKey};
use crate::track_list::{OrderedTracks, TrackList, TrackMoveResult};

/// Track attribute to sort the queue by
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, EnumString, strum::Display)]
#[strum(ascii_case_insensitive)]
pub enum SortField {
    #[strum(serialize = "title")]
    Title,
    #[strum(serialize = "artist")]
    Artist,
    #[strum(serialize = "album")]
    Album,
    #[strum(serialize = "duration")]
    Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, EnumString, strum::Display)]
#[strum(ascii_case_insensitive)]
pub enum SortOrder {
    #[default]
    #[strum(serialize = "asc")]
    Ascending,
    #[strum(serialize = "desc")]
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackSort {
    pub field: SortField,
    pub order: SortOrder,
}

impl TrackSort {
    pub fn new(field: SortField, order: SortOrder) -> Self {
        Self { field, order }
    }

    pub fn compare(&self, a: &Track, b: &Track) -> Ordering {
        let ordering = match self.field {
            SortField::Title => a.display_name().cmp(&b.display_name()),
            SortField::Artist => a.artist.cmp(&b.artist),
            SortField::Album => a.album.cmp(&b.album),
            SortField::Duration => a.duration.total_cmp(&b.duration),
        };

        match self.order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}

/// Where playback is within the active scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceInfo {
    pub scope: Scope,
    /// 1-based position of the playing track within the scope, 0 when stopped
    pub position: usize,
    pub total_tracks: usize,
}

impl Display for SequenceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {} ({})", self.position, self.total_tracks, self.scope)
    }
}

/// The play queue: ordered tracks plus everything needed to decide what
/// plays next.
///
/// Structural edits take the track list's write lock once and patch the
/// current index and the shuffle sequence before releasing it, so a reader
/// never observes a list that disagrees with the playback position.
/// Sequencing (start/next/previous/...) lives in [`crate::sequencing`].
#[derive(Debug)]
pub struct PlaybackQueue {
    pub(crate) tracks: TrackList,
    pub(crate) current_index: Option<usize>,
    pub(crate) repeat_mode: RepeatMode,
    pub(crate) shuffle_mode: ShuffleMode,
    pub(crate) scope: Scope,
    pub(crate) shuffle: ShuffleSequence,
}

impl Default for PlaybackQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackQueue {
    pub fn new() -> Self {
        Self::with_track_list(TrackList::new())
    }

    /// Queue over an existing (possibly shared) track list
    pub fn with_track_list(tracks: TrackList) -> Self {
        Self {
            tracks,
            current_index: None,
            repeat_mode: RepeatMode::default(),
            shuffle_mode: ShuffleMode::default(),
            scope: Scope::default(),
            shuffle: ShuffleSequence::new(),
        }
    }

    /// Use a seeded shuffle sequence, for reproducible play orders
    pub fn with_shuffle_seed(mut self, seed: u64) -> Self {
        self.shuffle = ShuffleSequence::with_seed(seed);
        self
    }

    // Accessors

    pub fn track_list(&self) -> &TrackList {
        &self.tracks
    }

    pub fn size(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> Vec<Track> {
        self.tracks.tracks()
    }

    pub fn track_at(&self, index: usize) -> Option<Track> {
        self.tracks.get(index)
    }

    pub fn index_of_track(&self, key: &TrackKey) -> Option<usize> {
        self.tracks.index_of(key)
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn current_track(&self) -> Option<Track> {
        self.current_index.and_then(|index| self.tracks.get(index))
    }

    /// The playing track and everything after it
    pub fn tracks_pending_playback(&self) -> Vec<Track> {
        let Some(current) = self.current_index else {
            return Vec::new();
        };
        let tracks = self.tracks.read();
        tracks.as_slice().get(current..).map(|slice| slice.to_vec()).unwrap_or_default()
    }

    pub fn search(&self, query: &SearchQuery) -> Vec<SearchResult> {
        let results = self.tracks.read().search(query);
        log::debug!("Search for {} found {} tracks", query, results.len());
        results
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn sequence_info(&self) -> SequenceInfo {
        let tracks = self.tracks.read();
        let view = self.scope.view(&tracks);
        let position = self
            .current_index
            .and_then(|index| view.position_of(index))
            .map_or(0, |position| position + 1);

        SequenceInfo {
            scope: self.scope.clone(),
            position,
            total_tracks: view.len(),
        }
    }

    pub fn shuffle_sequence(&self) -> &ShuffleSequence {
        &self.shuffle
    }

    // Adding tracks

    /// Append tracks, skipping any already queued. Returns the indices the
    /// new tracks occupy.
    pub fn add_tracks(&mut self, new: impl IntoIterator<Item = Track>) -> Range<usize> {
        let mut tracks = self.tracks.write();
        let added = tracks.add(new);
        extend_shuffle(&mut self.shuffle, self.shuffle_mode, &self.scope, &tracks, added.clone());

        log::debug!("Added {} tracks to the queue", added.len());
        added
    }

    /// Add tracks, optionally replacing everything queued so far
    pub fn enqueue_tracks(&mut self, new: impl IntoIterator<Item = Track>, clear_queue: bool) -> Range<usize> {
        if clear_queue {
            self.remove_all_tracks();
        }
        self.add_tracks(new)
    }

    pub fn insert_tracks(&mut self, new: impl IntoIterator<Item = Track>, at: usize) -> Range<usize> {
        let mut tracks = self.tracks.write();
        let inserted = tracks.insert(new, at);
        if inserted.is_empty() {
            return inserted;
        }

        if let Some(current) = self.current_index.filter(|&current| inserted.start <= current) {
            self.current_index = Some(current + inserted.len());
        }

        extend_shuffle(&mut self.shuffle, self.shuffle_mode, &self.scope, &tracks, inserted.clone());
        log::debug!("Inserted {} tracks at {}", inserted.len(), inserted.start);
        inserted
    }

    /// Put tracks right after the playing track ("play next"). Tracks that
    /// are already queued are moved there rather than duplicated. With
    /// nothing playing this is [`add_tracks`](Self::add_tracks).
    pub fn enqueue_tracks_after_current_track(&mut self, new: impl IntoIterator<Item = Track>) -> Range<usize> {
        let mut tracks = self.tracks.write();
        let Some(playing) = self
            .current_index
            .and_then(|index| tracks.get(index))
            .map(|track| track.key.clone())
        else {
            drop(tracks);
            return self.add_tracks(new);
        };

        let mut seen = HashSet::new();
        let batch: Vec<Track> = new
            .into_iter()
            .filter(|track| track.key != playing && seen.insert(track.key.clone()))
            .collect();

        let already_queued: Vec<TrackKey> = batch
            .iter()
            .filter(|track| tracks.contains(&track.key))
            .map(|track| track.key.clone())
            .collect();
        tracks.remove_keys(&already_queued);

        // Removing tracks above the playing one shifts it up
        let current = tracks.index_of(&playing);
        self.current_index = current;
        let at = current.map_or(tracks.len(), |index| index + 1);

        let inserted = tracks.insert(batch, at);
        extend_shuffle(&mut self.shuffle, self.shuffle_mode, &self.scope, &tracks, inserted.clone());

        log::debug!("Enqueued {} tracks to play next ({} moved)", inserted.len(), already_queued.len());
        inserted
    }

    // Removing tracks

    /// Remove tracks by index. Removing the playing track stops playback.
    pub fn remove_tracks(&mut self, indices: &[usize]) -> Vec<Track> {
        let mut tracks = self.tracks.write();

        let mut valid: Vec<usize> = indices.iter().copied().filter(|&index| index < tracks.len()).collect();
        valid.sort_unstable();
        valid.dedup();

        let removed = tracks.remove_at(&valid);
        if removed.is_empty() {
            return removed;
        }

        match self.current_index {
            Some(current) if valid.binary_search(&current).is_ok() => {
                log::info!("Playing track was removed from the queue, stopping");
                self.current_index = None;
                self.shuffle.clear();
            }
            current => {
                self.current_index = current.map(|current| {
                    current - valid.iter().take_while(|&&index| index < current).count()
                });
                self.shuffle.remove_tracks(removed.iter().map(|track| &track.key));
            }
        }

        log::debug!("Removed {} tracks from the queue", removed.len());
        removed
    }

    pub fn remove_all_tracks(&mut self) {
        self.tracks.write().clear();
        self.current_index = None;
        self.shuffle.clear();
        log::info!("Queue cleared");
    }

    // Reordering

    pub fn move_tracks_up(&mut self, indices: &[usize]) -> Vec<TrackMoveResult> {
        self.reorder(|tracks| tracks.move_up(indices))
    }

    pub fn move_tracks_down(&mut self, indices: &[usize]) -> Vec<TrackMoveResult> {
        self.reorder(|tracks| tracks.move_down(indices))
    }

    pub fn move_tracks_to_top(&mut self, indices: &[usize]) -> Vec<TrackMoveResult> {
        self.reorder(|tracks| tracks.move_to_top(indices))
    }

    pub fn move_tracks_to_bottom(&mut self, indices: &[usize]) -> Vec<TrackMoveResult> {
        self.reorder(|tracks| tracks.move_to_bottom(indices))
    }

    /// Drag and drop `indices` to the gap at `drop_index`
    pub fn move_tracks(&mut self, indices: &[usize], drop_index: usize) -> Vec<TrackMoveResult> {
        self.reorder(|tracks| tracks.drag_and_drop(indices, drop_index))
    }

    /// Move the selection to just after the playing track. Nothing moves when
    /// nothing is playing.
    pub fn move_tracks_to_play_next(&mut self, indices: &[usize]) -> Vec<TrackMoveResult> {
        let Some(current) = self.current_index else {
            return Vec::new();
        };
        let others: Vec<usize> = indices.iter().copied().filter(|&index| index != current).collect();
        self.reorder(|tracks| tracks.drag_and_drop(&others, current + 1))
    }

    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&Track, &Track) -> Ordering,
    {
        self.reorder(|tracks| {
            tracks.sort_by(compare);
            Vec::new()
        });
    }

    pub fn sort(&mut self, sort: TrackSort) {
        log::debug!("Sorting queue by {} ({})", sort.field, sort.order);
        self.sort_by(|a, b| sort.compare(a, b));
    }

    /// Apply a reordering and follow the playing track to its new index.
    /// The shuffle sequence holds keys, so it needs no patching.
    fn reorder<F>(&mut self, op: F) -> Vec<TrackMoveResult>
    where
        F: FnOnce(&mut OrderedTracks) -> Vec<TrackMoveResult>,
    {
        let mut tracks = self.tracks.write();
        let playing = self
            .current_index
            .and_then(|index| tracks.get(index))
            .map(|track| track.key.clone());

        let results = op(&mut tracks);
        self.current_index = playing.and_then(|key| tracks.index_of(&key));
        results
    }

    /// Swap in freshly loaded copies of tracks already queued
    pub fn update_tracks_if_present(&mut self, tracks: impl IntoIterator<Item = Track>) -> usize {
        self.tracks.update_tracks_if_present(tracks)
    }

    // Gapless

    /// Check that every in-scope track decodes to one known format, then
    /// switch to plain sequential playback. On error nothing is changed.
    pub fn prepare_for_gapless_playback(&mut self) -> QueueResult<()> {
        self.check_gapless_formats().inspect_err(|err| {
            log::warn!("Gapless playback not possible: {}", err);
        })?;

        if self.repeat_mode == RepeatMode::One {
            self.set_repeat_mode(RepeatMode::Off);
        }
        if self.shuffle_mode == ShuffleMode::On {
            self.set_shuffle_mode(ShuffleMode::Off);
        }

        log::info!("Prepared {} tracks for gapless playback", self.sequence_info().total_tracks);
        Ok(())
    }

    fn check_gapless_formats(&self) -> QueueResult<()> {
        let tracks = self.tracks.read();
        let view = self.scope.view(&tracks);
        let mut formats: HashSet<PlaybackFormat> = HashSet::new();
        let mut missing: Option<String> = None;

        let in_scope = (0..view.len())
            .filter_map(|position| view.queue_index(position))
            .filter_map(|index| tracks.get(index));

        for track in in_scope {
            match track.format {
                Some(format) => {
                    formats.insert(format);
                }
                None => {
                    missing = Some(format!(
                        "Unable to prepare for gapless playback: No audio format for track: {}.",
                        track
                    ));
                }
            }

            if formats.len() > 1 {
                return Err(QueueError::GaplessNotPossible(
                    "The tracks in the Play Queue do not all have the same audio format.".to_string(),
                ));
            }
            if let Some(message) = missing.take() {
                return Err(QueueError::GaplessNotPossible(message));
            }
        }

        Ok(())
    }
}

/// Scatter newly queued, in-scope tracks into an active shuffle sequence.
/// An inactive (empty) sequence picks them up when it is next initialized.
fn extend_shuffle(
    shuffle: &mut ShuffleSequence,
    mode: ShuffleMode,
    scope: &Scope,
    tracks: &OrderedTracks,
    range: Range<usize>,
) {
    if !mode.is_on() || shuffle.is_empty() {
        return;
    }

    let keys: Vec<TrackKey> = range
        .filter_map(|index| tracks.get(index))
        .filter(|track| scope.contains(track))
        .map(|track| track.key.clone())
        .collect();
    shuffle.add_tracks(keys);
}
