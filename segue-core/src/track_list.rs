use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::search::{SearchQuery, SearchResult};
use crate::track::{Track, TrackKey};

/// Where a track ended up after a reordering operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackMoveResult {
    pub source: usize,
    pub destination: usize,
}

impl TrackMoveResult {
    fn new(source: usize, destination: usize) -> Self {
        Self { source, destination }
    }
}

/// Insertion-ordered tracks, unique by key. This is the unlocked storage;
/// shared access goes through [`TrackList`].
#[derive(Debug, Default)]
pub struct OrderedTracks {
    tracks: Vec<Track>,
    lookup: HashMap<TrackKey, usize>,
}

impl OrderedTracks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Track> {
        self.tracks.iter()
    }

    pub fn as_slice(&self) -> &[Track] {
        &self.tracks
    }

    pub fn index_of(&self, key: &TrackKey) -> Option<usize> {
        self.lookup.get(key).copied()
    }

    pub fn contains(&self, key: &TrackKey) -> bool {
        self.lookup.contains_key(key)
    }

    /// Drops tracks that are already stored, and repeats within `new` itself.
    pub fn dedupe(&self, new: impl IntoIterator<Item = Track>) -> Vec<Track> {
        let mut seen = HashSet::new();
        new.into_iter()
            .filter(|track| !self.contains(&track.key) && seen.insert(track.key.clone()))
            .collect()
    }

    /// Append tracks, returns the indices actually occupied by new tracks
    pub fn add(&mut self, new: impl IntoIterator<Item = Track>) -> Range<usize> {
        let deduped = self.dedupe(new);
        let start = self.tracks.len();

        for track in deduped {
            self.lookup.insert(track.key.clone(), self.tracks.len());
            self.tracks.push(track);
        }

        start..self.tracks.len()
    }

    /// Insert tracks as a block at `at` (clamped to the end), preserving their
    /// relative order.
    pub fn insert(&mut self, new: impl IntoIterator<Item = Track>, at: usize) -> Range<usize> {
        let deduped = self.dedupe(new);
        let at = at.min(self.tracks.len());
        let count = deduped.len();
        if count == 0 {
            return at..at;
        }

        self.tracks.splice(at..at, deduped);
        self.reindex();
        at..(at + count)
    }

    /// Removes the tracks at `indices`. Out of range indices are ignored.
    /// Returned tracks are in ascending index order.
    pub fn remove_at(&mut self, indices: &[usize]) -> Vec<Track> {
        let mut descending: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&index| index < self.tracks.len())
            .collect();
        descending.sort_unstable_by(|a, b| b.cmp(a));
        descending.dedup();

        if descending.is_empty() {
            return Vec::new();
        }

        let mut removed: Vec<Track> = descending
            .into_iter()
            .map(|index| self.tracks.remove(index))
            .collect();
        removed.reverse();
        self.reindex();
        removed
    }

    /// Removes tracks by key, returning the indices they occupied
    pub fn remove_keys(&mut self, keys: &[TrackKey]) -> Vec<usize> {
        let mut indices: Vec<usize> = keys.iter().filter_map(|key| self.index_of(key)).collect();
        indices.sort_unstable();
        indices.dedup();
        self.remove_at(&indices);
        indices
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
        self.lookup.clear();
    }

    /// Replace stored tracks with fresher copies (e.g. after metadata has
    /// been read). Never adds or reorders anything.
    pub fn update_if_present(&mut self, tracks: impl IntoIterator<Item = Track>) -> usize {
        let mut updated = 0;
        for track in tracks {
            if let Some(index) = self.index_of(&track.key) {
                self.tracks[index] = track;
                updated += 1;
            }
        }
        updated
    }

    /// Move each selected track one position up. A selected block already at
    /// the top stays where it is.
    pub fn move_up(&mut self, indices: &[usize]) -> Vec<TrackMoveResult> {
        let ascending = sorted_unique(indices);
        if !self.is_valid_selection(&ascending) {
            return Vec::new();
        }

        let unmovable = ascending
            .iter()
            .enumerate()
            .take_while(|(position, index)| position == *index)
            .count();

        let results = ascending[unmovable..]
            .iter()
            .map(|&index| {
                self.tracks.swap(index, index - 1);
                TrackMoveResult::new(index, index - 1)
            })
            .collect();

        self.reindex();
        results
    }

    /// Move each selected track one position down. A selected block already
    /// at the bottom stays where it is.
    pub fn move_down(&mut self, indices: &[usize]) -> Vec<TrackMoveResult> {
        let mut descending = sorted_unique(indices);
        if !self.is_valid_selection(&descending) {
            return Vec::new();
        }
        descending.reverse();

        let last = self.tracks.len() - 1;
        let unmovable = descending
            .iter()
            .enumerate()
            .take_while(|(position, index)| last - position == **index)
            .count();

        let results = descending[unmovable..]
            .iter()
            .map(|&index| {
                self.tracks.swap(index, index + 1);
                TrackMoveResult::new(index, index + 1)
            })
            .collect();

        self.reindex();
        results
    }

    pub fn move_to_top(&mut self, indices: &[usize]) -> Vec<TrackMoveResult> {
        let ascending = sorted_unique(indices);
        if !self.is_valid_selection(&ascending) {
            return Vec::new();
        }

        let mut results = Vec::new();
        for (destination, &source) in ascending.iter().enumerate() {
            if destination != source {
                let track = self.tracks.remove(source);
                self.tracks.insert(destination, track);
                results.push(TrackMoveResult::new(source, destination));
            }
        }

        self.reindex();
        results
    }

    pub fn move_to_bottom(&mut self, indices: &[usize]) -> Vec<TrackMoveResult> {
        let mut descending = sorted_unique(indices);
        if !self.is_valid_selection(&descending) {
            return Vec::new();
        }
        descending.reverse();

        let last = self.tracks.len() - 1;
        let mut results = Vec::new();
        for (offset, &source) in descending.iter().enumerate() {
            let destination = last - offset;
            if destination != source {
                let track = self.tracks.remove(source);
                self.tracks.insert(destination, track);
                results.push(TrackMoveResult::new(source, destination));
            }
        }

        self.reindex();
        results
    }

    /// Drag the selected tracks to `drop_index` (a gap between rows, so
    /// `len` is valid). Sources keep their relative order.
    pub fn drag_and_drop(&mut self, indices: &[usize], drop_index: usize) -> Vec<TrackMoveResult> {
        let ascending = sorted_unique(indices);
        let len = self.tracks.len();
        if ascending.is_empty() || drop_index > len || ascending.iter().any(|&index| index >= len) {
            return Vec::new();
        }

        let above = ascending.iter().filter(|&&index| index < drop_index).count();
        let first_destination = drop_index - above;

        let moved: Vec<Track> = ascending
            .iter()
            .rev()
            .map(|&index| self.tracks.remove(index))
            .collect();

        for (offset, track) in moved.into_iter().rev().enumerate() {
            self.tracks.insert(first_destination + offset, track);
        }

        self.reindex();
        ascending
            .iter()
            .enumerate()
            .map(|(offset, &source)| TrackMoveResult::new(source, first_destination + offset))
            .filter(|result| result.source != result.destination)
            .collect()
    }

    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&Track, &Track) -> Ordering,
    {
        self.tracks.sort_by(compare);
        self.reindex();
    }

    /// Queued tracks matching `query`, in queue order
    pub fn search(&self, query: &SearchQuery) -> Vec<SearchResult> {
        self.tracks
            .iter()
            .enumerate()
            .filter_map(|(index, track)| {
                query.matched_field(track).map(|matched_field| SearchResult {
                    index,
                    track: track.clone(),
                    matched_field,
                })
            })
            .collect()
    }

    fn is_valid_selection(&self, ascending: &[usize]) -> bool {
        match ascending.last() {
            Some(&last) => last < self.tracks.len() && ascending.len() < self.tracks.len(),
            None => false,
        }
    }

    fn reindex(&mut self) {
        self.lookup.clear();
        for (index, track) in self.tracks.iter().enumerate() {
            self.lookup.insert(track.key.clone(), index);
        }
    }
}

fn sorted_unique(indices: &[usize]) -> Vec<usize> {
    let mut sorted = indices.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted
}

/// Shared handle to the track store. Clones refer to the same tracks, so a
/// loader thread can hold one while the playback controller holds another.
#[derive(Debug, Clone, Default)]
pub struct TrackList {
    inner: Arc<RwLock<OrderedTracks>>,
}

impl TrackList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tracks(tracks: impl IntoIterator<Item = Track>) -> Self {
        let list = Self::new();
        list.write().add(tracks);
        list
    }

    pub fn read(&self) -> RwLockReadGuard<'_, OrderedTracks> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, OrderedTracks> {
        self.inner.write()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Track> {
        self.read().get(index).cloned()
    }

    /// Snapshot of all tracks in order
    pub fn tracks(&self) -> Vec<Track> {
        self.read().as_slice().to_vec()
    }

    pub fn index_of(&self, key: &TrackKey) -> Option<usize> {
        self.read().index_of(key)
    }

    pub fn contains(&self, key: &TrackKey) -> bool {
        self.read().contains(key)
    }

    pub fn update_tracks_if_present(&self, tracks: impl IntoIterator<Item = Track>) -> usize {
        self.write().update_if_present(tracks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchField;

    fn store(names: &[&str]) -> OrderedTracks {
        let mut tracks = OrderedTracks::new();
        tracks.add(names.iter().map(|name| Track::new(*name)));
        tracks
    }

    fn names(tracks: &OrderedTracks) -> Vec<String> {
        tracks.iter().map(|t| t.key.to_string()).collect()
    }

    #[test]
    fn add_skips_known_and_repeated_keys() {
        let mut tracks = store(&["a", "b"]);
        let added = tracks.add(vec![Track::new("b"), Track::new("c"), Track::new("c"), Track::new("d")]);
        assert_eq!(added, 2..4);
        assert_eq!(names(&tracks), vec!["a", "b", "c", "d"]);
        assert_eq!(tracks.index_of(&TrackKey::from("d")), Some(3));
    }

    #[test]
    fn add_of_only_duplicates_is_empty_range() {
        let mut tracks = store(&["a", "b"]);
        assert!(tracks.add(vec![Track::new("a")]).is_empty());
        assert_eq!(tracks.len(), 2);
    }

    #[test]
    fn insert_keeps_relative_order() {
        let mut tracks = store(&["a", "b", "c"]);
        let inserted = tracks.insert(vec![Track::new("x"), Track::new("y")], 1);
        assert_eq!(inserted, 1..3);
        assert_eq!(names(&tracks), vec!["a", "x", "y", "b", "c"]);
        assert_eq!(tracks.index_of(&TrackKey::from("b")), Some(3));
    }

    #[test]
    fn insert_beyond_end_clamps() {
        let mut tracks = store(&["a"]);
        assert_eq!(tracks.insert(vec![Track::new("x")], 99), 1..2);
        assert_eq!(names(&tracks), vec!["a", "x"]);
    }

    #[test]
    fn remove_at_ignores_invalid_indices() {
        let mut tracks = store(&["a", "b", "c", "d"]);
        let removed = tracks.remove_at(&[3, 1, 1, 42]);
        assert_eq!(removed, vec![Track::new("b"), Track::new("d")]);
        assert_eq!(names(&tracks), vec!["a", "c"]);
        assert_eq!(tracks.index_of(&TrackKey::from("c")), Some(1));
        assert_eq!(tracks.index_of(&TrackKey::from("d")), None);
    }

    #[test]
    fn remove_keys_reports_old_indices() {
        let mut tracks = store(&["a", "b", "c"]);
        let indices = tracks.remove_keys(&[TrackKey::from("c"), TrackKey::from("zzz"), TrackKey::from("a")]);
        assert_eq!(indices, vec![0, 2]);
        assert_eq!(names(&tracks), vec!["b"]);
    }

    #[test]
    fn move_up_leaves_top_block_alone() {
        let mut tracks = store(&["a", "b", "c", "d", "e"]);
        let results = tracks.move_up(&[0, 1, 3]);
        assert_eq!(results, vec![TrackMoveResult::new(3, 2)]);
        assert_eq!(names(&tracks), vec!["a", "b", "d", "c", "e"]);
    }

    #[test]
    fn move_up_contiguous_block() {
        let mut tracks = store(&["a", "b", "c", "d"]);
        tracks.move_up(&[2, 3]);
        assert_eq!(names(&tracks), vec!["a", "c", "d", "b"]);
    }

    #[test]
    fn move_up_rejects_full_selection() {
        let mut tracks = store(&["a", "b"]);
        assert!(tracks.move_up(&[0, 1]).is_empty());
        assert!(tracks.move_up(&[]).is_empty());
        assert!(tracks.move_up(&[5]).is_empty());
    }

    #[test]
    fn move_down_leaves_bottom_block_alone() {
        let mut tracks = store(&["a", "b", "c", "d", "e"]);
        let results = tracks.move_down(&[1, 3, 4]);
        assert_eq!(results, vec![TrackMoveResult::new(1, 2)]);
        assert_eq!(names(&tracks), vec!["a", "c", "b", "d", "e"]);
    }

    #[test]
    fn move_to_top_and_bottom() {
        let mut tracks = store(&["a", "b", "c", "d", "e"]);
        tracks.move_to_top(&[2, 4]);
        assert_eq!(names(&tracks), vec!["c", "e", "a", "b", "d"]);

        let results = tracks.move_to_bottom(&[0, 2]);
        assert_eq!(names(&tracks), vec!["e", "b", "d", "c", "a"]);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn drag_and_drop_around_the_drop_index() {
        let mut tracks = store(&["a", "b", "c", "d", "e", "f"]);
        // "b" above the drop point, "f" below it
        let results = tracks.drag_and_drop(&[1, 5], 4);
        assert_eq!(names(&tracks), vec!["a", "c", "d", "b", "f", "e"]);
        assert_eq!(results, vec![TrackMoveResult::new(1, 3), TrackMoveResult::new(5, 4)]);
    }

    #[test]
    fn drag_and_drop_to_end() {
        let mut tracks = store(&["a", "b", "c"]);
        tracks.drag_and_drop(&[0], 3);
        assert_eq!(names(&tracks), vec!["b", "c", "a"]);
        assert!(tracks.drag_and_drop(&[0], 4).is_empty());
    }

    #[test]
    fn update_if_present_never_adds() {
        let mut tracks = store(&["a"]);
        let updated = tracks.update_if_present(vec![
            Track::new("a").with_title("Alpha"),
            Track::new("b").with_title("Beta"),
        ]);
        assert_eq!(updated, 1);
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks.get(0).and_then(|t| t.title.clone()), Some("Alpha".to_string()));
    }

    #[test]
    fn search_reports_queue_positions() {
        let mut tracks = OrderedTracks::new();
        tracks.add(vec![
            Track::new("money.flac").with_title("Money").with_artist("Pink Floyd"),
            Track::new("04 - Endless Dream.flac").with_artist("Conjure One"),
            Track::new("time.flac").with_title("Time").with_artist("Pink Floyd"),
        ]);

        let results = tracks.search(&SearchQuery::new("pink floyd"));
        let found: Vec<(usize, SearchField)> = results.iter().map(|r| (r.index, r.matched_field)).collect();
        assert_eq!(found, vec![(0, SearchField::Artist), (2, SearchField::Artist)]);
        assert_eq!(results[1].track, Track::new("time.flac"));

        let results = tracks.search(&SearchQuery::new("dream"));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].matched_field, SearchField::Name);

        assert!(tracks.search(&SearchQuery::new("pink").with_fields([])).is_empty());
    }

    #[test]
    fn track_list_handles_share_storage() {
        let list = TrackList::from_tracks(vec![Track::new("a")]);
        let loader = list.clone();

        let handle = std::thread::spawn(move || {
            loader.update_tracks_if_present(vec![Track::new("a").with_title("Loaded")])
        });
        assert_eq!(handle.join().expect("loader thread panicked"), 1);

        assert_eq!(list.get(0).and_then(|t| t.title), Some("Loaded".to_string()));
        assert_eq!(list.len(), 1);
    }
}
