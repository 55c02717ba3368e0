use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::modes::RepeatMode;
use crate::track::TrackKey;
use crate::track_list::OrderedTracks;

/// A random, exhaustive, non-repeating play order over a set of tracks.
///
/// `sequence[..cursor]` has been played (most recent last, so the track
/// playing right now sits at `cursor - 1`) and `sequence[cursor..]` is still
/// to come. Tracks are held by key, so reordering the queue never
/// invalidates the sequence; only additions and removals have to be patched
/// in.
#[derive(Debug, Clone)]
pub struct ShuffleSequence {
    sequence: Vec<TrackKey>,
    cursor: usize,
    rng: SmallRng,
}

impl Default for ShuffleSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl ShuffleSequence {
    pub fn new() -> Self {
        Self::with_rng(SmallRng::from_os_rng())
    }

    /// Deterministic sequence, for tests and reproducible sessions
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }

    fn with_rng(rng: SmallRng) -> Self {
        Self {
            sequence: Vec::new(),
            cursor: 0,
            rng,
        }
    }

    /// Fresh random order over `keys`. A `playing` track is moved to the
    /// front and counted as already played.
    pub fn initialize(&mut self, keys: Vec<TrackKey>, playing: Option<&TrackKey>) {
        self.sequence = keys;
        self.sequence.shuffle(&mut self.rng);
        self.cursor = 0;

        if let Some(position) = playing.and_then(|key| self.position_of(key)) {
            self.sequence.swap(0, position);
            self.cursor = 1;
        }

        log::debug!(
            "Shuffle sequence initialized with {} tracks (cursor {})",
            self.sequence.len(),
            self.cursor
        );
    }

    /// Rebuild a sequence from a previous session's history
    pub fn resume(&mut self, played: Vec<TrackKey>, remaining: Vec<TrackKey>) {
        self.cursor = played.len();
        self.sequence = played;
        self.sequence.extend(remaining);
        log::debug!(
            "Shuffle sequence resumed: {} played, {} remaining",
            self.cursor,
            self.sequence.len() - self.cursor
        );
    }

    /// Advance one step. Once exhausted, only `RepeatMode::All` starts a new
    /// round.
    pub fn next(&mut self, repeat: RepeatMode) -> Option<TrackKey> {
        if let Some(key) = self.sequence.get(self.cursor).cloned() {
            self.cursor += 1;
            return Some(key);
        }

        if repeat == RepeatMode::All && !self.sequence.is_empty() {
            self.regenerate();
            self.cursor = 1;
            return self.sequence.first().cloned();
        }

        None
    }

    /// What `next` would return, without consuming it. Never starts a new
    /// round.
    pub fn peek_next(&self) -> Option<TrackKey> {
        self.sequence.get(self.cursor).cloned()
    }

    pub fn previous(&mut self) -> Option<TrackKey> {
        if self.has_previous() {
            self.cursor -= 1;
            return self.sequence.get(self.cursor - 1).cloned();
        }
        None
    }

    pub fn peek_previous(&self) -> Option<TrackKey> {
        if self.has_previous() {
            return self.sequence.get(self.cursor - 2).cloned();
        }
        None
    }

    /// Scatter new tracks over the unplayed part. Keys already in the
    /// sequence are skipped.
    pub fn add_tracks(&mut self, keys: impl IntoIterator<Item = TrackKey>) {
        for key in keys {
            if self.contains(&key) {
                continue;
            }
            let position = self.rng.random_range(self.cursor..=self.sequence.len());
            self.sequence.insert(position, key);
        }
    }

    /// Drop tracks from wherever they sit, keeping the cursor on the same
    /// boundary between played and remaining.
    pub fn remove_tracks<'a>(&mut self, keys: impl IntoIterator<Item = &'a TrackKey>) -> usize {
        let mut removed = 0;
        for key in keys {
            if let Some(position) = self.position_of(key) {
                self.sequence.remove(position);
                if position < self.cursor {
                    self.cursor -= 1;
                }
                removed += 1;
            }
        }
        removed
    }

    pub fn clear(&mut self) {
        self.sequence.clear();
        self.cursor = 0;
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn has_next(&self) -> bool {
        self.cursor < self.sequence.len()
    }

    pub fn has_previous(&self) -> bool {
        self.cursor > 1
    }

    pub fn has_ended(&self) -> bool {
        !self.sequence.is_empty() && !self.has_next()
    }

    pub fn contains(&self, key: &TrackKey) -> bool {
        self.sequence.contains(key)
    }

    pub fn keys(&self) -> &[TrackKey] {
        &self.sequence
    }

    pub fn played(&self) -> &[TrackKey] {
        &self.sequence[..self.cursor]
    }

    pub fn remaining(&self) -> &[TrackKey] {
        &self.sequence[self.cursor..]
    }

    /// Played part as queue indices
    pub fn played_indices(&self, tracks: &OrderedTracks) -> Vec<usize> {
        self.played().iter().filter_map(|key| tracks.index_of(key)).collect()
    }

    /// Remaining part as queue indices
    pub fn remaining_indices(&self, tracks: &OrderedTracks) -> Vec<usize> {
        self.remaining().iter().filter_map(|key| tracks.index_of(key)).collect()
    }

    fn position_of(&self, key: &TrackKey) -> Option<usize> {
        self.sequence.iter().position(|k| k == key)
    }

    fn regenerate(&mut self) {
        let last = self.sequence.last().cloned();
        self.sequence.shuffle(&mut self.rng);

        let len = self.sequence.len();
        if len > 1 && self.sequence.first() == last.as_ref() {
            // never start a round with the track that just finished
            let swap_with = self.rng.random_range(len / 2..len);
            self.sequence.swap(0, swap_with);
        }

        log::debug!("Shuffle sequence exhausted, regenerated {} tracks", len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn keys(n: usize) -> Vec<TrackKey> {
        (0..n).map(|i| TrackKey::from(format!("track-{i}").as_str())).collect()
    }

    fn drain(sequence: &mut ShuffleSequence, repeat: RepeatMode) -> Vec<TrackKey> {
        std::iter::from_fn(|| sequence.next(repeat)).take(10_000).collect()
    }

    #[test]
    fn initialize_without_playing_track() {
        let mut sequence = ShuffleSequence::with_seed(7);
        sequence.initialize(keys(5), None);
        assert_eq!(sequence.len(), 5);
        assert_eq!(sequence.cursor(), 0);
        assert!(sequence.played().is_empty());
        assert!(!sequence.has_previous());
    }

    #[test]
    fn initialize_puts_playing_track_first() {
        let all = keys(8);
        let mut sequence = ShuffleSequence::with_seed(1);
        sequence.initialize(all.clone(), Some(&all[5]));

        assert_eq!(sequence.cursor(), 1);
        assert_eq!(sequence.played(), &all[5..6]);
        assert_eq!(sequence.remaining().len(), 7);
    }

    #[test]
    fn next_walks_every_track_once_then_ends() {
        let all = keys(6);
        let mut sequence = ShuffleSequence::with_seed(3);
        sequence.initialize(all.clone(), None);

        let played = drain(&mut sequence, RepeatMode::Off);
        assert_eq!(played.len(), 6);
        assert_eq!(played.iter().collect::<HashSet<_>>(), all.iter().collect::<HashSet<_>>());
        assert!(sequence.has_ended());
        assert_eq!(sequence.next(RepeatMode::One), None);
        assert_eq!(sequence.peek_next(), None);
    }

    #[test]
    fn repeat_all_regenerates_without_immediate_repeat() {
        for seed in 0..200 {
            let mut sequence = ShuffleSequence::with_seed(seed);
            sequence.initialize(keys(2 + (seed as usize % 4)), None);
            let len = sequence.len();

            let mut last = None;
            for _ in 0..len {
                last = sequence.next(RepeatMode::All);
            }
            assert!(sequence.has_ended());

            let first_of_new_round = sequence.next(RepeatMode::All);
            assert_ne!(first_of_new_round, last, "seed {seed}");
            assert_eq!(sequence.cursor(), 1);
            assert_eq!(sequence.len(), len);
        }
    }

    #[test]
    fn single_track_regenerates_to_itself() {
        let all = keys(1);
        let mut sequence = ShuffleSequence::with_seed(0);
        sequence.initialize(all.clone(), Some(&all[0]));
        assert_eq!(sequence.next(RepeatMode::Off), None);
        assert_eq!(sequence.next(RepeatMode::All), Some(all[0].clone()));
    }

    #[test]
    fn large_rounds_differ_from_each_other() {
        let mut sequence = ShuffleSequence::with_seed(42);
        sequence.initialize(keys(20), None);
        let first_round = drain_round(&mut sequence);
        let second_round = drain_round(&mut sequence);
        assert_ne!(first_round, second_round);
    }

    fn drain_round(sequence: &mut ShuffleSequence) -> Vec<TrackKey> {
        (0..sequence.len()).filter_map(|_| sequence.next(RepeatMode::All)).collect()
    }

    #[test]
    fn peek_does_not_regenerate() {
        let mut sequence = ShuffleSequence::with_seed(9);
        sequence.initialize(keys(3), None);
        drain_round(&mut sequence);
        let before = sequence.keys().to_vec();

        assert_eq!(sequence.peek_next(), None);
        assert_eq!(sequence.keys(), before.as_slice());
        assert_eq!(sequence.cursor(), 3);
    }

    #[test]
    fn previous_walks_back_through_history() {
        let mut sequence = ShuffleSequence::with_seed(5);
        sequence.initialize(keys(4), None);
        let a = sequence.next(RepeatMode::Off);
        let b = sequence.next(RepeatMode::Off);
        let _c = sequence.next(RepeatMode::Off);

        assert_eq!(sequence.peek_previous(), b);
        assert_eq!(sequence.previous(), b);
        assert_eq!(sequence.previous(), a);
        assert_eq!(sequence.previous(), None);
        assert_eq!(sequence.cursor(), 1);
    }

    #[test]
    fn added_tracks_land_in_remaining_part() {
        let all = keys(6);
        let mut sequence = ShuffleSequence::with_seed(11);
        sequence.initialize(all[..4].to_vec(), Some(&all[0]));
        sequence.next(RepeatMode::Off);
        let played_before = sequence.played().to_vec();

        sequence.add_tracks(all[4..].to_vec());
        sequence.add_tracks(vec![all[1].clone()]);

        assert_eq!(sequence.len(), 6);
        assert_eq!(sequence.played(), played_before.as_slice());
        assert!(sequence.remaining().contains(&all[4]));
        assert!(sequence.remaining().contains(&all[5]));
    }

    #[test]
    fn removing_played_tracks_shifts_cursor() {
        let all = keys(5);
        let mut sequence = ShuffleSequence::with_seed(2);
        sequence.resume(all[..3].to_vec(), all[3..].to_vec());

        let removed = sequence.remove_tracks([&all[0], &all[4], &TrackKey::from("missing")]);
        assert_eq!(removed, 2);
        assert_eq!(sequence.cursor(), 2);
        assert_eq!(sequence.played(), &all[1..3]);
        assert_eq!(sequence.remaining(), &all[3..4]);
    }

    #[test]
    fn resume_reproduces_history() {
        let all = keys(4);
        let mut sequence = ShuffleSequence::with_seed(0);
        sequence.resume(vec![all[2].clone(), all[0].clone()], vec![all[3].clone(), all[1].clone()]);

        assert_eq!(sequence.played().last(), Some(&all[0]));
        assert_eq!(sequence.peek_previous(), Some(all[2].clone()));
        assert_eq!(sequence.next(RepeatMode::Off), Some(all[3].clone()));
        assert_eq!(sequence.next(RepeatMode::Off), Some(all[1].clone()));
        assert_eq!(sequence.next(RepeatMode::Off), None);
    }

    #[test]
    fn clear_empties_everything() {
        let mut sequence = ShuffleSequence::with_seed(0);
        sequence.initialize(keys(3), None);
        sequence.next(RepeatMode::Off);
        sequence.clear();
        assert!(sequence.is_empty());
        assert_eq!(sequence.cursor(), 0);
        assert_eq!(sequence.next(RepeatMode::All), None);
    }

    proptest::proptest! {
        #[test]
        fn initialize_is_a_permutation(len in 0usize..64, seed in proptest::num::u64::ANY, playing in 0usize..64) {
            let all = keys(len);
            let mut sequence = ShuffleSequence::with_seed(seed);
            sequence.initialize(all.clone(), all.get(playing));

            let mut sorted = sequence.keys().to_vec();
            sorted.sort();
            let mut expected = all.clone();
            expected.sort();
            proptest::prop_assert_eq!(sorted, expected);
            proptest::prop_assert_eq!(sequence.cursor(), usize::from(playing < len));
        }

        #[test]
        fn mutations_keep_cursor_in_bounds(ops in proptest::collection::vec(0u8..5, 1..150), seed in proptest::num::u64::ANY) {
            let all = keys(12);
            let mut sequence = ShuffleSequence::with_seed(seed);
            sequence.initialize(all[..6].to_vec(), None);

            for (step, op) in ops.into_iter().enumerate() {
                let key = &all[step % all.len()];
                match op {
                    0 => { sequence.next(RepeatMode::All); }
                    1 => { sequence.previous(); }
                    2 => sequence.add_tracks(vec![key.clone()]),
                    3 => { sequence.remove_tracks([key]); }
                    _ => { sequence.next(RepeatMode::Off); }
                }

                proptest::prop_assert!(sequence.cursor() <= sequence.len());
                let unique: HashSet<_> = sequence.keys().iter().collect();
                proptest::prop_assert_eq!(unique.len(), sequence.len());
            }
        }
    }
}
