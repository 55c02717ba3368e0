//! Deciding what plays: start/stop, explicit selection, and the
//! `subsequent` / `next` / `previous` resolutions with their peeking
//! counterparts.
//!
//! All resolution happens over the [`ScopeView`] of the queue. Positions are
//! computed within the view and mapped back to queue indices.

use crate::modes::{RepeatAndShuffleModes, RepeatMode, ShuffleMode};
use crate::queue::PlaybackQueue;
use crate::scope::{GroupId, Scope, ScopeView};
use crate::shuffle::ShuffleSequence;
use crate::track::{Track, TrackKey};
use crate::track_list::OrderedTracks;

/// Position to play when the current one finishes on its own
fn sequential_subsequent(position: Option<usize>, len: usize, repeat: RepeatMode) -> Option<usize> {
    match (repeat, position) {
        // first play always starts at the top
        (_, None) => Some(0),
        (RepeatMode::One, Some(position)) => Some(position),
        (_, Some(position)) if position + 1 < len => Some(position + 1),
        (RepeatMode::All, Some(_)) => Some(0),
        _ => None,
    }
}

fn sequential_next(position: usize, len: usize, repeat: RepeatMode) -> Option<usize> {
    if position + 1 < len {
        Some(position + 1)
    } else if repeat == RepeatMode::All {
        Some(0)
    } else {
        None
    }
}

fn sequential_previous(position: usize, len: usize, repeat: RepeatMode) -> Option<usize> {
    if position > 0 {
        Some(position - 1)
    } else if repeat == RepeatMode::All {
        len.checked_sub(1)
    } else {
        None
    }
}

/// Start a shuffle round if shuffle is on but no round exists yet, e.g.
/// shuffle was switched on while stopped.
fn ensure_shuffle(
    shuffle: &mut ShuffleSequence,
    tracks: &OrderedTracks,
    view: &ScopeView,
    current_index: Option<usize>,
) {
    if !shuffle.is_empty() {
        return;
    }

    let playing = current_index
        .filter(|&index| view.position_of(index).is_some())
        .and_then(|index| tracks.get(index))
        .map(|track| track.key.clone());
    shuffle.initialize(view.keys(tracks), playing.as_ref());
}

impl PlaybackQueue {
    /// Begin a new sequence over the current scope
    pub fn start(&mut self) -> Option<Track> {
        if self.shuffle_mode.is_on() {
            let tracks = self.tracks.read();
            let keys = self.scope.view(&tracks).keys(&tracks);
            self.shuffle.initialize(keys, None);
        }

        log::info!("Starting sequence over {}", self.scope);
        self.subsequent()
    }

    pub fn stop(&mut self) {
        self.current_index = None;
        self.shuffle.clear();
        log::info!("Sequence stopped");
    }

    /// Play the track at `index`. The scope is kept when the track belongs to
    /// it, otherwise playback widens to all tracks.
    pub fn select(&mut self, index: usize) -> Option<Track> {
        let tracks = self.tracks.read();
        let track = tracks.get(index)?.clone();

        if !self.scope.contains(&track) {
            log::info!("{} is outside {}, switching to all tracks", track, self.scope);
            self.scope = Scope::AllTracks;
        }

        self.current_index = Some(index);
        if self.shuffle_mode.is_on() {
            let keys = self.scope.view(&tracks).keys(&tracks);
            self.shuffle.initialize(keys, Some(&track.key));
        }

        log::debug!("Selected track {} ({})", index, track);
        Some(track)
    }

    /// [`select`](Self::select) by identity. Unknown keys change nothing.
    pub fn select_track(&mut self, key: &TrackKey) -> Option<Track> {
        let index = self.tracks.index_of(key)?;
        self.select(index)
    }

    /// Play a group from the start
    pub fn select_group(&mut self, group: GroupId) -> Option<Track> {
        self.scope = Scope::Group(group);
        self.current_index = None;
        self.shuffle.clear();
        self.start()
    }

    /// Narrow or widen what the sequence ranges over. If the playing track
    /// falls outside the new scope, playback stops.
    pub fn set_scope(&mut self, scope: Scope) {
        if scope == self.scope {
            return;
        }
        log::info!("Scope changed from {} to {}", self.scope, scope);
        self.scope = scope;

        let playing_in_scope = {
            let tracks = self.tracks.read();
            let playing = self.current_index.and_then(|index| tracks.get(index));
            match playing {
                Some(track) if self.scope.contains(track) => {
                    if self.shuffle_mode.is_on() {
                        let keys = self.scope.view(&tracks).keys(&tracks);
                        self.shuffle.initialize(keys, Some(&track.key));
                    }
                    true
                }
                Some(_) => false,
                None => {
                    self.shuffle.clear();
                    true
                }
            }
        };

        if !playing_in_scope {
            self.stop();
        }
    }

    // Iteration

    /// The track that plays once the current one finishes. This is the only
    /// resolution that crosses the end of the sequence by itself.
    pub fn subsequent(&mut self) -> Option<Track> {
        let tracks = self.tracks.read();
        let view = self.scope.view(&tracks);
        if view.is_empty() {
            self.current_index = None;
            return None;
        }

        let resolved = if self.shuffle_mode.is_on() {
            ensure_shuffle(&mut self.shuffle, &tracks, &view, self.current_index);
            self.shuffle.next(self.repeat_mode).and_then(|key| tracks.index_of(&key))
        } else {
            let position = self.current_index.and_then(|index| view.position_of(index));
            sequential_subsequent(position, view.len(), self.repeat_mode).and_then(|p| view.queue_index(p))
        };

        log::debug!("Subsequent: {:?} -> {:?}", self.current_index, resolved);
        self.current_index = resolved;
        resolved.and_then(|index| tracks.get(index).cloned())
    }

    /// Skip forward. When there is nothing to skip to, the current track
    /// keeps playing and `None` is returned.
    pub fn next(&mut self) -> Option<Track> {
        let tracks = self.tracks.read();
        let view = self.scope.view(&tracks);
        let current = self.current_index?;
        let position = view.position_of(current)?;

        if let Some(track) = self.singleton(&tracks, &view, current) {
            return Some(track);
        }
        if view.len() < 2 {
            return None;
        }

        let resolved = if self.shuffle_mode.is_on() {
            ensure_shuffle(&mut self.shuffle, &tracks, &view, self.current_index);
            self.shuffle.next(self.repeat_mode).and_then(|key| tracks.index_of(&key))
        } else {
            sequential_next(position, view.len(), self.repeat_mode).and_then(|p| view.queue_index(p))
        };

        log::debug!("Next: {} -> {:?}", current, resolved);
        let index = resolved?;
        self.current_index = Some(index);
        tracks.get(index).cloned()
    }

    /// Skip backward, the mirror image of [`next`](Self::next)
    pub fn previous(&mut self) -> Option<Track> {
        let tracks = self.tracks.read();
        let view = self.scope.view(&tracks);
        let current = self.current_index?;
        let position = view.position_of(current)?;

        if let Some(track) = self.singleton(&tracks, &view, current) {
            return Some(track);
        }
        if view.len() < 2 {
            return None;
        }

        let resolved = if self.shuffle_mode.is_on() {
            self.shuffle.previous().and_then(|key| tracks.index_of(&key))
        } else {
            sequential_previous(position, view.len(), self.repeat_mode).and_then(|p| view.queue_index(p))
        };

        log::debug!("Previous: {} -> {:?}", current, resolved);
        let index = resolved?;
        self.current_index = Some(index);
        tracks.get(index).cloned()
    }

    // Peeking

    pub fn peek_subsequent(&self) -> Option<Track> {
        let tracks = self.tracks.read();
        let view = self.scope.view(&tracks);
        if view.is_empty() {
            return None;
        }

        let resolved = if self.shuffle_mode.is_on() {
            self.shuffle.peek_next().and_then(|key| tracks.index_of(&key))
        } else {
            let position = self.current_index.and_then(|index| view.position_of(index));
            sequential_subsequent(position, view.len(), self.repeat_mode).and_then(|p| view.queue_index(p))
        };

        resolved.and_then(|index| tracks.get(index).cloned())
    }

    pub fn peek_next(&self) -> Option<Track> {
        let tracks = self.tracks.read();
        let view = self.scope.view(&tracks);
        let current = self.current_index?;
        let position = view.position_of(current)?;

        if let Some(track) = self.singleton(&tracks, &view, current) {
            return Some(track);
        }
        if view.len() < 2 {
            return None;
        }

        let resolved = if self.shuffle_mode.is_on() {
            self.shuffle.peek_next().and_then(|key| tracks.index_of(&key))
        } else {
            sequential_next(position, view.len(), self.repeat_mode).and_then(|p| view.queue_index(p))
        };
        resolved.and_then(|index| tracks.get(index).cloned())
    }

    pub fn peek_previous(&self) -> Option<Track> {
        let tracks = self.tracks.read();
        let view = self.scope.view(&tracks);
        let current = self.current_index?;
        let position = view.position_of(current)?;

        if let Some(track) = self.singleton(&tracks, &view, current) {
            return Some(track);
        }
        if view.len() < 2 {
            return None;
        }

        let resolved = if self.shuffle_mode.is_on() {
            self.shuffle.peek_previous().and_then(|key| tracks.index_of(&key))
        } else {
            sequential_previous(position, view.len(), self.repeat_mode).and_then(|p| view.queue_index(p))
        };
        resolved.and_then(|index| tracks.get(index).cloned())
    }

    /// A lone track under sequential playback repeats on next/previous,
    /// whatever the repeat mode.
    fn singleton(&self, tracks: &OrderedTracks, view: &ScopeView, current: usize) -> Option<Track> {
        if view.len() == 1 && !self.shuffle_mode.is_on() {
            return tracks.get(current).cloned();
        }
        None
    }

    // Modes

    pub fn repeat_and_shuffle_modes(&self) -> RepeatAndShuffleModes {
        RepeatAndShuffleModes {
            repeat: self.repeat_mode,
            shuffle: self.shuffle_mode,
        }
    }

    /// Repeat one cannot be combined with shuffle; setting it turns shuffle
    /// off.
    pub fn set_repeat_mode(&mut self, mode: RepeatMode) -> RepeatAndShuffleModes {
        self.repeat_mode = mode;

        if mode == RepeatMode::One && self.shuffle_mode.is_on() {
            self.shuffle_mode = ShuffleMode::Off;
            self.shuffle.clear();
        }

        log::debug!("Modes: {}", self.repeat_and_shuffle_modes());
        self.repeat_and_shuffle_modes()
    }

    /// Turning shuffle on starts a round with the playing track (if any)
    /// counted as played, and turns repeat one off.
    pub fn set_shuffle_mode(&mut self, mode: ShuffleMode) -> RepeatAndShuffleModes {
        if mode == self.shuffle_mode {
            return self.repeat_and_shuffle_modes();
        }
        self.shuffle_mode = mode;

        match mode {
            ShuffleMode::On => {
                if self.repeat_mode == RepeatMode::One {
                    self.repeat_mode = RepeatMode::Off;
                }

                self.shuffle.clear();
                if self.current_index.is_some() {
                    let tracks = self.tracks.read();
                    let view = self.scope.view(&tracks);
                    ensure_shuffle(&mut self.shuffle, &tracks, &view, self.current_index);
                }
            }
            ShuffleMode::Off => self.shuffle.clear(),
        }

        log::debug!("Modes: {}", self.repeat_and_shuffle_modes());
        self.repeat_and_shuffle_modes()
    }

    /// Shuffle is applied last, so it wins over repeat one
    pub fn set_repeat_and_shuffle_modes(&mut self, repeat: RepeatMode, shuffle: ShuffleMode) -> RepeatAndShuffleModes {
        self.set_repeat_mode(repeat);
        self.set_shuffle_mode(shuffle)
    }

    pub fn toggle_repeat_mode(&mut self) -> RepeatAndShuffleModes {
        self.set_repeat_mode(self.repeat_mode.toggled())
    }

    pub fn toggle_shuffle_mode(&mut self) -> RepeatAndShuffleModes {
        self.set_shuffle_mode(self.shuffle_mode.toggled())
    }
}
