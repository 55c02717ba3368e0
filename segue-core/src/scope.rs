use std::collections::HashSet;
use std::fmt::Display;

use strum::{EnumIter, EnumString};

use crate::track::{Track, TrackKey};
use crate::track_list::OrderedTracks;

/// Track attribute a group is formed by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, strum::Display)]
#[strum(ascii_case_insensitive)]
pub enum GroupKind {
    #[strum(serialize = "artist")]
    Artist,
    #[strum(serialize = "album")]
    Album,
    #[strum(serialize = "genre")]
    Genre,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupId {
    pub kind: GroupKind,
    pub name: String,
}

impl GroupId {
    pub fn new(kind: GroupKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    pub fn contains(&self, track: &Track) -> bool {
        group_name(track, self.kind) == Some(self.name.as_str())
    }
}

impl Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} '{}'", self.kind, self.name)
    }
}

/// What the active sequence ranges over
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Scope {
    #[default]
    AllTracks,
    Group(GroupId),
}

impl Scope {
    pub fn contains(&self, track: &Track) -> bool {
        match self {
            Scope::AllTracks => true,
            Scope::Group(group) => group.contains(track),
        }
    }

    /// Project the queue onto this scope
    pub fn view(&self, tracks: &OrderedTracks) -> ScopeView {
        match self {
            Scope::AllTracks => ScopeView::All(tracks.len()),
            Scope::Group(group) => ScopeView::Subset(
                tracks
                    .iter()
                    .enumerate()
                    .filter(|(_, track)| group.contains(track))
                    .map(|(index, _)| index)
                    .collect(),
            ),
        }
    }
}

impl Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::AllTracks => write!(f, "all tracks"),
            Scope::Group(group) => write!(f, "{}", group),
        }
    }
}

/// The in-scope part of the queue. Positions are 0-based within the view,
/// queue indices are positions in the full queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeView {
    All(usize),
    Subset(Vec<usize>),
}

impl ScopeView {
    pub fn len(&self) -> usize {
        match self {
            ScopeView::All(len) => *len,
            ScopeView::Subset(indices) => indices.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn queue_index(&self, position: usize) -> Option<usize> {
        match self {
            ScopeView::All(len) => (position < *len).then_some(position),
            ScopeView::Subset(indices) => indices.get(position).copied(),
        }
    }

    pub fn position_of(&self, queue_index: usize) -> Option<usize> {
        match self {
            ScopeView::All(len) => (queue_index < *len).then_some(queue_index),
            // Subset indices are ascending
            ScopeView::Subset(indices) => indices.binary_search(&queue_index).ok(),
        }
    }

    /// Keys of the in-scope tracks, in queue order
    pub fn keys(&self, tracks: &OrderedTracks) -> Vec<TrackKey> {
        (0..self.len())
            .filter_map(|position| self.queue_index(position))
            .filter_map(|index| tracks.get(index))
            .map(|track| track.key.clone())
            .collect()
    }
}

/// Distinct groups of `kind`, in order of first appearance in the queue
pub fn groups(tracks: &OrderedTracks, kind: GroupKind) -> Vec<GroupId> {
    let mut seen = HashSet::new();
    tracks
        .iter()
        .filter_map(|track| group_name(track, kind))
        .filter(|name| seen.insert(name.to_string()))
        .map(|name| GroupId::new(kind, name))
        .collect()
}

fn group_name(track: &Track, kind: GroupKind) -> Option<&str> {
    match kind {
        GroupKind::Artist => track.artist.as_deref(),
        GroupKind::Album => track.album.as_deref(),
        GroupKind::Genre => track.genre.as_deref(),
    }
}
