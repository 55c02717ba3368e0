use std::fmt::Display;

use strum::{EnumIter, EnumString, IntoEnumIterator};

use crate::track::Track;

/// How the query text has to line up with a field value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, EnumString, strum::Display)]
#[strum(ascii_case_insensitive)]
pub enum SearchType {
    #[default]
    #[strum(serialize = "contains")]
    Contains,
    #[strum(serialize = "begins")]
    BeginsWith,
    #[strum(serialize = "ends")]
    EndsWith,
    #[strum(serialize = "equals")]
    Equals,
}

/// Track attribute a query can match. `Name` is the file name without its
/// extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, strum::Display)]
#[strum(ascii_case_insensitive)]
pub enum SearchField {
    #[strum(serialize = "name")]
    Name,
    #[strum(serialize = "title")]
    Title,
    #[strum(serialize = "artist")]
    Artist,
    #[strum(serialize = "album")]
    Album,
}

impl SearchField {
    fn value<'a>(&self, track: &'a Track) -> Option<&'a str> {
        match self {
            SearchField::Name => track.key.path().file_stem().and_then(|stem| stem.to_str()),
            SearchField::Title => track.title.as_deref(),
            SearchField::Artist => track.artist.as_deref(),
            SearchField::Album => track.album.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub search_type: SearchType,
    /// Fields to look in, in priority order. No fields matches nothing.
    pub fields: Vec<SearchField>,
    pub case_sensitive: bool,
}

impl SearchQuery {
    /// Case-insensitive `contains` over every field
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            search_type: SearchType::Contains,
            fields: SearchField::iter().collect(),
            case_sensitive: false,
        }
    }

    pub fn with_type(mut self, search_type: SearchType) -> Self {
        self.search_type = search_type;
        self
    }

    pub fn with_fields(mut self, fields: impl IntoIterator<Item = SearchField>) -> Self {
        self.fields = fields.into_iter().collect();
        self
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// First field of `track` that satisfies the query
    pub fn matched_field(&self, track: &Track) -> Option<SearchField> {
        if self.text.is_empty() {
            return None;
        }

        let needle = self.normalize(&self.text);
        self.fields.iter().copied().find(|field| {
            field
                .value(track)
                .is_some_and(|value| self.compare(&self.normalize(value), &needle))
        })
    }

    fn normalize(&self, text: &str) -> String {
        if self.case_sensitive {
            text.to_string()
        } else {
            text.to_lowercase()
        }
    }

    fn compare(&self, value: &str, needle: &str) -> bool {
        match self.search_type {
            SearchType::Contains => value.contains(needle),
            SearchType::BeginsWith => value.starts_with(needle),
            SearchType::EndsWith => value.ends_with(needle),
            SearchType::Equals => value == needle,
        }
    }
}

impl Display for SearchQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} '{}'", self.search_type, self.text)
    }
}

/// A queued track that matched a [`SearchQuery`]
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub index: usize,
    pub track: Track,
    pub matched_field: SearchField,
}
