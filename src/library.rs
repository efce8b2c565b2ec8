use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const RECENTLY_WATCHED_LIMIT: usize = 5;

/// Ordered set of video ids. Insertion order is kept for display.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct IdSet(Vec<String>);

impl IdSet {
    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|other| other == id)
    }

    /// Adds `id` if absent, removes it if present. Returns whether `id` is in
    /// the set afterwards.
    pub fn toggle(&mut self, id: &str) -> bool {
        if let Some(index) = self.0.iter().position(|other| other == id) {
            self.0.remove(index);
            false
        } else {
            self.0.push(id.to_owned());
            true
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a IdSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Most-recent-first list of selected videos, without duplicates.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct RecentlyWatched(Vec<String>);

impl RecentlyWatched {
    pub fn select(&mut self, id: &str) {
        self.0.retain(|other| other != id);
        self.0.insert(0, id.to_owned());
        self.0.truncate(RECENTLY_WATCHED_LIMIT);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|other| other == id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a RecentlyWatched {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Favorites,
    Watchlist,
    Borrowed,
}

impl ListKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ListKind::Favorites => "favorites",
            ListKind::Watchlist => "watchlist",
            ListKind::Borrowed => "borrowed",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "favorites" => Ok(ListKind::Favorites),
            "watchlist" => Ok(ListKind::Watchlist),
            "borrowed" => Ok(ListKind::Borrowed),
            _ => Err(format!("Unknown list: {}", s)),
        }
    }
}

/// Per-session viewing state.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Library {
    #[serde(default)]
    pub favorites: IdSet,
    #[serde(default)]
    pub watchlist: IdSet,
    #[serde(default)]
    pub borrowed: IdSet,
    #[serde(default)]
    pub recently_watched: RecentlyWatched,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LibraryCounts {
    pub favorites: usize,
    pub watchlist: usize,
    pub borrowed: usize,
    pub recently_watched: usize,
}

impl Library {
    pub fn list(&self, kind: ListKind) -> &IdSet {
        match kind {
            ListKind::Favorites => &self.favorites,
            ListKind::Watchlist => &self.watchlist,
            ListKind::Borrowed => &self.borrowed,
        }
    }

    pub fn toggle(&mut self, kind: ListKind, id: &str) -> bool {
        match kind {
            ListKind::Favorites => self.favorites.toggle(id),
            ListKind::Watchlist => self.watchlist.toggle(id),
            ListKind::Borrowed => self.borrowed.toggle(id),
        }
    }

    pub fn select(&mut self, id: &str) {
        self.recently_watched.select(id);
    }

    pub fn counts(&self) -> LibraryCounts {
        LibraryCounts {
            favorites: self.favorites.len(),
            watchlist: self.watchlist.len(),
            borrowed: self.borrowed.len(),
            recently_watched: self.recently_watched.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_toggle_restores_the_set() {
        let mut library = Library::default();
        assert!(library.toggle(ListKind::Favorites, "A"));
        assert!(library.favorites.contains("A"));
        assert!(!library.toggle(ListKind::Favorites, "A"));
        assert_eq!(library, Library::default());
    }

    #[test]
    fn lists_are_independent() {
        let mut library = Library::default();
        library.toggle(ListKind::Watchlist, "A");
        library.toggle(ListKind::Borrowed, "B");
        assert!(library.favorites.is_empty());
        assert!(library.list(ListKind::Watchlist).contains("A"));
        assert!(!library.list(ListKind::Watchlist).contains("B"));
        assert!(library.list(ListKind::Borrowed).contains("B"));
    }

    #[test]
    fn toggle_keeps_insertion_order() {
        let mut set = IdSet::default();
        set.toggle("3");
        set.toggle("1");
        set.toggle("2");
        set.toggle("1");
        assert_eq!(set.iter().cloned().collect::<Vec<_>>(), vec!["3", "2"]);
    }

    #[test]
    fn recently_watched_is_capped_and_most_recent_first() {
        let mut recent = RecentlyWatched::default();
        for id in ["1", "2", "3", "4", "5", "6", "7"].iter() {
            recent.select(id);
        }
        assert_eq!(
            recent.iter().cloned().collect::<Vec<_>>(),
            vec!["7", "6", "5", "4", "3"]
        );
    }

    #[test]
    fn reselecting_moves_to_front_without_duplicates() {
        let mut recent = RecentlyWatched::default();
        recent.select("1");
        recent.select("2");
        recent.select("3");
        recent.select("1");
        assert_eq!(
            recent.iter().cloned().collect::<Vec<_>>(),
            vec!["1", "3", "2"]
        );
    }

    #[test]
    fn list_kind_parse() {
        assert_eq!("watchlist".parse::<ListKind>(), Ok(ListKind::Watchlist));
        assert!("watched".parse::<ListKind>().is_err());
    }

    #[test]
    fn serializes_camel_case() {
        let mut library = Library::default();
        library.select("9");
        let json = serde_json::to_value(&library).unwrap();
        assert_eq!(json["recentlyWatched"], serde_json::json!(["9"]));
        assert_eq!(json["favorites"], serde_json::json!([]));
    }
}
