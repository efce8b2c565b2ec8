use crate::model::*;
use std::collections::HashSet;
use std::path::Path;

pub const PAGE_SIZE: usize = 20;

const BUILTIN_CATALOG: &str = include_str!("../data/catalog.json");

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Could not read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed catalog: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Duplicate video id in catalog: {0}")]
    DuplicateId(String),
}

/// In-memory collection of the videos loaded for display.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    videos: Vec<Video>,
}

/// True if `video` passes the genre selector and contains `query` in its
/// title or description, ignoring case. An empty query matches everything.
pub fn matches(video: &Video, genre: GenreFilter, query: &str) -> bool {
    if !genre.matches(video.genre) {
        return false;
    }
    let query = query.to_lowercase();
    query.is_empty()
        || video.title.to_lowercase().contains(&query)
        || video.description.to_lowercase().contains(&query)
}

impl Catalog {
    pub fn new(videos: Vec<Video>) -> Result<Catalog, CatalogError> {
        let mut seen = HashSet::new();
        for video in &videos {
            if !seen.insert(video.id.as_str()) {
                return Err(CatalogError::DuplicateId(video.id.clone()));
            }
        }
        Ok(Catalog { videos })
    }

    pub fn builtin() -> Result<Catalog, CatalogError> {
        Catalog::from_json(BUILTIN_CATALOG)
    }

    pub fn from_json(json: &str) -> Result<Catalog, CatalogError> {
        Catalog::new(serde_json::from_str(json)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Catalog, CatalogError> {
        Catalog::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn videos(&self) -> &[Video] {
        &self.videos
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Video> {
        self.videos.iter().find(|video| video.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Subset passing [`matches`], in catalog order.
    pub fn filter(&self, genre: GenreFilter, query: &str) -> Vec<&Video> {
        self.videos
            .iter()
            .filter(|video| matches(video, genre, query))
            .collect()
    }

    /// Videos for `ids` in the order given. Ids not in the catalog are
    /// skipped.
    pub fn select<'a, I>(&self, ids: I) -> Vec<&Video>
    where
        I: IntoIterator<Item = &'a String>,
    {
        ids.into_iter().filter_map(|id| self.get(id)).collect()
    }

    /// 1-based page of [`PAGE_SIZE`] videos. Page 0 is read as page 1.
    pub fn page(&self, page: u32) -> &[Video] {
        let start = (page.max(1) as usize - 1).saturating_mul(PAGE_SIZE);
        if start >= self.videos.len() {
            return &[];
        }
        let end = (start + PAGE_SIZE).min(self.videos.len());
        &self.videos[start..end]
    }
}

#[cfg(test)]
pub(crate) fn video(id: &str, title: &str, genre: Genre) -> Video {
    Video {
        id: id.to_owned(),
        title: title.to_owned(),
        description: format!("{} description", title),
        genre,
        year: Some(2020),
        duration: "1h 30m".to_owned(),
        rating: 7.5,
        watch_count: 100,
        date_added: "2024-01-01".to_owned(),
        cover_color: "#1a1a1a".to_owned(),
        thumbnail_url: None,
        poster_url: None,
        backdrop_url: None,
    }
}
