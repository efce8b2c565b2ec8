use crate::catalog::Catalog;
use crate::model::*;
use crate::tmdb::{TmdbClient, TmdbError};
use log::warn;

/// What `/api/movies` was asked for. A text query wins over a genre.
#[derive(Debug, Clone, PartialEq)]
pub enum MovieQuery {
    Popular,
    Search(String),
    Genre(Genre),
}

impl MovieQuery {
    /// Builds the request from raw query parameters. `all` or no genre
    /// means popular; a genre we don't carry is read as drama.
    pub fn from_params(query: Option<&str>, genre: Option<&str>) -> MovieQuery {
        if let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) {
            return MovieQuery::Search(query.to_owned());
        }
        match genre.map(str::trim) {
            None | Some("") | Some("all") => MovieQuery::Popular,
            Some(genre) => MovieQuery::Genre(genre.parse().unwrap_or_else(|err| {
                warn!("{}, using drama", err);
                Genre::Drama
            })),
        }
    }
}

/// Where videos come from: TMDb when an API key is configured, the static
/// catalog otherwise.
#[derive(Clone)]
pub enum MovieSource {
    Tmdb(TmdbClient),
    Static(Catalog),
}

impl MovieSource {
    pub async fn movies(&self, request: &MovieQuery, page: u32) -> Result<Vec<Video>, TmdbError> {
        match self {
            MovieSource::Tmdb(client) => match request {
                MovieQuery::Popular => client.popular(page).await,
                MovieQuery::Search(query) => client.search(query, page).await,
                MovieQuery::Genre(genre) => client.discover(*genre, page).await,
            },
            MovieSource::Static(catalog) => {
                let matching = match request {
                    MovieQuery::Popular => catalog.clone(),
                    MovieQuery::Search(query) => {
                        filtered(catalog, GenreFilter::All, query)
                    }
                    MovieQuery::Genre(genre) => {
                        filtered(catalog, GenreFilter::Only(*genre), "")
                    }
                };
                Ok(matching.page(page).to_vec())
            }
        }
    }

    pub async fn movie(&self, id: &str) -> Result<Option<Video>, TmdbError> {
        match self {
            MovieSource::Tmdb(client) => client.movie(id).await,
            MovieSource::Static(catalog) => Ok(catalog.get(id).cloned()),
        }
    }

    /// Resolves ids in order, skipping the ones that no longer exist.
    pub async fn movies_by_ids<'a, I>(&self, ids: I) -> Result<Vec<Video>, TmdbError>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut videos = Vec::new();
        for id in ids {
            if let Some(video) = self.movie(id).await? {
                videos.push(video);
            }
        }
        Ok(videos)
    }

    /// Catalog shown on pages. If TMDb fails the page still renders, from
    /// `fallback`.
    pub async fn browse(&self, fallback: &Catalog) -> Catalog {
        match self {
            MovieSource::Static(catalog) => catalog.clone(),
            MovieSource::Tmdb(client) => match client.popular(1).await {
                Ok(videos) => Catalog::new(videos).unwrap_or_else(|err| {
                    warn!("{}, showing built-in catalog", err);
                    fallback.clone()
                }),
                Err(err) => {
                    warn!("{}, showing built-in catalog", err);
                    fallback.clone()
                }
            },
        }
    }
}

fn filtered(catalog: &Catalog, genre: GenreFilter, query: &str) -> Catalog {
    // Subsets of a catalog keep unique ids.
    Catalog::new(catalog.filter(genre, query).into_iter().cloned().collect())
        .unwrap_or_default()
}
