use crate::model::*;
use chrono::NaiveDate;
use log::debug;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";
const DEFAULT_COVER_COLOR: &str = "#1a1a1a";
const DEFAULT_DURATION: &str = "2h 0m";

#[derive(Debug, thiserror::Error)]
pub enum TmdbError {
    #[error("TMDb request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("TMDb responded with {0}")]
    Status(u16),
}

#[derive(Deserialize, Debug, Clone)]
pub struct TmdbGenre {
    pub id: u64,
    pub name: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TmdbMovie {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    /// Set on list endpoints.
    #[serde(default)]
    pub genre_ids: Vec<u64>,
    /// Set on the detail endpoint instead of `genre_ids`.
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    #[serde(default)]
    pub release_date: Option<String>,
    pub runtime: Option<u32>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub popularity: f64,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
}

#[derive(Deserialize, Debug)]
struct MoviesResponse {
    results: Vec<TmdbMovie>,
}

#[derive(Deserialize, Debug)]
struct GenresResponse {
    genres: Vec<TmdbGenre>,
}

pub type GenreNames = HashMap<u64, String>;

fn format_runtime(minutes: u32) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}

fn release_year(date: Option<&str>) -> Option<u16> {
    date.and_then(|date| date.get(0..4)).and_then(|year| year.parse().ok())
}

/// Maps a TMDb record into a [`Video`]. The primary genre is the first one
/// listed; unknown or unmapped genres become drama.
pub fn convert_movie(
    movie: TmdbMovie,
    genre_names: &GenreNames,
    image_base_url: &str,
    today: NaiveDate,
) -> Video {
    let primary = movie
        .genre_ids
        .first()
        .copied()
        .or_else(|| movie.genres.first().map(|genre| genre.id));
    let genre = primary
        .and_then(|id| {
            genre_names.get(&id).map(String::as_str).or_else(|| {
                movie
                    .genres
                    .iter()
                    .find(|genre| genre.id == id)
                    .map(|genre| genre.name.as_str())
            })
        })
        .map(Genre::from_tmdb_name)
        .unwrap_or(Genre::Drama);
    let image = |path: &Option<String>| {
        path.as_ref()
            .map(|path| format!("{}{}", image_base_url, path))
    };
    Video {
        id: movie.id.to_string(),
        year: release_year(movie.release_date.as_deref()),
        duration: movie
            .runtime
            .filter(|minutes| *minutes > 0)
            .map(format_runtime)
            .unwrap_or_else(|| DEFAULT_DURATION.to_owned()),
        rating: ((movie.vote_average * 10.0).round() / 10.0) as f32,
        watch_count: (movie.popularity * 100.0).floor().max(0.0) as u64,
        date_added: today.format("%Y-%m-%d").to_string(),
        cover_color: DEFAULT_COVER_COLOR.to_owned(),
        thumbnail_url: image(&movie.poster_path),
        poster_url: image(&movie.poster_path),
        backdrop_url: image(&movie.backdrop_path),
        genre,
        title: movie.title,
        description: movie.overview,
    }
}

#[derive(Clone)]
pub struct TmdbClient {
    http: reqwest::Client,
    base_url: String,
    image_base_url: String,
    api_key: String,
}

impl TmdbClient {
    pub fn new(http: reqwest::Client, base_url: &str, image_base_url: &str, api_key: &str) -> Self {
        TmdbClient {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            image_base_url: image_base_url.trim_end_matches('/').to_owned(),
            api_key: api_key.to_owned(),
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Option<T>, TmdbError> {
        debug!("TMDb GET {}", path);
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(TmdbError::Status(status.as_u16()));
        }
        Ok(Some(response.json().await?))
    }

    pub async fn genres(&self) -> Result<GenreNames, TmdbError> {
        let response: Option<GenresResponse> = self.get("/genre/movie/list", &[]).await?;
        Ok(response
            .map(|response| {
                response
                    .genres
                    .into_iter()
                    .map(|genre| (genre.id, genre.name))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn list(&self, path: &str, params: &[(&str, String)]) -> Result<Vec<Video>, TmdbError> {
        let response: MoviesResponse = self
            .get(path, params)
            .await?
            .ok_or(TmdbError::Status(404))?;
        let genre_names = self.genres().await?;
        let today = chrono::Utc::now().date_naive();
        Ok(response
            .results
            .into_iter()
            .map(|movie| convert_movie(movie, &genre_names, &self.image_base_url, today))
            .collect())
    }

    pub async fn popular(&self, page: u32) -> Result<Vec<Video>, TmdbError> {
        self.list("/movie/popular", &[("page", page.to_string())])
            .await
    }

    pub async fn search(&self, query: &str, page: u32) -> Result<Vec<Video>, TmdbError> {
        self.list(
            "/search/movie",
            &[("query", query.to_owned()), ("page", page.to_string())],
        )
        .await
    }

    pub async fn discover(&self, genre: Genre, page: u32) -> Result<Vec<Video>, TmdbError> {
        self.list(
            "/discover/movie",
            &[
                ("with_genres", genre.tmdb_id().to_string()),
                ("page", page.to_string()),
            ],
        )
        .await
    }

    /// `Ok(None)` if TMDb doesn't know the id.
    pub async fn movie(&self, id: &str) -> Result<Option<Video>, TmdbError> {
        // TMDb ids are numeric; anything else can't exist there.
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(None);
        }
        let movie: Option<TmdbMovie> = self.get(&format!("/movie/{}", id), &[]).await?;
        match movie {
            Some(movie) => {
                let genre_names = self.genres().await?;
                let today = chrono::Utc::now().date_naive();
                Ok(Some(convert_movie(
                    movie,
                    &genre_names,
                    &self.image_base_url,
                    today,
                )))
            }
            None => Ok(None),
        }
    }
}
