use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Genre {
    Horror,
    Comedy,
    SciFi,
    Action,
    Drama,
}

impl Genre {
    pub const ALL: [Genre; 5] = [
        Genre::Horror,
        Genre::Comedy,
        Genre::SciFi,
        Genre::Action,
        Genre::Drama,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Genre::Horror => "horror",
            Genre::Comedy => "comedy",
            Genre::SciFi => "sci-fi",
            Genre::Action => "action",
            Genre::Drama => "drama",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Genre::Horror => "Horror",
            Genre::Comedy => "Comedy",
            Genre::SciFi => "Sci-Fi",
            Genre::Action => "Action",
            Genre::Drama => "Drama",
        }
    }

    /// Genre id used by TMDb's `/discover/movie?with_genres=`.
    pub fn tmdb_id(self) -> u64 {
        match self {
            Genre::Horror => 27,
            Genre::Comedy => 35,
            Genre::SciFi => 878,
            Genre::Action => 28,
            Genre::Drama => 18,
        }
    }

    /// Maps a TMDb genre name onto our genres. Anything we don't carry is
    /// shelved as drama.
    pub fn from_tmdb_name(name: &str) -> Genre {
        match name {
            "Horror" => Genre::Horror,
            "Comedy" => Genre::Comedy,
            "Science Fiction" => Genre::SciFi,
            "Action" => Genre::Action,
            _ => Genre::Drama,
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Genre {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Genre::ALL
            .iter()
            .copied()
            .find(|genre| genre.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown genre: {}", s))
    }
}

/// Genre selector of the catalog filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenreFilter {
    #[default]
    All,
    Only(Genre),
}

impl GenreFilter {
    pub fn matches(self, genre: Genre) -> bool {
        match self {
            GenreFilter::All => true,
            GenreFilter::Only(selected) => selected == genre,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GenreFilter::All => "all",
            GenreFilter::Only(genre) => genre.as_str(),
        }
    }

    /// Background theme class of the page for this selection.
    pub fn theme(self) -> &'static str {
        match self {
            GenreFilter::All => "theme-all",
            GenreFilter::Only(Genre::Horror) => "theme-horror",
            GenreFilter::Only(Genre::Comedy) => "theme-comedy",
            GenreFilter::Only(Genre::SciFi) => "theme-sci-fi",
            GenreFilter::Only(Genre::Action) => "theme-action",
            GenreFilter::Only(Genre::Drama) => "theme-drama",
        }
    }

    /// Lenient parse for query strings: missing, empty, `all` or garbage
    /// all mean no genre restriction.
    pub fn parse(value: Option<&str>) -> GenreFilter {
        match value.map(str::trim) {
            None | Some("") | Some("all") => GenreFilter::All,
            Some(other) => other
                .parse()
                .map(GenreFilter::Only)
                .unwrap_or(GenreFilter::All),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    pub title: String,
    pub description: String,
    pub genre: Genre,
    pub year: Option<u16>,
    pub duration: String,
    pub rating: f32,
    pub watch_count: u64,
    pub date_added: String,
    pub cover_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop_url: Option<String>,
}

/// Account record of the local auth backend.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: String,
}

/// User as reported back by either auth backend.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl AuthUser {
    /// Name to greet the user with: their name if known, else the local part
    /// of the email address.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) if !name.trim().is_empty() => name.trim().to_owned(),
            _ => self
                .email
                .split('@')
                .next()
                .unwrap_or(&self.email)
                .to_owned(),
        }
    }
}
