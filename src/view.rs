use crate::library::Library;
use crate::model::*;
use serde::Serialize;

pub const GRID_COLUMNS: usize = 6;
pub const SHELF_SPACING: f32 = 2.5;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
    Carousel,
    Shelf,
}

impl ViewMode {
    pub const ALL: [ViewMode; 4] = [
        ViewMode::Grid,
        ViewMode::List,
        ViewMode::Carousel,
        ViewMode::Shelf,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::Grid => "grid",
            ViewMode::List => "list",
            ViewMode::Carousel => "carousel",
            ViewMode::Shelf => "shelf",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Grid => "Grid",
            ViewMode::List => "List",
            ViewMode::Carousel => "Carousel",
            ViewMode::Shelf => "Shelf",
        }
    }

    /// Anything unrecognized shows the grid.
    pub fn parse(value: Option<&str>) -> ViewMode {
        value
            .and_then(|value| {
                ViewMode::ALL
                    .iter()
                    .copied()
                    .find(|mode| mode.as_str() == value.trim())
            })
            .unwrap_or_default()
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VideoCard<'a> {
    pub video: &'a Video,
    pub is_favorite: bool,
    pub is_recent: bool,
    pub in_watchlist: bool,
    pub is_borrowed: bool,
}

impl<'a> VideoCard<'a> {
    pub fn new(video: &'a Video, library: &Library) -> VideoCard<'a> {
        VideoCard {
            video,
            is_favorite: library.favorites.contains(&video.id),
            is_recent: library.recently_watched.contains(&video.id),
            in_watchlist: library.watchlist.contains(&video.id),
            is_borrowed: library.borrowed.contains(&video.id),
        }
    }
}

pub fn cards<'a, I>(videos: I, library: &Library) -> Vec<VideoCard<'a>>
where
    I: IntoIterator<Item = &'a Video>,
{
    videos
        .into_iter()
        .map(|video| VideoCard::new(video, library))
        .collect()
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CarouselSlot<'a> {
    pub card: VideoCard<'a>,
    /// Degrees around the turntable.
    pub angle: f32,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ShelfSlot<'a> {
    pub card: VideoCard<'a>,
    /// Distance from the middle of the shelf, in case widths.
    pub offset: f32,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Shelf<'a> {
    pub genre: Genre,
    pub label: &'static str,
    pub slots: Vec<ShelfSlot<'a>>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Layout<'a> {
    Grid {
        columns: usize,
        rows: Vec<Vec<VideoCard<'a>>>,
    },
    List {
        items: Vec<VideoCard<'a>>,
    },
    Carousel {
        items: Vec<CarouselSlot<'a>>,
    },
    Shelf {
        shelves: Vec<Shelf<'a>>,
    },
}

fn shelf_offset(index: usize, len: usize) -> f32 {
    (index as f32 - (len as f32 - 1.0) / 2.0) * SHELF_SPACING
}

/// Arranges the (already filtered) cards for `mode`. Card order within each
/// arrangement follows the input order.
pub fn project(mode: ViewMode, cards: Vec<VideoCard<'_>>) -> Layout<'_> {
    match mode {
        ViewMode::Grid => Layout::Grid {
            columns: GRID_COLUMNS,
            rows: cards
                .chunks(GRID_COLUMNS)
                .map(|row| row.to_vec())
                .collect(),
        },
        ViewMode::List => Layout::List { items: cards },
        ViewMode::Carousel => {
            let step = if cards.is_empty() {
                0.0
            } else {
                360.0 / cards.len() as f32
            };
            Layout::Carousel {
                items: cards
                    .into_iter()
                    .enumerate()
                    .map(|(index, card)| CarouselSlot {
                        card,
                        angle: index as f32 * step,
                    })
                    .collect(),
            }
        }
        ViewMode::Shelf => {
            let shelves = Genre::ALL
                .iter()
                .filter_map(|genre| {
                    let on_shelf: Vec<VideoCard<'_>> = cards
                        .iter()
                        .filter(|card| card.video.genre == *genre)
                        .cloned()
                        .collect();
                    if on_shelf.is_empty() {
                        return None;
                    }
                    let len = on_shelf.len();
                    Some(Shelf {
                        genre: *genre,
                        label: genre.label(),
                        slots: on_shelf
                            .into_iter()
                            .enumerate()
                            .map(|(index, card)| ShelfSlot {
                                card,
                                offset: shelf_offset(index, len),
                            })
                            .collect(),
                    })
                })
                .collect();
            Layout::Shelf { shelves }
        }
    }
}
