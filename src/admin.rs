use crate::catalog::Catalog;
use crate::model::*;
use serde::Serialize;

pub const TOP_VIDEOS: usize = 5;

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenreCount {
    pub genre: Genre,
    pub label: &'static str,
    pub count: usize,
}

/// Figures for the admin dashboard, computed from what is loaded.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdminOverview<'a> {
    pub total_videos: usize,
    pub total_views: u64,
    pub average_rating: f32,
    pub genres: Vec<GenreCount>,
    pub top_videos: Vec<&'a Video>,
    /// Only known with local accounts.
    pub registered_users: Option<usize>,
}

impl<'a> AdminOverview<'a> {
    pub fn new(catalog: &'a Catalog, registered_users: Option<usize>) -> AdminOverview<'a> {
        let videos = catalog.videos();
        let average_rating = if videos.is_empty() {
            0.0
        } else {
            let sum: f32 = videos.iter().map(|video| video.rating).sum();
            (sum / videos.len() as f32 * 10.0).round() / 10.0
        };
        let genres = Genre::ALL
            .iter()
            .map(|genre| GenreCount {
                genre: *genre,
                label: genre.label(),
                count: videos.iter().filter(|video| video.genre == *genre).count(),
            })
            .collect();
        let mut top_videos: Vec<&Video> = videos.iter().collect();
        // Stable sort: ties keep catalog order.
        top_videos.sort_by(|a, b| b.watch_count.cmp(&a.watch_count));
        top_videos.truncate(TOP_VIDEOS);
        AdminOverview {
            total_videos: videos.len(),
            total_views: videos.iter().map(|video| video.watch_count).sum(),
            average_rating,
            genres,
            top_videos,
            registered_users,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::video;

    #[test]
    fn overview() {
        let mut videos = vec![
            video("1", "One", Genre::Horror),
            video("2", "Two", Genre::Horror),
            video("3", "Three", Genre::Drama),
        ];
        videos[0].watch_count = 10;
        videos[1].watch_count = 30;
        videos[2].watch_count = 20;
        videos[0].rating = 7.0;
        videos[1].rating = 8.0;
        videos[2].rating = 8.5;
        let catalog = Catalog::new(videos).unwrap();
        let overview = AdminOverview::new(&catalog, Some(4));
        assert_eq!(overview.total_videos, 3);
        assert_eq!(overview.total_views, 60);
        assert_eq!(overview.average_rating, 7.8);
        let ids: Vec<&str> = overview.top_videos.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3", "1"]);
        let horror = overview
            .genres
            .iter()
            .find(|g| g.genre == Genre::Horror)
            .unwrap();
        assert_eq!(horror.count, 2);
        assert_eq!(overview.registered_users, Some(4));
    }

    #[test]
    fn empty_catalog() {
        let catalog = Catalog::default();
        let overview = AdminOverview::new(&catalog, None);
        assert_eq!(overview.average_rating, 0.0);
        assert!(overview.top_videos.is_empty());
        assert!(overview.genres.iter().all(|g| g.count == 0));
    }

    #[test]
    fn top_videos_capped() {
        let overview_catalog = Catalog::builtin().unwrap();
        let overview = AdminOverview::new(&overview_catalog, None);
        assert_eq!(overview.top_videos.len(), TOP_VIDEOS);
        assert_eq!(overview.top_videos[0].title, "The Haunting Hour");
    }
}
