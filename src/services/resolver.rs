//! Resolves a song's original release year from the catalog, falling back
//! to the streaming service's own metadata on any failure path.

use regex::Regex;
use std::sync::OnceLock;

use crate::models::song::{current_year, month_name, NOT_AVAILABLE};
use crate::models::{ProcessedSong, Song};
use crate::models::song::ResolvedSource;
use crate::services::catalog_client::CatalogClient;

const SCORE_THRESHOLD: u32 = 80;
const PROMO_KEYWORDS: [&str; 5] = ["promo", "sampler", "test pressing", "advance", "acetate"];

fn bracket_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\(\[][^\)\]]*[\)\]]").unwrap())
}

fn disallowed_chars_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9 _-]").unwrap())
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Strips parenthesized/bracketed substrings and non-alphanumeric noise,
/// collapses whitespace, and lowercases.
pub fn normalize(input: &str) -> String {
    let no_brackets = bracket_re().replace_all(input, "");
    let allowed_only = disallowed_chars_re().replace_all(&no_brackets, "");
    let collapsed = whitespace_re().replace_all(&allowed_only, " ");
    collapsed.trim().to_lowercase()
}

pub struct Resolver {
    catalog: CatalogClient,
}

impl Resolver {
    pub fn new(catalog: CatalogClient) -> Self {
        Self { catalog }
    }

    /// Never fails: any internal error path falls back to streaming metadata.
    pub async fn resolve(&self, song: &Song) -> ProcessedSong {
        match self.resolve_via_catalog(song).await {
            Ok(Some(processed)) => processed,
            Ok(None) => fallback_to_streaming(song, None),
            Err(e) => {
                tracing::warn!(artist = %song.artist, title = %song.title, error = %e, "catalog resolution failed, falling back to streaming metadata");
                fallback_to_streaming(song, None)
            }
        }
    }

    async fn resolve_via_catalog(&self, song: &Song) -> crate::error::Result<Option<ProcessedSong>> {
        let norm_artist = normalize(&song.artist);
        let norm_title = normalize(&song.title);

        let mut results = self
            .catalog
            .search(&format!("{} {}", norm_artist, norm_title), 10, "year,asc")
            .await?;

        if results.is_empty() {
            results = self
                .catalog
                .search(&format!("artist:\"{}\"", norm_artist), 20, "year,asc")
                .await?;
        }

        if results.is_empty() {
            return Ok(None);
        }

        let mut best: Option<(u32, &crate::services::catalog_client::SearchResult)> = None;
        for candidate in &results {
            let score = score_candidate(candidate, &norm_artist, &norm_title);
            match best {
                Some((best_score, _)) if score <= best_score => {}
                _ => best = Some((score, candidate)),
            }
        }

        let (score, candidate) = match best {
            Some(b) => b,
            None => return Ok(None),
        };

        if score < SCORE_THRESHOLD {
            return Ok(None);
        }

        let master = self.catalog.get_master(candidate.id).await?;
        let release = self.catalog.get_release(master.main_release_id).await?;

        if let Some(format) = release.formats.first() {
            let is_promo = format.descriptions.iter().any(|d| {
                let lower = d.to_lowercase();
                PROMO_KEYWORDS.iter().any(|kw| lower.contains(kw))
            });
            if is_promo {
                return Ok(None);
            }
        }

        let (year, month, day) = match &release.released {
            Some(released) => parse_release_date(released, master.year),
            None => (master.year.map(|y| y.to_string()), None, None),
        };

        let year = match year {
            Some(y) => y,
            None => return Ok(None),
        };

        let year_num: i32 = match year.parse() {
            Ok(y) => y,
            Err(_) => return Ok(None),
        };
        if !(1900..=current_year()).contains(&year_num) {
            return Ok(None);
        }

        Ok(Some(ProcessedSong {
            artist: song.artist.clone(),
            title: song.title.clone(),
            spotify_url: song.spotify_url.clone(),
            current_release_date: song.current_release_date.clone(),
            release_year: year,
            release_month: month.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            release_day: day.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            source: ResolvedSource::Catalog,
            source_url: Some(format!(
                "https://www.discogs.com/master/{}",
                master.id
            )),
            error: None,
        }))
    }
}

/// Parses a catalog `released` date (`YYYY`, `YYYY-MM`, or `YYYY-MM-DD`),
/// defaulting the year to the master's year when the release omits one.
fn parse_release_date(released: &str, master_year: Option<i64>) -> (Option<String>, Option<String>, Option<String>) {
    let parts: Vec<&str> = released.split('-').collect();
    let year = parts
        .first()
        .filter(|p| !p.is_empty())
        .map(|p| p.to_string())
        .or_else(|| master_year.map(|y| y.to_string()));

    let month = parts
        .get(1)
        .and_then(|m| m.parse::<u32>().ok())
        .and_then(month_name)
        .map(|m| m.to_string());

    let day = parts.get(2).filter(|d| !d.is_empty()).map(|d| d.to_string());

    (year, month, day)
}

fn score_candidate(
    candidate: &crate::services::catalog_client::SearchResult,
    norm_artist: &str,
    norm_title: &str,
) -> u32 {
    let Some((artist_part, title_part)) = candidate.title.split_once(" - ") else {
        return 0;
    };

    let cand_artist = normalize(artist_part);
    let cand_title = normalize(title_part);

    let artist_score = if cand_artist == norm_artist {
        40
    } else if cand_artist.contains(norm_artist) {
        20
    } else {
        0
    };

    let title_score = if cand_title == norm_title {
        40
    } else if cand_title.contains(norm_title) {
        20
    } else {
        0
    };

    let year_score = match candidate.year.as_deref().and_then(|y| y.parse::<i32>().ok()) {
        Some(y) if (1900..=current_year()).contains(&y) => 20,
        _ => 0,
    };

    artist_score + title_score + year_score
}

/// Derives a ProcessedSong directly from the song's own streaming metadata.
/// Depends only on `song`, so it is idempotent across repeated calls.
pub fn fallback_to_streaming(song: &Song, error: Option<String>) -> ProcessedSong {
    let parts: Vec<&str> = song.current_release_date.split('-').collect();

    let year = parts
        .first()
        .filter(|p| !p.is_empty())
        .map(|p| p.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let month = parts
        .get(1)
        .and_then(|m| m.parse::<u32>().ok())
        .and_then(month_name)
        .map(|m| m.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let day = parts
        .get(2)
        .filter(|d| !d.is_empty())
        .map(|d| d.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    ProcessedSong {
        artist: song.artist.clone(),
        title: song.title.clone(),
        spotify_url: song.spotify_url.clone(),
        current_release_date: song.current_release_date.clone(),
        release_year: year,
        release_month: month,
        release_day: day,
        source: ResolvedSource::Streaming,
        source_url: Some(song.spotify_url.clone()),
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_brackets_and_punctuation() {
        assert_eq!(normalize("Hey Jude (Remastered 2015)"), "hey jude");
        assert_eq!(normalize("  Blues   Traveler!! "), "blues traveler");
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize("The Beatles (Live)");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn score_candidate_exact_match_is_100() {
        let candidate = crate::services::catalog_client::SearchResult {
            id: 1,
            title: "Beatles - Hey Jude".to_string(),
            year: Some("1968".to_string()),
        };
        assert_eq!(score_candidate(&candidate, "beatles", "hey jude"), 100);
    }

    #[test]
    fn score_candidate_without_separator_is_zero() {
        let candidate = crate::services::catalog_client::SearchResult {
            id: 1,
            title: "Hey Jude".to_string(),
            year: Some("1968".to_string()),
        };
        assert_eq!(score_candidate(&candidate, "beatles", "hey jude"), 0);
    }

    #[test]
    fn fallback_parses_partial_dates() {
        let song = Song {
            artist: "A".into(),
            title: "B".into(),
            spotify_url: "u".into(),
            current_release_date: "1999-03".into(),
        };
        let processed = fallback_to_streaming(&song, None);
        assert_eq!(processed.release_year, "1999");
        assert_eq!(processed.release_month, "March");
        assert_eq!(processed.release_day, "N/A");
    }

    #[test]
    fn fallback_handles_empty_date() {
        let song = Song {
            artist: "A".into(),
            title: "B".into(),
            spotify_url: "u".into(),
            current_release_date: "".into(),
        };
        let processed = fallback_to_streaming(&song, None);
        assert_eq!(processed.release_year, "N/A");
        assert_eq!(processed.release_month, "N/A");
        assert_eq!(processed.release_day, "N/A");
    }

    #[test]
    fn fallback_is_deterministic_for_same_song() {
        let song = Song {
            artist: "A".into(),
            title: "B".into(),
            spotify_url: "u".into(),
            current_release_date: "1984-07-15".into(),
        };
        let first = fallback_to_streaming(&song, None);
        let second = fallback_to_streaming(&song, None);
        assert_eq!(first.release_year, second.release_year);
        assert_eq!(first.release_month, second.release_month);
        assert_eq!(first.release_day, second.release_day);
    }
}
