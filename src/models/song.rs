use serde::{Deserialize, Serialize};

pub const NOT_AVAILABLE: &str = "N/A";

/// A track as it arrives from the streaming service, before year resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Song {
    pub artist: String,
    pub title: String,
    #[serde(rename = "spotifyUrl")]
    pub spotify_url: String,
    #[serde(rename = "currentReleaseDate")]
    pub current_release_date: String,
}

/// `source` that supplied a [`ProcessedSong`]'s release date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedSource {
    Catalog,
    Streaming,
}

/// A [`Song`] augmented with its resolved release date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedSong {
    pub artist: String,
    pub title: String,
    #[serde(rename = "spotifyUrl")]
    pub spotify_url: String,
    #[serde(rename = "currentReleaseDate")]
    pub current_release_date: String,
    #[serde(rename = "releaseYear")]
    pub release_year: String,
    #[serde(rename = "releaseMonth")]
    pub release_month: String,
    #[serde(rename = "releaseDay")]
    pub release_day: String,
    pub source: ResolvedSource,
    #[serde(rename = "sourceUrl", skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessedSong {
    /// True iff `release_year` is `"N/A"` or a four-digit year within
    /// `[1900, currentYear]`.
    pub fn has_valid_year(&self) -> bool {
        if self.release_year == NOT_AVAILABLE {
            return true;
        }
        match self.release_year.parse::<i32>() {
            Ok(year) => (1900..=current_year()).contains(&year),
            Err(_) => false,
        }
    }
}

pub fn current_year() -> i32 {
    chrono::Utc::now().format("%Y").to_string().parse().unwrap_or(2026)
}

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub fn month_name(month: u32) -> Option<&'static str> {
    if (1..=12).contains(&month) {
        Some(MONTH_NAMES[(month - 1) as usize])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(release_year: &str) -> ProcessedSong {
        ProcessedSong {
            artist: "A".into(),
            title: "B".into(),
            spotify_url: "u".into(),
            current_release_date: "2000".into(),
            release_year: release_year.into(),
            release_month: NOT_AVAILABLE.into(),
            release_day: NOT_AVAILABLE.into(),
            source: ResolvedSource::Streaming,
            source_url: None,
            error: None,
        }
    }

    #[test]
    fn not_available_year_is_valid() {
        assert!(song(NOT_AVAILABLE).has_valid_year());
    }

    #[test]
    fn in_range_year_is_valid() {
        assert!(song("1994").has_valid_year());
    }

    #[test]
    fn out_of_range_year_is_invalid() {
        assert!(!song("1899").has_valid_year());
        assert!(!song(&(current_year() + 1).to_string()).has_valid_year());
    }

    #[test]
    fn non_numeric_year_is_invalid() {
        assert!(!song("unknown").has_valid_year());
    }

    #[test]
    fn month_name_rejects_out_of_range() {
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
        assert_eq!(month_name(3), Some("March"));
    }
}
