//! Turns an opaque playlist reference into a randomized candidate set of
//! [`Song`]s. Performs no catalog lookups; holds no state beyond its RNG.

use rand::seq::{index, SliceRandom};
use rand::thread_rng;

use crate::error::Result;
use crate::models::Song;
use crate::services::streaming_client::{StreamingClient, Track};

pub struct Sampler {
    streaming: StreamingClient,
    sample_size: usize,
}

impl Sampler {
    pub fn new(streaming: StreamingClient, sample_size: usize) -> Self {
        Self {
            streaming,
            sample_size,
        }
    }

    /// Draws a randomized working set of page offsets spanning the whole
    /// playlist (not just its first pages), so a playlist larger than
    /// `sample_size` is actually subsampled rather than walked from the
    /// start, then shuffles and caps the collected tracks at `sample_size`.
    pub async fn sample(&self, playlist_id: &str) -> Result<Vec<Song>> {
        let total = self.streaming.get_playlist_total(playlist_id).await? as usize;
        let page_size = self.streaming.page_size();
        let target = total.min(self.sample_size);

        if target == 0 {
            return Ok(Vec::new());
        }

        let total_pages = (total + page_size - 1) / page_size;
        let pages_needed = ((target + page_size - 1) / page_size).min(total_pages);

        let page_indices: Vec<usize> = if pages_needed >= total_pages {
            (0..total_pages).collect()
        } else {
            index::sample(&mut thread_rng(), total_pages, pages_needed).into_vec()
        };

        let mut tracks: Vec<Track> = Vec::with_capacity(pages_needed * page_size);
        for page_index in page_indices {
            let offset = page_index * page_size;
            let page = self
                .streaming
                .get_playlist_tracks(playlist_id, offset)
                .await?;
            tracks.extend(page);
        }

        tracks.shuffle(&mut thread_rng());
        tracks.truncate(target);

        Ok(tracks.into_iter().map(track_to_song).collect())
    }
}

fn track_to_song(track: Track) -> Song {
    Song {
        artist: track
            .artists
            .first()
            .map(|a| a.name.clone())
            .unwrap_or_default(),
        title: track.name,
        spotify_url: track.external_urls.spotify,
        current_release_date: track.album.release_date,
    }
}
