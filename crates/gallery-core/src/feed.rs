use std::{
    collections::HashMap,
    sync::{
        Arc, RwLock,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;

use crate::{error::GalleryError, types::Photo};

/// Id of the last photo in the public sample catalog.
pub const DEFAULT_TERMINAL_PHOTO_ID: i64 = 132;

/// One contiguous offset/limit window of the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeedSlice {
    /// Photos in server order.
    pub photos: Vec<Photo>,
    /// No photos exist past this slice.
    pub exhausted: bool,
}

impl FeedSlice {
    /// Wrap raw photos, deriving the exhaustion flag.
    ///
    /// A slice is exhausted when it contains the terminal id or when the
    /// catalog returned fewer photos than requested.
    pub fn from_photos(photos: Vec<Photo>, requested_limit: u32, terminal_id: i64) -> Self {
        let exhausted = photos.len() < requested_limit as usize
            || photos.iter().any(|photo| photo.id == terminal_id);
        Self { photos, exhausted }
    }
}

/// Offset/limit access to the remote photo catalog.
///
/// Implementations know nothing about uploads or deletions and never retry.
#[async_trait]
pub trait RemoteFeed: Send + Sync {
    async fn fetch_slice(&self, offset: u64, limit: u32) -> Result<FeedSlice, GalleryError>;
}

/// Catalog held in memory. Records every request it serves.
#[derive(Clone, Default)]
pub struct InMemoryFeed {
    photos: Arc<Vec<Photo>>,
    terminal_id: Option<i64>,
    requests: Arc<RwLock<Vec<(u64, u32)>>>,
    delays: Arc<RwLock<HashMap<u64, Duration>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryFeed {
    /// Catalog of sample photos with ids `1..=count`, the last one terminal.
    pub fn with_sample_photos(count: i64) -> Self {
        let photos = (1..=count).map(sample_photo).collect();
        Self::new(photos, Some(count))
    }

    pub fn new(photos: Vec<Photo>, terminal_id: Option<i64>) -> Self {
        Self {
            photos: Arc::new(photos),
            terminal_id,
            ..Self::default()
        }
    }

    /// Delay every response served at `offset`.
    pub fn delay_offset(&self, offset: u64, delay: Duration) {
        if let Ok(mut delays) = self.delays.write() {
            delays.insert(offset, delay);
        }
    }

    /// Make every following request fail with a network error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Requests served so far as `(offset, limit)` pairs.
    pub fn requests(&self) -> Vec<(u64, u32)> {
        self.requests
            .read()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    /// Raw catalog window without any filtering.
    pub fn raw_window(&self, offset: u64, limit: u32) -> Vec<Photo> {
        self.photos
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl RemoteFeed for InMemoryFeed {
    async fn fetch_slice(&self, offset: u64, limit: u32) -> Result<FeedSlice, GalleryError> {
        if let Ok(mut requests) = self.requests.write() {
            requests.push((offset, limit));
        }

        let delay = self
            .delays
            .read()
            .ok()
            .and_then(|delays| delays.get(&offset).copied());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(GalleryError::network(
                "feed_transport_error",
                "in-memory feed marked unavailable",
            ));
        }

        let photos = self.raw_window(offset, limit);
        let terminal_id = self.terminal_id.unwrap_or(i64::MAX);
        Ok(FeedSlice::from_photos(photos, limit, terminal_id))
    }
}

fn sample_photo(id: i64) -> Photo {
    Photo {
        id,
        title: format!("Sample photo {id}"),
        description: format!("Catalog entry number {id}"),
        url: format!("https://photos.example.org/{id}.jpeg"),
        user: 1 + id % 7,
    }
}
