use std::collections::HashSet;

use tracing::debug;

use crate::{
    error::GalleryError,
    feed::{FeedSlice, RemoteFeed},
    types::Photo,
};

/// Step of one backfill run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackfillState {
    /// Next request to issue at the fixed offset.
    Requesting { limit: u32 },
    /// Raw slice waiting to be filtered against the deleted ids.
    Filtering { limit: u32, slice: FeedSlice },
    /// Enough non-deleted photos were found.
    Satisfied(Vec<Photo>),
    /// The catalog ended first; the photos may be short of the target.
    Exhausted(Vec<Photo>),
}

impl BackfillState {
    /// Whether the run has finished.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Satisfied(_) | Self::Exhausted(_))
    }

    /// Compute the successor of a `Filtering` state.
    ///
    /// Non-filtering states are returned unchanged.
    pub fn filter(self, want: u32, deleted: &HashSet<i64>) -> Self {
        let Self::Filtering { limit, slice } = self else {
            return self;
        };

        let raw_count = slice.photos.len();
        let mut kept: Vec<Photo> = slice
            .photos
            .into_iter()
            .filter(|photo| !deleted.contains(&photo.id))
            .collect();
        let want = want as usize;

        debug!(
            limit,
            raw_count,
            kept = kept.len(),
            want,
            exhausted = slice.exhausted,
            "filtered backfill slice"
        );

        if kept.len() >= want {
            kept.truncate(want);
            return Self::Satisfied(kept);
        }
        if slice.exhausted {
            return Self::Exhausted(kept);
        }

        let missing = (raw_count - kept.len()) as u32;
        Self::Requesting {
            limit: (want as u32).saturating_add(missing),
        }
    }
}

/// Result of a finished backfill run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackfillOutcome {
    /// Non-deleted photos in server order, at most the requested count.
    pub photos: Vec<Photo>,
    /// Number of feed requests issued.
    pub rounds: u32,
    /// The run stopped at the end of the catalog.
    pub exhausted: bool,
}

/// Over-fetch-and-filter loop on top of a [`RemoteFeed`].
///
/// Each round re-requests the same offset with the window grown by exactly
/// the number of deleted photos seen, so the loop converges or hits the end
/// of the catalog.
#[derive(Debug, Clone)]
pub struct BackfillFetcher<F> {
    feed: F,
}

impl<F: RemoteFeed> BackfillFetcher<F> {
    pub fn new(feed: F) -> Self {
        Self { feed }
    }

    pub fn feed(&self) -> &F {
        &self.feed
    }

    /// Fill one catalog page, ignoring uploads.
    pub async fn fetch_page(
        &self,
        page_num: u32,
        page_size: u32,
        deleted: &HashSet<i64>,
    ) -> Result<BackfillOutcome, GalleryError> {
        if page_num == 0 || page_size == 0 {
            return Err(GalleryError::invalid_page(page_num, page_size));
        }
        let offset = u64::from(page_num - 1) * u64::from(page_size);
        self.fetch_window(offset, page_size, deleted).await
    }

    /// Collect up to `want` non-deleted photos starting at `offset`.
    pub async fn fetch_window(
        &self,
        offset: u64,
        want: u32,
        deleted: &HashSet<i64>,
    ) -> Result<BackfillOutcome, GalleryError> {
        if want == 0 {
            return Ok(BackfillOutcome {
                photos: Vec::new(),
                rounds: 0,
                exhausted: false,
            });
        }

        let mut state = BackfillState::Requesting { limit: want };
        let mut rounds = 0_u32;

        loop {
            state = match state {
                BackfillState::Requesting { limit } => {
                    rounds += 1;
                    debug!(offset, limit, round = rounds, "requesting backfill slice");
                    let slice = self.feed.fetch_slice(offset, limit).await?;
                    BackfillState::Filtering { limit, slice }
                }
                filtering @ BackfillState::Filtering { .. } => filtering.filter(want, deleted),
                BackfillState::Satisfied(photos) => {
                    return Ok(BackfillOutcome {
                        photos,
                        rounds,
                        exhausted: false,
                    });
                }
                BackfillState::Exhausted(photos) => {
                    return Ok(BackfillOutcome {
                        photos,
                        rounds,
                        exhausted: true,
                    });
                }
            };
        }
    }
}
