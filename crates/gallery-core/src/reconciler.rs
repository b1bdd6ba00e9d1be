use tracing::debug;

use crate::{
    backfill::BackfillFetcher,
    error::GalleryError,
    feed::RemoteFeed,
    overlay::OverlayState,
    types::Photo,
};

/// Builds the exact photo list of one page of the virtual feed.
///
/// Pure apart from the feed requests it issues: the same inputs against the
/// same catalog give the same page.
#[derive(Debug, Clone)]
pub struct PageReconciler<F> {
    fetcher: BackfillFetcher<F>,
}

impl<F: RemoteFeed> PageReconciler<F> {
    pub fn new(feed: F) -> Self {
        Self {
            fetcher: BackfillFetcher::new(feed),
        }
    }

    /// Photos of 1-based `page_num`, at most `page_size` of them.
    ///
    /// Uploads occupy the front of the feed. A page straddling the end of the
    /// uploads is topped up from remote offset 0, not from the number of
    /// remote photos earlier pages would have consumed.
    pub async fn get_page(
        &self,
        page_num: u32,
        page_size: u32,
        overlay: &OverlayState,
    ) -> Result<Vec<Photo>, GalleryError> {
        if page_num == 0 || page_size == 0 {
            return Err(GalleryError::invalid_page(page_num, page_size));
        }

        let uploaded = &overlay.uploaded_photos;
        let uploaded_count = uploaded.len() as u64;
        let start = u64::from(page_num - 1) * u64::from(page_size);
        let end = u64::from(page_num) * u64::from(page_size);

        if uploaded_count > start {
            let start = start as usize;
            if uploaded_count >= end {
                debug!(page_num, page_size, "page served from uploads only");
                return Ok(uploaded[start..end as usize].to_vec());
            }

            let mut photos = uploaded[start..].to_vec();
            let want = page_size - photos.len() as u32;
            debug!(
                page_num,
                page_size,
                uploaded_on_page = photos.len(),
                want,
                "topping up upload page from remote offset 0"
            );
            let outcome = self
                .fetcher
                .fetch_window(0, want, &overlay.deleted_photo_ids)
                .await?;
            photos.extend(outcome.photos);
            return Ok(photos);
        }

        let offset = start - uploaded_count;
        debug!(page_num, page_size, offset, "page served from remote feed");
        let outcome = self
            .fetcher
            .fetch_window(offset, page_size, &overlay.deleted_photo_ids)
            .await?;
        Ok(outcome.photos)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::{feed::InMemoryFeed, overlay::LocalOverlayStore};

    fn ids(photos: &[Photo]) -> Vec<i64> {
        photos.iter().map(|p| p.id).collect()
    }

    fn store_with_uploads(count: usize) -> LocalOverlayStore {
        let mut store = LocalOverlayStore::new();
        for n in 0..count {
            store.upload(format!("blob:{n}"));
        }
        store
    }

    #[tokio::test]
    async fn matches_raw_feed_without_overlay() {
        let feed = InMemoryFeed::with_sample_photos(50);
        let reconciler = PageReconciler::new(feed.clone());
        let overlay = OverlayState::default();

        for (page_num, page_size) in [(1, 4), (2, 4), (3, 6), (5, 9), (4, 12)] {
            let page = reconciler
                .get_page(page_num, page_size, &overlay)
                .await
                .expect("page should load");
            let offset = u64::from(page_num - 1) * u64::from(page_size);
            assert_eq!(page, feed.raw_window(offset, page_size));
        }
    }

    #[tokio::test]
    async fn never_returns_deleted_photos() {
        let feed = InMemoryFeed::with_sample_photos(60);
        let reconciler = PageReconciler::new(feed);
        let mut store = store_with_uploads(3);
        store.commit_delete(&[-1, 2, 5, 6, 7, 13, 14].into_iter().collect());
        let overlay = store.snapshot();

        for page_num in 1..=6 {
            let page = reconciler
                .get_page(page_num, 6, &overlay)
                .await
                .expect("page should load");
            assert!(page.iter().all(|p| !overlay.is_deleted(p.id)));
        }
    }

    #[tokio::test]
    async fn backfill_keeps_pages_full_while_catalog_lasts() {
        let feed = InMemoryFeed::with_sample_photos(40);
        let reconciler = PageReconciler::new(feed);
        let mut store = LocalOverlayStore::new();
        store.commit_delete(&[9, 10, 11].into_iter().collect());

        let page = reconciler
            .get_page(2, 4, store.state())
            .await
            .expect("page should load");
        assert_eq!(ids(&page), vec![5, 6, 7, 8]);

        let page = reconciler
            .get_page(3, 4, store.state())
            .await
            .expect("page should load");
        assert_eq!(ids(&page), vec![12, 13, 14, 15]);
    }

    #[tokio::test]
    async fn terminates_with_short_page_when_rest_is_deleted() {
        let feed = InMemoryFeed::with_sample_photos(12);
        let reconciler = PageReconciler::new(feed);
        let mut store = LocalOverlayStore::new();
        store.commit_delete(&[10, 11, 12].into_iter().collect());

        let page = reconciler
            .get_page(3, 4, store.state())
            .await
            .expect("page should load");
        assert_eq!(ids(&page), vec![9]);
    }

    #[tokio::test]
    async fn newest_upload_leads_first_page() {
        let feed = InMemoryFeed::with_sample_photos(20);
        let reconciler = PageReconciler::new(feed);
        let mut store = store_with_uploads(2);
        let latest = store.upload("blob:latest");

        let page = reconciler
            .get_page(1, 4, store.state())
            .await
            .expect("page should load");
        assert_eq!(page[0], latest);
        assert_eq!(ids(&page), vec![-2, -1, 0, 1]);
    }

    #[tokio::test]
    async fn uploads_shift_page_boundaries() {
        let feed = InMemoryFeed::with_sample_photos(20);
        let reconciler = PageReconciler::new(feed.clone());
        let store = store_with_uploads(5);
        let uploads = store.state().uploaded_photos.clone();

        let first = reconciler
            .get_page(1, 4, store.state())
            .await
            .expect("page 1 should load");
        assert_eq!(first, uploads[0..4].to_vec());
        assert!(feed.requests().is_empty());

        let second = reconciler
            .get_page(2, 4, store.state())
            .await
            .expect("page 2 should load");
        assert_eq!(ids(&second), vec![uploads[4].id, 1, 2, 3]);
        assert_eq!(feed.requests(), vec![(0, 3)]);
    }

    #[tokio::test]
    async fn straddling_page_backfills_deleted_remote_photos() {
        let feed = InMemoryFeed::with_sample_photos(20);
        let reconciler = PageReconciler::new(feed.clone());
        let mut store = store_with_uploads(5);
        store.commit_delete(&HashSet::from([1]));
        let last_upload = store.state().uploaded_photos[4].id;

        let second = reconciler
            .get_page(2, 4, store.state())
            .await
            .expect("page 2 should load");
        assert_eq!(ids(&second), vec![last_upload, 2, 3, 4]);
        assert_eq!(feed.requests(), vec![(0, 3), (0, 4)]);
    }

    #[tokio::test]
    async fn page_past_uploads_offsets_remote_by_upload_count() {
        let feed = InMemoryFeed::with_sample_photos(20);
        let reconciler = PageReconciler::new(feed.clone());
        let store = store_with_uploads(5);

        let third = reconciler
            .get_page(3, 4, store.state())
            .await
            .expect("page 3 should load");
        assert_eq!(ids(&third), vec![4, 5, 6, 7]);
        assert_eq!(feed.requests(), vec![(3, 4)]);
    }

    // A straddling page restarts the remote feed at offset 0, so remote photos
    // shown there can show up again on a later page.
    #[tokio::test]
    async fn straddling_page_restarts_remote_feed_at_offset_zero() {
        let feed = InMemoryFeed::with_sample_photos(20);
        let reconciler = PageReconciler::new(feed.clone());
        let store = store_with_uploads(6);

        let second = reconciler
            .get_page(2, 4, store.state())
            .await
            .expect("page 2 should load");
        assert_eq!(ids(&second)[2..], [1, 2]);

        let third = reconciler
            .get_page(3, 4, store.state())
            .await
            .expect("page 3 should load");
        assert_eq!(ids(&third), vec![3, 4, 5, 6]);
        assert_eq!(feed.requests(), vec![(0, 2), (2, 4)]);
    }

    #[tokio::test]
    async fn committed_upload_never_reappears() {
        let feed = InMemoryFeed::with_sample_photos(20);
        let reconciler = PageReconciler::new(feed);
        let mut store = store_with_uploads(3);
        store.commit_delete(&HashSet::from([-1]));
        for n in 0..4 {
            store.upload(format!("blob:later-{n}"));
        }

        for page_num in 1..=4 {
            let page = reconciler
                .get_page(page_num, 4, store.state())
                .await
                .expect("page should load");
            assert!(page.iter().all(|p| p.id != -1));
        }
    }

    #[tokio::test]
    async fn rejects_page_zero() {
        let feed = InMemoryFeed::with_sample_photos(20);
        let reconciler = PageReconciler::new(feed.clone());

        let err = reconciler
            .get_page(0, 4, &OverlayState::default())
            .await
            .expect_err("page 0 must be rejected");
        assert_eq!(err.code, "invalid_page_request");
        assert!(feed.requests().is_empty());
    }
}
