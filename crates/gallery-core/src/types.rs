use serde::{Deserialize, Serialize};

/// One photo in the virtual feed, either remote or uploaded locally.
///
/// Remote photos carry server-assigned positive ids; uploaded photos carry
/// non-positive ids handed out by [`crate::LocalOverlayStore`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Photo {
    /// Unique id within the combined virtual list.
    pub id: i64,
    /// Display title.
    pub title: String,
    /// Display description.
    pub description: String,
    /// Image location (remote URL or a locally resolved object URL).
    pub url: String,
    /// Owning user id as reported by the feed.
    pub user: i64,
}

impl Photo {
    /// Whether this photo was uploaded in the current session.
    pub fn is_uploaded(&self) -> bool {
        self.id <= 0
    }
}

/// Page currently shown to the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageSnapshot {
    /// 1-based page number.
    pub page_num: u32,
    /// Page size the photos were reconciled with.
    pub page_size: u32,
    /// Photos in display order, at most `page_size` of them.
    pub photos: Vec<Photo>,
    /// Ids currently marked for deletion, sorted ascending.
    pub selected_ids: Vec<i64>,
    /// Backward pagination is possible.
    pub has_previous: bool,
    /// Forward pagination is possible. False once a short page is returned.
    pub has_next: bool,
}

impl PageSnapshot {
    /// Empty first page, used before the first reconciliation lands.
    pub fn empty(page_size: u32) -> Self {
        Self {
            page_num: 1,
            page_size,
            photos: Vec::new(),
            selected_ids: Vec::new(),
            has_previous: false,
            has_next: false,
        }
    }
}

/// Command channel input accepted by the gallery runtime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum GalleryCommand {
    /// Jump to a 1-based page.
    SetPageNum {
        /// Target page.
        page_num: u32,
    },
    /// Advance one page if the current page is full.
    NextPage,
    /// Go back one page if not on the first page.
    PreviousPage,
    /// Override the number of photos per page.
    SetPageSize {
        /// New page size, at least 1.
        page_size: u32,
    },
    /// Recompute the page size from a viewport width in pixels.
    SetViewportWidth {
        /// Viewport width in CSS pixels.
        width_px: u32,
    },
    /// Add a local photo at the front of the feed.
    Upload {
        /// Already resolved image URL.
        url: String,
    },
    /// Flip the selection state of a displayed photo.
    ToggleSelect {
        /// Photo id on the current page.
        id: i64,
    },
    /// Delete every selected photo.
    CommitDelete,
    /// Re-run reconciliation for the current page.
    Refresh,
}

/// Event stream output emitted by the gallery runtime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum GalleryEvent {
    /// A reconciliation cycle finished and its page is now displayed.
    PageLoaded(PageSnapshot),
    /// Selection changed without a reconciliation.
    SelectionChanged {
        /// Sorted selected ids.
        selected_ids: Vec<i64>,
    },
    /// A local photo was added to the overlay.
    PhotoUploaded(Photo),
    /// The latest reconciliation failed; the previous page stays displayed.
    FetchFailed {
        /// Stable error code.
        code: String,
        /// Human-readable message.
        message: String,
        /// Generation of the failed request.
        generation: u64,
    },
    /// A command was not applicable in the current state.
    CommandRejected {
        /// Stable error code.
        code: String,
        /// Human-readable message.
        message: String,
    },
}
