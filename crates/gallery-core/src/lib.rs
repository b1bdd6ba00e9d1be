//! Reconciliation and pagination engine for the photo gallery.
//!
//! This crate merges the remote photo catalog with local uploads and
//! deletions, backfills pages thinned out by deletions, and tracks which
//! reconciliation result is current.

/// Over-fetch-and-filter loop that keeps pages full despite deletions.
pub mod backfill;
/// Command queue and event fan-out between callers and the runtime.
pub mod channel;
/// Stable gallery error types.
pub mod error;
/// Remote catalog access trait and an in-memory catalog.
pub mod feed;
/// Cycle outcome to event mapping.
pub mod normalization;
/// Local uploads and deletions layered over the catalog.
pub mod overlay;
/// Page assembly from uploads and backfilled remote photos.
pub mod reconciler;
/// Marked-for-deletion tracking.
pub mod selection;
/// Session reducer with generation counting.
pub mod session;
/// Photo, snapshot, command, and event types.
pub mod types;
/// Viewport width breakpoints.
pub mod viewport;

pub use backfill::{BackfillFetcher, BackfillOutcome, BackfillState};
pub use channel::{
    EventStream, GalleryChannelError, GalleryCommandPort, GalleryEventSink, gallery_channels,
};
pub use error::{GalleryError, GalleryErrorCategory};
pub use feed::{DEFAULT_TERMINAL_PHOTO_ID, FeedSlice, InMemoryFeed, RemoteFeed};
pub use normalization::{normalize_apply_outcome, normalize_rejection};
pub use overlay::{LocalOverlayStore, OverlayState};
pub use reconciler::PageReconciler;
pub use selection::SelectionTracker;
pub use session::{ApplyOutcome, CommandEffect, GallerySession, ReconcileRequest};
pub use types::{GalleryCommand, GalleryEvent, PageSnapshot, Photo};
pub use viewport::{DEFAULT_PAGE_SIZE, page_size_for_width};
