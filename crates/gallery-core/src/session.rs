use tracing::{debug, info};

use crate::{
    error::{GalleryError, GalleryErrorCategory},
    feed::RemoteFeed,
    overlay::{LocalOverlayStore, OverlayState},
    reconciler::PageReconciler,
    selection::SelectionTracker,
    types::{GalleryCommand, GalleryEvent, PageSnapshot, Photo},
    viewport::{DEFAULT_PAGE_SIZE, page_size_for_width},
};

/// One scheduled reconciliation cycle.
///
/// Carries everything the cycle reads, so later mutations of the session
/// cannot change a window under a running fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileRequest {
    /// Monotonic tag; only the newest generation's result is displayed.
    pub generation: u64,
    pub page_num: u32,
    pub page_size: u32,
    pub overlay: OverlayState,
}

impl ReconcileRequest {
    /// Run the cycle against a reconciler.
    pub async fn run<F: RemoteFeed>(
        &self,
        reconciler: &PageReconciler<F>,
    ) -> Result<Vec<Photo>, GalleryError> {
        reconciler
            .get_page(self.page_num, self.page_size, &self.overlay)
            .await
    }
}

/// What happened to a finished cycle's result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The result was current and is now displayed.
    Applied(PageSnapshot),
    /// A newer request superseded this one; the result was dropped.
    Stale { generation: u64, latest: u64 },
    /// The current request failed; the previous page stays displayed.
    Failed { generation: u64, error: GalleryError },
}

/// Side effects of one command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandEffect {
    /// Events to emit immediately.
    pub events: Vec<GalleryEvent>,
    /// Reconciliation to schedule, if the command changed page or overlay.
    pub request: Option<ReconcileRequest>,
}

impl CommandEffect {
    fn schedule(request: ReconcileRequest) -> Self {
        Self {
            events: Vec::new(),
            request: Some(request),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    page_num: u32,
    page_size: u32,
}

/// Gallery state owned by a single logical thread of control.
///
/// Every change to page number, page size, or overlay schedules exactly one
/// [`ReconcileRequest`]; every older request becomes stale at that moment.
#[derive(Debug, Clone)]
pub struct GallerySession {
    page_num: u32,
    page_size: u32,
    overlay: LocalOverlayStore,
    selection: SelectionTracker,
    displayed: PageSnapshot,
    generation: u64,
    scheduled: Option<Scheduled>,
}

impl Default for GallerySession {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl GallerySession {
    /// Start an empty session on page 1. A zero size falls back to the default.
    pub fn new(page_size: u32) -> Self {
        let page_size = if page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            page_size
        };
        Self {
            page_num: 1,
            page_size,
            overlay: LocalOverlayStore::new(),
            selection: SelectionTracker::default(),
            displayed: PageSnapshot::empty(page_size),
            generation: 0,
            scheduled: None,
        }
    }

    /// Start a session sized for a viewport width.
    pub fn for_viewport(width_px: u32) -> Self {
        Self::new(page_size_for_width(width_px))
    }

    pub fn page_num(&self) -> u32 {
        self.page_num
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn overlay(&self) -> &OverlayState {
        self.overlay.state()
    }

    pub fn selection(&self) -> &SelectionTracker {
        &self.selection
    }

    /// Generation of the newest scheduled request.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Page currently displayed, with the live selection.
    pub fn snapshot(&self) -> PageSnapshot {
        PageSnapshot {
            selected_ids: self.selection.ids(),
            ..self.displayed.clone()
        }
    }

    /// Re-run the current page.
    pub fn refresh(&mut self) -> ReconcileRequest {
        self.schedule()
    }

    pub fn set_page_num(&mut self, page_num: u32) -> Result<ReconcileRequest, GalleryError> {
        if page_num == 0 {
            return Err(GalleryError::invalid_page(page_num, self.page_size));
        }
        self.page_num = page_num;
        Ok(self.schedule())
    }

    /// Advance one page. Refused while the displayed page is short.
    pub fn next_page(&mut self) -> Result<ReconcileRequest, GalleryError> {
        if !self.displayed.has_next {
            return Err(GalleryError::new(
                GalleryErrorCategory::Config,
                "no_next_page",
                format!("page {} is the last page", self.displayed.page_num),
            ));
        }
        self.set_page_num(self.page_num.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> Result<ReconcileRequest, GalleryError> {
        if self.page_num <= 1 {
            return Err(GalleryError::new(
                GalleryErrorCategory::Config,
                "no_previous_page",
                "already on the first page",
            ));
        }
        self.set_page_num(self.page_num - 1)
    }

    /// Change the page size for the next cycle. An unchanged size schedules nothing.
    pub fn set_page_size(
        &mut self,
        page_size: u32,
    ) -> Result<Option<ReconcileRequest>, GalleryError> {
        if page_size == 0 {
            return Err(GalleryError::new(
                GalleryErrorCategory::Config,
                "invalid_page_size",
                "page size must be at least 1",
            ));
        }
        if page_size == self.page_size {
            return Ok(None);
        }
        self.page_size = page_size;
        Ok(Some(self.schedule()))
    }

    pub fn set_viewport_width(&mut self, width_px: u32) -> Option<ReconcileRequest> {
        let page_size = page_size_for_width(width_px);
        if page_size == self.page_size {
            return None;
        }
        self.page_size = page_size;
        Some(self.schedule())
    }

    /// Add a local photo and jump back to the first page where it shows.
    pub fn upload(&mut self, url: impl Into<String>) -> (Photo, ReconcileRequest) {
        let photo = self.overlay.upload(url);
        self.page_num = 1;
        (photo, self.schedule())
    }

    /// Flip selection of a photo on the displayed page. Returns true when now selected.
    pub fn toggle_select(&mut self, id: i64) -> Result<bool, GalleryError> {
        if !self.displayed.photos.iter().any(|photo| photo.id == id) {
            return Err(GalleryError::new(
                GalleryErrorCategory::Config,
                "photo_not_displayed",
                format!("photo {id} is not on the displayed page"),
            ));
        }
        Ok(self.selection.toggle(id))
    }

    /// Delete the selection. Does nothing when nothing is selected.
    pub fn commit_delete(&mut self) -> Option<ReconcileRequest> {
        if self.selection.is_empty() {
            return None;
        }
        self.overlay.commit_delete(self.selection.as_set());
        debug!(ids = ?self.selection.ids(), "committed deletion");
        self.selection.clear();
        Some(self.schedule())
    }

    /// Accept the result of a finished cycle.
    pub fn apply_result(
        &mut self,
        generation: u64,
        result: Result<Vec<Photo>, GalleryError>,
    ) -> ApplyOutcome {
        let scheduled = match self.scheduled {
            Some(scheduled) if generation == self.generation => scheduled,
            _ => {
                debug!(generation, latest = self.generation, "dropping stale page result");
                return ApplyOutcome::Stale {
                    generation,
                    latest: self.generation,
                };
            }
        };

        match result {
            Ok(photos) => {
                self.selection.retain_displayed(&photos);
                self.displayed = PageSnapshot {
                    page_num: scheduled.page_num,
                    page_size: scheduled.page_size,
                    has_previous: scheduled.page_num > 1,
                    has_next: photos.len() == scheduled.page_size as usize,
                    photos,
                    selected_ids: Vec::new(),
                };
                info!(
                    generation,
                    page_num = scheduled.page_num,
                    count = self.displayed.photos.len(),
                    "page applied"
                );
                ApplyOutcome::Applied(self.snapshot())
            }
            Err(error) => ApplyOutcome::Failed { generation, error },
        }
    }

    /// Apply one protocol command.
    pub fn apply(&mut self, command: &GalleryCommand) -> Result<CommandEffect, GalleryError> {
        use GalleryCommand::*;

        match command {
            SetPageNum { page_num } => self.set_page_num(*page_num).map(CommandEffect::schedule),
            NextPage => self.next_page().map(CommandEffect::schedule),
            PreviousPage => self.previous_page().map(CommandEffect::schedule),
            SetPageSize { page_size } => Ok(CommandEffect {
                events: Vec::new(),
                request: self.set_page_size(*page_size)?,
            }),
            SetViewportWidth { width_px } => Ok(CommandEffect {
                events: Vec::new(),
                request: self.set_viewport_width(*width_px),
            }),
            Upload { url } => {
                let (photo, request) = self.upload(url.clone());
                Ok(CommandEffect {
                    events: vec![GalleryEvent::PhotoUploaded(photo)],
                    request: Some(request),
                })
            }
            ToggleSelect { id } => {
                self.toggle_select(*id)?;
                Ok(CommandEffect {
                    events: vec![GalleryEvent::SelectionChanged {
                        selected_ids: self.selection.ids(),
                    }],
                    request: None,
                })
            }
            CommitDelete => Ok(CommandEffect {
                events: Vec::new(),
                request: self.commit_delete(),
            }),
            Refresh => Ok(CommandEffect::schedule(self.refresh())),
        }
    }

    fn schedule(&mut self) -> ReconcileRequest {
        self.generation += 1;
        self.scheduled = Some(Scheduled {
            page_num: self.page_num,
            page_size: self.page_size,
        });
        ReconcileRequest {
            generation: self.generation,
            page_num: self.page_num,
            page_size: self.page_size,
            overlay: self.overlay.snapshot(),
        }
    }
}
