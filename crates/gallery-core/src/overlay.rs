use std::collections::HashSet;

use crate::types::Photo;

const UPLOADED_TITLE: &str = "Uploaded Photo";
const UPLOADED_DESCRIPTION: &str = "How fun is it to upload photos to my gallery";
const UPLOADED_USER: i64 = 0;

/// Local layer on top of the remote catalog, handed by value to each
/// reconciliation cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayState {
    /// Uploaded photos, newest first.
    pub uploaded_photos: Vec<Photo>,
    /// Ids removed from the virtual feed for the rest of the session.
    pub deleted_photo_ids: HashSet<i64>,
}

impl OverlayState {
    pub fn uploaded_count(&self) -> usize {
        self.uploaded_photos.len()
    }

    pub fn is_deleted(&self, id: i64) -> bool {
        self.deleted_photo_ids.contains(&id)
    }
}

/// Owner of the overlay. Mutated only by explicit user actions.
#[derive(Debug, Clone, Default)]
pub struct LocalOverlayStore {
    state: OverlayState,
    next_upload_id: i64,
}

impl LocalOverlayStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current overlay.
    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    /// Copy of the overlay for a reconciliation cycle.
    pub fn snapshot(&self) -> OverlayState {
        self.state.clone()
    }

    /// Add a photo at the front of the feed.
    ///
    /// Ids start at 0 and decrease by one per upload.
    pub fn upload(&mut self, url: impl Into<String>) -> Photo {
        let photo = Photo {
            id: self.next_upload_id,
            title: UPLOADED_TITLE.to_owned(),
            description: UPLOADED_DESCRIPTION.to_owned(),
            url: url.into(),
            user: UPLOADED_USER,
        };
        self.next_upload_id -= 1;
        self.state.uploaded_photos.insert(0, photo.clone());
        photo
    }

    /// Remove `ids` from the uploads and mark all of them deleted.
    ///
    /// Deletions are permanent for the session.
    pub fn commit_delete(&mut self, ids: &HashSet<i64>) {
        self.state
            .uploaded_photos
            .retain(|photo| !ids.contains(&photo.id));
        self.state.deleted_photo_ids.extend(ids.iter().copied());
    }
}
