use crate::{error::GalleryError, session::ApplyOutcome, types::GalleryEvent};

/// Convert a finished cycle to the event callers should see, if any.
///
/// Stale results produce nothing.
pub fn normalize_apply_outcome(outcome: ApplyOutcome) -> Option<GalleryEvent> {
    match outcome {
        ApplyOutcome::Applied(snapshot) => Some(GalleryEvent::PageLoaded(snapshot)),
        ApplyOutcome::Stale { .. } => None,
        ApplyOutcome::Failed { generation, error } => Some(GalleryEvent::FetchFailed {
            code: error.code,
            message: error.message,
            generation,
        }),
    }
}

/// Convert a refused command to a `CommandRejected` event.
pub fn normalize_rejection(error: GalleryError) -> GalleryEvent {
    GalleryEvent::CommandRejected {
        code: error.code,
        message: error.message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PageSnapshot;

    #[test]
    fn maps_applied_page_to_page_loaded() {
        let snapshot = PageSnapshot::empty(4);
        let event = normalize_apply_outcome(ApplyOutcome::Applied(snapshot.clone()));
        assert_eq!(event, Some(GalleryEvent::PageLoaded(snapshot)));
    }

    #[test]
    fn drops_stale_results() {
        let event = normalize_apply_outcome(ApplyOutcome::Stale {
            generation: 3,
            latest: 5,
        });
        assert_eq!(event, None);
    }

    #[test]
    fn maps_failure_with_stable_code() {
        let event = normalize_apply_outcome(ApplyOutcome::Failed {
            generation: 7,
            error: GalleryError::network("feed_http_status", "503 Service Unavailable"),
        });

        match event {
            Some(GalleryEvent::FetchFailed {
                code, generation, ..
            }) => {
                assert_eq!(code, "feed_http_status");
                assert_eq!(generation, 7);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn maps_rejection() {
        let event = normalize_rejection(GalleryError::invalid_page(0, 4));
        match event {
            GalleryEvent::CommandRejected { code, .. } => {
                assert_eq!(code, "invalid_page_request")
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
