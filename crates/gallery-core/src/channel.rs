use thiserror::Error;
use tokio::sync::{broadcast, mpsc};

use crate::{
    error::GalleryError,
    normalization::{normalize_apply_outcome, normalize_rejection},
    session::ApplyOutcome,
    types::{GalleryCommand, GalleryEvent},
};

/// Broadcast event stream type used by presentation subscribers.
pub type EventStream = broadcast::Receiver<GalleryEvent>;

/// Errors returned by gallery channel operations.
#[derive(Debug, Error)]
pub enum GalleryChannelError {
    /// The gallery runtime stopped and no longer takes commands.
    #[error("gallery runtime is not accepting commands")]
    CommandChannelClosed,
}

/// Open the command queue and event fan-out for one gallery runtime.
///
/// The port goes to callers, the receiver and sink to the runtime. The
/// runtime never holds a command sender, so once every port is dropped the
/// receiver yields `None` and the runtime can stop.
pub fn gallery_channels(
    command_buffer: usize,
    event_buffer: usize,
) -> (
    GalleryCommandPort,
    mpsc::Receiver<GalleryCommand>,
    GalleryEventSink,
) {
    let (command_tx, command_rx) = mpsc::channel(command_buffer.max(1));
    let (event_tx, _) = broadcast::channel(event_buffer.max(1));

    (
        GalleryCommandPort {
            command_tx,
            event_tx: event_tx.clone(),
        },
        command_rx,
        GalleryEventSink { event_tx },
    )
}

/// Caller side of a gallery runtime: enqueue commands, watch events.
#[derive(Clone, Debug)]
pub struct GalleryCommandPort {
    command_tx: mpsc::Sender<GalleryCommand>,
    event_tx: broadcast::Sender<GalleryEvent>,
}

impl GalleryCommandPort {
    pub fn subscribe(&self) -> EventStream {
        self.event_tx.subscribe()
    }

    /// Queue one command. Commands are applied in the order they are queued.
    pub async fn send_command(&self, command: GalleryCommand) -> Result<(), GalleryChannelError> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| GalleryChannelError::CommandChannelClosed)
    }
}

/// Runtime side of the event fan-out.
#[derive(Clone, Debug)]
pub struct GalleryEventSink {
    event_tx: broadcast::Sender<GalleryEvent>,
}

impl GalleryEventSink {
    /// Best-effort; having no subscribers is not an error.
    pub fn emit(&self, event: GalleryEvent) {
        let _ = self.event_tx.send(event);
    }

    /// Publish a finished cycle. Returns false for stale results, which
    /// subscribers never see.
    pub fn publish_outcome(&self, outcome: ApplyOutcome) -> bool {
        match normalize_apply_outcome(outcome) {
            Some(event) => {
                self.emit(event);
                true
            }
            None => false,
        }
    }

    pub fn publish_rejection(&self, error: GalleryError) {
        self.emit(normalize_rejection(error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PageSnapshot;

    #[tokio::test]
    async fn delivers_commands_in_order() {
        let (port, mut rx, _sink) = gallery_channels(8, 8);
        port.send_command(GalleryCommand::SetPageNum { page_num: 3 })
            .await
            .expect("command send should work");
        port.send_command(GalleryCommand::NextPage)
            .await
            .expect("command send should work");

        assert_eq!(
            rx.recv().await,
            Some(GalleryCommand::SetPageNum { page_num: 3 })
        );
        assert_eq!(rx.recv().await, Some(GalleryCommand::NextPage));
    }

    #[tokio::test]
    async fn dropping_every_port_closes_the_queue_while_sink_lives() {
        let (port, mut rx, sink) = gallery_channels(4, 4);
        let second = port.clone();
        drop(port);
        drop(second);

        assert_eq!(rx.recv().await, None);
        sink.emit(GalleryEvent::SelectionChanged {
            selected_ids: vec![],
        });
    }

    #[tokio::test]
    async fn stale_outcomes_reach_no_subscriber() {
        let (port, _rx, sink) = gallery_channels(4, 16);
        let mut events = port.subscribe();

        assert!(!sink.publish_outcome(ApplyOutcome::Stale {
            generation: 1,
            latest: 2,
        }));
        let snapshot = PageSnapshot::empty(4);
        assert!(sink.publish_outcome(ApplyOutcome::Applied(snapshot.clone())));

        let event = events.recv().await.expect("subscriber should receive event");
        assert_eq!(event, GalleryEvent::PageLoaded(snapshot));
    }

    #[tokio::test]
    async fn rejections_become_events() {
        let (port, _rx, sink) = gallery_channels(4, 4);
        let mut events = port.subscribe();

        sink.publish_rejection(GalleryError::invalid_page(0, 4));

        match events.recv().await.expect("subscriber should receive event") {
            GalleryEvent::CommandRejected { code, .. } => assert_eq!(code, "invalid_page_request"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn reports_stopped_runtime() {
        let (port, rx, _sink) = gallery_channels(1, 1);
        drop(rx);

        let err = port
            .send_command(GalleryCommand::Refresh)
            .await
            .expect_err("closed receiver must fail");
        assert!(matches!(err, GalleryChannelError::CommandChannelClosed));
    }
}
